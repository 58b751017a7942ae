mod assembler;
mod buffer;
mod builder;
pub mod depacketizer;
mod error;
mod sample;
pub mod util;

pub use builder::SampleBuilder;
pub use depacketizer::{Depacketizer, PassThrough, RtpDepacketizer};
pub use error::SampleBuilderError;
pub use sample::{Sample, SampleBuilderStats};

/// Largest buffer capacity that keeps 16-bit sequence number comparisons unambiguous.
pub const MAX_CAPACITY: u16 = (1 << 15) - 1;

/// Clock rate under which a timestamp delta of `0x10000` lasts exactly one second.
pub const DEFAULT_CLOCK_RATE: u32 = 1 << 16;
