mod rtp;
mod sequence_number;

pub(crate) use self::rtp::parse_packet;
pub use self::sequence_number::SequenceNumber;
