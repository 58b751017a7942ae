use bytes::Bytes;
use std::time::Duration;

/// A complete media sample reassembled from one or more RTP packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Depacketized payloads of every packet in the group, in sequence order.
    pub data: Bytes,
    /// Time until the next sample, derived from the RTP timestamp delta.
    pub duration: Duration,
    /// RTP timestamp shared by the packets of this sample.
    pub packet_timestamp: u32,
    /// Packets evicted or discarded since the previous sample was returned.
    pub dropped_packets: usize,
}

/// Cumulative counters of a [SampleBuilder](crate::SampleBuilder).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SampleBuilderStats {
    pub samples: u64,
    /// Packets pushed out of the buffer to make room for newer ones.
    pub evicted_packets: u64,
    /// Packets removed in groups whose start could not be confirmed.
    pub discarded_packets: u64,
    /// Packets older than the scan position when they arrived.
    pub stale_packets: u64,
    pub duplicate_packets: u64,
    pub depacketize_failures: u64,
}
