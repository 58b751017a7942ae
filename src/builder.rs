use crate::{
    assembler::Assembler,
    buffer::{Insertion, PacketBuffer},
    depacketizer::Depacketizer,
    error::SampleBuilderError,
    sample::SampleBuilderStats,
    util, Sample, MAX_CAPACITY,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use webrtc::{rtp::packet::Packet, rtp_transceiver::rtp_codec::RTCRtpCodecCapability};

struct Inner<D> {
    buffer: PacketBuffer,
    assembler: Assembler<D>,
    stats: SampleBuilderStats,
    /// Value of `evicted_packets + discarded_packets` when the last sample was returned.
    dropped_before_last_sample: u64,
}

/// Reassembles media samples from RTP packets that may arrive out of order or not at all.
///
/// Packets are fed with [push](SampleBuilder::push) and complete samples are drained with
/// [pop](SampleBuilder::pop). A sample is only released once the packets directly before
/// and after it have been seen with a different timestamp, so the first and the most recent
/// timestamp of a stream are always held back. At most `capacity` packets are kept; older
/// ones are evicted to make room and their samples are lost.
///
/// Both methods take `&self`, so a `SampleBuilder` can be shared between a receiving and a
/// decoding task through an `Arc`.
pub struct SampleBuilder<D> {
    inner: Mutex<Inner<D>>,
}

impl<D: Depacketizer> SampleBuilder<D> {
    /// Create a `SampleBuilder` holding up to `capacity` packets, converting RTP timestamps
    /// with `clock_rate` ticks per second.
    pub fn new(
        capacity: u16,
        depacketizer: D,
        clock_rate: u32,
    ) -> Result<SampleBuilder<D>, SampleBuilderError> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(SampleBuilderError::InvalidCapacity(capacity));
        }
        if clock_rate == 0 {
            return Err(SampleBuilderError::InvalidClockRate);
        }

        Ok(SampleBuilder {
            inner: Mutex::new(Inner {
                buffer: PacketBuffer::new(capacity),
                assembler: Assembler::new(depacketizer, clock_rate),
                stats: SampleBuilderStats::default(),
                dropped_before_last_sample: 0,
            }),
        })
    }

    /// Create a `SampleBuilder` using the clock rate of a negotiated codec.
    pub fn with_codec(
        capacity: u16,
        depacketizer: D,
        codec_capability: &RTCRtpCodecCapability,
    ) -> Result<SampleBuilder<D>, SampleBuilderError> {
        SampleBuilder::new(capacity, depacketizer, codec_capability.clock_rate)
    }

    fn lock(&self) -> MutexGuard<'_, Inner<D>> {
        // The state is consistent between every statement that can panic
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a packet. May evict the oldest buffered packets if the buffer is full.
    pub fn push(&self, packet: Packet) {
        let mut inner = self.lock();
        let sequence_number = packet.header.sequence_number;

        match inner.buffer.insert(packet) {
            Insertion::Stored { evicted } => inner.stats.evicted_packets += evicted as u64,
            Insertion::Stale => {
                log::trace!("Dropping stale packet {sequence_number}");
                inner.stats.stale_packets += 1;
            }
            Insertion::Duplicate => {
                log::trace!("Ignoring duplicate packet {sequence_number}");
                inner.stats.duplicate_packets += 1;
            }
        }
    }

    /// Parse a marshalled RTP packet and [push](SampleBuilder::push) it.
    pub fn push_raw(&self, buffer: &[u8]) -> Result<(), SampleBuilderError> {
        let packet = util::parse_packet(buffer).ok_or(SampleBuilderError::HeaderParsing)?;
        self.push(packet);
        Ok(())
    }

    /// Return the next complete sample, or `None` if no sample is ready yet.
    pub fn pop(&self) -> Option<Sample> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let mut sample = inner.assembler.assemble(&mut inner.buffer, &mut inner.stats)?;
        let dropped = inner.stats.evicted_packets + inner.stats.discarded_packets;
        sample.dropped_packets = (dropped - inner.dropped_before_last_sample) as usize;
        inner.dropped_before_last_sample = dropped;
        Some(sample)
    }

    /// Number of buffered packets.
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.lock().buffer.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.lock().buffer.capacity()
    }

    pub fn clock_rate(&self) -> u32 {
        self.lock().assembler.clock_rate()
    }

    pub fn stats(&self) -> SampleBuilderStats {
        self.lock().stats
    }
}
