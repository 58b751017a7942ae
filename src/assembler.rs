use crate::{
    buffer::PacketBuffer, depacketizer::Depacketizer, sample::SampleBuilderStats,
    util::SequenceNumber, Sample,
};
use bytes::BytesMut;
use std::time::Duration;

/// Outcome of scanning for the group that starts at the low-water marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Both ends are known: `first..=last` share `timestamp` and `last + 1` carries
    /// `next_timestamp`.
    Complete {
        first: SequenceNumber,
        last: SequenceNumber,
        timestamp: u32,
        next_timestamp: u32,
    },
    /// The newest packet still belongs to the group.
    Pending,
    /// A packet is missing before the end of the group could be found.
    Gap,
}

fn scan(buffer: &PacketBuffer) -> Scan {
    let (Some(first), Some(high)) = (buffer.low(), buffer.high()) else {
        return Scan::Pending;
    };
    let Some(packet) = buffer.get(first) else {
        return Scan::Gap;
    };

    let timestamp = packet.header.timestamp;
    let mut last = first;
    loop {
        if last == high {
            return Scan::Pending;
        }
        let next = last.next();
        match buffer.get(next) {
            None => return Scan::Gap,
            Some(packet) if packet.header.timestamp == timestamp => last = next,
            Some(packet) => {
                return Scan::Complete {
                    first,
                    last,
                    timestamp,
                    next_timestamp: packet.header.timestamp,
                }
            }
        }
    }
}

/// Turns complete groups of buffered packets into [Sample]s.
pub(crate) struct Assembler<D> {
    depacketizer: D,
    clock_rate: u32,
}

impl<D: Depacketizer> Assembler<D> {
    pub(crate) fn new(depacketizer: D, clock_rate: u32) -> Assembler<D> {
        debug_assert!(clock_rate > 0);
        Assembler {
            depacketizer,
            clock_rate,
        }
    }

    pub(crate) fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    /// Convert an RTP timestamp delta into wall-clock time.
    pub(crate) fn duration(&self, ticks: u32) -> Duration {
        Duration::from_nanos(ticks as u64 * 1_000_000_000 / self.clock_rate as u64)
    }

    /// Emit the earliest ready group, discarding groups whose start cannot be confirmed.
    pub(crate) fn assemble(
        &mut self,
        buffer: &mut PacketBuffer,
        stats: &mut SampleBuilderStats,
    ) -> Option<Sample> {
        loop {
            let Scan::Complete {
                first,
                last,
                timestamp,
                next_timestamp,
            } = scan(buffer)
            else {
                return None;
            };

            // The packet before the group must have been seen with another timestamp,
            // otherwise earlier members may have been missed or evicted.
            let start_confirmed = matches!(buffer.boundary(), Some(prev) if prev != timestamp);
            let members = last.distance_from(first) as usize + 1;

            if !start_confirmed {
                let mut seq = first;
                for _ in 0..members {
                    buffer.evict(seq);
                    seq = seq.next();
                }
                stats.discarded_packets += members as u64;
                log::debug!(
                    "Discarded {members} packet(s) with timestamp {timestamp}, start of group unconfirmed"
                );
                continue;
            }

            let mut data = BytesMut::new();
            let mut seq = first;
            for _ in 0..members {
                if let Some(packet) = buffer.evict(seq) {
                    match self.depacketizer.depacketize(&packet.payload) {
                        Ok(bytes) => data.extend_from_slice(&bytes),
                        Err(e) => {
                            stats.depacketize_failures += 1;
                            log::warn!(
                                "Skipping packet {}, unable to depacketize: {e:?}",
                                packet.header.sequence_number
                            );
                        }
                    }
                }
                seq = seq.next();
            }
            stats.samples += 1;

            let sample = Sample {
                data: data.freeze(),
                duration: self.duration(next_timestamp.wrapping_sub(timestamp)),
                packet_timestamp: timestamp,
                dropped_packets: 0,
            };
            return Some(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{depacketizer::PassThrough, DEFAULT_CLOCK_RATE};
    use bytes::Bytes;
    use webrtc::rtp::{header::Header, packet::Packet};

    fn packet(sequence_number: u16, timestamp: u32, payload: &'static [u8]) -> Packet {
        Packet {
            header: Header {
                sequence_number,
                timestamp,
                ..Default::default()
            },
            payload: Bytes::from_static(payload),
        }
    }

    fn buffer_with(packets: &[(u16, u32)]) -> PacketBuffer {
        let mut buffer = PacketBuffer::new(50);
        for &(seq, ts) in packets {
            buffer.insert(packet(seq, ts, &[0x00]));
        }
        buffer
    }

    #[test]
    fn scan_states() {
        assert_eq!(scan(&buffer_with(&[])), Scan::Pending);
        assert_eq!(scan(&buffer_with(&[(10, 1), (11, 1)])), Scan::Pending);
        assert_eq!(scan(&buffer_with(&[(10, 1), (12, 2)])), Scan::Gap);
        assert_eq!(
            scan(&buffer_with(&[(10, 1), (11, 1), (12, 2)])),
            Scan::Complete {
                first: SequenceNumber(10),
                last: SequenceNumber(11),
                timestamp: 1,
                next_timestamp: 2,
            }
        );
    }

    #[test]
    fn duration_uses_clock_rate() {
        let assembler = Assembler::new(PassThrough, DEFAULT_CLOCK_RATE);
        assert_eq!(assembler.duration(0x10000), Duration::from_secs(1));
        assert_eq!(assembler.duration(0x8000), Duration::from_millis(500));

        let assembler = Assembler::new(PassThrough, 90_000);
        assert_eq!(assembler.duration(3000), Duration::from_nanos(33_333_333));
        assert_eq!(assembler.clock_rate(), 90_000);
    }

    #[test]
    fn leading_group_is_discarded_once() {
        let mut buffer = buffer_with(&[(10, 1), (11, 1), (12, 2), (13, 3)]);
        let mut stats = SampleBuilderStats::default();
        let mut assembler = Assembler::new(PassThrough, DEFAULT_CLOCK_RATE);

        let sample = assembler.assemble(&mut buffer, &mut stats).unwrap();
        assert_eq!(sample.packet_timestamp, 2);
        assert_eq!(sample.duration, assembler.duration(1));
        assert_eq!(stats.discarded_packets, 2);
        assert_eq!(stats.samples, 1);

        // Packet 13 is still pending
        assert!(assembler.assemble(&mut buffer, &mut stats).is_none());
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.low(), Some(SequenceNumber(13)));
    }
}
