use crate::util::SequenceNumber;
use webrtc::rtp::packet::Packet;

/// Result of [PacketBuffer::insert].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Insertion {
    /// Stored; `evicted` older packets had to leave the buffer to make room.
    Stored { evicted: usize },
    /// Older than the scan position.
    Stale,
    /// A packet with the same sequence number is already resident. The first copy is kept.
    Duplicate,
}

/// Fixed-capacity store of pending RTP packets, indexed by `sequence_number % capacity`.
///
/// Resident packets always lie in the window `[low, high]`, which is never wider than the
/// capacity, so two resident packets never share a slot.
pub(crate) struct PacketBuffer {
    slots: Box<[Option<Packet>]>,
    resident: usize,
    /// Oldest sequence number still relevant to the scan.
    low: Option<SequenceNumber>,
    /// Newest sequence number pushed.
    high: Option<SequenceNumber>,
    /// Timestamp of the packet directly before `low`, if it was seen.
    boundary: Option<u32>,
    /// Set once `low` has moved forward. Before that, late arrivals may still extend the
    /// window backwards.
    anchored: bool,
}

impl PacketBuffer {
    pub(crate) fn new(capacity: u16) -> PacketBuffer {
        debug_assert!(capacity > 0);
        let slots = (0..capacity).map(|_| None).collect();

        PacketBuffer {
            slots,
            resident: 0,
            low: None,
            high: None,
            boundary: None,
            anchored: false,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.resident
    }

    pub(crate) fn is_full(&self) -> bool {
        self.resident == self.slots.len()
    }

    pub(crate) fn low(&self) -> Option<SequenceNumber> {
        self.low
    }

    pub(crate) fn high(&self) -> Option<SequenceNumber> {
        self.high
    }

    pub(crate) fn boundary(&self) -> Option<u32> {
        self.boundary
    }

    pub(crate) fn get(&self, seq: SequenceNumber) -> Option<&Packet> {
        self.slots[seq.slot(self.slots.len())]
            .as_ref()
            .filter(|packet| packet.header.sequence_number == seq.0)
    }

    pub(crate) fn insert(&mut self, packet: Packet) -> Insertion {
        let seq = SequenceNumber(packet.header.sequence_number);

        let (low, high) = match (self.low, self.high) {
            (Some(low), Some(high)) => (low, high),
            _ => {
                self.low = Some(seq);
                self.high = Some(seq);
                self.store(seq, packet);
                return Insertion::Stored { evicted: 0 };
            }
        };

        let mut evicted = 0;
        if seq > high {
            let window_start = SequenceNumber(seq.0.wrapping_sub(self.slots.len() as u16 - 1));
            if window_start > low {
                evicted = self.advance_to(window_start);
            }
            self.high = Some(seq);
        } else if seq < low {
            // Until a group is resolved nothing has been scanned past, so an early packet
            // that arrived late can still join if it fits the window.
            if self.anchored || high.distance_from(seq) as usize >= self.slots.len() {
                return Insertion::Stale;
            }
            self.low = Some(seq);
        }

        if self.get(seq).is_some() {
            return Insertion::Duplicate;
        }
        self.store(seq, packet);
        Insertion::Stored { evicted }
    }

    /// Remove the packet at `seq`. If `seq` is the oldest position, the low-water marker moves
    /// past it.
    pub(crate) fn evict(&mut self, seq: SequenceNumber) -> Option<Packet> {
        let index = seq.slot(self.slots.len());
        let packet = if self.get(seq).is_some() {
            self.slots[index].take()
        } else {
            None
        };
        if packet.is_some() {
            self.resident -= 1;
        }
        if self.low == Some(seq) {
            self.boundary = packet.as_ref().map(|packet| packet.header.timestamp);
            self.low = Some(seq.next());
            self.anchored = true;
        }
        packet
    }

    /// Evict every position older than `target`, returning the number of packets removed.
    fn advance_to(&mut self, target: SequenceNumber) -> usize {
        let Some(low) = self.low else {
            return 0;
        };
        let distance = target.distance_from(low) as usize;

        let mut evicted = 0;
        let mut seq = low;
        for _ in 0..distance.min(self.slots.len()) {
            if let Some(packet) = self.evict(seq) {
                log::debug!(
                    "Evicted packet {} (timestamp {}) to make room",
                    packet.header.sequence_number,
                    packet.header.timestamp
                );
                evicted += 1;
            }
            seq = seq.next();
        }

        if distance > self.slots.len() {
            // Everything past the old window was never pushed
            self.boundary = None;
        }
        self.low = Some(target);
        self.anchored = true;
        evicted
    }

    fn store(&mut self, seq: SequenceNumber, packet: Packet) {
        let index = seq.slot(self.slots.len());
        debug_assert!(self.slots[index].is_none());
        self.slots[index] = Some(packet);
        self.resident += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use webrtc::rtp::header::Header;

    fn packet(sequence_number: u16, timestamp: u32) -> Packet {
        Packet {
            header: Header {
                sequence_number,
                timestamp,
                ..Default::default()
            },
            payload: Bytes::from_static(&[0x00]),
        }
    }

    #[test]
    fn stores_by_sequence_number() {
        let mut buffer = PacketBuffer::new(8);
        assert_eq!(buffer.insert(packet(100, 1)), Insertion::Stored { evicted: 0 });
        assert_eq!(buffer.insert(packet(102, 2)), Insertion::Stored { evicted: 0 });

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.low(), Some(SequenceNumber(100)));
        assert_eq!(buffer.high(), Some(SequenceNumber(102)));
        assert!(buffer.get(SequenceNumber(101)).is_none());
        assert_eq!(buffer.get(SequenceNumber(102)).unwrap().header.timestamp, 2);
        // Same slot, different sequence number
        assert!(buffer.get(SequenceNumber(110)).is_none());
    }

    #[test]
    fn duplicates_are_ignored() {
        let mut buffer = PacketBuffer::new(8);
        buffer.insert(packet(100, 1));
        assert_eq!(buffer.insert(packet(100, 9)), Insertion::Duplicate);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.get(SequenceNumber(100)).unwrap().header.timestamp, 1);
    }

    #[test]
    fn early_packet_extends_window_until_anchored() {
        let mut buffer = PacketBuffer::new(8);
        buffer.insert(packet(100, 1));
        assert_eq!(buffer.insert(packet(98, 1)), Insertion::Stored { evicted: 0 });
        assert_eq!(buffer.low(), Some(SequenceNumber(98)));

        // Would not fit in the window anymore
        assert_eq!(buffer.insert(packet(90, 1)), Insertion::Stale);

        buffer.evict(SequenceNumber(98));
        assert_eq!(buffer.low(), Some(SequenceNumber(99)));
        assert_eq!(buffer.insert(packet(97, 1)), Insertion::Stale);
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut buffer = PacketBuffer::new(4);
        for seq in 0..4 {
            buffer.insert(packet(seq, seq as u32));
        }
        assert!(buffer.is_full());

        assert_eq!(buffer.insert(packet(4, 4)), Insertion::Stored { evicted: 1 });
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.low(), Some(SequenceNumber(1)));
        assert_eq!(buffer.boundary(), Some(0));
        assert!(buffer.get(SequenceNumber(0)).is_none());

        // Jump far ahead, the whole window is lost
        assert_eq!(buffer.insert(packet(20, 20)), Insertion::Stored { evicted: 4 });
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.low(), Some(SequenceNumber(17)));
        assert_eq!(buffer.boundary(), None);
    }

    #[test]
    fn window_wraps_around() {
        let mut buffer = PacketBuffer::new(4);
        buffer.insert(packet(65534, 1));
        buffer.insert(packet(65535, 1));
        buffer.insert(packet(0, 2));
        buffer.insert(packet(1, 2));
        assert!(buffer.is_full());

        assert_eq!(buffer.insert(packet(2, 3)), Insertion::Stored { evicted: 1 });
        assert_eq!(buffer.low(), Some(SequenceNumber(65535)));
        assert_eq!(buffer.insert(packet(65534, 1)), Insertion::Stale);
    }
}
