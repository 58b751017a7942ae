use std::cmp::Ordering;

/// RTP sequence number with wraparound-aware ordering.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceNumber(pub u16);

impl SequenceNumber {
    #[inline]
    pub fn next(&self) -> SequenceNumber {
        SequenceNumber(self.0.wrapping_add(1))
    }

    #[inline]
    pub fn prev(&self) -> SequenceNumber {
        SequenceNumber(self.0.wrapping_sub(1))
    }

    /// Number of steps needed to go forward from `earlier` to `self`, modulo 2^16.
    #[inline]
    pub fn distance_from(&self, earlier: SequenceNumber) -> u16 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Slot index in a ring of `len` slots.
    #[inline]
    pub fn slot(&self, len: usize) -> usize {
        self.0 as usize % len
    }
}

impl From<u16> for SequenceNumber {
    fn from(value: u16) -> Self {
        SequenceNumber(value)
    }
}

impl Ord for SequenceNumber {
    /// Total ordering from RFC1982.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        const THRESHOLD: u16 = 1 << 15;

        if self.0 == other.0 {
            Ordering::Equal
        } else if other.0.wrapping_sub(self.0) < THRESHOLD {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl PartialOrd for SequenceNumber {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
