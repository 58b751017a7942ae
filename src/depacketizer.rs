use bytes::Bytes;
use std::{convert::Infallible, fmt::Debug};

/// Transforms the payload of a single RTP packet into codec specific sample bytes.
///
/// Payloads are passed in sequence order within a group. A failure only affects the packet
/// that caused it: the [SampleBuilder](crate::SampleBuilder) leaves its bytes out of the
/// sample and keeps the rest of the group.
pub trait Depacketizer {
    type Error: Debug;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Bytes, Self::Error>;
}

/// Returns payloads unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl Depacketizer for PassThrough {
    type Error = Infallible;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Bytes, Self::Error> {
        Ok(payload.clone())
    }
}

/// Adapter for the codec depacketizers shipped with `webrtc::rtp::codecs`.
#[derive(Debug, Default, Clone)]
pub struct RtpDepacketizer<T>(pub T);

impl<T> Depacketizer for RtpDepacketizer<T>
where
    T: webrtc::rtp::packetizer::Depacketizer,
{
    type Error = webrtc::rtp::Error;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Bytes, Self::Error> {
        self.0.depacketize(payload)
    }
}

impl<D: Depacketizer + ?Sized> Depacketizer for Box<D> {
    type Error = D::Error;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Bytes, Self::Error> {
        (**self).depacketize(payload)
    }
}
