use bytes::{Buf, Bytes};
use webrtc::{
    rtp::{header::Header, packet::Packet},
    util::Unmarshal,
};

/// Parse a marshalled RTP packet, dropping any trailing padding from the payload.
pub(crate) fn parse_packet(mut buffer: &[u8]) -> Option<Packet> {
    let header = unmarshal_header(&mut buffer)?;
    Some(Packet {
        header,
        payload: Bytes::copy_from_slice(buffer),
    })
}

fn unmarshal_header(buffer: &mut &[u8]) -> Option<Header> {
    let header = Header::unmarshal(buffer).ok()?;
    if header.padding {
        let payload_len = buffer.remaining();
        if payload_len > 0 {
            let padding_len = buffer[payload_len - 1] as usize;
            if padding_len <= payload_len {
                *buffer = &buffer[..payload_len - padding_len];
                Some(header)
            } else {
                None
            }
        } else {
            None
        }
    } else {
        Some(header)
    }
}
