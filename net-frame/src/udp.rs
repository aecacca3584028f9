//! UDP datagram decode. Encode is not required for this core's use cases
//! (spec §4.3 — no UDP replies are synthesized by the endpoint loop).

use crate::error::CodecError;
use crate::MAX_PAYLOAD;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UdpDatagram {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16,
    pub checksum: u16,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

impl UdpDatagram {
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < 8 {
            return Err(CodecError::MalformedFrame);
        }
        let mut payload = heapless::Vec::new();
        payload
            .extend_from_slice(&buf[8..])
            .map_err(|()| CodecError::MalformedFrame)?;

        Ok(Self {
            src_port: u16::from_be_bytes([buf[0], buf[1]]),
            dst_port: u16::from_be_bytes([buf[2], buf[3]]),
            length: u16::from_be_bytes([buf[4], buf[5]]),
            checksum: u16::from_be_bytes([buf[6], buf[7]]),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_header_and_payload() {
        let buf = [0x00, 0x35, 0x13, 0x88, 0x00, 0x0a, 0x12, 0x34, 0xde, 0xad];
        let udp = UdpDatagram::decode(&buf).unwrap();
        assert_eq!(udp.src_port, 53);
        assert_eq!(udp.dst_port, 5000);
        assert_eq!(udp.length, 10);
        assert_eq!(udp.checksum, 0x1234);
        assert_eq!(&udp.payload[..], &[0xde, 0xad]);
    }

    #[test]
    fn short_buffer_is_malformed() {
        assert_eq!(UdpDatagram::decode(&[0; 3]), Err(CodecError::MalformedFrame));
    }
}
