//! ICMP echo request/reply (type 8 / type 0) decode, reply construction, and
//! encode. Other ICMP types decode but this crate does not build replies for
//! them.

use crate::checksum::internet_checksum;
use crate::error::CodecError;
use crate::MAX_PAYLOAD;

pub const ECHO_REPLY_TYPE: u8 = 0;
pub const ECHO_REQUEST_TYPE: u8 = 8;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IcmpDatagram {
    pub type_: u8,
    pub code: u8,
    pub checksum: u16,
    pub id: u16,
    pub sequence_number: u16,
    pub payload: heapless::Vec<u8, MAX_PAYLOAD>,
}

impl IcmpDatagram {
    /// Decodes an 8-byte ICMP header followed by its payload. No checksum
    /// verification is performed on ingress (spec §7 default).
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < 8 {
            return Err(CodecError::MalformedFrame);
        }
        let mut payload = heapless::Vec::new();
        payload
            .extend_from_slice(&buf[8..])
            .map_err(|()| CodecError::MalformedFrame)?;

        Ok(Self {
            type_: buf[0],
            code: buf[1],
            checksum: u16::from_be_bytes([buf[2], buf[3]]),
            id: u16::from_be_bytes([buf[4], buf[5]]),
            sequence_number: u16::from_be_bytes([buf[6], buf[7]]),
            payload,
        })
    }

    pub fn is_echo_request(&self) -> bool {
        self.type_ == ECHO_REQUEST_TYPE && self.code == 0
    }

    /// Builds the echo reply for an echo request: identical id/sequence/
    /// payload, `type=0`, `code=0`, checksum recomputed over the whole
    /// datagram with the checksum field zeroed during the computation.
    pub fn echo_reply(&self) -> Self {
        let mut reply = Self {
            type_: ECHO_REPLY_TYPE,
            code: 0,
            checksum: 0,
            id: self.id,
            sequence_number: self.sequence_number,
            payload: self.payload.clone(),
        };
        reply.checksum = reply.compute_checksum();
        reply
    }

    fn header_bytes(&self, checksum: u16) -> [u8; 8] {
        let mut header = [0u8; 8];
        header[0] = self.type_;
        header[1] = self.code;
        header[2..4].copy_from_slice(&checksum.to_be_bytes());
        header[4..6].copy_from_slice(&self.id.to_be_bytes());
        header[6..8].copy_from_slice(&self.sequence_number.to_be_bytes());
        header
    }

    /// One's-complement sum of the whole datagram (header + payload) with
    /// the checksum field zeroed, per spec §4.3.
    fn compute_checksum(&self) -> u16 {
        // internet_checksum operates on a contiguous buffer; assemble one.
        let mut buf: heapless::Vec<u8, { MAX_PAYLOAD + 8 }> = heapless::Vec::new();
        let _ = buf.extend_from_slice(&self.header_bytes(0));
        let _ = buf.extend_from_slice(&self.payload);
        internet_checksum(&buf)
    }

    pub fn encode(&self) -> heapless::Vec<u8, { MAX_PAYLOAD + 8 }> {
        let mut out: heapless::Vec<u8, { MAX_PAYLOAD + 8 }> = heapless::Vec::new();
        let _ = out.extend_from_slice(&self.header_bytes(self.checksum));
        let _ = out.extend_from_slice(&self.payload);
        out
    }

    /// Verifies the one's-complement sum over the encoded datagram equals
    /// `0xFFFF` (spec §8 property 3's self-checking form).
    pub fn checksum_verifies(&self) -> bool {
        crate::checksum::verifies(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> IcmpDatagram {
        let mut payload = heapless::Vec::new();
        payload.extend_from_slice(b"Hi").unwrap();
        IcmpDatagram {
            type_: ECHO_REQUEST_TYPE,
            code: 0,
            checksum: 0,
            id: 1,
            sequence_number: 7,
            payload,
        }
    }

    #[test]
    fn s2_echo_reply_matches_request() {
        let req = request();
        let reply = req.echo_reply();
        assert_eq!(reply.type_, ECHO_REPLY_TYPE);
        assert_eq!(reply.code, 0);
        assert_eq!(reply.id, req.id);
        assert_eq!(reply.sequence_number, req.sequence_number);
        assert_eq!(reply.payload, req.payload);
        assert!(reply.checksum_verifies());
    }

    #[test]
    fn decode_then_echo_reply_round_trips() {
        let req = request();
        let encoded = req.encode();
        let decoded = IcmpDatagram::decode(&encoded).unwrap();
        assert_eq!(decoded.id, req.id);
        assert_eq!(decoded.sequence_number, req.sequence_number);
        assert_eq!(decoded.payload, req.payload);
        assert!(decoded.is_echo_request());
    }

    #[test]
    fn short_buffer_is_malformed() {
        assert_eq!(IcmpDatagram::decode(&[0; 4]), Err(CodecError::MalformedFrame));
    }
}
