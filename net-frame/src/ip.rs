//! IPv4 header decode/encode (spec §4.3). Fragmentation is not reassembled
//! (non-goal); options are preserved opaquely, never interpreted.

use simple_network::Ip4Address;

use crate::checksum::internet_checksum;
use crate::error::CodecError;
use crate::icmp::IcmpDatagram;
use crate::udp::UdpDatagram;
use crate::{MAX_IP_OPTIONS, MAX_PAYLOAD};

pub const PROTOCOL_ICMP: u8 = 1;
pub const PROTOCOL_UDP: u8 = 17;
const MIN_HEADER_LEN: usize = 20;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpPayload {
    Icmp(IcmpDatagram),
    Udp(UdpDatagram),
    Raw(heapless::Vec<u8, MAX_PAYLOAD>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpFrame {
    pub version: u8,
    pub ihl: u8,
    pub tos: u8,
    pub total_length: u16,
    pub id: u16,
    pub flags: u8,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub header_checksum: u16,
    pub src: Ip4Address,
    pub dst: Ip4Address,
    pub options: heapless::Vec<u8, MAX_IP_OPTIONS>,
    pub payload: IpPayload,
}

impl IpFrame {
    /// Decodes the 20-byte fixed header, then `(ihl-5)*4` bytes of opaque
    /// options, then `total_length - ihl*4` bytes of payload. Rejects a
    /// frame whose `total_length` exceeds the buffer.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < MIN_HEADER_LEN {
            return Err(CodecError::MalformedFrame);
        }

        let version = buf[0] >> 4;
        let ihl = buf[0] & 0x0F;
        if ihl < 5 {
            return Err(CodecError::MalformedFrame);
        }
        let tos = buf[1];
        let total_length = u16::from_be_bytes([buf[2], buf[3]]);
        let id = u16::from_be_bytes([buf[4], buf[5]]);
        let flags = (buf[6] >> 5) & 0x07;
        let fragment_offset = (u16::from(buf[6] & 0x1F) << 8) | u16::from(buf[7]);
        let ttl = buf[8];
        let protocol = buf[9];
        let header_checksum = u16::from_be_bytes([buf[10], buf[11]]);
        let src = Ip4Address::from([buf[12], buf[13], buf[14], buf[15]]);
        let dst = Ip4Address::from([buf[16], buf[17], buf[18], buf[19]]);

        let header_len = usize::from(ihl) * 4;
        if buf.len() < header_len || usize::from(total_length) > buf.len() || usize::from(total_length) < header_len {
            return Err(CodecError::MalformedFrame);
        }

        let mut options: heapless::Vec<u8, MAX_IP_OPTIONS> = heapless::Vec::new();
        options
            .extend_from_slice(&buf[MIN_HEADER_LEN..header_len])
            .map_err(|()| CodecError::MalformedFrame)?;

        let payload_bytes = &buf[header_len..usize::from(total_length)];
        let payload = match protocol {
            PROTOCOL_ICMP => IpPayload::Icmp(IcmpDatagram::decode(payload_bytes)?),
            PROTOCOL_UDP => IpPayload::Udp(UdpDatagram::decode(payload_bytes)?),
            _ => {
                let mut raw = heapless::Vec::new();
                raw.extend_from_slice(payload_bytes).map_err(|()| CodecError::MalformedFrame)?;
                IpPayload::Raw(raw)
            }
        };

        Ok(Self {
            version,
            ihl,
            tos,
            total_length,
            id,
            flags,
            fragment_offset,
            ttl,
            protocol,
            header_checksum,
            src,
            dst,
            options,
            payload,
        })
    }

    /// Whether the header checksum, as transmitted, verifies. Ingress does
    /// not require this (spec §7 default is to accept); callers may opt in.
    pub fn header_checksum_verifies(&self, buf: &[u8]) -> bool {
        let header_len = usize::from(self.ihl) * 4;
        header_len <= buf.len() && crate::checksum::verifies(&buf[..header_len])
    }

    fn payload_bytes(&self) -> Result<heapless::Vec<u8, { MAX_PAYLOAD + 8 }>, CodecError> {
        let mut out: heapless::Vec<u8, { MAX_PAYLOAD + 8 }> = heapless::Vec::new();
        match &self.payload {
            IpPayload::Icmp(d) => {
                out.extend_from_slice(&d.encode()).map_err(|()| CodecError::MalformedFrame)?;
            }
            IpPayload::Raw(bytes) => {
                out.extend_from_slice(bytes).map_err(|()| CodecError::MalformedFrame)?;
            }
            // UDP encode is out of scope for this core (decode-only, spec §4.3).
            IpPayload::Udp(_) => return Err(CodecError::Unsupported),
        }
        Ok(out)
    }

    /// Encodes the header (options included) followed by the payload.
    /// `version` is forced to 4, `ihl` to 5 unless options are present, and
    /// the header checksum is recomputed with the checksum field zeroed
    /// during the computation (spec §4.3).
    pub fn encode(&self) -> Result<heapless::Vec<u8, { MAX_PAYLOAD + 8 + 20 + MAX_IP_OPTIONS }>, CodecError> {
        let payload = self.payload_bytes()?;
        let ihl = if self.options.is_empty() { 5u8 } else { 5 + (self.options.len() as u8) / 4 };
        let header_len = usize::from(ihl) * 4;
        let total_length = (header_len + payload.len()) as u16;

        let mut header = [0u8; MIN_HEADER_LEN];
        header[0] = (4 << 4) | ihl;
        header[1] = self.tos;
        header[2..4].copy_from_slice(&total_length.to_be_bytes());
        header[4..6].copy_from_slice(&self.id.to_be_bytes());
        let flags_frag = (u16::from(self.flags) << 13) | (self.fragment_offset & 0x1FFF);
        header[6..8].copy_from_slice(&flags_frag.to_be_bytes());
        header[8] = self.ttl;
        header[9] = self.protocol;
        // header_checksum (bytes 10..12) left zero for the computation below.
        header[12..16].copy_from_slice(&self.src.octets());
        header[16..20].copy_from_slice(&self.dst.octets());

        let mut header_and_options: heapless::Vec<u8, { 20 + MAX_IP_OPTIONS }> = heapless::Vec::new();
        header_and_options.extend_from_slice(&header).map_err(|()| CodecError::MalformedFrame)?;
        header_and_options.extend_from_slice(&self.options).map_err(|()| CodecError::MalformedFrame)?;

        let checksum = internet_checksum(&header_and_options);
        header_and_options[10] = (checksum >> 8) as u8;
        header_and_options[11] = (checksum & 0xFF) as u8;

        let mut out: heapless::Vec<u8, { MAX_PAYLOAD + 8 + 20 + MAX_IP_OPTIONS }> = heapless::Vec::new();
        out.extend_from_slice(&header_and_options).map_err(|()| CodecError::MalformedFrame)?;
        out.extend_from_slice(&payload).map_err(|()| CodecError::MalformedFrame)?;
        Ok(out)
    }
}
