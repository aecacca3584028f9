//! Ethernet II framing: 14-byte header (dst/src MAC + EtherType) dispatching
//! on EtherType to an IPv4 or ARP parse, or a raw payload otherwise.

use simple_network::{EtherType, MacAddress};

use crate::arp::ArpFrame;
use crate::error::CodecError;
use crate::ip::IpFrame;
use crate::MAX_PAYLOAD;

const HEADER_LEN: usize = 14;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EthernetPayload {
    Ipv4(IpFrame),
    Arp(ArpFrame),
    Raw(heapless::Vec<u8, MAX_PAYLOAD>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EthernetFrame {
    pub dst_mac: MacAddress,
    pub src_mac: MacAddress,
    pub ethertype: u16,
    pub payload: EthernetPayload,
}

impl EthernetFrame {
    /// Decodes `dst[0..6], src[6..12], ethertype[12..14]`, then dispatches
    /// the remainder on `ethertype`. A frame shorter than 14 bytes is
    /// rejected outright; a malformed inner IPv4/ARP payload propagates its
    /// own error rather than silently falling back to `Raw`.
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < HEADER_LEN {
            return Err(CodecError::MalformedFrame);
        }

        let dst_mac = MacAddress::from([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5]]);
        let src_mac = MacAddress::from([buf[6], buf[7], buf[8], buf[9], buf[10], buf[11]]);
        let ethertype = u16::from_be_bytes([buf[12], buf[13]]);
        let rest = &buf[HEADER_LEN..];

        let payload = match ethertype {
            et if et == EtherType::IPV4.as_u16() => EthernetPayload::Ipv4(IpFrame::decode(rest)?),
            et if et == EtherType::ARP.as_u16() => EthernetPayload::Arp(ArpFrame::decode(rest)?),
            _ => {
                let mut raw = heapless::Vec::new();
                raw.extend_from_slice(rest).map_err(|()| CodecError::MalformedFrame)?;
                EthernetPayload::Raw(raw)
            }
        };

        Ok(Self { dst_mac, src_mac, ethertype, payload })
    }

    /// Encodes the 14-byte header followed by the serialized payload. No
    /// FCS is appended — the controller's MAC appends it (spec §4.3).
    pub fn encode(&self) -> Result<heapless::Vec<u8, { MAX_PAYLOAD + 14 + 8 + 20 + 40 }>, CodecError> {
        let mut out: heapless::Vec<u8, { MAX_PAYLOAD + 14 + 8 + 20 + 40 }> = heapless::Vec::new();
        out.extend_from_slice(self.dst_mac.as_ref()).map_err(|()| CodecError::MalformedFrame)?;
        out.extend_from_slice(self.src_mac.as_ref()).map_err(|()| CodecError::MalformedFrame)?;
        out.extend_from_slice(&self.ethertype.to_be_bytes()).map_err(|()| CodecError::MalformedFrame)?;

        match &self.payload {
            EthernetPayload::Ipv4(ip) => {
                out.extend_from_slice(&ip.encode()?).map_err(|()| CodecError::MalformedFrame)?;
            }
            EthernetPayload::Arp(arp) => {
                out.extend_from_slice(&arp.encode()).map_err(|()| CodecError::MalformedFrame)?;
            }
            EthernetPayload::Raw(bytes) => {
                out.extend_from_slice(bytes).map_err(|()| CodecError::MalformedFrame)?;
            }
        }

        Ok(out)
    }
}
