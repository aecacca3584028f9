//! ARP (RFC 826) decode/encode, narrowed to the Ethernet/IPv4 case this
//! implementation supports (`htype=1`, `ptype=0x0800`, `hlen=6`, `plen=4`).

use simple_network::{Ip4Address, MacAddress};

use crate::error::CodecError;

/// Total wire length of a `hlen=6, plen=4` ARP packet: 8-byte header plus
/// 2*(hlen+plen) address bytes.
pub const ARP_PACKET_LEN: usize = 28;
/// spec §4.3: the codec pads ARP replies to at least 46 payload bytes
/// regardless of the driver's own padding policy.
pub const ARP_MIN_PAYLOAD_LEN: usize = 46;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;
const HLEN_ETHERNET: u8 = 6;
const PLEN_IPV4: u8 = 4;

/// `oper` field: 1 = request, 2 = reply, anything else decodes but this
/// implementation never replies to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArpOperation {
    Request,
    Reply,
    Other(u16),
}

impl ArpOperation {
    const fn from_u16(v: u16) -> Self {
        match v {
            1 => Self::Request,
            2 => Self::Reply,
            other => Self::Other(other),
        }
    }

    const fn as_u16(self) -> u16 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
            Self::Other(v) => v,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArpFrame {
    pub htype: u16,
    pub ptype: u16,
    pub hlen: u8,
    pub plen: u8,
    pub oper: ArpOperation,
    pub sha: MacAddress,
    pub spa: Ip4Address,
    pub tha: MacAddress,
    pub tpa: Ip4Address,
}

impl ArpFrame {
    /// Decodes an ARP packet from `buf`. Only the `hlen=6, plen=4` layout is
    /// structurally representable by this type; anything else is rejected
    /// as `Unsupported` rather than guessed at (see DESIGN.md).
    pub fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < 8 {
            return Err(CodecError::MalformedFrame);
        }

        let htype = u16::from_be_bytes([buf[0], buf[1]]);
        let ptype = u16::from_be_bytes([buf[2], buf[3]]);
        let hlen = buf[4];
        let plen = buf[5];
        let oper = ArpOperation::from_u16(u16::from_be_bytes([buf[6], buf[7]]));

        if hlen != HLEN_ETHERNET || plen != PLEN_IPV4 {
            return Err(CodecError::Unsupported);
        }
        if buf.len() < ARP_PACKET_LEN {
            return Err(CodecError::MalformedFrame);
        }

        let sha = MacAddress::from([buf[8], buf[9], buf[10], buf[11], buf[12], buf[13]]);
        let spa = Ip4Address::from([buf[14], buf[15], buf[16], buf[17]]);
        let tha = MacAddress::from([buf[18], buf[19], buf[20], buf[21], buf[22], buf[23]]);
        let tpa = Ip4Address::from([buf[24], buf[25], buf[26], buf[27]]);

        Ok(Self { htype, ptype, hlen, plen, oper, sha, spa, tha, tpa })
    }

    /// Whether this is a well-formed Ethernet/IPv4 ARP request/reply this
    /// implementation is prepared to interpret (spec §3 invariant).
    pub fn is_standard(&self) -> bool {
        self.htype == HTYPE_ETHERNET && self.ptype == PTYPE_IPV4 && self.hlen == HLEN_ETHERNET && self.plen == PLEN_IPV4
    }

    /// Builds the reply to a request per spec §4.3: sender/target swap,
    /// `oper=2`, our MAC/IP substituted as sender.
    pub fn reply_for(&self, local_mac: MacAddress, local_ip: Ip4Address) -> Self {
        Self {
            htype: self.htype,
            ptype: self.ptype,
            hlen: self.hlen,
            plen: self.plen,
            oper: ArpOperation::Reply,
            sha: local_mac,
            spa: local_ip,
            tha: self.sha,
            tpa: self.spa,
        }
    }

    /// Encodes the header and addresses (28 bytes), then pads with zeros
    /// up to `ARP_MIN_PAYLOAD_LEN` so the Ethernet payload meets the
    /// minimum frame size regardless of downstream padding policy.
    pub fn encode(&self) -> heapless::Vec<u8, ARP_MIN_PAYLOAD_LEN> {
        let mut out: heapless::Vec<u8, ARP_MIN_PAYLOAD_LEN> = heapless::Vec::new();
        let _ = out.extend_from_slice(&self.htype.to_be_bytes());
        let _ = out.extend_from_slice(&self.ptype.to_be_bytes());
        let _ = out.push(self.hlen);
        let _ = out.push(self.plen);
        let _ = out.extend_from_slice(&self.oper.as_u16().to_be_bytes());
        let _ = out.extend_from_slice(self.sha.as_ref());
        let _ = out.extend_from_slice(self.spa.as_ref());
        let _ = out.extend_from_slice(self.tha.as_ref());
        let _ = out.extend_from_slice(self.tpa.as_ref());
        while out.len() < ARP_MIN_PAYLOAD_LEN {
            let _ = out.push(0);
        }
        out
    }
}
