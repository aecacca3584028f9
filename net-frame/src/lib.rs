#![no_std]
//! Ethernet II / ARP / IPv4 / ICMP / UDP frame codec.
//!
//! Decoders borrow the input slice and never retain a reference to it;
//! encoders return freshly allocated, fixed-capacity byte sequences. No
//! checksum verification happens on ingress by default; encoders always
//! recompute.

pub mod arp;
pub mod checksum;
pub mod error;
pub mod ethernet;
pub mod icmp;
pub mod ip;
pub mod udp;

pub use arp::{ArpFrame, ArpOperation};
pub use error::CodecError;
pub use ethernet::{EthernetFrame, EthernetPayload};
pub use icmp::IcmpDatagram;
pub use ip::{IpFrame, IpPayload};
pub use simple_network::{EtherType, Ip4Address, MacAddress};
pub use udp::UdpDatagram;

/// Largest payload this crate will copy out of a received buffer (bounds
/// the `heapless::Vec` capacities used throughout for owned, no-alloc
/// storage — spec.md's "no frame aliases controller memory" invariant).
pub const MAX_PAYLOAD: usize = 1500;
/// Largest IPv4 options block: `(15 - 5) * 4` bytes for `ihl` up to 15.
pub const MAX_IP_OPTIONS: usize = 40;
/// Largest Ethernet frame this crate will encode, header included.
pub const MAX_FRAME: usize = 1518;
