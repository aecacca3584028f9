#![no_std]
//! Endpoint loop (spec.md §4.4): poll the driver for a packet, hand it to
//! `net-frame` for parsing, answer ARP-who-has and ICMP echo for the
//! configured IPv4 address, and observe everything else.
//!
//! `handle_frame` is the pure dispatch core — no hardware access — kept
//! separate from `Endpoint::poll` so the reply logic is unit-testable
//! without a driver or a mocked SPI bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use enc28j60::{DriverError, Enc28j60};
use net_frame::arp::ArpOperation;
use net_frame::ethernet::{EthernetFrame, EthernetPayload};
use net_frame::icmp::ECHO_REQUEST_TYPE;
use net_frame::ip::{IpFrame, IpPayload, PROTOCOL_ICMP};
use net_frame::{EtherType, Ip4Address, MacAddress};

macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        { defmt::info!($($arg)*); }
    }};
}

macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        { defmt::warn!($($arg)*); }
    }};
}

macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        { defmt::error!($($arg)*); }
    }};
}

/// Largest frame this loop will decode/encode, header included.
pub const MAX_FRAME: usize = net_frame::MAX_FRAME;

/// Host-facing configuration (spec.md §6): local MAC/IP and an optional
/// source-MAC filter applied before dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EndpointConfig {
    pub local_mac: MacAddress,
    pub local_ip: Ip4Address,
    pub source_filter: Option<MacAddress>,
}

/// Error surfaced by `Endpoint` methods. Codec errors never appear here —
/// per spec §7 a malformed/unsupported frame is logged and dropped inside
/// `poll`, never propagated.
#[derive(Debug)]
pub enum EndpointError<E> {
    Driver(DriverError<E>),
}

impl<E> From<DriverError<E>> for EndpointError<E> {
    fn from(err: DriverError<E>) -> Self {
        EndpointError::Driver(err)
    }
}

pub struct Endpoint<SPI, INT, RST, DELAY>
where
    SPI: SpiDevice,
    INT: InputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    driver: Enc28j60<SPI, INT, RST, DELAY>,
    config: EndpointConfig,
    link_was_up: bool,
}

impl<SPI, INT, RST, DELAY> Endpoint<SPI, INT, RST, DELAY>
where
    SPI: SpiDevice,
    INT: InputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(driver: Enc28j60<SPI, INT, RST, DELAY>, config: EndpointConfig) -> Self {
        Endpoint { driver, config, link_was_up: false }
    }

    /// Brings the controller up and logs its chip revision (spec.md §4.4
    /// steps 1-2). Call once before the first `poll`/`run_forever`.
    pub fn init(&mut self) -> Result<(), EndpointError<SPI::Error>> {
        self.driver.initialize()?;
        let revision = self.driver.chip_revision()?;
        log_info!("enc28j60: initialized, chip revision {}", revision);
        Ok(())
    }

    /// One poll/dispatch/reply iteration. Returns `true` if a frame was
    /// received and handled (decoded and, for dispatched frames, replied
    /// to), `false` if the link was down or nothing usable arrived.
    pub fn poll(&mut self, buf: &mut [u8]) -> Result<bool, EndpointError<SPI::Error>> {
        let link_up = self.driver.is_link_up()?;
        if link_up != self.link_was_up {
            log_info!("enc28j60: link {}", link_up);
            self.link_was_up = link_up;
        }
        if !link_up {
            return Ok(false);
        }

        let n = self.driver.receive(buf)?;
        if n < 14 {
            return Ok(false);
        }

        let frame = match EthernetFrame::decode(&buf[..n]) {
            Ok(frame) => frame,
            Err(_) => {
                log_warn!("enc28j60: dropped malformed frame");
                return Ok(false);
            }
        };

        if let Some(filter) = self.config.source_filter
            && frame.src_mac != filter
        {
            return Ok(false);
        }

        match handle_frame(&self.config, &frame) {
            Some(reply) => {
                let Ok(encoded) = reply.encode() else {
                    log_warn!("enc28j60: failed to encode reply");
                    return Ok(true);
                };
                self.driver.transmit(&encoded)?;
                Ok(true)
            }
            None => Ok(true),
        }
    }

    /// The spec's infinite loop: poll forever, backing off one second when
    /// the link is down (spec.md §4.4 step 3). `sleep_one_second` is
    /// injected rather than hardcoded to a timer, keeping this host-agnostic
    /// and unit-testable.
    pub fn run_forever(&mut self, buf: &mut [u8], mut sleep_one_second: impl FnMut()) -> ! {
        loop {
            match self.poll(buf) {
                Ok(_) => {}
                Err(EndpointError::Driver(DriverError::Bus(_))) => {
                    log_error!("enc28j60: bus error, re-initializing");
                    let _ = self.init();
                }
                Err(EndpointError::Driver(DriverError::Timeout)) => {
                    log_warn!("enc28j60: status poll timed out");
                }
            }
            if !self.link_was_up {
                sleep_one_second();
            }
        }
    }
}

/// Pure dispatch logic (spec.md §4.4 step 4): given a decoded Ethernet
/// frame and the endpoint's configuration, builds the Ethernet-framed
/// reply, if any. ARP-who-has for the local IP gets an ARP reply; ICMP
/// echo request addressed to the local IP gets an echo reply; everything
/// else is observed only.
pub fn handle_frame(config: &EndpointConfig, frame: &EthernetFrame) -> Option<EthernetFrame> {
    match &frame.payload {
        EthernetPayload::Arp(arp) => {
            if arp.oper == ArpOperation::Request && arp.tpa == config.local_ip {
                let reply_arp = arp.reply_for(config.local_mac, config.local_ip);
                Some(EthernetFrame {
                    dst_mac: frame.src_mac,
                    src_mac: config.local_mac,
                    ethertype: EtherType::ARP.as_u16(),
                    payload: EthernetPayload::Arp(reply_arp),
                })
            } else {
                None
            }
        }
        EthernetPayload::Ipv4(ip) => handle_ipv4(config, frame, ip),
        EthernetPayload::Raw(_) => None,
    }
}

fn handle_ipv4(config: &EndpointConfig, frame: &EthernetFrame, ip: &IpFrame) -> Option<EthernetFrame> {
    if ip.dst != config.local_ip || ip.protocol != PROTOCOL_ICMP {
        return None;
    }
    let IpPayload::Icmp(icmp) = &ip.payload else { return None };
    if !icmp.is_echo_request() {
        return None;
    }

    let icmp_reply = icmp.echo_reply();
    let ip_reply = IpFrame {
        version: 4,
        ihl: 5,
        tos: 0,
        total_length: 0,
        id: ip.id,
        flags: 0,
        fragment_offset: 0,
        ttl: 64,
        protocol: PROTOCOL_ICMP,
        header_checksum: 0,
        src: ip.dst,
        dst: ip.src,
        options: heapless::Vec::new(),
        payload: IpPayload::Icmp(icmp_reply),
    };

    Some(EthernetFrame {
        dst_mac: frame.src_mac,
        src_mac: config.local_mac,
        ethertype: EtherType::IPV4.as_u16(),
        payload: EthernetPayload::Ipv4(ip_reply),
    })
}
