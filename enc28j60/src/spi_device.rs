//! ENC28J60 register/buffer driver (spec.md §4.2): banked control-register
//! access, indirect MII/PHY access, the on-chip SRAM ring, and framed TX/RX
//! against a single caller-supplied `SpiDevice`.
//!
//! `current_bank`, `rx_read_ptr`, `link_up_cached` and the station MAC
//! address form this driver's `DriverState`: private fields on `Enc28j60`,
//! mutated only by its own methods. Nothing here is process-wide.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::error::DriverError;

use super::register::*;

/// RX ring bounds. `RXSTART_INIT` must be 0 — silicon errata #5.
const RXSTART_INIT: u16 = 0x0000;
const RXEND_INIT: u16 = 0x0BFF;
/// TX window: a single in-flight packet.
const TXSTART_INIT: u16 = 0x0C00;
const TXEND_INIT: u16 = 0x11FF;

const MAX_FRAME_LENGTH: u16 = 1500;

/// MACON1: MARXEN | TXPAUS | RXPAUS.
const MACON1_MASK: u8 = 0b0000_1101;
/// MACON3: PADCFG0 | TXCRCEN | FULDPX | FRMLNEN.
const MACON3_MASK: u8 = 0b0011_0011;
const MABBIPG_FULL_DUPLEX: u8 = 0x15;
const MAIPGL_FULL_DUPLEX: u8 = 0x12;

const ESTAT_CLKRDY: u8 = 0b0000_0001;
const ESTAT_TXABRT: u8 = 0b0000_0010;

const ECON1_BSEL_MASK: u8 = 0b0000_0011;
const ECON1_RXEN: u8 = 0b0000_0100;
const ECON1_TXRTS: u8 = 0b0000_1000;
const ECON1_TXRST: u8 = 0b1000_0000;

const ECON2_AUTOINC: u8 = 0b1000_0000;
const ECON2_PKTDEC: u8 = 0b0100_0000;

const EIE_INTIE_PKTIE: u8 = 0b1100_0000;
/// EIR.TXERIF: datasheet bit 2.
const EIR_TXERIF: u8 = 0b0000_0100;

const MICMD_MIIRD: u8 = 0b0000_0001;
const MISTAT_BUSY: u8 = 0b0000_0001;

const PHSTAT2_LSTAT: u16 = 0x0400;

const PHY_POLL_INTERVAL_US: u32 = 10;
const PHY_TIMEOUT_US: u32 = 10_000;
const RESET_TIMEOUT_US: u32 = 100_000;
const TX_IDLE_TIMEOUT_US: u32 = 100_000;

/// Bank of the ENC28J60's address space currently selected in hardware, or
/// `None` if unknown (spec.md's `current_bank = -1`). Forces a bank-select
/// sequence on the very first register access.
pub struct Enc28j60<SPI: SpiDevice, INT: InputPin, RST: OutputPin, DELAY: DelayNs> {
    spi: SPI,
    #[allow(dead_code)]
    int: INT,
    reset_pin: RST,
    delay: DELAY,
    current_bank: Option<Bank>,
    rx_read_ptr: u16,
    link_up_cached: Option<bool>,
    mac_address: [u8; 6],
}

impl<SPI, INT, RST, DELAY> Enc28j60<SPI, INT, RST, DELAY>
where
    SPI: SpiDevice,
    INT: InputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, int: INT, reset_pin: RST, delay: DELAY, mac_address: [u8; 6]) -> Self {
        Enc28j60 {
            spi,
            int,
            reset_pin,
            delay,
            current_bank: None,
            rx_read_ptr: RXSTART_INIT,
            link_up_cached: None,
            mac_address,
        }
    }

    /// Brings the controller up per spec.md §4.2's initialization sequence.
    /// Must be called exactly once, before `receive`/`transmit`.
    pub fn initialize(&mut self) -> Result<(), DriverError<SPI::Error>> {
        self.reset_via_spi()?;
        self.wait_clkrdy()?;

        self.ensure_autoinc()?;

        // 2. RX ring.
        self.write_u16(ERXSTL, ERXSTH, RXSTART_INIT)?;
        self.write_u16(ERXRDPTL, ERXRDPTH, RXSTART_INIT)?;
        self.write_u16(ERXNDL, ERXNDH, RXEND_INIT)?;
        self.rx_read_ptr = RXSTART_INIT;

        // 3. TX window.
        self.write_u16(ETXSTL, ETXSTH, TXSTART_INIT)?;
        self.write_u16(ETXNDL, ETXNDH, TXEND_INIT)?;

        // 4. MAC config.
        self.write_control(MACON1, MACON1_MASK)?;
        self.write_control(MACON2, 0)?;
        self.write_control(MACON3, MACON3_MASK)?;

        // 5. Max frame length.
        self.write_u16(MAMXFLL, MAMXFLH, MAX_FRAME_LENGTH)?;

        // 6. Inter-frame gaps.
        self.write_control(MABBIPG, MABBIPG_FULL_DUPLEX)?;
        self.write_control(MAIPGL, MAIPGL_FULL_DUPLEX)?;

        // 7. Station MAC address into MAADR1..MAADR6 (physically reversed
        // in the register map: MAADR5 sits at bank-3 address 0x00).
        let mac = self.mac_address;
        self.write_control(MAADR1, mac[0])?;
        self.write_control(MAADR2, mac[1])?;
        self.write_control(MAADR3, mac[2])?;
        self.write_control(MAADR4, mac[3])?;
        self.write_control(MAADR5, mac[4])?;
        self.write_control(MAADR6, mac[5])?;

        self.write_control(ERXFCON, 0)?;

        // 8. Switch to bank 0, enable packet interrupts (unused — we poll),
        // enable reception.
        self.write_control(EIE, EIE_INTIE_PKTIE)?;
        self.write_control(ECON1, ECON1_RXEN)?;

        Ok(())
    }

    /// Issues a hardware reset via the RST pin.
    pub fn reset(&mut self) -> Result<(), RST::Error> {
        self.reset_pin.set_low()?;
        self.delay.delay_ns(400);
        self.reset_pin.set_high()?;
        self.delay.delay_us(50);
        Ok(())
    }

    /// Issues a System Soft Reset (SRC) via SPI. A single 0xFF byte; does
    /// not touch any register address.
    pub fn reset_via_spi(&mut self) -> Result<(), DriverError<SPI::Error>> {
        self.spi.write(&[0xFF])?;
        Ok(())
    }

    /// Chip silicon revision (`EREVID`). Logged by the endpoint loop at
    /// startup (spec.md §4.4 step 2).
    pub fn chip_revision(&mut self) -> Result<u8, DriverError<SPI::Error>> {
        self.read_control(EREVID)
    }

    /// Reads `PHSTAT2` and returns whether the link partner reports up.
    /// Caches the result so callers can detect transitions without
    /// re-reading PHY state themselves.
    pub fn is_link_up(&mut self) -> Result<bool, DriverError<SPI::Error>> {
        let value = self.read_phy(PHSTAT2)?;
        let up = (value & PHSTAT2_LSTAT) != 0;
        self.link_up_cached = Some(up);
        Ok(up)
    }

    /// Last value observed by `is_link_up`, if any has been taken yet.
    pub fn cached_link_state(&self) -> Option<bool> {
        self.link_up_cached
    }

    fn ensure_autoinc(&mut self) -> Result<(), DriverError<SPI::Error>> {
        let cmd = [ECON2.opcode(Op::BFS), ECON2_AUTOINC];
        self.spi.write(&cmd)?;
        Ok(())
    }

    fn mem_read(&mut self, data: &mut [u8]) -> Result<(), DriverError<SPI::Error>> {
        const RBM_OPCODE: u8 = 0x3A;
        let mut ops = [
            embedded_hal::spi::Operation::Write(&[RBM_OPCODE]),
            embedded_hal::spi::Operation::Read(data),
        ];
        self.spi.transaction(&mut ops)?;
        Ok(())
    }

    fn mem_write(&mut self, data: &[u8]) -> Result<(), DriverError<SPI::Error>> {
        const WBM_OPCODE: u8 = 0x7A;
        let mut ops = [
            embedded_hal::spi::Operation::Write(&[WBM_OPCODE]),
            embedded_hal::spi::Operation::Write(data),
        ];
        self.spi.transaction(&mut ops)?;
        Ok(())
    }

    fn ensure_bank(&mut self, reg: ControlRegister) -> Result<(), DriverError<SPI::Error>> {
        if let Some(bank) = reg.bank()
            && self.current_bank != Some(bank)
        {
            self.set_bank(bank)?;
        }
        Ok(())
    }

    /// Reads one control register. MAC/MII registers shift out a stale byte
    /// on the first read, so those issue a 3-byte transaction instead of 2
    /// (spec.md §4.2's RCR contract).
    pub fn read_control(&mut self, reg: ControlRegister) -> Result<u8, DriverError<SPI::Error>> {
        self.ensure_bank(reg)?;

        if reg.shifts_dummy_byte() {
            let mut buf = [0u8; 3];
            let command = [reg.opcode(Op::RCR), 0, 0];
            self.spi.transfer(&mut buf, &command)?;
            Ok(buf[2])
        } else {
            let mut buf = [0u8; 2];
            let command = [reg.opcode(Op::RCR), 0];
            self.spi.transfer(&mut buf, &command)?;
            Ok(buf[1])
        }
    }

    pub fn write_control(&mut self, reg: ControlRegister, data: u8) -> Result<(), DriverError<SPI::Error>> {
        self.ensure_bank(reg)?;
        let buf = [reg.opcode(Op::WCR), data];
        self.spi.write(&buf)?;
        Ok(())
    }

    /// Reads a PHY (MII) register through the indirect `MIREGADR`/`MICMD`/
    /// `MISTAT` interface, bounded to `PHY_TIMEOUT_US`.
    pub fn read_phy(&mut self, reg: PhyRegister) -> Result<u16, DriverError<SPI::Error>> {
        self.write_control(MIREGADR, reg.addr())?;
        self.write_control(MICMD, MICMD_MIIRD)?;
        self.wait_phy_idle()?;
        self.write_control(MICMD, 0)?;
        self.read_u16(MIRDL, MIRDH)
    }

    pub fn write_phy(&mut self, reg: PhyRegister, data: u16) -> Result<(), DriverError<SPI::Error>> {
        self.write_control(MIREGADR, reg.addr())?;
        self.write_u16(MIWRL, MIWRH, data)?;
        self.wait_phy_idle()
    }

    //
    // Network functions
    //

    /// Receives a single packet into `buf`, returning the number of bytes
    /// written (0 if no packet was queued, or the queued packet failed the
    /// hardware's receive-ok check). Always advances `rx_read_ptr` and frees
    /// the consumed SRAM, even when the packet is dropped.
    pub fn receive(&mut self, buf: &mut [u8]) -> Result<usize, DriverError<SPI::Error>> {
        let packet_count = self.read_control(EPKTCNT)?;
        if packet_count == 0 {
            return Ok(0);
        }

        self.write_u16(ERDPTL, ERDPTH, self.rx_read_ptr)?;

        let mut rsv = [0u8; 6];
        self.mem_read(&mut rsv)?;

        let next_packet = u16::from_le_bytes([rsv[0], rsv[1]]);
        let byte_count = u16::from_le_bytes([rsv[2], rsv[3]]) as usize;
        let status = u16::from_le_bytes([rsv[4], rsv[5]]);
        const RECEIVE_OK: u16 = 0x0080;

        let copy_len = if status & RECEIVE_OK != 0 {
            let payload_len = byte_count.saturating_sub(4);
            let copy_len = core::cmp::min(payload_len, buf.len());
            if copy_len > 0 {
                self.mem_read(&mut buf[..copy_len])?;
            }
            copy_len
        } else {
            0
        };

        self.rx_read_ptr = next_packet;
        let new_rdpt = if next_packet.wrapping_sub(1) > RXEND_INIT {
            RXEND_INIT
        } else {
            next_packet.wrapping_sub(1)
        };
        self.write_u16(ERXRDPTL, ERXRDPTH, new_rdpt)?;

        let cmd = [ECON2.opcode(Op::BFS), ECON2_PKTDEC];
        self.spi.write(&cmd)?;

        Ok(copy_len)
    }

    /// Transmits one fully-assembled Ethernet frame (header included; the
    /// caller, not this driver, builds it — see `net-frame`). Applies the
    /// errata #12 TX-lockup workaround before launching and does not poll
    /// for completion: the next call's entry busy-wait does that.
    pub fn transmit(&mut self, frame: &[u8]) -> Result<(), DriverError<SPI::Error>> {
        self.wait_tx_idle()?;

        self.write_u16(EWRPTL, EWRPTH, TXSTART_INIT)?;
        let tx_end = TXSTART_INIT + (frame.len() as u16);
        self.write_u16(ETXNDL, ETXNDH, tx_end)?;

        self.mem_write(&[0u8])?;
        self.mem_write(frame)?;

        let cmd = [ECON1.opcode(Op::BFS), ECON1_TXRTS];
        self.spi.write(&cmd)?;

        if self.read_control(EIR)? & EIR_TXERIF != 0 {
            let cmd = [ECON1.opcode(Op::BFC), ECON1_TXRST];
            self.spi.write(&cmd)?;
        }

        Ok(())
    }

    //
    // Helpers
    //

    fn read_u16(&mut self, lo: ControlRegister, hi: ControlRegister) -> Result<u16, DriverError<SPI::Error>> {
        let lo = self.read_control(lo)? as u16;
        let hi = self.read_control(hi)? as u16;
        Ok(lo | (hi << 8))
    }

    fn write_u16(&mut self, lo: ControlRegister, hi: ControlRegister, val: u16) -> Result<(), DriverError<SPI::Error>> {
        self.write_control(lo, (val & 0xff) as u8)?;
        self.write_control(hi, (val >> 8) as u8)?;
        Ok(())
    }

    fn set_bank(&mut self, bank: Bank) -> Result<(), DriverError<SPI::Error>> {
        let command = [ECON1.opcode(Op::BFC), ECON1_BSEL_MASK];
        self.spi.write(&command)?;

        let command = [ECON1.opcode(Op::BFS), (bank as u8) & ECON1_BSEL_MASK];
        self.spi.write(&command)?;
        self.current_bank = Some(bank);

        Ok(())
    }

    fn wait_clkrdy(&mut self) -> Result<(), DriverError<SPI::Error>> {
        let mut waited = 0u32;
        loop {
            let estat = self.read_control(ESTAT)?;
            if estat & ESTAT_CLKRDY != 0 {
                return Ok(());
            }
            if waited >= RESET_TIMEOUT_US {
                return Err(DriverError::Timeout);
            }
            self.delay.delay_us(PHY_POLL_INTERVAL_US);
            waited += PHY_POLL_INTERVAL_US;
        }
    }

    fn wait_phy_idle(&mut self) -> Result<(), DriverError<SPI::Error>> {
        let mut waited = 0u32;
        loop {
            let mistat = self.read_control(MISTAT)?;
            if mistat & MISTAT_BUSY == 0 {
                return Ok(());
            }
            if waited >= PHY_TIMEOUT_US {
                return Err(DriverError::Timeout);
            }
            self.delay.delay_us(PHY_POLL_INTERVAL_US);
            waited += PHY_POLL_INTERVAL_US;
        }
    }

    /// Busy-waits for `ECON1.TXRTS` to clear. While waiting, pulses
    /// `ECON1.TXRST` if `EIR.TXERIF` is set — errata #12's workaround for
    /// the transmit logic locking up.
    fn wait_tx_idle(&mut self) -> Result<(), DriverError<SPI::Error>> {
        let mut waited = 0u32;
        loop {
            let econ1 = self.read_control(ECON1)?;
            if econ1 & ECON1_TXRTS == 0 {
                return Ok(());
            }
            if self.read_control(EIR)? & EIR_TXERIF != 0 {
                let cmd = [ECON1.opcode(Op::BFS), ECON1_TXRST];
                self.spi.write(&cmd)?;
                let cmd = [ECON1.opcode(Op::BFC), ECON1_TXRST];
                self.spi.write(&cmd)?;
            }
            if waited >= TX_IDLE_TIMEOUT_US {
                return Err(DriverError::Timeout);
            }
            self.delay.delay_us(PHY_POLL_INTERVAL_US);
            waited += PHY_POLL_INTERVAL_US;
        }
    }

    /// Whether the last transmit aborted (`ESTAT.TXABRT`), clearing the
    /// flag as a side effect. Exposed for callers that want to log it;
    /// spec.md does not require checking this before resending.
    pub fn take_tx_abort(&mut self) -> Result<bool, DriverError<SPI::Error>> {
        let estat = self.read_control(ESTAT)?;
        let aborted = estat & ESTAT_TXABRT != 0;
        if aborted {
            let cmd = [ESTAT.opcode(Op::BFC), ESTAT_TXABRT];
            self.spi.write(&cmd)?;
        }
        Ok(aborted)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec;

    use super::*;
    use embedded_hal_bus::spi::ExclusiveDevice;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    /// S3: starting with `current_bank = None`, reading `MACON1` (bank 2)
    /// then `MACON3` (bank 2) emits exactly one BFC(ECON1)+BFS(ECON1) pair
    /// and two RCR(dummy-byte) reads.
    #[test]
    fn s3_bank_switch_minimality() {
        let spi_expectations = [
            // BFC(ECON1, 0x03)
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), 0x03]),
            // BFS(ECON1, 0x02) -- Bank2 as u8 == 2
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), 0x02]),
            // RCR(MACON1) with dummy byte
            SpiTransaction::transfer(vec![MACON1.opcode(Op::RCR), 0, 0], vec![0, 0, 0xAB]),
            // RCR(MACON3) with dummy byte, no bank switch in between
            SpiTransaction::transfer(vec![MACON3.opcode(Op::RCR), 0, 0], vec![0, 0, 0xCD]),
        ];
        let pin_expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];

        let mut spi = SpiMock::new(&spi_expectations);
        let cs = PinMock::new(&pin_expectations);
        let device = ExclusiveDevice::new_no_delay(spi.clone(), cs.clone()).unwrap();

        let int = PinMock::new(&[]);
        let reset = PinMock::new(&[]);
        let mut enc = Enc28j60::new(device, int, reset, NoopDelay::new(), [0; 6]);

        assert_eq!(enc.read_control(MACON1).unwrap(), 0xAB);
        assert_eq!(enc.read_control(MACON3).unwrap(), 0xCD);

        spi.done();
        let mut cs = cs;
        cs.done();
    }

    /// Property 5: after consuming a packet, `rx_read_ptr` equals the
    /// `next_packet` field from the packet's 6-byte receive status vector,
    /// and the freed region is written back as `next_packet - 1` when that
    /// does not wrap below `ERXST`.
    #[test]
    fn property5_rx_pointer_advances_to_next_packet() {
        let rsv = [0x60, 0x00, 0x40, 0x00, 0x80, 0x00]; // next=0x0060, count=64, RECEIVE_OK
        let payload = [0xABu8; 60];

        let spi_expectations = [
            // bank switch to Bank1 for EPKTCNT
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), ECON1_BSEL_MASK]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), (Bank::Bank1 as u8) & ECON1_BSEL_MASK]),
            SpiTransaction::transfer(vec![EPKTCNT.opcode(Op::RCR), 0], vec![0, 1]),
            // bank switch to Bank0 for ERDPT
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), ECON1_BSEL_MASK]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), (Bank::Bank0 as u8) & ECON1_BSEL_MASK]),
            SpiTransaction::write_vec(vec![ERDPTL.opcode(Op::WCR), 0x50]),
            SpiTransaction::write_vec(vec![ERDPTH.opcode(Op::WCR), 0x00]),
            // 6-byte receive status vector
            SpiTransaction::write_vec(vec![0x3A]),
            SpiTransaction::read_vec(rsv.to_vec()),
            // packet payload (byte_count - 4 = 60 bytes)
            SpiTransaction::write_vec(vec![0x3A]),
            SpiTransaction::read_vec(payload.to_vec()),
            // ERXRDPT = next_packet - 1 = 0x005F, still bank 0
            SpiTransaction::write_vec(vec![ERXRDPTL.opcode(Op::WCR), 0x5F]),
            SpiTransaction::write_vec(vec![ERXRDPTH.opcode(Op::WCR), 0x00]),
            // ECON2.PKTDEC
            SpiTransaction::write_vec(vec![ECON2.opcode(Op::BFS), ECON2_PKTDEC]),
        ];
        let mut pin_expectations: vec::Vec<PinTransaction> = vec::Vec::new();
        for _ in 0..12 {
            pin_expectations.push(PinTransaction::set(PinState::Low));
            pin_expectations.push(PinTransaction::set(PinState::High));
        }

        let mut spi = SpiMock::new(&spi_expectations);
        let cs = PinMock::new(&pin_expectations);
        let device = ExclusiveDevice::new_no_delay(spi.clone(), cs.clone()).unwrap();

        let int = PinMock::new(&[]);
        let reset = PinMock::new(&[]);
        let mut enc = Enc28j60::new(device, int, reset, NoopDelay::new(), [0; 6]);
        enc.rx_read_ptr = 0x0050;

        let mut buf = [0u8; 60];
        let n = enc.receive(&mut buf).unwrap();
        assert_eq!(n, 60);
        assert_eq!(&buf[..], &payload[..]);
        assert_eq!(enc.rx_read_ptr, 0x0060);

        spi.done();
        let mut cs = cs;
        cs.done();
    }

    /// S4: with `ERXND = 0x0BFF`, a next-packet pointer of `0x0000` must
    /// cause `ERXRDPT` to be written as `0x0BFF` (the wrap branch).
    #[test]
    fn s4_rx_ring_wrap() {
        assert_eq!(0u16.wrapping_sub(1), 0xFFFF);
        assert!(0u16.wrapping_sub(1) > RXEND_INIT);

        let rsv = [0x00, 0x00, 0x10, 0x00, 0x00, 0x00]; // next=0x0000, count=16, not RECEIVE_OK

        let spi_expectations = [
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), ECON1_BSEL_MASK]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), (Bank::Bank1 as u8) & ECON1_BSEL_MASK]),
            SpiTransaction::transfer(vec![EPKTCNT.opcode(Op::RCR), 0], vec![0, 1]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), ECON1_BSEL_MASK]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), (Bank::Bank0 as u8) & ECON1_BSEL_MASK]),
            SpiTransaction::write_vec(vec![ERDPTL.opcode(Op::WCR), 0x00]),
            SpiTransaction::write_vec(vec![ERDPTH.opcode(Op::WCR), 0x01]),
            SpiTransaction::write_vec(vec![0x3A]),
            SpiTransaction::read_vec(rsv.to_vec()),
            // not RECEIVE_OK -> no payload read
            SpiTransaction::write_vec(vec![ERXRDPTL.opcode(Op::WCR), 0xFF]),
            SpiTransaction::write_vec(vec![ERXRDPTH.opcode(Op::WCR), 0x0B]),
            SpiTransaction::write_vec(vec![ECON2.opcode(Op::BFS), ECON2_PKTDEC]),
        ];
        let mut pin_expectations: vec::Vec<PinTransaction> = vec::Vec::new();
        for _ in 0..11 {
            pin_expectations.push(PinTransaction::set(PinState::Low));
            pin_expectations.push(PinTransaction::set(PinState::High));
        }

        let mut spi = SpiMock::new(&spi_expectations);
        let cs = PinMock::new(&pin_expectations);
        let device = ExclusiveDevice::new_no_delay(spi.clone(), cs.clone()).unwrap();

        let int = PinMock::new(&[]);
        let reset = PinMock::new(&[]);
        let mut enc = Enc28j60::new(device, int, reset, NoopDelay::new(), [0; 6]);
        enc.rx_read_ptr = 0x0100;

        let mut buf = [0u8; 64];
        let n = enc.receive(&mut buf).unwrap();
        assert_eq!(n, 0); // RECEIVE_OK was clear, packet discarded
        assert_eq!(enc.rx_read_ptr, 0x0000);

        spi.done();
        let mut cs = cs;
        cs.done();
    }

    /// S5: entering the TX path with `EIR.TXERIF` set while `ECON1.TXRTS`
    /// is still set pulses `ECON1.TXRST` (set then clear) before
    /// proceeding; if `TXERIF` is set again after launching, a cleanup
    /// `BFC(ECON1, TXRST)` is issued.
    #[test]
    fn s5_tx_errata_workaround() {
        let frame = [0xAAu8];

        let spi_expectations = [
            // wait_tx_idle: TXRTS still set, TXERIF set -> pulse TXRST
            SpiTransaction::transfer(vec![ECON1.opcode(Op::RCR), 0], vec![0, ECON1_TXRTS]),
            SpiTransaction::transfer(vec![EIR.opcode(Op::RCR), 0], vec![0, EIR_TXERIF]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), ECON1_TXRST]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), ECON1_TXRST]),
            // second poll: TXRTS clear, proceed
            SpiTransaction::transfer(vec![ECON1.opcode(Op::RCR), 0], vec![0, 0x00]),
            // EWRPT = TXSTART_INIT (0x0C00), already on bank 0
            SpiTransaction::write_vec(vec![EWRPTL.opcode(Op::WCR), 0x00]),
            SpiTransaction::write_vec(vec![EWRPTH.opcode(Op::WCR), 0x0C]),
            // ETXND = TXSTART_INIT + frame.len() (0x0C01)
            SpiTransaction::write_vec(vec![ETXNDL.opcode(Op::WCR), 0x01]),
            SpiTransaction::write_vec(vec![ETXNDH.opcode(Op::WCR), 0x0C]),
            // per-packet control byte
            SpiTransaction::write_vec(vec![0x7A]),
            SpiTransaction::write_vec(vec![0x00]),
            // frame bytes
            SpiTransaction::write_vec(vec![0x7A]),
            SpiTransaction::write_vec(vec![0xAA]),
            // launch
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFS), ECON1_TXRTS]),
            // post-launch: TXERIF set again -> cleanup BFC(TXRST)
            SpiTransaction::transfer(vec![EIR.opcode(Op::RCR), 0], vec![0, EIR_TXERIF]),
            SpiTransaction::write_vec(vec![ECON1.opcode(Op::BFC), ECON1_TXRST]),
        ];
        let mut pin_expectations: vec::Vec<PinTransaction> = vec::Vec::new();
        for _ in 0..14 {
            pin_expectations.push(PinTransaction::set(PinState::Low));
            pin_expectations.push(PinTransaction::set(PinState::High));
        }

        let mut spi = SpiMock::new(&spi_expectations);
        let cs = PinMock::new(&pin_expectations);
        let device = ExclusiveDevice::new_no_delay(spi.clone(), cs.clone()).unwrap();

        let int = PinMock::new(&[]);
        let reset = PinMock::new(&[]);
        let mut enc = Enc28j60::new(device, int, reset, NoopDelay::new(), [0; 6]);
        enc.current_bank = Some(Bank::Bank0);

        enc.transmit(&frame).unwrap();

        spi.done();
        let mut cs = cs;
        cs.done();
    }
}
