use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use simple_network::{EtherType, MacAddress, ReceiveError, SimpleNetwork, TransmitError};

use crate::Enc28j60;

/// Largest Ethernet II frame (header + payload) this adapter will stage on
/// the stack before handing it to the driver's single-packet TX window.
const MAX_FRAME_LEN: usize = 1518;

impl<SPI, INT, RST, DELAY> SimpleNetwork for Enc28j60<SPI, INT, RST, DELAY>
where
    SPI: SpiDevice,
    INT: InputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, ReceiveError> {
        self.receive(buf).map_err(|_| ReceiveError::DeviceError)
    }

    fn transmit(
        &mut self,
        dst: &MacAddress,
        src: &MacAddress,
        ether_type: EtherType,
        data: &[u8],
    ) -> Result<(), TransmitError> {
        let total_len = 14 + data.len();
        if total_len > MAX_FRAME_LEN {
            return Err(TransmitError::InvalidParameter);
        }

        let mut frame = [0u8; MAX_FRAME_LEN];
        frame[0..6].copy_from_slice(dst.as_ref());
        frame[6..12].copy_from_slice(src.as_ref());
        frame[12..14].copy_from_slice(&ether_type.to_be_bytes());
        frame[14..total_len].copy_from_slice(data);

        self.transmit(&frame[..total_len]).map_err(|_| TransmitError::DeviceError)
    }
}
