#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt_rtt as _;
use embedded_hal_bus::spi::ExclusiveDevice;
use hal::prelude::*;
use panic_probe as _;
use stm32f4xx_hal::{self as hal, hal_02::spi::MODE_0, rcc::Config, spi::Spi};

use enc28j60::Enc28j60;
use endpoint::{Endpoint, EndpointConfig};
use simple_network::{Ip4Address, MacAddress};

/// Board's station address; swap for a real allocation before deploying
/// more than one of these on a LAN.
const LOCAL_MAC: [u8; 6] = [0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
const LOCAL_IP: [u8; 4] = [10, 0, 1, 254];

#[entry]
fn main() -> ! {
    let cp = cortex_m::peripheral::Peripherals::take().unwrap();
    let dp = hal::pac::Peripherals::take().unwrap();

    let mut rcc = dp.RCC.freeze(Config::hsi().sysclk(16.MHz()));

    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);
    let gpiod = dp.GPIOD.split(&mut rcc);

    let sck = gpioa.pa5.into_alternate();
    let miso = gpioa.pa6.into_alternate();
    let mosi = gpioa.pa7.into_alternate();

    let cs = gpiob.pb1.into_push_pull_output();
    let reset = gpiob.pb0.into_push_pull_output();
    let int = gpioa.pa1.into_pull_up_input();

    let mut orange_led = gpiod.pd13.into_push_pull_output();
    let mut blue_led = gpiod.pd15.into_push_pull_output();
    orange_led.set_high();
    blue_led.set_high();

    let spi = Spi::new(
        dp.SPI1,
        (Some(sck), Some(miso), Some(mosi)),
        MODE_0,
        2.MHz(),
        &mut rcc,
    );

    let delay = dp.TIM2.delay_us(&mut rcc);
    let device = ExclusiveDevice::new(spi, cs, cp.SYST.delay(&rcc.clocks)).expect("set up SpiDevice");
    let driver = Enc28j60::new(device, int, reset, delay, LOCAL_MAC);

    let config = EndpointConfig {
        local_mac: MacAddress::from(LOCAL_MAC),
        local_ip: Ip4Address::from(LOCAL_IP),
        source_filter: None,
    };
    let mut endpoint = Endpoint::new(driver, config);
    endpoint.init().expect("enc28j60 initialization failed");

    blue_led.set_low();
    orange_led.set_low();

    let mut buf = [0u8; endpoint::MAX_FRAME];
    endpoint.run_forever(&mut buf, || cortex_m::asm::delay(16_000_000));
}
