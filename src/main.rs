//! ancs-icons firmware for the Adafruit Circuit Playground Bluefruit
//! (nRF52840) with an SSD1306 OLED.
//!
//! Advertises as an ANCS accessory, pairs with an iPhone and shows the
//! icon of its newest notification from an allow-listed app. Buttons A
//! and B scroll through newer and older notifications; the display dims
//! after a while without activity.
//!
//! # Tasks
//!
//! - `softdevice_task` - runs the SoftDevice event loop
//! - `main` - the lifecycle controller (advertise, serve one phone, repeat)

#![no_std]
#![no_main]

mod audio;
mod ble;
mod error;
mod ui;

use core::mem;

use ancs_icons::config::{Settings, BLE_DEVICE_NAME};
use ancs_icons::controller::{Clock, Controller};
use audio::Speaker;
use ble::peripheral::{bonder, AncsPeripheral};
use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive, Pin as _};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Instant, Timer};
use nrf_softdevice::{raw, Softdevice};
use ui::buttons::ScrollButtons;
use ui::display::OledSink;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Embassy time as the controller's clock.
struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    async fn delay_ms(&self, ms: u64) {
        Timer::after_millis(ms).await;
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Peripheral-only SoftDevice setup: one link, MTU large enough for
/// most ANCS attribute responses in a single notification.
fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ancs-icons starting");

    // The SoftDevice reserves interrupt priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    let sd: &'static Softdevice = Softdevice::enable(&softdevice_config());
    spawner.spawn(softdevice_task(sd)).unwrap();
    info!("SoftDevice enabled");

    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_05, p.P0_04, twim::Config::default());
    let display = OledSink::new(i2c);

    let pwm = SimplePwm::new_1ch(p.PWM0, p.P0_13);
    let speaker_enable = Output::new(p.P1_04, Level::Low, OutputDrive::Standard);
    let speaker = Speaker::new(pwm, speaker_enable);

    let buttons = ScrollButtons::new(p.P1_15.degrade(), p.P1_02.degrade());

    let mut peripheral = AncsPeripheral::new(sd, bonder());
    let mut controller = Controller::new(display, speaker, buttons, EmbassyClock, Settings::default());

    controller.run(&mut peripheral).await
}
