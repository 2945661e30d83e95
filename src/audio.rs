//! Piezo speaker driven by PWM0.
//!
//! The Circuit Playground speaker sits behind an amplifier enable pin;
//! it is only switched on while a chime plays.

use ancs_icons::config::CHIME_NOTES;
use ancs_icons::controller::AudioSink;
use defmt::debug;
use embassy_nrf::gpio::Output;
use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_time::Timer;

/// PWM counter clock with [`Prescaler::Div16`].
const PWM_CLOCK_HZ: u32 = 1_000_000;

/// COUNTERTOP is 15 bits wide.
const MAX_TOP: u32 = 0x7FFF;

pub struct Speaker {
    pwm: SimplePwm<'static, PWM0>,
    enable: Output<'static>,
}

impl Speaker {
    pub fn new(pwm: SimplePwm<'static, PWM0>, enable: Output<'static>) -> Self {
        pwm.set_prescaler(Prescaler::Div16);
        pwm.disable();
        Self { pwm, enable }
    }

    /// Square wave at `freq_hz`, 50% duty.
    fn tone(&mut self, freq_hz: u32) {
        let top = (PWM_CLOCK_HZ / freq_hz.max(1)).min(MAX_TOP) as u16;
        self.pwm.set_max_duty(top);
        self.pwm.set_duty(0, top / 2);
        self.pwm.enable();
    }
}

impl AudioSink for Speaker {
    async fn play_connect_chime(&mut self) {
        self.enable.set_high();
        for (freq, ms) in CHIME_NOTES {
            debug!("Chime note {} Hz", freq);
            self.tone(freq);
            Timer::after_millis(ms).await;
        }
        self.pwm.disable();
        self.enable.set_low();
    }
}
