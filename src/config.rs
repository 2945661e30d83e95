//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and the app
//! allow/block lists live here so they can be tuned in one place.
//! [`Settings`] bundles the tunables the controller needs at runtime.

use crate::notify::view::AppFilter;

// BLE

/// Complete local name put in the scan response.
pub const BLE_DEVICE_NAME: &str = "CIRCUITPY";

/// Advertising interval (in 0.625 ms units). 160 = 100 ms.
pub const BLE_ADV_INTERVAL: u32 = 160;

/// How many times to poll the security mode while waiting for the
/// phone to finish pairing / encryption (200 ms apart).
pub const BLE_SECURITY_POLLS: u32 = 50;

/// Pause before advertising again after a failed connection attempt.
pub const BLE_RETRY_DELAY_MS: u64 = 1_000;

// Timing (milliseconds)

/// Minimum time between two accepted button navigations.
pub const DEBOUNCE_MS: u64 = 100;

/// After this long without navigation a manually selected notification
/// snaps back to the newest one.
pub const DELAY_AFTER_PRESS_MS: u64 = 15_000;

/// Inactivity before the display is dimmed.
pub const DIM_TIMEOUT_MS: u64 = 20_000;

/// Display brightness while dimmed (fraction of full brightness).
pub const DIM_LEVEL: f32 = 0.05;

/// Length of one controller tick / GATT event pump window.
pub const POLL_INTERVAL_MS: u64 = 50;

/// An ANCS attribute request with no answer after this long is re-sent.
pub const ATTRIBUTE_RETRY_MS: u64 = 2_000;

/// Attribute requests sent for one notification before it is skipped
/// for the rest of the session.
pub const MAX_ATTRIBUTE_ATTEMPTS: u8 = 3;

// Capacities

/// Maximum number of live notifications tracked per session.
/// Must be a power of two (index map capacity).
pub const MAX_NOTIFICATIONS: usize = 32;

/// Maximum stored length of an app bundle identifier.
pub const APP_ID_LEN: usize = 48;

/// Maximum number of bonded phones remembered in RAM.
pub const MAX_BONDED_PEERS: usize = 4;

// GPIO pin assignments (Circuit Playground Bluefruit defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your own board.
//
//   Button A (newer)   → P1.15
//   Button B (older)   → P1.02
//   Speaker            → P0.13
//   Speaker enable     → P1.04
//   I²C SDA            → P0.05
//   I²C SCL            → P0.04

/// Connect chime notes (Hz, ms).
pub const CHIME_NOTES: [(u32, u64); 3] = [(523, 250), (659, 250), (784, 500)];

// Icons

/// Icon resources the display knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Icon {
    Slack,
    Basecamp,
    Sms,
    Discord,
    Calendar,
    Phone,
}

impl Icon {
    /// Short label drawn inside the icon tile.
    pub fn label(self) -> &'static str {
        match self {
            Icon::Slack => "SLACK",
            Icon::Basecamp => "BCAMP",
            Icon::Sms => "SMS",
            Icon::Discord => "DISCORD",
            Icon::Calendar => "CAL",
            Icon::Phone => "PHONE",
        }
    }
}

/// Apps to show notifications from, and the icon drawn for each.
pub const APP_ICONS: &[(&str, Icon)] = &[
    ("com.tinyspeck.chatlyio", Icon::Slack),
    ("com.basecamp.bc3-ios", Icon::Basecamp),
    ("com.apple.MobileSMS", Icon::Sms),
    ("com.hammerandchisel.discord", Icon::Discord),
    ("com.apple.mobilecal", Icon::Calendar),
    ("com.apple.mobilephone", Icon::Phone),
];

/// Apps never shown, even when they have an icon.
pub const BLOCKLIST: &[&str] = &[];

// Runtime settings

/// What to do when both scroll buttons are held in the same tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimultaneousPress {
    /// Apply "older" then "newer" to the same index, in that order.
    Sequential,
    /// Treat the combination as no input.
    Ignore,
}

/// Tunables threaded through the controller.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub debounce_ms: u64,
    pub rearm_ms: u64,
    pub dim_timeout_ms: u64,
    pub dim_level: f32,
    pub simultaneous_press: SimultaneousPress,
    pub filter: AppFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            rearm_ms: DELAY_AFTER_PRESS_MS,
            dim_timeout_ms: DIM_TIMEOUT_MS,
            dim_level: DIM_LEVEL,
            simultaneous_press: SimultaneousPress::Sequential,
            filter: AppFilter::new(APP_ICONS, BLOCKLIST),
        }
    }
}
