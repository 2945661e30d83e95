//! Host-testable library interface for ancs-icons.
//!
//! Everything that decides *what* ends up on the screen lives here and
//! builds without any embedded hardware: the notification model, the
//! selection cursor, the idle/dim timer, the lifecycle controller and
//! the ANCS wire format.
//!
//! Usage: `cargo test --lib` (or `cargo test` for the integration tests too)
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links this library for all of its logic; only the hardware
//! collaborators (SoftDevice, OLED, speaker, buttons) live in the binary.

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

#[macro_use]
mod fmt;

pub mod config;
pub mod controller;
pub mod notify;
pub mod power_logic;

// Internal module paths for the pure parts of the BLE and UI subsystems;
// the rest of those directories is firmware-only.
#[path = "ble/advertisement.rs"]
mod ble_advertisement_impl;
#[path = "ble/ancs.rs"]
mod ble_ancs_impl;
#[path = "ble/feed.rs"]
mod ble_feed_impl;
#[path = "ui/input_logic.rs"]
mod ui_input_logic_impl;

pub mod ble {
    pub mod advertisement {
        pub use crate::ble_advertisement_impl::*;
    }
    pub mod ancs {
        pub use crate::ble_ancs_impl::*;
    }
    pub mod feed {
        pub use crate::ble_feed_impl::*;
    }
}

pub mod ui {
    pub mod input_logic {
        pub use crate::ui_input_logic_impl::{scroll, Scroll};
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
