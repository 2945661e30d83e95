//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Peripheral** - advertises with an ANCS solicitation, accepts the
//!    phone's connection and pairs/bonds with it.
//! 2. **ANCS Client** - discovers the phone's ANCS service, subscribes
//!    to Notification Source and Data Source and writes Control Point
//!    requests.
//!
//! The byte-level protocol and the live notification feed are host
//! tested and live in the library; they are re-exported here.

pub mod ancs_client;
pub mod peripheral;

pub use ancs_icons::ble::{advertisement, ancs, feed};
