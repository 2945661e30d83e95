//! Unified error type for the ancs-icons firmware.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! None of these are fatal: a failed connection attempt goes back to
//! advertising, a failed display write is logged and the next change
//! redraws the whole frame.

use defmt::Format;

/// Top-level error type used across the firmware.
#[derive(Debug, Format)]
pub enum Error {
    // BLE
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// The connected phone does not expose the ANCS service
    /// (not an iPhone, or not yet encrypted).
    AncsNotFound,

    // UI / Display
    /// I²C transaction to the display failed.
    Display,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// Advertising could not start or was aborted.
    AdvertiseFailed,
    /// Pairing / encryption did not complete in time.
    SecurityFailed,
    /// Enabling notifications on an ANCS characteristic failed.
    NotifyFailed,
    /// Control Point write was rejected.
    WriteFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
