//! Legacy advertising payloads.
//!
//! iOS only offers ANCS to accessories that solicit it, so the
//! advertisement carries the ANCS UUID in a "List of 128-bit Service
//! Solicitation UUIDs" field. The name goes in the scan response.

use crate::ble::ancs::ANCS_SERVICE_UUID;
use heapless::Vec;

/// Maximum legacy advertising / scan response payload.
pub const MAX_AD_LEN: usize = 31;

/// One advertising or scan response payload.
pub type AdPayload = Vec<u8, MAX_AD_LEN>;

const AD_FLAGS: u8 = 0x01;
const AD_SHORTENED_LOCAL_NAME: u8 = 0x08;
const AD_COMPLETE_LOCAL_NAME: u8 = 0x09;
const AD_SOLICIT_UUID128: u8 = 0x15;

/// LE General Discoverable, BR/EDR not supported.
const FLAGS_GENERAL_DISCOVERABLE_LE_ONLY: u8 = 0x06;

/// Flags + ANCS solicitation (21 bytes).
pub fn advertising_data() -> AdPayload {
    let mut data = AdPayload::new();
    push_field(&mut data, AD_FLAGS, &[FLAGS_GENERAL_DISCOVERABLE_LE_ONLY]);
    push_field(&mut data, AD_SOLICIT_UUID128, &ANCS_SERVICE_UUID);
    data
}

/// Scan response carrying the device name.
///
/// Names that do not fit are cut and sent as a shortened local name.
pub fn scan_response_data(name: &str) -> AdPayload {
    let room = MAX_AD_LEN - 2;
    let mut data = AdPayload::new();

    if name.len() <= room {
        push_field(&mut data, AD_COMPLETE_LOCAL_NAME, name.as_bytes());
    } else {
        let mut end = room;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        push_field(&mut data, AD_SHORTENED_LOCAL_NAME, &name.as_bytes()[..end]);
    }
    data
}

/// Value of the first field of type `ad_type` in an AD payload.
pub fn find_field(data: &[u8], ad_type: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        if data[i + 1] == ad_type {
            return Some(&data[i + 2..i + 1 + len]);
        }
        i += len + 1;
    }
    None
}

fn push_field(data: &mut AdPayload, ad_type: u8, value: &[u8]) {
    // Callers stay within MAX_AD_LEN.
    let _ = data.push(value.len() as u8 + 1);
    let _ = data.push(ad_type);
    let _ = data.extend_from_slice(value);
}
