//! Apple Notification Center Service (ANCS) wire format.
//!
//! The phone is the GATT server. We subscribe to two characteristics and
//! write a third:
//!
//! - **Notification Source** (notify): 8-byte packets announcing that a
//!   notification was added, modified or removed.
//! - **Control Point** (write): ask for attributes of one notification.
//! - **Data Source** (notify): the answer, possibly split over several
//!   notifications when it exceeds the ATT MTU.
//!
//! Everything here is pure byte handling so it can be tested on the host.

use crate::notify::{truncated_app_id, AppId, Category, NotificationId};
use heapless::Vec;

/// ANCS primary service UUID `7905F431-B5CE-4E99-A40F-4B1E122D00D0`,
/// little-endian as it goes on air.
pub const ANCS_SERVICE_UUID: [u8; 16] = [
    0xD0, 0x00, 0x2D, 0x12, 0x1E, 0x4B, 0x0F, 0xA4, 0x99, 0x4E, 0xCE, 0xB5, 0x31, 0xF4, 0x05, 0x79,
];

/// Length of a Notification Source packet.
pub const NOTIFICATION_SOURCE_LEN: usize = 8;

/// Control Point command: Get Notification Attributes.
const COMMAND_GET_NOTIFICATION_ATTRIBUTES: u8 = 0;

/// Notification attribute IDs we request. Neither takes a max-length.
const ATTRIBUTE_APP_IDENTIFIER: u8 = 0;
const ATTRIBUTE_DATE: u8 = 5;

/// Number of attribute tuples in every response we ask for.
const REQUESTED_ATTRIBUTES: usize = 2;

/// Size of an encoded attribute request.
pub const ATTRIBUTE_REQUEST_LEN: usize = 7;

/// Largest Data Source response we are willing to buffer.
pub const MAX_RESPONSE_LEN: usize = 128;

/// Notification Source event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventId {
    Added,
    Modified,
    Removed,
}

/// Notification Source EventFlags bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventFlags(pub u8);

impl EventFlags {
    pub const SILENT: u8 = 1 << 0;
    pub const IMPORTANT: u8 = 1 << 1;
    pub const PRE_EXISTING: u8 = 1 << 2;
    pub const POSITIVE_ACTION: u8 = 1 << 3;
    pub const NEGATIVE_ACTION: u8 = 1 << 4;

    pub fn is_silent(self) -> bool {
        self.0 & Self::SILENT != 0
    }

    /// The notification existed before we connected.
    pub fn is_pre_existing(self) -> bool {
        self.0 & Self::PRE_EXISTING != 0
    }
}

/// One decoded Notification Source packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationSourceEvent {
    pub event: EventId,
    pub flags: EventFlags,
    pub category: Category,
    pub category_count: u8,
    pub uid: NotificationId,
}

impl NotificationSourceEvent {
    /// Decode a Notification Source packet.
    ///
    /// Layout: `[EventID][EventFlags][CategoryID][CategoryCount][UID u32 LE]`.
    /// Returns `None` for short packets and unknown event IDs.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < NOTIFICATION_SOURCE_LEN {
            return None;
        }

        let event = match data[0] {
            0 => EventId::Added,
            1 => EventId::Modified,
            2 => EventId::Removed,
            _ => return None,
        };

        Some(Self {
            event,
            flags: EventFlags(data[1]),
            category: Category::from(data[2]),
            category_count: data[3],
            uid: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        })
    }
}

/// Build a Control Point "Get Notification Attributes" command asking
/// for the app identifier and date of `uid`.
pub fn encode_get_notification_attributes(uid: NotificationId) -> [u8; ATTRIBUTE_REQUEST_LEN] {
    let uid = uid.to_le_bytes();
    [
        COMMAND_GET_NOTIFICATION_ATTRIBUTES,
        uid[0],
        uid[1],
        uid[2],
        uid[3],
        ATTRIBUTE_APP_IDENTIFIER,
        ATTRIBUTE_DATE,
    ]
}

/// Attributes returned by the phone for one notification.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NotificationAttributes {
    pub uid: NotificationId,
    pub app_id: AppId,
    /// Parsed Date attribute, see [`parse_date`].
    pub date: Option<u64>,
}

/// Reassembles Data Source responses that span several notifications.
pub struct DataSourceAssembler {
    buf: Vec<u8, MAX_RESPONSE_LEN>,
}

enum Parse {
    Complete(NotificationAttributes),
    Incomplete,
    Malformed,
}

impl DataSourceAssembler {
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed one Data Source notification.
    ///
    /// Returns the attributes once the whole response has arrived.
    /// Malformed or oversized responses are dropped.
    pub fn push(&mut self, fragment: &[u8]) -> Option<NotificationAttributes> {
        if self.buf.extend_from_slice(fragment).is_err() {
            self.buf.clear();
            return None;
        }

        match parse_response(&self.buf) {
            Parse::Complete(attrs) => {
                self.buf.clear();
                Some(attrs)
            }
            Parse::Incomplete => None,
            Parse::Malformed => {
                self.buf.clear();
                None
            }
        }
    }

    /// Drop any partially received response.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

impl Default for DataSourceAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Layout: `[CommandID][UID u32 LE]` then `[AttrID][len u16 LE][value]`
/// for each requested attribute, in request order.
fn parse_response(data: &[u8]) -> Parse {
    if data.is_empty() {
        return Parse::Incomplete;
    }
    if data[0] != COMMAND_GET_NOTIFICATION_ATTRIBUTES {
        return Parse::Malformed;
    }
    if data.len() < 5 {
        return Parse::Incomplete;
    }

    let uid = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    let mut app_id = AppId::new();
    let mut date = None;

    let mut offset = 5;
    for _ in 0..REQUESTED_ATTRIBUTES {
        if offset + 3 > data.len() {
            return Parse::Incomplete;
        }
        let attribute = data[offset];
        let len = u16::from_le_bytes([data[offset + 1], data[offset + 2]]) as usize;
        let start = offset + 3;
        if start + len > data.len() {
            return Parse::Incomplete;
        }
        let value = &data[start..start + len];

        match attribute {
            ATTRIBUTE_APP_IDENTIFIER => {
                app_id = core::str::from_utf8(value)
                    .map(truncated_app_id)
                    .unwrap_or_default();
            }
            ATTRIBUTE_DATE => {
                date = core::str::from_utf8(value).ok().and_then(parse_date);
            }
            _ => return Parse::Malformed,
        }
        offset = start + len;
    }

    Parse::Complete(NotificationAttributes { uid, app_id, date })
}

/// Parse an ANCS Date attribute (`yyyyMMdd'T'HHmmSS`, UTS #35) into a
/// sortable number `yyyyMMddHHmmSS`.
pub fn parse_date(date: &str) -> Option<u64> {
    let bytes = date.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'T' {
        return None;
    }

    let mut value: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i == 8 {
            continue;
        }
        if !b.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u64::from(b - b'0');
    }
    Some(value)
}
