//! Notification data model - the live set the phone reports, and the
//! per-tick logic that decides which notification icon is on screen.
//!
//! - [`view`]: filters and orders the live set into the Eligible View.
//! - [`selection`]: the cursor that picks one identifier per tick.
//!
//! Nothing here owns notifications across polls; the feed hands in a
//! fresh [`NotificationSet`] snapshot every tick and identifiers are the
//! only thing carried from one tick to the next.

pub mod selection;
pub mod view;


use crate::config::{APP_ID_LEN, MAX_NOTIFICATIONS};
use heapless::{FnvIndexMap, String};

/// Identifier of one live notification (the ANCS NotificationUID).
pub type NotificationId = u32;

/// App bundle identifier, e.g. `com.apple.MobileSMS`.
pub type AppId = String<APP_ID_LEN>;

/// Live notifications keyed by identifier, as of the latest poll.
pub type NotificationSet = FnvIndexMap<NotificationId, Notification, MAX_NOTIFICATIONS>;

/// ANCS notification category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    Other,
    IncomingCall,
    MissedCall,
    Voicemail,
    Social,
    Schedule,
    Email,
    News,
    HealthAndFitness,
    BusinessAndFinance,
    Location,
    Entertainment,
}

impl From<u8> for Category {
    fn from(value: u8) -> Self {
        match value {
            1 => Category::IncomingCall,
            2 => Category::MissedCall,
            3 => Category::Voicemail,
            4 => Category::Social,
            5 => Category::Schedule,
            6 => Category::Email,
            7 => Category::News,
            8 => Category::HealthAndFitness,
            9 => Category::BusinessAndFinance,
            10 => Category::Location,
            11 => Category::Entertainment,
            _ => Category::Other,
        }
    }
}

/// One entry of the live notification set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    pub id: NotificationId,
    /// Source app; empty until the phone has answered the attribute request.
    pub app_id: AppId,
    pub category: Category,
    /// Set by the feed once the phone dismissed the notification.
    pub removed: bool,
    arrival: u64,
}

impl Notification {
    /// Create a notification record.
    ///
    /// App identifiers longer than [`APP_ID_LEN`] are truncated.
    pub fn new(id: NotificationId, app_id: &str, category: Category, arrival: u64) -> Self {
        Self {
            id,
            app_id: truncated_app_id(app_id),
            category,
            removed: false,
            arrival,
        }
    }

    /// Sort key for the Eligible View: larger means newer.
    ///
    /// Only comparable with other arrival timestamps, not wall-clock time.
    pub fn arrival_timestamp(&self) -> u64 {
        self.arrival
    }

    pub(crate) fn set_arrival(&mut self, arrival: u64) {
        self.arrival = arrival;
    }
}

pub(crate) fn truncated_app_id(app_id: &str) -> AppId {
    let mut id = AppId::new();
    for c in app_id.chars() {
        if id.push(c).is_err() {
            break;
        }
    }
    id
}
