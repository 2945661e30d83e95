//! Eligible View builder.

use super::{NotificationId, NotificationSet};
use crate::config::{Icon, MAX_NOTIFICATIONS};
use heapless::Vec;

/// Identifiers worth showing, oldest first, newest last.
pub type EligibleView = Vec<NotificationId, MAX_NOTIFICATIONS>;

/// Allow-map (app → icon) plus block-list.
#[derive(Clone, Copy, Debug)]
pub struct AppFilter {
    icons: &'static [(&'static str, Icon)],
    blocked: &'static [&'static str],
}

impl AppFilter {
    pub const fn new(
        icons: &'static [(&'static str, Icon)],
        blocked: &'static [&'static str],
    ) -> Self {
        Self { icons, blocked }
    }

    /// Icon configured for an app, if it has one.
    pub fn icon_for(&self, app_id: &str) -> Option<Icon> {
        self.icons
            .iter()
            .find_map(|(app, icon)| (*app == app_id).then_some(*icon))
    }

    /// Allow-listed and not block-listed.
    pub fn is_eligible(&self, app_id: &str) -> bool {
        self.icon_for(app_id).is_some() && !self.blocked.contains(&app_id)
    }
}

/// Build the ordered view of notifications that may be displayed.
///
/// Removed notifications are never eligible. Entries are ordered by
/// ascending arrival timestamp; equal timestamps fall back to the
/// identifier, so the result does not depend on the map's iteration
/// order and repeated calls on the same set agree exactly.
pub fn build(set: &NotificationSet, filter: &AppFilter) -> EligibleView {
    let mut view = EligibleView::new();
    for (id, notification) in set.iter() {
        if notification.removed || !filter.is_eligible(&notification.app_id) {
            continue;
        }
        // Same capacity as the set, cannot overflow.
        let _ = view.push(*id);
    }

    view.sort_unstable_by_key(|id| {
        let arrival = set.get(id).map_or(0, |n| n.arrival_timestamp());
        (arrival, *id)
    });
    view
}
