//! Selection cursor - which notification is on screen.
//!
//! Runs once per tick against a freshly built Eligible View. The cursor
//! remembers only the identifier it last showed, when the user last
//! navigated, and whether the "no notifications" placeholder is up.
//!
//! Precedence, per tick:
//!
//! 1. A shown notification that was removed (or vanished from the set)
//!    is dropped before anything else.
//! 2. Nothing shown and nothing eligible: show the placeholder once.
//! 3. Otherwise resume at the shown notification if the user navigated
//!    within the re-arm window, else jump to the newest; then apply the
//!    scroll buttons (older first, then newer), clamping at both ends.

use super::{NotificationId, NotificationSet};
use crate::config::Settings;
use crate::ui::input_logic::scroll;

/// Level state of the two scroll buttons, sampled this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons {
    /// Scroll towards older notifications (button B).
    pub older: bool,
    /// Scroll towards newer notifications (button A).
    pub newer: bool,
}

impl Buttons {
    pub fn any(self) -> bool {
        self.older || self.newer
    }
}

/// What the display should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Draw the icon of this notification.
    Show(NotificationId),
    /// Draw the "no notifications" placeholder.
    ShowEmpty,
    /// Leave the display alone.
    NoChange,
}

/// Per-session cursor state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    shown: Option<NotificationId>,
    last_navigation: Option<u64>,
    cleared: bool,
}

impl Selection {
    pub const fn new() -> Self {
        Self {
            shown: None,
            last_navigation: None,
            cleared: false,
        }
    }

    /// Identifier currently on screen, if any.
    pub fn shown(&self) -> Option<NotificationId> {
        self.shown
    }

    /// True while the placeholder is on screen.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Record that the placeholder was drawn outside of [`Selection::tick`].
    pub fn mark_cleared(&mut self) {
        self.shown = None;
        self.cleared = true;
    }

    /// Advance the cursor by one tick.
    ///
    /// `view` must have been built from `set` this tick. `now` is in
    /// milliseconds on the same clock as previous calls.
    pub fn tick(
        &mut self,
        view: &[NotificationId],
        set: &NotificationSet,
        buttons: Buttons,
        now: u64,
        settings: &Settings,
    ) -> Outcome {
        if let Some(id) = self.shown {
            let gone = set.get(&id).map_or(true, |n| n.removed);
            if gone {
                self.shown = None;
            }
        }

        if view.is_empty() {
            self.shown = None;
            if self.cleared {
                return Outcome::NoChange;
            }
            self.cleared = true;
            return Outcome::ShowEmpty;
        }

        self.cleared = false;

        let newest = view.len() - 1;
        let since_navigation = self
            .last_navigation
            .map_or(u64::MAX, |at| now.saturating_sub(at));

        let mut index = match self.shown {
            Some(id) if since_navigation < settings.rearm_ms => {
                view.iter().position(|v| *v == id).unwrap_or(newest)
            }
            _ => newest,
        };

        if since_navigation >= settings.debounce_ms {
            let scrolled = scroll(index, view.len(), buttons, settings.simultaneous_press);
            index = scrolled.index;
            if scrolled.moved {
                self.last_navigation = Some(now);
            }
        }

        let id = view[index];
        if self.shown == Some(id) {
            return Outcome::NoChange;
        }
        self.shown = Some(id);
        Outcome::Show(id)
    }
}
