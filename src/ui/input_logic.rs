//! Turns one tick's scroll-button levels into a cursor move over the
//! Eligible View (index 0 is the oldest entry, the last is the newest).

use crate::config::SimultaneousPress;
use crate::notify::selection::Buttons;

/// Result of applying the scroll buttons to a view index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scroll {
    pub index: usize,
    /// At least one button actually stepped the cursor. A press that
    /// only hit the end of the view does not count.
    pub moved: bool,
}

/// Apply "older" then "newer" to `index` in a view of `len` entries,
/// clamping at both ends.
///
/// With [`SimultaneousPress::Ignore`], holding both buttons is no input.
pub fn scroll(index: usize, len: usize, buttons: Buttons, policy: SimultaneousPress) -> Scroll {
    let unchanged = Scroll { index, moved: false };
    if buttons.older && buttons.newer && policy == SimultaneousPress::Ignore {
        return unchanged;
    }

    let mut scroll = unchanged;
    if buttons.older && scroll.index > 0 {
        scroll.index -= 1;
        scroll.moved = true;
    }
    if buttons.newer && scroll.index + 1 < len {
        scroll.index += 1;
        scroll.moved = true;
    }
    scroll
}
