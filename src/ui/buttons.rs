//! GPIO scroll buttons.
//!
//! Two physical buttons (active-high with internal pull-down):
//!   - A - scroll towards newer notifications
//!   - B - scroll towards older notifications
//!
//! The controller samples both levels once per tick; there is no edge
//! detection or debounce state here.

use ancs_icons::controller::ButtonInput;
use ancs_icons::notify::selection::Buttons;
use embassy_nrf::gpio::{AnyPin, Input, Pull};

pub struct ScrollButtons {
    newer: Input<'static>,
    older: Input<'static>,
}

impl ScrollButtons {
    pub fn new(newer: AnyPin, older: AnyPin) -> Self {
        Self {
            newer: Input::new(newer, Pull::Down),
            older: Input::new(older, Pull::Down),
        }
    }
}

impl ButtonInput for ScrollButtons {
    fn sample(&mut self) -> Buttons {
        Buttons {
            older: self.older.is_high(),
            newer: self.newer.is_high(),
        }
    }
}
