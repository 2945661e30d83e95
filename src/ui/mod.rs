//! User interface subsystem - OLED display + physical buttons.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C, two stacked layers
//!   (connect backdrop + notification icon)
//! - **Buttons**: 2 tactile switches (A = newer, B = older), sampled as
//!   levels; debouncing happens in the selection cursor

pub mod buttons;
pub mod display;
