//! Connection lifecycle controller - the firmware's main loop.
//!
//! ```text
//!   ADVERTISING ──connect()──▶ ACTIVE ──peer gone──▶ ADVERTISING ...
//! ```
//!
//! While advertising, only the idle/dim timer runs. Once a phone with a
//! notification feed is connected, every tick polls the feed, rebuilds
//! the Eligible View, advances the selection cursor and writes to the
//! display only when something changed.
//!
//! All hardware sits behind the traits below so the state machine can be
//! driven from host tests with scripted fakes.

use core::convert::Infallible;

use embassy_futures::select::{select, Either};

use crate::config::{Icon, Settings, POLL_INTERVAL_MS};
use crate::notify::selection::{Buttons, Outcome, Selection};
use crate::notify::{view, NotificationSet};
use crate::power_logic::{DisplayPower, IdleTimer};

/// Monotonic time source plus timed waits.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    async fn delay_ms(&self, ms: u64);
}

/// Two level-sampled scroll buttons. No debounce state of its own.
pub trait ButtonInput {
    fn sample(&mut self) -> Buttons;
}

/// Display layers, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    /// "Connect your phone" screen, always present.
    Backdrop,
    /// Icon or placeholder, only while a phone is connected.
    Foreground,
}

/// Image resources the display can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Image {
    Connect,
    NoNotifications,
    App(Icon),
}

/// Stacked-layer display.
pub trait DisplaySink {
    fn show(&mut self, layer: Layer, image: Image);

    fn remove(&mut self, layer: Layer);

    /// `level` is a fraction, 1.0 = full brightness.
    fn set_brightness(&mut self, level: f32);
}

/// Speaker.
pub trait AudioSink {
    /// Play the connect chime. May take up to about a second.
    async fn play_connect_chime(&mut self);
}

/// One connected phone and its notification feed.
pub trait NotificationSession {
    /// False once the peer has gone away.
    fn connected(&self) -> bool;

    /// Current notification set. May wait up to one poll interval for
    /// fresh data from the phone.
    async fn active_notifications(&mut self) -> NotificationSet;
}

/// Wireless transport in peripheral role.
pub trait ConnectionProvider {
    type Session: NotificationSession;

    /// Make the device discoverable.
    fn start_advertising(&mut self);

    /// Wait for a peer that exposes a notification feed, pairing with it
    /// first if needed.
    async fn connect(&mut self) -> Self::Session;
}

pub struct Controller<D, A, I, C> {
    display: D,
    audio: A,
    input: I,
    clock: C,
    settings: Settings,
    selection: Selection,
    idle: IdleTimer,
    power: DisplayPower,
}

impl<D, A, I, C> Controller<D, A, I, C>
where
    D: DisplaySink,
    A: AudioSink,
    I: ButtonInput,
    C: Clock,
{
    /// Put up the connect screen at full brightness.
    pub fn new(mut display: D, audio: A, input: I, clock: C, settings: Settings) -> Self {
        display.show(Layer::Backdrop, Image::Connect);
        display.set_brightness(DisplayPower::Bright.level(settings.dim_level));

        let idle = IdleTimer::new(clock.now_ms(), settings.dim_timeout_ms);
        Self {
            display,
            audio,
            input,
            clock,
            settings,
            selection: Selection::new(),
            idle,
            power: DisplayPower::Bright,
        }
    }

    /// Run forever: advertise, serve one phone, repeat.
    pub async fn run<P: ConnectionProvider>(&mut self, provider: &mut P) -> ! {
        loop {
            let mut session = self.wait_for_connection(provider).await;
            self.begin_session().await;
            self.run_session(&mut session).await;
            self.end_session();
        }
    }

    /// ADVERTISING: keep the dim timer going until a phone connects.
    pub async fn wait_for_connection<P: ConnectionProvider>(
        &mut self,
        provider: &mut P,
    ) -> P::Session {
        info!("Advertising, waiting for a phone");
        provider.start_advertising();

        match select(provider.connect(), self.idle_until_connected()).await {
            Either::First(session) => session,
            Either::Second(never) => match never {},
        }
    }

    /// ADVERTISING → ACTIVE.
    pub async fn begin_session(&mut self) {
        info!("Phone connected");
        self.idle.record_activity(self.clock.now_ms());
        self.audio.play_connect_chime().await;

        self.selection = Selection::new();
        self.display.show(Layer::Foreground, Image::NoNotifications);
        self.selection.mark_cleared();
        self.update_power(Buttons::default());
    }

    /// ACTIVE: tick until the peer disconnects.
    pub async fn run_session<S: NotificationSession>(&mut self, session: &mut S) {
        while session.connected() {
            let set = session.active_notifications().await;
            if !session.connected() {
                break;
            }
            self.tick(&set);
        }
    }

    /// ACTIVE → ADVERTISING: forget the session, back to the connect screen.
    pub fn end_session(&mut self) {
        info!("Phone disconnected");
        self.selection = Selection::new();
        self.display.remove(Layer::Foreground);
        self.idle.record_activity(self.clock.now_ms());
        self.update_power(Buttons::default());
    }

    /// One ACTIVE tick against the latest notification set.
    pub fn tick(&mut self, set: &NotificationSet) -> Outcome {
        let now = self.clock.now_ms();
        let buttons = self.input.sample();

        let eligible = view::build(set, &self.settings.filter);
        let outcome = self
            .selection
            .tick(&eligible, set, buttons, now, &self.settings);

        match outcome {
            Outcome::Show(id) => {
                let Some(notification) = set.get(&id) else {
                    return outcome;
                };
                if let Some(icon) = self.settings.filter.icon_for(&notification.app_id) {
                    info!(
                        "Showing {} from {} ({})",
                        id,
                        notification.app_id.as_str(),
                        notification.category
                    );
                    self.display.show(Layer::Foreground, Image::App(icon));
                }
                self.idle.record_activity(now);
            }
            Outcome::ShowEmpty => {
                info!("No notifications to show");
                self.display.show(Layer::Foreground, Image::NoNotifications);
                self.idle.record_activity(now);
            }
            Outcome::NoChange => {}
        }

        self.update_power(buttons);
        outcome
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn power(&self) -> DisplayPower {
        self.power
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    async fn idle_until_connected(&mut self) -> Infallible {
        loop {
            let buttons = self.input.sample();
            self.update_power(buttons);
            self.clock.delay_ms(POLL_INTERVAL_MS).await;
        }
    }

    /// Buttons held count as activity; write the backlight only on change.
    fn update_power(&mut self, buttons: Buttons) {
        let now = self.clock.now_ms();
        if buttons.any() {
            self.idle.record_activity(now);
        }

        let power = self.idle.evaluate(now);
        if power != self.power {
            info!("Display {}", power);
            self.display.set_brightness(power.level(self.settings.dim_level));
            self.power = power;
        }
    }
}
