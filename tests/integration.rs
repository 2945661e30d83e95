//! Integration tests for the ancs-icons library.
//!
//! These drive the connection lifecycle controller end to end with
//! scripted fakes standing in for the radio, display, speaker and
//! buttons. Run with: `cargo test --test integration`

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use ancs_icons::config::{Icon, Settings};
use ancs_icons::controller::{
    AudioSink, ButtonInput, Clock, ConnectionProvider, Controller, DisplaySink, Image, Layer,
    NotificationSession,
};
use ancs_icons::notify::selection::{Buttons, Outcome};
use ancs_icons::notify::{Category, Notification, NotificationSet};
use ancs_icons::power_logic::DisplayPower;
use embassy_futures::{block_on, yield_now};

// ═══════════════════════════════════════════════════════════════════════════
// Fakes
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Show(Layer, Image),
    Remove(Layer),
    Brightness(f32),
    Chime,
}

/// State shared between the fakes and the test body.
#[derive(Clone, Default)]
struct Bench {
    now: Rc<Cell<u64>>,
    buttons: Rc<Cell<Buttons>>,
    log: Rc<RefCell<Vec<Event>>>,
    advertising: Rc<Cell<u32>>,
}

impl Bench {
    fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    fn brightness_writes(&self) -> Vec<f32> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Brightness(level) => Some(*level),
                _ => None,
            })
            .collect()
    }

    fn controller(&self) -> Controller<FakeDisplay, FakeAudio, FakeButtons, FakeClock> {
        Controller::new(
            FakeDisplay(self.clone()),
            FakeAudio(self.clone()),
            FakeButtons(self.clone()),
            FakeClock(self.clone()),
            Settings::default(),
        )
    }
}

struct FakeClock(Bench);

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.now.get()
    }

    async fn delay_ms(&self, ms: u64) {
        self.0.now.set(self.0.now.get() + ms);
        yield_now().await;
    }
}

struct FakeButtons(Bench);

impl ButtonInput for FakeButtons {
    fn sample(&mut self) -> Buttons {
        self.0.buttons.get()
    }
}

struct FakeDisplay(Bench);

impl DisplaySink for FakeDisplay {
    fn show(&mut self, layer: Layer, image: Image) {
        self.0.log.borrow_mut().push(Event::Show(layer, image));
    }

    fn remove(&mut self, layer: Layer) {
        self.0.log.borrow_mut().push(Event::Remove(layer));
    }

    fn set_brightness(&mut self, level: f32) {
        self.0.log.borrow_mut().push(Event::Brightness(level));
    }
}

struct FakeAudio(Bench);

impl AudioSink for FakeAudio {
    async fn play_connect_chime(&mut self) {
        self.0.log.borrow_mut().push(Event::Chime);
    }
}

/// One poll: let `advance_ms` pass, hold `buttons`, then report `set`.
struct Step {
    advance_ms: u64,
    buttons: Buttons,
    set: NotificationSet,
}

fn step(advance_ms: u64, buttons: Buttons, set: NotificationSet) -> Step {
    Step {
        advance_ms,
        buttons,
        set,
    }
}

/// Plays back its steps, then reports the peer as gone.
struct ScriptedSession {
    bench: Bench,
    steps: VecDeque<Step>,
    connected: bool,
}

impl NotificationSession for ScriptedSession {
    fn connected(&self) -> bool {
        self.connected
    }

    async fn active_notifications(&mut self) -> NotificationSet {
        match self.steps.pop_front() {
            Some(step) => {
                self.bench.now.set(self.bench.now.get() + step.advance_ms);
                self.bench.buttons.set(step.buttons);
                step.set
            }
            None => {
                self.connected = false;
                NotificationSet::new()
            }
        }
    }
}

/// Hands out one scripted session per connection, each once the clock
/// reaches its connect time.
struct FakeProvider {
    bench: Bench,
    sessions: VecDeque<(u64, Vec<Step>)>,
}

impl FakeProvider {
    fn new(bench: &Bench) -> Self {
        Self {
            bench: bench.clone(),
            sessions: VecDeque::new(),
        }
    }

    fn phone_at(mut self, connect_at: u64, steps: Vec<Step>) -> Self {
        self.sessions.push_back((connect_at, steps));
        self
    }
}

impl ConnectionProvider for FakeProvider {
    type Session = ScriptedSession;

    fn start_advertising(&mut self) {
        self.bench.advertising.set(self.bench.advertising.get() + 1);
    }

    async fn connect(&mut self) -> ScriptedSession {
        loop {
            let due = self
                .sessions
                .front()
                .is_some_and(|(at, _)| *at <= self.bench.now.get());
            if due {
                if let Some((_, steps)) = self.sessions.pop_front() {
                    return ScriptedSession {
                        bench: self.bench.clone(),
                        steps: steps.into(),
                        connected: true,
                    };
                }
            }
            yield_now().await;
        }
    }
}

const NONE: Buttons = Buttons {
    older: false,
    newer: false,
};
const OLDER: Buttons = Buttons {
    older: true,
    newer: false,
};

/// SMS (oldest), Slack, Calendar (newest).
fn three() -> NotificationSet {
    let mut set = NotificationSet::new();
    for (id, app, arrival) in [
        (1, "com.apple.MobileSMS", 100),
        (2, "com.tinyspeck.chatlyio", 200),
        (3, "com.apple.mobilecal", 300),
    ] {
        set.insert(id, Notification::new(id, app, Category::Social, arrival))
            .unwrap();
    }
    set
}

/// Run one full ADVERTISING → ACTIVE → ADVERTISING cycle.
fn serve_one(
    controller: &mut Controller<FakeDisplay, FakeAudio, FakeButtons, FakeClock>,
    provider: &mut FakeProvider,
) {
    block_on(async {
        let mut session = controller.wait_for_connection(provider).await;
        controller.begin_session().await;
        controller.run_session(&mut session).await;
        controller.end_session();
    });
}

// ═══════════════════════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn boot_shows_connect_screen_at_full_brightness() {
    let bench = Bench::default();
    let controller = bench.controller();

    assert_eq!(
        bench.events(),
        vec![
            Event::Show(Layer::Backdrop, Image::Connect),
            Event::Brightness(1.0),
        ]
    );
    assert_eq!(controller.power(), DisplayPower::Bright);
    assert_eq!(controller.selection().shown(), None);
}

#[test]
fn connect_plays_chime_then_placeholder_then_newest() {
    let bench = Bench::default();
    let mut controller = bench.controller();
    bench.clear();

    let mut provider = FakeProvider::new(&bench).phone_at(
        0,
        vec![
            step(50, NONE, NotificationSet::new()),
            step(50, NONE, three()),
            step(50, NONE, three()),
        ],
    );
    serve_one(&mut controller, &mut provider);

    assert_eq!(bench.advertising.get(), 1);
    assert_eq!(
        bench.events(),
        vec![
            Event::Chime,
            Event::Show(Layer::Foreground, Image::NoNotifications),
            Event::Show(Layer::Foreground, Image::App(Icon::Calendar)),
            Event::Remove(Layer::Foreground),
        ]
    );
    assert_eq!(controller.selection().shown(), None);
}

#[test]
fn disconnect_resets_selection_for_next_session() {
    let bench = Bench::default();
    let mut controller = bench.controller();

    let mut provider = FakeProvider::new(&bench)
        .phone_at(
            0,
            vec![
                step(50, NONE, three()),
                step(200, OLDER, three()),
                step(200, OLDER, three()),
            ],
        )
        .phone_at(0, vec![step(50, NONE, three())]);

    serve_one(&mut controller, &mut provider);
    let first = bench.events();
    assert!(first.contains(&Event::Show(Layer::Foreground, Image::App(Icon::Sms))));
    assert_eq!(first.last(), Some(&Event::Remove(Layer::Foreground)));

    bench.clear();
    serve_one(&mut controller, &mut provider);

    // Fresh session: placeholder first, then the newest, not the old cursor.
    assert_eq!(
        bench.events(),
        vec![
            Event::Chime,
            Event::Show(Layer::Foreground, Image::NoNotifications),
            Event::Show(Layer::Foreground, Image::App(Icon::Calendar)),
            Event::Remove(Layer::Foreground),
        ]
    );
    assert_eq!(bench.advertising.get(), 2);
}

#[test]
fn tick_reports_outcomes() {
    let bench = Bench::default();
    let mut controller = bench.controller();

    assert_eq!(controller.tick(&three()), Outcome::Show(3));
    assert_eq!(controller.tick(&three()), Outcome::NoChange);
    assert_eq!(controller.tick(&NotificationSet::new()), Outcome::ShowEmpty);
    assert_eq!(controller.tick(&NotificationSet::new()), Outcome::NoChange);
}

// ═══════════════════════════════════════════════════════════════════════════
// Idle / dim
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn dims_while_advertising_and_wakes_on_connect() {
    let bench = Bench::default();
    let mut controller = bench.controller();

    let mut provider = FakeProvider::new(&bench).phone_at(25_000, vec![]);
    serve_one(&mut controller, &mut provider);

    assert_eq!(bench.brightness_writes(), vec![1.0, 0.05, 1.0]);
    assert_eq!(controller.power(), DisplayPower::Bright);
}

#[test]
fn held_button_keeps_display_bright_while_advertising() {
    let bench = Bench::default();
    let mut controller = bench.controller();
    bench.buttons.set(OLDER);

    let mut provider = FakeProvider::new(&bench).phone_at(30_000, vec![]);
    serve_one(&mut controller, &mut provider);

    assert_eq!(bench.brightness_writes(), vec![1.0]);
}

#[test]
fn brightness_written_only_on_change() {
    let bench = Bench::default();
    let mut controller = bench.controller();

    let mut steps = vec![step(50, NONE, three())];
    for _ in 0..6 {
        steps.push(step(5_000, NONE, three()));
    }
    steps.push(step(200, OLDER, three()));
    steps.push(step(200, NONE, three()));

    let mut provider = FakeProvider::new(&bench).phone_at(0, steps);
    serve_one(&mut controller, &mut provider);

    // Bright at boot, dim once past the timeout, bright again on the press.
    assert_eq!(bench.brightness_writes(), vec![1.0, 0.05, 1.0]);
    assert!(bench
        .events()
        .contains(&Event::Show(Layer::Foreground, Image::App(Icon::Slack))));
}
