//! Live notification feed for one ANCS session.
//!
//! Turns Notification Source / Data Source traffic into a
//! [`NotificationSet`] the controller can snapshot once per tick, and
//! keeps track of which notifications still need their attributes.
//!
//! Attribute requests go out one at a time, lowest UID first. A request
//! the phone never answers is re-sent after the retry window, up to
//! [`MAX_ATTRIBUTE_ATTEMPTS`] times; after that the notification is
//! skipped so it cannot hold up the others.

use crate::ble::ancs::{DataSourceAssembler, EventId, NotificationSourceEvent};
use crate::config::{MAX_ATTRIBUTE_ATTEMPTS, MAX_NOTIFICATIONS};
use crate::notify::{Notification, NotificationId, NotificationSet};
use core::future::Future;
use embassy_futures::select::{select, Either};
use heapless::Vec;

/// The one outstanding attribute request.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    uid: NotificationId,
    /// When the request may be sent again.
    due: u64,
    attempts: u8,
}

pub struct AncsFeed {
    set: NotificationSet,
    in_flight: Option<InFlight>,
    /// Notifications whose attributes never arrived.
    abandoned: Vec<NotificationId, MAX_NOTIFICATIONS>,
    assembler: DataSourceAssembler,
    retry_ms: u64,
}

impl AncsFeed {
    pub fn new(retry_ms: u64) -> Self {
        Self {
            set: NotificationSet::new(),
            in_flight: None,
            abandoned: Vec::new(),
            assembler: DataSourceAssembler::new(),
            retry_ms,
        }
    }

    /// Number of live entries, removed ones included until the next snapshot.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Apply one Notification Source packet.
    ///
    /// Returns the decoded event, or `None` if the packet was malformed.
    pub fn on_notification_source(&mut self, data: &[u8]) -> Option<NotificationSourceEvent> {
        let Some(event) = NotificationSourceEvent::parse(data) else {
            warn!("ANCS: malformed notification source packet ({} bytes)", data.len());
            return None;
        };

        match event.event {
            EventId::Added | EventId::Modified => self.track(&event),
            EventId::Removed => self.mark_removed(event.uid),
        }
        Some(event)
    }

    /// Apply one Data Source fragment.
    ///
    /// Returns the identifier whose attributes were completed, if any.
    pub fn on_data_source(&mut self, data: &[u8]) -> Option<NotificationId> {
        let attrs = self.assembler.push(data)?;

        if self.in_flight_uid() == Some(attrs.uid) {
            self.in_flight = None;
        }

        // Fallback for a missing date: sort with the newest entry seen so far.
        let newest = self.newest_arrival();
        let notification = self.set.get_mut(&attrs.uid)?;
        notification.app_id = attrs.app_id;
        notification.set_arrival(attrs.date.unwrap_or(newest));
        debug!(
            "ANCS: attributes for {}: {}",
            attrs.uid,
            notification.app_id.as_str()
        );
        Some(attrs.uid)
    }

    /// Next notification to request attributes for, if one is due.
    ///
    /// At most one request is in flight; it is handed out again once it
    /// has gone unanswered for the retry window, and given up on after
    /// [`MAX_ATTRIBUTE_ATTEMPTS`] sends.
    pub fn next_request(&mut self, now: u64) -> Option<NotificationId> {
        if let Some(request) = self.in_flight {
            if !self.needs_attributes(request.uid) {
                self.in_flight = None;
            } else if now < request.due {
                return None;
            } else if request.attempts >= MAX_ATTRIBUTE_ATTEMPTS {
                warn!(
                    "ANCS: no attributes for {} after {} attempts, skipping it",
                    request.uid, request.attempts
                );
                self.abandon(request.uid);
            } else {
                warn!("ANCS: no attributes for {} yet, asking again", request.uid);
                self.assembler.reset();
                self.in_flight = Some(InFlight {
                    uid: request.uid,
                    due: now.saturating_add(self.retry_ms),
                    attempts: request.attempts + 1,
                });
                return Some(request.uid);
            }
        }

        let uid = self
            .set
            .keys()
            .copied()
            .filter(|uid| self.needs_attributes(*uid))
            .min()?;
        self.in_flight = Some(InFlight {
            uid,
            due: now.saturating_add(self.retry_ms),
            attempts: 1,
        });
        Some(uid)
    }

    /// The request for `uid` could not be sent; make it due again now.
    ///
    /// The failed send still counts as an attempt.
    pub fn request_failed(&mut self, uid: NotificationId) {
        if let Some(request) = self.in_flight.as_mut() {
            if request.uid == uid {
                request.due = 0;
            }
        }
    }

    /// Current set, as the controller sees it this tick.
    ///
    /// Removed entries are part of exactly one snapshot and purged after.
    pub fn snapshot(&mut self) -> NotificationSet {
        let snapshot = self.set.clone();

        let mut removed: Vec<NotificationId, MAX_NOTIFICATIONS> = Vec::new();
        for (id, notification) in self.set.iter() {
            if notification.removed {
                let _ = removed.push(*id);
            }
        }
        for id in &removed {
            self.forget(*id);
        }

        snapshot
    }

    fn track(&mut self, event: &NotificationSourceEvent) {
        if let Some(existing) = self.set.get_mut(&event.uid) {
            existing.category = event.category;
            if existing.removed && event.event == EventId::Added {
                // Re-added before the removal was purged: start over.
                existing.removed = false;
                existing.app_id.clear();
                existing.set_arrival(0);
                self.abandoned.retain(|id| *id != event.uid);
            }
            return;
        }

        if self.set.len() == MAX_NOTIFICATIONS {
            self.evict_oldest();
        }

        self.abandoned.retain(|id| *id != event.uid);
        let notification = Notification::new(event.uid, "", event.category, 0);
        let _ = self.set.insert(event.uid, notification);
    }

    fn mark_removed(&mut self, uid: NotificationId) {
        if let Some(notification) = self.set.get_mut(&uid) {
            notification.removed = true;
        }
        if self.in_flight_uid() == Some(uid) {
            self.in_flight = None;
        }
    }

    fn needs_attributes(&self, uid: NotificationId) -> bool {
        !self.abandoned.contains(&uid)
            && self
                .set
                .get(&uid)
                .is_some_and(|n| !n.removed && n.app_id.is_empty())
    }

    fn in_flight_uid(&self) -> Option<NotificationId> {
        self.in_flight.map(|request| request.uid)
    }

    fn abandon(&mut self, uid: NotificationId) {
        self.in_flight = None;
        self.assembler.reset();
        // Same capacity as the set, and only tracked uids get here.
        let _ = self.abandoned.push(uid);
    }

    /// Drop every trace of `uid`.
    fn forget(&mut self, uid: NotificationId) {
        self.set.remove(&uid);
        self.abandoned.retain(|id| *id != uid);
        if self.in_flight_uid() == Some(uid) {
            self.in_flight = None;
        }
    }

    fn newest_arrival(&self) -> u64 {
        self.set
            .values()
            .map(Notification::arrival_timestamp)
            .max()
            .unwrap_or(0)
    }

    /// Make room: drop a removed entry if there is one, else the lowest
    /// UID (the phone hands them out in increasing order).
    fn evict_oldest(&mut self) {
        let victim = self
            .set
            .values()
            .min_by_key(|n| (!n.removed, n.id))
            .map(|n| n.id);

        if let Some(uid) = victim {
            self.forget(uid);
        }
    }
}

/// Run `listen` for one `window`, performing `write` inside it.
///
/// `listen` is polled first, so anything the peer sends while the write
/// is outstanding is already being received. Returns the result of the
/// write, or `Ok` if `listen` finished early (the link went away).
pub async fn write_while_listening<L, W, D, E>(listen: L, write: W, window: D) -> Result<(), E>
where
    L: Future,
    W: Future<Output = Result<(), E>>,
    D: Future<Output = ()>,
{
    let writer = async {
        let sent = write.await;
        window.await;
        sent
    };

    match select(listen, writer).await {
        Either::First(_) => Ok(()),
        Either::Second(sent) => sent,
    }
}
