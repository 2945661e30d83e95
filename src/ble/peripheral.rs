//! Peripheral-role connection handling.
//!
//! Advertises with an ANCS solicitation, takes the phone's connection,
//! pairs and bonds, then hands the controller an [`AncsSession`] once the
//! notification service is subscribed. Any failure along the way drops
//! the link and goes back to advertising.

use core::cell::RefCell;

use crate::ble::advertisement::{advertising_data, scan_response_data, AdPayload};
use crate::ble::ancs_client::{self, AncsClient};
use crate::ble::feed::AncsFeed;
use crate::error::{BleError, Error};
use ancs_icons::config::{
    ATTRIBUTE_RETRY_MS, BLE_ADV_INTERVAL, BLE_DEVICE_NAME, BLE_RETRY_DELAY_MS,
    BLE_SECURITY_POLLS, MAX_BONDED_PEERS, POLL_INTERVAL_MS,
};
use ancs_icons::controller::{ConnectionProvider, NotificationSession};
use ancs_icons::notify::NotificationSet;
use defmt::{info, warn};
use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{
    peripheral, Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode,
};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
}

/// In-RAM bond store. Bonds are lost on reset; the phone then pairs again.
pub struct Bonder {
    peers: RefCell<Vec<PeerBond, MAX_BONDED_PEERS>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            peers: RefCell::new(Vec::new()),
        }
    }

    fn is_bonded(&self, conn: &Connection) -> bool {
        self.peers
            .borrow()
            .iter()
            .any(|p| p.peer_id.is_match(conn.peer_address()))
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let mut peers = self.peers.borrow_mut();
        if let Some(existing) = peers.iter_mut().find(|p| p.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            return;
        }

        if peers.is_full() {
            peers.remove(0);
        }

        let _ = peers.push(PeerBond {
            master_id,
            key,
            peer_id,
        });
        info!("BLE: bonded, {} peer(s) stored", peers.len());
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peers
            .borrow()
            .iter()
            .find_map(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

/// Must be called exactly once.
pub fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new())
}

async fn wait_for_secure_link(conn: &Connection) -> bool {
    for _ in 0..BLE_SECURITY_POLLS {
        match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                Timer::after(Duration::from_millis(200)).await
            }
            _ => return true,
        }
    }
    false
}

/// Hands out one [`AncsSession`] per connected phone.
pub struct AncsPeripheral {
    sd: &'static Softdevice,
    bonder: &'static Bonder,
    adv_data: AdPayload,
    scan_data: AdPayload,
}

impl AncsPeripheral {
    pub fn new(sd: &'static Softdevice, bonder: &'static Bonder) -> Self {
        Self {
            sd,
            bonder,
            adv_data: advertising_data(),
            scan_data: scan_response_data(BLE_DEVICE_NAME),
        }
    }

    async fn try_connect(&mut self) -> Result<AncsSession, Error> {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &self.adv_data,
            scan_data: &self.scan_data,
        };
        let config = peripheral::Config {
            interval: BLE_ADV_INTERVAL,
            ..Default::default()
        };

        let conn = peripheral::advertise_pairable(self.sd, adv, &config, self.bonder)
            .await
            .map_err(|_| BleError::AdvertiseFailed)?;

        if self.bonder.is_bonded(&conn) {
            info!("BLE: bonded phone connected");
        } else {
            info!("BLE: new phone connected, requesting pairing");
        }

        let secure_ok = match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                conn.request_pairing().is_ok() && wait_for_secure_link(&conn).await
            }
            _ => true,
        };
        if !secure_ok {
            let _ = conn.disconnect();
            return Err(BleError::SecurityFailed.into());
        }

        let client = match ancs_client::discover_and_subscribe(&conn).await {
            Ok(client) => client,
            Err(e) => {
                let _ = conn.disconnect();
                return Err(e);
            }
        };

        Ok(AncsSession {
            conn,
            client,
            feed: AncsFeed::new(ATTRIBUTE_RETRY_MS),
        })
    }
}

impl ConnectionProvider for AncsPeripheral {
    type Session = AncsSession;

    fn start_advertising(&mut self) {
        // The SoftDevice only advertises while `connect` awaits it.
        self.adv_data = advertising_data();
        self.scan_data = scan_response_data(BLE_DEVICE_NAME);
        info!("BLE: advertising as {}", BLE_DEVICE_NAME);
    }

    async fn connect(&mut self) -> AncsSession {
        loop {
            match self.try_connect().await {
                Ok(session) => return session,
                Err(e) => {
                    warn!("BLE: connection attempt failed: {}", e);
                    Timer::after_millis(BLE_RETRY_DELAY_MS).await;
                }
            }
        }
    }
}

/// One connected iPhone.
pub struct AncsSession {
    conn: Connection,
    client: AncsClient,
    feed: AncsFeed,
}

impl NotificationSession for AncsSession {
    fn connected(&self) -> bool {
        self.conn.handle().is_some()
    }

    async fn active_notifications(&mut self) -> NotificationSet {
        let request = self.feed.next_request(Instant::now().as_millis());

        let pumped = ancs_client::pump(
            &self.conn,
            &self.client,
            &mut self.feed,
            request,
            Duration::from_millis(POLL_INTERVAL_MS),
        )
        .await;

        if let (Err(e), Some(uid)) = (pumped, request) {
            warn!("ANCS: attribute request for {} failed: {}", uid, e);
            self.feed.request_failed(uid);
        }

        self.feed.snapshot()
    }
}
