//! BLE GATT ANCS Client - discovers the phone's Apple Notification
//! Center Service and moves bytes between it and the [`AncsFeed`].
//!
//! After the link is encrypted, this module:
//! 1. Discovers the ANCS service (iOS hides it until then).
//! 2. Enables notifications on Data Source, then Notification Source,
//!    so no attribute response can arrive before we listen for it.
//! 3. Pumps GATT notifications into the feed for one poll window at a
//!    time. Attribute requests are written to the Control Point inside
//!    that window, while the notification listener is running.

use crate::ble::ancs::{encode_get_notification_attributes, ATTRIBUTE_REQUEST_LEN, MAX_RESPONSE_LEN};
use crate::ble::feed::{write_while_listening, AncsFeed};
use crate::error::{BleError, Error};
use ancs_icons::notify::NotificationId;
use defmt::info;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::{gatt_client, Connection};

/// nrf-softdevice GATT client struct for ANCS.
///
/// The `#[nrf_softdevice::gatt_client]` macro generates discovery and
/// write/notify helpers for the listed characteristics.
#[nrf_softdevice::gatt_client(uuid = "7905f431-b5ce-4e99-a40f-4b1e122d00d0")]
pub struct AncsClient {
    /// Notification Source - 8-byte added/modified/removed events.
    #[characteristic(uuid = "9fbf120d-6301-42d9-8c58-25e699a21dbd", notify)]
    pub notification_source: heapless::Vec<u8, 20>,

    /// Control Point - Get Notification Attributes requests.
    #[characteristic(uuid = "69d1d8f3-45e1-49a8-9821-9bbdfdaad9d9", write)]
    pub control_point: [u8; ATTRIBUTE_REQUEST_LEN],

    /// Data Source - attribute responses, possibly fragmented.
    #[characteristic(uuid = "22eac6e9-24d6-4bb5-be44-b36ace7c7bfb", notify)]
    pub data_source: heapless::Vec<u8, MAX_RESPONSE_LEN>,
}

/// Discover ANCS on the connected phone and subscribe to its two
/// notifying characteristics.
pub async fn discover_and_subscribe(conn: &Connection) -> Result<AncsClient, Error> {
    info!("Discovering ANCS...");

    let client: AncsClient = gatt_client::discover(conn)
        .await
        .map_err(|_| Error::AncsNotFound)?;

    info!("ANCS discovered");

    client
        .data_source_cccd_write(true)
        .await
        .map_err(|_| BleError::NotifyFailed)?;
    client
        .notification_source_cccd_write(true)
        .await
        .map_err(|_| BleError::NotifyFailed)?;

    info!("Subscribed to ANCS notifications");
    Ok(client)
}

/// Ask the phone for the app identifier and date of one notification.
pub async fn request_attributes(client: &AncsClient, uid: NotificationId) -> Result<(), Error> {
    let command = encode_get_notification_attributes(uid);
    client
        .control_point_write(&command)
        .await
        .map_err(|_| BleError::WriteFailed)?;
    Ok(())
}

/// Feed GATT notifications into `feed` for at most `window`, writing
/// the attribute request for `request` (if any) in the same window.
///
/// Returns early if the connection drops. An error means the request
/// could not be written.
pub async fn pump(
    conn: &Connection,
    client: &AncsClient,
    feed: &mut AncsFeed,
    request: Option<NotificationId>,
    window: Duration,
) -> Result<(), Error> {
    let run = gatt_client::run(conn, client, |event| match event {
        AncsClientEvent::NotificationSourceNotification(data) => {
            if let Some(event) = feed.on_notification_source(&data) {
                info!("ANCS: {} uid={} ({})", event.event, event.uid, event.category);
            }
        }
        AncsClientEvent::DataSourceNotification(data) => {
            let _ = feed.on_data_source(&data);
        }
    });

    let write = async {
        match request {
            Some(uid) => request_attributes(client, uid).await,
            None => Ok(()),
        }
    };

    write_while_listening(run, write, Timer::after(window)).await
}
