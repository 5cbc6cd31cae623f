//! Bluetooth LE transport built on btleplug.
//!
//! btleplug is async; this wraps it in a blocking interface backed by an owned
//! tokio runtime so the session loop can stay a plain synchronous loop.
//! Notifications are forwarded from a runtime task into a crossbeam channel.

use crate::transport::types::Notification;
use crate::transport::{Transport, TransportError};
use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use futures_util::StreamExt;
use std::time::Duration;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1_024;
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(500);

impl From<btleplug::Error> for TransportError {
    fn from(e: btleplug::Error) -> Self {
        match e {
            btleplug::Error::NotConnected => TransportError::NotConnected,
            btleplug::Error::TimedOut(_) => TransportError::Timeout,
            other => TransportError::Backend(other.to_string()),
        }
    }
}

/// Like the `From` conversion, but names the sensor that went missing.
fn connect_error(e: btleplug::Error, address: &str) -> TransportError {
    match e {
        btleplug::Error::DeviceNotFound => TransportError::DeviceNotFound(address.to_string()),
        other => other.into(),
    }
}

/// Queue a notification without blocking the runtime worker. A full queue
/// drops the frame; returns `false` once the session side has gone away.
fn forward(sender: &Sender<Notification>, value: Vec<u8>) -> bool {
    match sender.try_send(Notification::new(value)) {
        Ok(()) => true,
        Err(TrySendError::Full(dropped)) => {
            tracing::warn!(raw = %dropped.frame.to_hex(), "notification queue full, dropping frame");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

/// Blocking BLE central connected to one heart-rate sensor.
pub struct BleTransport {
    runtime: tokio::runtime::Runtime,
    peripheral: Option<Peripheral>,
}

impl BleTransport {
    pub fn new() -> Result<Self, TransportError> {
        // Multi-threaded so the notification task keeps running while the
        // session thread blocks on the channel.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| TransportError::Backend(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            runtime,
            peripheral: None,
        })
    }

    fn peripheral(&self) -> Result<&Peripheral, TransportError> {
        self.peripheral.as_ref().ok_or(TransportError::NotConnected)
    }
}

async fn first_adapter() -> Result<Adapter, TransportError> {
    let manager = Manager::new().await?;
    manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| TransportError::Backend("no Bluetooth adapter found".to_string()))
}

/// Scan until a peripheral with `address` shows up.
async fn find_peripheral(adapter: &Adapter, address: &str) -> Result<Peripheral, TransportError> {
    adapter.start_scan(ScanFilter::default()).await?;
    loop {
        for peripheral in adapter.peripherals().await? {
            if peripheral.address().to_string().eq_ignore_ascii_case(address) {
                return Ok(peripheral);
            }
        }
        tokio::time::sleep(SCAN_POLL_INTERVAL).await;
    }
}

impl Transport for BleTransport {
    fn connect(&mut self, address: &str, timeout: Duration) -> Result<(), TransportError> {
        let peripheral = self.runtime.block_on(async {
            let adapter = first_adapter().await?;
            tracing::info!(address, "scanning for sensor");

            let found = tokio::time::timeout(timeout, find_peripheral(&adapter, address)).await;
            if let Err(e) = adapter.stop_scan().await {
                tracing::debug!("failed to stop scan: {e}");
            }
            let peripheral = match found {
                Ok(result) => result?,
                Err(_) => return Err(TransportError::DeviceNotFound(address.to_string())),
            };

            match tokio::time::timeout(timeout, peripheral.connect()).await {
                Ok(result) => result.map_err(|e| connect_error(e, address))?,
                Err(_) => return Err(TransportError::Timeout),
            }
            peripheral
                .discover_services()
                .await
                .map_err(|e| connect_error(e, address))?;
            Ok::<_, TransportError>(peripheral)
        })?;

        tracing::info!(address, "connected to sensor");
        self.peripheral = Some(peripheral);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        match &self.peripheral {
            Some(peripheral) => self
                .runtime
                .block_on(peripheral.is_connected())
                .unwrap_or(false),
            None => false,
        }
    }

    fn subscribe(&mut self, characteristic: Uuid) -> Result<Receiver<Notification>, TransportError> {
        let peripheral = self.peripheral()?.clone();
        let target = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic)
            .ok_or(TransportError::CharacteristicNotFound(characteristic))?;

        let mut stream = self.runtime.block_on(async {
            peripheral.subscribe(&target).await?;
            peripheral.notifications().await
        })?;

        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        self.runtime.spawn(async move {
            while let Some(notification) = stream.next().await {
                if notification.uuid != characteristic {
                    continue;
                }
                if !forward(&sender, notification.value) {
                    break;
                }
            }
            tracing::debug!("notification stream ended");
        });

        Ok(receiver)
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        if let Some(peripheral) = self.peripheral.take() {
            self.runtime.block_on(peripheral.disconnect())?;
        }
        Ok(())
    }
}
