use crate::{
    backend::{BleBackend, DiscoveryStream},
    device::{Advertisement, ScannedDevice},
    error::BlescanError,
    registry::DeviceRegistry,
};

use futures::StreamExt;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
}

#[derive(Debug)]
pub enum ScanEvent {
    Discovered(Advertisement),
    Failed(BlescanError),
    Ended,
}

#[derive(Default)]
pub struct Scanner {
    state: ScanState,
    registry: DeviceRegistry,
    stream: Option<DiscoveryStream>,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Always restarts from an empty list, whatever the current state.
    pub async fn start_scan<B: BleBackend>(&mut self, backend: &B) {
        self.stream = None;
        self.registry.clear();
        self.state = ScanState::Scanning;

        match backend.start_device_scan().await {
            Ok(stream) => {
                log::info!("Scan started");
                self.stream = Some(stream);
            }
            Err(err) => {
                self.apply(ScanEvent::Failed(err));
            }
        }
    }

    /// Leaves the collected devices untouched.
    pub async fn stop_scan<B: BleBackend>(&mut self, backend: &B) {
        if self.stream.take().is_none() && self.state == ScanState::Idle {
            return;
        }

        self.state = ScanState::Idle;
        if let Err(err) = backend.stop_device_scan().await {
            log::warn!("Failed to stop device scan: {err}");
        }
        log::info!("Scan stopped. {} device(s) found", self.registry.len());
    }

    /// Waits for the next sighting. Never resolves while idle.
    pub async fn next_event(&mut self) -> ScanEvent {
        let Some(stream) = self.stream.as_mut() else {
            return std::future::pending().await;
        };

        match stream.next().await {
            Some(Ok(advertisement)) => ScanEvent::Discovered(advertisement),
            Some(Err(err)) => ScanEvent::Failed(err),
            None => ScanEvent::Ended,
        }
    }

    /// Returns the device when the event added a new entry.
    pub fn apply(&mut self, event: ScanEvent) -> Option<&ScannedDevice> {
        match event {
            ScanEvent::Discovered(advertisement) => {
                if self.state != ScanState::Scanning {
                    return None;
                }

                let device = ScannedDevice::from_advertisement(&advertisement)?;
                if !self.registry.insert(device) {
                    return None;
                }

                let added = self.registry.devices().last();
                if let Some(device) = added {
                    log::debug!("Discovered {} ({})", device.display_name(), device.id);
                }
                added
            }
            ScanEvent::Failed(err) => {
                let err = match err {
                    BlescanError::ScanError(_) => err,
                    other => BlescanError::ScanError(other.to_string()),
                };
                log::error!("{err}");
                self.stream = None;
                self.state = ScanState::Idle;
                None
            }
            ScanEvent::Ended => {
                log::info!("Discovery stream closed");
                self.stream = None;
                self.state = ScanState::Idle;
                None
            }
        }
    }
}
