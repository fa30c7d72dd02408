use crate::{
    backend::BleBackend,
    device::{ConnectedDevice, DeviceId, UNNAMED_DEVICE},
    error::{BlescanError, BlescanResult},
    scanner::Scanner,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting {
        id: DeviceId,
    },
    Connected {
        device: ConnectedDevice,
    },
    Failed {
        id: DeviceId,
        reason: String,
    },
}

#[derive(Default)]
pub struct Connector {
    state: ConnectionState,
    timeout: Option<Duration>,
}

impl Connector {
    pub fn new(timeout: Option<Duration>) -> Self {
        Connector {
            state: ConnectionState::Idle,
            timeout,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Stops any running scan, then connects and enumerates services.
    /// Nothing is retried; the outcome is left in `state()`.
    pub async fn connect<B: BleBackend>(
        &mut self,
        backend: &B,
        scanner: &mut Scanner,
        id: DeviceId,
    ) -> &ConnectionState {
        scanner.stop_scan(backend).await;

        log::info!("Connecting to {id}");
        self.state = ConnectionState::Connecting { id: id.clone() };

        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, attempt(backend, &id))
                .await
                .map_err(BlescanError::from)
                .and_then(|result| result),
            None => attempt(backend, &id).await,
        };

        self.state = match result {
            Ok(device) => ConnectionState::Connected { device },
            Err(err) => {
                let reason = match err {
                    BlescanError::ConnectionError(reason) => reason,
                    other => other.to_string(),
                };
                log::error!("{}", BlescanError::ConnectionError(reason.clone()));
                ConnectionState::Failed { id, reason }
            }
        };

        &self.state
    }
}

async fn attempt<B: BleBackend>(backend: &B, id: &DeviceId) -> BlescanResult<ConnectedDevice> {
    let mut device = backend.connect_to_device(id).await?;
    log::info!(
        "Connected to device: {}",
        device.name.as_deref().unwrap_or(UNNAMED_DEVICE)
    );

    device.services = backend.discover_all_services_and_characteristics(id).await?;
    log::info!("Services: {}", serde_json::to_string(&device.services)?);

    Ok(device)
}
