//! In-memory BLE backend and permission providers for driving a `Screen`
//! without a radio.

use blescan::{
    backend::{BleBackend, DiscoveryStream},
    device::{Advertisement, CharacteristicInfo, ConnectedDevice, DeviceId, ServiceInfo},
    error::{BlescanError, BlescanResult},
    permission::{Permission, PermissionProvider, PermissionResults, PermissionStatus},
};
use futures::StreamExt;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

pub type Sighting = BlescanResult<Advertisement>;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    StartScan,
    StopScan,
    Connect(String),
    DiscoverServices(String),
    Destroy,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Default)]
pub struct MockBackend {
    calls: CallLog,
    scans: Mutex<VecDeque<(Vec<Sighting>, bool)>>,
    fail_start: bool,
    connect_error: Option<String>,
    services_error: Option<String>,
    hang_connect: bool,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next scan reports `sightings`, then the stream ends.
    pub fn with_scan(self, sightings: Vec<Sighting>) -> Self {
        self.scans.lock().unwrap().push_back((sightings, false));
        self
    }

    /// Next scan reports `sightings`, then stays open.
    pub fn with_open_scan(self, sightings: Vec<Sighting>) -> Self {
        self.scans.lock().unwrap().push_back((sightings, true));
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn failing_connect(mut self, reason: &str) -> Self {
        self.connect_error = Some(reason.to_string());
        self
    }

    pub fn failing_services(mut self, reason: &str) -> Self {
        self.services_error = Some(reason.to_string());
        self
    }

    pub fn hanging_connect(mut self) -> Self {
        self.hang_connect = true;
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BleBackend for MockBackend {
    async fn start_device_scan(&self) -> BlescanResult<DiscoveryStream> {
        self.record(Call::StartScan);

        if self.fail_start {
            return Err(BlescanError::ScanError("adapter busy".to_string()));
        }

        let stream = match self.scans.lock().unwrap().pop_front() {
            Some((sightings, true)) => futures::stream::iter(sightings)
                .chain(futures::stream::pending())
                .boxed(),
            Some((sightings, false)) => futures::stream::iter(sightings).boxed(),
            None => futures::stream::pending().boxed(),
        };

        Ok(stream)
    }

    async fn stop_device_scan(&self) -> BlescanResult<()> {
        self.record(Call::StopScan);
        Ok(())
    }

    async fn connect_to_device(&self, id: &DeviceId) -> BlescanResult<ConnectedDevice> {
        self.record(Call::Connect(id.to_string()));

        if self.hang_connect {
            std::future::pending::<()>().await;
        }

        if let Some(reason) = &self.connect_error {
            return Err(BlescanError::ConnectionError(reason.clone()));
        }

        Ok(ConnectedDevice {
            id: id.clone(),
            name: Some("Mock".to_string()),
            services: Vec::new(),
        })
    }

    async fn discover_all_services_and_characteristics(
        &self,
        id: &DeviceId,
    ) -> BlescanResult<Vec<ServiceInfo>> {
        self.record(Call::DiscoverServices(id.to_string()));

        if let Some(reason) = &self.services_error {
            return Err(BlescanError::ConnectionError(reason.clone()));
        }

        Ok(vec![ServiceInfo {
            uuid: "0000180f-0000-1000-8000-00805f9b34fb".to_string(),
            primary: true,
            characteristics: vec![CharacteristicInfo {
                uuid: "00002a19-0000-1000-8000-00805f9b34fb".to_string(),
                flags: vec!["read".to_string(), "notify".to_string()],
            }],
        }])
    }

    async fn destroy(self) -> BlescanResult<()> {
        self.record(Call::Destroy);
        Ok(())
    }
}

pub struct GrantAll;

impl PermissionProvider for GrantAll {
    async fn request(&self, permissions: &[Permission]) -> PermissionResults {
        permissions
            .iter()
            .map(|p| (*p, PermissionStatus::Granted))
            .collect()
    }
}

pub struct Deny(pub Permission);

impl PermissionProvider for Deny {
    async fn request(&self, permissions: &[Permission]) -> PermissionResults {
        permissions
            .iter()
            .map(|p| {
                let status = if *p == self.0 {
                    PermissionStatus::Denied
                } else {
                    PermissionStatus::Granted
                };
                (*p, status)
            })
            .collect()
    }
}

#[allow(dead_code)]
pub fn seen(id: &str) -> Sighting {
    Ok(Advertisement::new(id))
}

#[allow(dead_code)]
pub fn seen_named(id: &str, name: &str) -> Sighting {
    Ok(Advertisement::new(id).with_name(name))
}

#[allow(dead_code)]
pub fn ids(devices: &[blescan::device::ScannedDevice]) -> Vec<&str> {
    devices.iter().map(|d| d.id.as_str()).collect()
}
