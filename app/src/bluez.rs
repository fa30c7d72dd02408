use crate::{
    backend::{BleBackend, DiscoveryStream},
    device::{Advertisement, CharacteristicInfo, ConnectedDevice, DeviceId, ServiceInfo},
    error::{BlescanError, BlescanResult},
    permission::{Permission, PermissionProvider, PermissionResults, PermissionStatus},
};

use bluer::{
    gatt::CharacteristicFlags, Adapter, AdapterEvent, Address, Device, DiscoveryFilter,
    DiscoveryTransport, Session,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::sleep;

const SERVICES_POLLING_INTERVAL: u64 = 100;
const MAX_SERVICES_ATTEMPT: usize = 50;

/// BlueZ over D-Bus. The session lives exactly as long as this value.
pub struct BluezBackend {
    session: Session,
    adapter: Adapter,
}

impl BluezBackend {
    pub async fn open(adapter_name: Option<&str>) -> BlescanResult<Self> {
        let session = match Session::new().await {
            Ok(session) => session,
            Err(err) => {
                log::error!("Failed to connect to bluetooth session.");
                return Err(BlescanError::BluetoothError(err));
            }
        };

        let adapter = match adapter_name {
            Some(name) => session.adapter(name),
            None => session.default_adapter().await,
        };

        let adapter = match adapter {
            Ok(adapter) => adapter,
            Err(err) => {
                log::error!("Failed to get bluetooth adapter");
                return Err(BlescanError::BluetoothError(err));
            }
        };

        log::info!("Using bluetooth adapter {}", adapter.name());
        Ok(BluezBackend { session, adapter })
    }

    pub fn permissions(&self) -> BluezPermissions {
        BluezPermissions {
            adapter: self.adapter.clone(),
        }
    }

    fn device(&self, id: &DeviceId) -> BlescanResult<Device> {
        let address: Address = id.as_str().parse()?;
        Ok(self.adapter.device(address)?)
    }
}

impl BleBackend for BluezBackend {
    async fn start_device_scan(&self) -> BlescanResult<DiscoveryStream> {
        self.adapter
            .set_discovery_filter(DiscoveryFilter {
                transport: DiscoveryTransport::Le,
                duplicate_data: true,
                ..Default::default()
            })
            .await?;

        let events = self.adapter.discover_devices_with_changes().await?;
        let adapter = self.adapter.clone();

        let stream = events.filter_map(move |event| {
            let adapter = adapter.clone();
            async move {
                match event {
                    AdapterEvent::DeviceAdded(address) => {
                        in_range(read_advertisement(&adapter, address).await)
                    }
                    _ => None,
                }
            }
        });

        Ok(Box::pin(stream))
    }

    async fn stop_device_scan(&self) -> BlescanResult<()> {
        log::debug!("Discovery on {} released", self.adapter.name());
        Ok(())
    }

    async fn connect_to_device(&self, id: &DeviceId) -> BlescanResult<ConnectedDevice> {
        let device = self.device(id)?;

        if !device.is_connected().await.unwrap_or(false) {
            device
                .connect()
                .await
                .map_err(|err| BlescanError::ConnectionError(err.to_string()))?;
        }

        Ok(ConnectedDevice {
            id: id.clone(),
            name: device.name().await.unwrap_or(None),
            services: Vec::new(),
        })
    }

    async fn discover_all_services_and_characteristics(
        &self,
        id: &DeviceId,
    ) -> BlescanResult<Vec<ServiceInfo>> {
        let device = self.device(id)?;
        wait_services_resolved(&device).await?;

        let mut services = Vec::new();
        for service in device.services().await? {
            let mut characteristics = Vec::new();
            for characteristic in service.characteristics().await? {
                characteristics.push(CharacteristicInfo {
                    uuid: characteristic.uuid().await?.to_string(),
                    flags: flag_names(&characteristic.flags().await?),
                });
            }

            services.push(ServiceInfo {
                uuid: service.uuid().await?.to_string(),
                primary: service.primary().await.unwrap_or(false),
                characteristics,
            });
        }

        Ok(services)
    }

    async fn destroy(self) -> BlescanResult<()> {
        let BluezBackend { session, adapter } = self;
        drop(adapter);
        drop(session);
        log::info!("Bluetooth session released");
        Ok(())
    }
}

/// Properties that fail to read are treated as absent; a vanished device
/// should not end the scan.
async fn read_advertisement(adapter: &Adapter, address: Address) -> BlescanResult<Advertisement> {
    let device = adapter.device(address)?;

    let default_alias = address.to_string().replace(':', "-");
    let local_name = device
        .alias()
        .await
        .ok()
        .filter(|alias| *alias != default_alias);

    Ok(Advertisement {
        id: Some(DeviceId::from(address)),
        name: device.name().await.unwrap_or(None),
        local_name,
        manufacturer_data: device
            .manufacturer_data()
            .await
            .unwrap_or(None)
            .unwrap_or_default()
            .into_iter()
            .collect(),
        rssi: device.rssi().await.unwrap_or(None),
    })
}

/// BlueZ also reports devices it merely remembers. Those have no RSSI until
/// they are heard again, at which point `DeviceAdded` is emitted once more.
fn in_range(sighting: BlescanResult<Advertisement>) -> Option<BlescanResult<Advertisement>> {
    match sighting {
        Ok(advertisement) if advertisement.rssi.is_none() => {
            if let Some(id) = &advertisement.id {
                log::trace!("Skipping {id}: not in range");
            }
            None
        }
        sighting => Some(sighting),
    }
}

async fn wait_services_resolved(device: &Device) -> BlescanResult<()> {
    for attempt in 0..MAX_SERVICES_ATTEMPT {
        if device.is_services_resolved().await? {
            return Ok(());
        }

        log::debug!(
            "Waiting for services on {}: {}/{}",
            device.address(),
            attempt + 1,
            MAX_SERVICES_ATTEMPT
        );
        sleep(Duration::from_millis(SERVICES_POLLING_INTERVAL)).await;
    }

    Err(BlescanError::ConnectionError(format!(
        "Services of {} were not resolved",
        device.address()
    )))
}

fn flag_names(flags: &CharacteristicFlags) -> Vec<String> {
    [
        (flags.broadcast, "broadcast"),
        (flags.read, "read"),
        (flags.write_without_response, "write-without-response"),
        (flags.write, "write"),
        (flags.notify, "notify"),
        (flags.indicate, "indicate"),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| name.to_string())
    .collect()
}

pub struct BluezPermissions {
    adapter: Adapter,
}

impl BluezPermissions {
    async fn radio_available(&self) -> bool {
        if self.adapter.is_powered().await.unwrap_or(false) {
            return true;
        }

        log::info!("Powering on {}", self.adapter.name());
        match self.adapter.set_powered(true).await {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Cannot power on {}: {err}", self.adapter.name());
                false
            }
        }
    }
}

impl PermissionProvider for BluezPermissions {
    async fn request(&self, permissions: &[Permission]) -> PermissionResults {
        let radio = if self.radio_available().await {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };

        permissions
            .iter()
            .map(|permission| match permission {
                Permission::BluetoothScan | Permission::BluetoothConnect => (*permission, radio),
                Permission::FineLocation | Permission::ForegroundLocation => {
                    (*permission, PermissionStatus::Granted)
                }
            })
            .collect()
    }
}
