use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result},
};

pub const UNNAMED_DEVICE: &str = "Unnamed Device";

/// Identifier assigned by the BLE stack. Opaque to everything above the backend.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        DeviceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        DeviceId::new(value)
    }
}

impl From<bluer::Address> for DeviceId {
    fn from(value: bluer::Address) -> Self {
        DeviceId(value.to_string())
    }
}

/// One sighting of a peripheral, as reported by a discovery stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Advertisement {
    pub id: Option<DeviceId>,
    pub name: Option<String>,
    pub local_name: Option<String>,
    pub manufacturer_data: BTreeMap<u16, Vec<u8>>,
    pub rssi: Option<i16>,
}

impl Advertisement {
    pub fn new(id: impl Into<DeviceId>) -> Self {
        Advertisement {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_local_name(mut self, local_name: &str) -> Self {
        self.local_name = Some(local_name.to_string());
        self
    }

    pub fn with_manufacturer_data(mut self, company_id: u16, payload: &[u8]) -> Self {
        self.manufacturer_data.insert(company_id, payload.to_vec());
        self
    }

    /// Advertised name, then the locally cached name, then a label built from
    /// manufacturer data, then the generic placeholder.
    pub fn display_name(&self) -> String {
        non_empty(&self.name)
            .or_else(|| non_empty(&self.local_name))
            .map(str::to_string)
            .or_else(|| manufacturer_label(&self.manufacturer_data))
            .unwrap_or_else(|| UNNAMED_DEVICE.to_string())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn manufacturer_label(data: &BTreeMap<u16, Vec<u8>>) -> Option<String> {
    if data.is_empty() {
        return None;
    }

    let entries: Vec<String> = data
        .iter()
        .map(|(company_id, payload)| format!("{company_id:04x}:{}", to_hex(payload)))
        .collect();

    Some(format!("Device ({})", entries.join(", ")))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ScannedDevice {
    pub id: DeviceId,
    pub name: Option<String>,
}

impl ScannedDevice {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_DEVICE)
    }

    /// `None` for sightings the stack reported without an identifier.
    pub fn from_advertisement(advertisement: &Advertisement) -> Option<Self> {
        advertisement.id.as_ref().map(|id| ScannedDevice {
            id: id.clone(),
            name: Some(advertisement.display_name()),
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CharacteristicInfo {
    pub uuid: String,
    pub flags: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceInfo {
    pub uuid: String,
    pub primary: bool,
    pub characteristics: Vec<CharacteristicInfo>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectedDevice {
    pub id: DeviceId,
    pub name: Option<String>,
    pub services: Vec<ServiceInfo>,
}
