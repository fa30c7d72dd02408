use crate::error::BlescanError;

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result},
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Linux,
    Android,
    Ios,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    BluetoothScan,
    BluetoothConnect,
    FineLocation,
    ForegroundLocation,
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Permission::BluetoothScan => write!(f, "BLUETOOTH_SCAN"),
            Permission::BluetoothConnect => write!(f, "BLUETOOTH_CONNECT"),
            Permission::FineLocation => write!(f, "ACCESS_FINE_LOCATION"),
            Permission::ForegroundLocation => write!(f, "LOCATION_FOREGROUND"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

pub type PermissionResults = BTreeMap<Permission, PermissionStatus>;

#[allow(async_fn_in_trait)]
pub trait PermissionProvider {
    /// Statuses for the asked permissions. A permission missing from the
    /// result counts as denied.
    async fn request(&self, permissions: &[Permission]) -> PermissionResults;
}

/// User-facing alert raised when a required permission was refused.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub denied: Vec<Permission>,
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

pub fn required_permissions(platform: Platform) -> &'static [Permission] {
    match platform {
        Platform::Android => &[
            Permission::BluetoothScan,
            Permission::BluetoothConnect,
            Permission::FineLocation,
        ],
        Platform::Ios => &[Permission::ForegroundLocation],
        Platform::Linux => &[Permission::BluetoothScan, Permission::BluetoothConnect],
    }
}

fn notice_for(platform: Platform, denied: Vec<Permission>) -> Notice {
    let (title, message) = match platform {
        Platform::Ios => (
            "Permission required",
            "Location permission is required to scan for devices.",
        ),
        Platform::Android | Platform::Linux => (
            "Permissions required",
            "Bluetooth and location permissions are required to scan for devices.",
        ),
    };

    Notice {
        title: title.to_string(),
        message: message.to_string(),
        denied,
    }
}

/// Asks for everything `platform` needs before discovery. Never blocks
/// scanning; a refusal only produces the notice.
pub async fn request_permissions<P: PermissionProvider>(
    provider: &P,
    platform: Platform,
) -> Option<Notice> {
    let required = required_permissions(platform);
    let results = provider.request(required).await;

    let denied: Vec<Permission> = required
        .iter()
        .filter(|permission| results.get(*permission) != Some(&PermissionStatus::Granted))
        .copied()
        .collect();

    if denied.is_empty() {
        log::info!("Permissions granted");
        return None;
    }

    let notice = notice_for(platform, denied);
    log::warn!(
        "{notice} ({})",
        BlescanError::PermissionDenied(notice.denied.clone())
    );
    Some(notice)
}
