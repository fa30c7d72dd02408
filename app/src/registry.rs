use crate::device::{DeviceId, ScannedDevice};

use std::collections::HashSet;

/// Devices seen during the current scan session, in discovery order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<ScannedDevice>,
    seen: HashSet<DeviceId>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// First sighting wins. Returns `false` for an identifier already listed.
    pub fn insert(&mut self, device: ScannedDevice) -> bool {
        if !self.seen.insert(device.id.clone()) {
            return false;
        }

        self.devices.push(device);
        true
    }

    pub fn clear(&mut self) {
        self.devices.clear();
        self.seen.clear();
    }

    pub fn get(&self, index: usize) -> Option<&ScannedDevice> {
        self.devices.get(index)
    }

    pub fn devices(&self) -> &[ScannedDevice] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
