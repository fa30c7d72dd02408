use crate::{
    device::{Advertisement, ConnectedDevice, DeviceId, ServiceInfo},
    error::BlescanResult,
};

use futures::Stream;
use std::pin::Pin;

/// Sightings in arrival order. Dropping the stream ends the subscription.
pub type DiscoveryStream = Pin<Box<dyn Stream<Item = BlescanResult<Advertisement>> + Send>>;

/// The platform BLE library as the screen sees it.
#[allow(async_fn_in_trait)]
pub trait BleBackend {
    /// Reports every advertising peripheral; there is no service filter.
    async fn start_device_scan(&self) -> BlescanResult<DiscoveryStream>;

    async fn stop_device_scan(&self) -> BlescanResult<()> {
        Ok(())
    }

    /// Returns the peripheral with an empty service list.
    async fn connect_to_device(&self, id: &DeviceId) -> BlescanResult<ConnectedDevice>;

    async fn discover_all_services_and_characteristics(
        &self,
        id: &DeviceId,
    ) -> BlescanResult<Vec<ServiceInfo>>;

    /// Releases the session. Called once, when the screen is torn down.
    async fn destroy(self) -> BlescanResult<()>
    where
        Self: Sized;
}
