use crate::{
    backend::BleBackend,
    config::ScreenConfig,
    connector::{ConnectionState, Connector},
    device::{DeviceId, ScannedDevice},
    error::{BlescanError, BlescanResult},
    permission::{request_permissions, Notice, PermissionProvider},
    scanner::{ScanEvent, ScanState, Scanner},
    view::ScreenView,
};

/// Owns the BLE session from `mount` until `destroy`. All state changes go
/// through the scanner and connector it holds.
pub struct Screen<B: BleBackend> {
    backend: B,
    scanner: Scanner,
    connector: Connector,
    notice: Option<Notice>,
}

impl<B: BleBackend> Screen<B> {
    pub async fn mount<P: PermissionProvider>(
        backend: B,
        permissions: &P,
        config: &ScreenConfig,
    ) -> Self {
        let notice = request_permissions(permissions, config.platform).await;

        Screen {
            backend,
            scanner: Scanner::new(),
            connector: Connector::new(config.connect_timeout),
            notice,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn scan_state(&self) -> ScanState {
        self.scanner.state()
    }

    pub fn devices(&self) -> &[ScannedDevice] {
        self.scanner.registry().devices()
    }

    pub fn connection(&self) -> &ConnectionState {
        self.connector.state()
    }

    pub fn view(&self) -> ScreenView {
        ScreenView::new(
            self.scan_state(),
            self.devices(),
            self.connection(),
            self.notice(),
        )
    }

    pub async fn start_scan(&mut self) {
        self.scanner.start_scan(&self.backend).await;
    }

    pub async fn stop_scan(&mut self) {
        self.scanner.stop_scan(&self.backend).await;
    }

    pub async fn toggle_scan(&mut self) {
        match self.scan_state() {
            ScanState::Scanning => self.stop_scan().await,
            ScanState::Idle => self.start_scan().await,
        }
    }

    /// Never resolves while idle.
    pub async fn next_discovery(&mut self) -> ScanEvent {
        self.scanner.next_event().await
    }

    pub fn apply(&mut self, event: ScanEvent) -> Option<&ScannedDevice> {
        self.scanner.apply(event)
    }

    /// `selector` is either a position in the device list or a raw identifier.
    pub async fn connect(&mut self, selector: &str) -> BlescanResult<&ConnectionState> {
        let id = self.resolve(selector)?;
        Ok(self
            .connector
            .connect(&self.backend, &mut self.scanner, id)
            .await)
    }

    fn resolve(&self, selector: &str) -> BlescanResult<DeviceId> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(BlescanError::InvalidIdentifier(selector.to_string()));
        }

        match selector.parse::<usize>() {
            Ok(index) => self
                .scanner
                .registry()
                .get(index)
                .map(|device| device.id.clone())
                .ok_or_else(|| BlescanError::UnknownDevice(selector.to_string())),
            Err(_) => Ok(DeviceId::new(selector)),
        }
    }

    pub async fn destroy(mut self) -> BlescanResult<()> {
        self.scanner.stop_scan(&self.backend).await;
        self.backend.destroy().await
    }
}
