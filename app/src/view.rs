use crate::{
    connector::ConnectionState,
    device::{ScannedDevice, UNNAMED_DEVICE},
    error::BlescanResult,
    permission::Notice,
    scanner::ScanState,
};

use serde::Serialize;
use std::fmt::Write;

pub const TITLE: &str = "Bluetooth Devices";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScreenView {
    pub title: &'static str,
    pub button: &'static str,
    pub scan_state: ScanState,
    pub devices: Vec<ScannedDevice>,
    pub connection: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl ScreenView {
    pub fn new(
        scan_state: ScanState,
        devices: &[ScannedDevice],
        connection: &ConnectionState,
        notice: Option<&Notice>,
    ) -> Self {
        let button = match scan_state {
            ScanState::Scanning => "Stop Scan",
            ScanState::Idle => "Start Scan",
        };

        ScreenView {
            title: TITLE,
            button,
            scan_state,
            devices: devices.to_vec(),
            connection: connection.clone(),
            notice: notice.cloned(),
        }
    }

    pub fn to_json(&self) -> BlescanResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.title);
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }
        let _ = writeln!(out, "[ {} ]", self.button);

        for (index, device) in self.devices.iter().enumerate() {
            let name = device.name.as_deref().unwrap_or(UNNAMED_DEVICE);
            let _ = writeln!(out, "{index:>3}  {name}");
            let _ = writeln!(out, "     {}", device.id);
        }

        let _ = write!(out, "{}", render_connection(&self.connection));
        out
    }
}

pub fn render_connection(connection: &ConnectionState) -> String {
    match connection {
        ConnectionState::Idle => "Not connected".to_string(),
        ConnectionState::Connecting { id } => format!("Connecting to {id}..."),
        ConnectionState::Failed { id, reason } => format!("Connection to {id} failed: {reason}"),
        ConnectionState::Connected { device } => {
            let mut out = format!(
                "Connected to {} ({})",
                device.name.as_deref().unwrap_or(UNNAMED_DEVICE),
                device.id
            );
            for service in &device.services {
                let _ = write!(out, "\n  service {}", service.uuid);
                for characteristic in &service.characteristics {
                    let _ = write!(
                        out,
                        "\n    characteristic {} [{}]",
                        characteristic.uuid,
                        characteristic.flags.join(", ")
                    );
                }
            }
            out
        }
    }
}
