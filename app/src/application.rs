use crate::{
    backend::BleBackend,
    connector::ConnectionState,
    device::ScannedDevice,
    error::{BlescanError, BlescanResult},
    input::{ScreenCommand, HELP},
    permission::Notice,
    scanner::{ScanEvent, ScanState},
    screen::Screen,
    view::{render_connection, ScreenView},
};

use serde_json::json;
use std::time::Duration;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    time::{sleep_until, Instant},
};

enum Input {
    Discovery(ScanEvent),
    Line(Option<String>),
}

/// Text for people, one JSON object per line with `--json`.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Output { json }
    }

    pub fn view(&self, view: &ScreenView) -> BlescanResult<()> {
        if self.json {
            println!("{}", view.to_json()?);
        } else {
            println!("{}", view.render());
        }
        Ok(())
    }

    pub fn discovered(&self, index: usize, device: &ScannedDevice) {
        if self.json {
            println!("{}", json!({ "discovered": device, "index": index }));
        } else {
            println!("{index:>3}  {} ({})", device.display_name(), device.id);
        }
    }

    pub fn connection(&self, connection: &ConnectionState) {
        if self.json {
            println!("{}", json!({ "connection": connection }));
        } else {
            println!("{}", render_connection(connection));
        }
    }

    pub fn notice(&self, notice: &Notice) {
        if self.json {
            println!("{}", json!({ "notice": notice }));
        } else {
            println!("! {notice}");
        }
    }

    pub fn message(&self, message: &str) {
        if self.json {
            println!("{}", json!({ "message": message }));
        } else {
            println!("{message}");
        }
    }
}

/// Drives the screen from `input` lines until `quit` or end of input, then
/// tears it down. The screen is destroyed even when reading or printing fails.
pub async fn run_interactive<B, R>(
    mut screen: Screen<B>,
    input: R,
    output: &Output,
) -> BlescanResult<()>
where
    B: BleBackend,
    R: AsyncBufRead + Unpin,
{
    if let Some(notice) = screen.notice() {
        output.notice(notice);
    }

    let result = interact(&mut screen, input, output).await;
    if let Err(err) = &result {
        log::error!("Interactive session aborted: {err}");
    }

    let destroyed = screen.destroy().await;
    result.and(destroyed)
}

async fn interact<B, R>(screen: &mut Screen<B>, input: R, output: &Output) -> BlescanResult<()>
where
    B: BleBackend,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    output.message(HELP);
    output.view(&screen.view())?;

    loop {
        let input = tokio::select! {
            biased;
            event = screen.next_discovery() => Input::Discovery(event),
            line = lines.next_line() => Input::Line(line?),
        };

        match input {
            Input::Discovery(event) => {
                let was_scanning = screen.scan_state() == ScanState::Scanning;
                if let Some(device) = screen.apply(event).cloned() {
                    output.discovered(screen.devices().len() - 1, &device);
                }
                if was_scanning && screen.scan_state() == ScanState::Idle {
                    output.message("Scan stopped");
                }
            }
            Input::Line(None) => break,
            Input::Line(Some(line)) => match line.parse::<ScreenCommand>() {
                Ok(ScreenCommand::Quit) => break,
                Ok(command) => handle_command(screen, command, output).await?,
                Err(message) => output.message(&message),
            },
        }
    }

    Ok(())
}

async fn handle_command<B: BleBackend>(
    screen: &mut Screen<B>,
    command: ScreenCommand,
    output: &Output,
) -> BlescanResult<()> {
    match command {
        ScreenCommand::Toggle => screen.toggle_scan().await,
        ScreenCommand::Start => screen.start_scan().await,
        ScreenCommand::Stop => screen.stop_scan().await,
        ScreenCommand::List => {}
        ScreenCommand::Help => {
            output.message(HELP);
            return Ok(());
        }
        ScreenCommand::Connect(selector) => {
            match screen.connect(&selector).await {
                Ok(connection) => output.connection(connection),
                Err(err) => {
                    log::warn!("{err}");
                    output.message(&err.to_string());
                }
            }
            return Ok(());
        }
        ScreenCommand::Quit => return Ok(()),
    }

    output.view(&screen.view())
}

/// Scans until `duration` elapses or the discovery stream stops on its own.
pub async fn scan_for<B: BleBackend>(screen: &mut Screen<B>, duration: Duration) {
    let deadline = Instant::now() + duration;
    screen.start_scan().await;

    while screen.scan_state() == ScanState::Scanning {
        let event = tokio::select! {
            _ = sleep_until(deadline) => None,
            event = screen.next_discovery() => Some(event),
        };

        match event {
            Some(event) => {
                screen.apply(event);
            }
            None => break,
        }
    }

    screen.stop_scan().await;
}

pub async fn run_scan<B: BleBackend>(
    mut screen: Screen<B>,
    duration: Duration,
    output: &Output,
) -> BlescanResult<()> {
    if let Some(notice) = screen.notice() {
        output.notice(notice);
    }

    scan_for(&mut screen, duration).await;
    let printed = output.view(&screen.view());

    let destroyed = screen.destroy().await;
    printed.and(destroyed)
}

pub async fn run_connect<B: BleBackend>(
    mut screen: Screen<B>,
    id: &str,
    output: &Output,
) -> BlescanResult<()> {
    if let Some(notice) = screen.notice() {
        output.notice(notice);
    }

    let failure = match screen.connect(id).await {
        Ok(connection) => {
            output.connection(connection);
            match connection {
                ConnectionState::Failed { reason, .. } => {
                    Some(BlescanError::ConnectionError(reason.clone()))
                }
                _ => None,
            }
        }
        Err(err) => Some(err),
    };

    screen.destroy().await?;

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
