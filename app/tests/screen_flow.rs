mod common;

use blescan::{
    application::{self, Output},
    config::ScreenConfig,
    connector::ConnectionState,
    device::DeviceId,
    error::BlescanError,
    permission::{Permission, Platform},
    scanner::{ScanEvent, ScanState},
    screen::Screen,
};
use common::{ids, seen, seen_named, Call, Deny, GrantAll, MockBackend};
use std::time::Duration;

async fn mount(backend: MockBackend) -> Screen<MockBackend> {
    Screen::mount(backend, &GrantAll, &ScreenConfig::default()).await
}

async fn drain(screen: &mut Screen<MockBackend>, events: usize) {
    for _ in 0..events {
        let event = screen.next_discovery().await;
        screen.apply(event);
    }
}

// Scanning

#[tokio::test]
async fn repeated_sightings_are_listed_once_in_discovery_order() {
    let backend = MockBackend::new().with_open_scan(vec![seen("A"), seen("B"), seen("A"), seen("C")]);
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 4).await;

    assert_eq!(ids(screen.devices()), vec!["A", "B", "C"]);
    assert_eq!(screen.scan_state(), ScanState::Scanning);
}

#[tokio::test]
async fn first_sighting_names_the_device() {
    let backend = MockBackend::new().with_open_scan(vec![seen_named("A", "one"), seen_named("A", "two")]);
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 2).await;

    assert_eq!(screen.devices().len(), 1);
    assert_eq!(screen.devices()[0].display_name(), "one");
}

#[tokio::test]
async fn starting_a_scan_clears_previous_results() {
    let backend = MockBackend::new()
        .with_open_scan(vec![seen("A"), seen("B")])
        .with_open_scan(vec![seen("C")]);
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 2).await;
    assert_eq!(screen.devices().len(), 2);

    screen.start_scan().await;
    assert!(screen.devices().is_empty());
    assert_eq!(screen.scan_state(), ScanState::Scanning);

    drain(&mut screen, 1).await;
    assert_eq!(ids(screen.devices()), vec!["C"]);
}

#[tokio::test]
async fn stopping_keeps_the_device_list() {
    let backend = MockBackend::new().with_open_scan(vec![seen("A"), seen("B")]);
    let calls = backend.calls();
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 2).await;
    screen.stop_scan().await;

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(ids(screen.devices()), vec!["A", "B"]);
    assert_eq!(*calls.lock().unwrap(), vec![Call::StartScan, Call::StopScan]);
}

#[tokio::test]
async fn toggle_flips_between_start_and_stop() {
    let mut screen = mount(MockBackend::new()).await;

    screen.toggle_scan().await;
    assert_eq!(screen.scan_state(), ScanState::Scanning);
    assert_eq!(screen.view().button, "Stop Scan");

    screen.toggle_scan().await;
    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(screen.view().button, "Start Scan");
}

#[tokio::test]
async fn stream_error_abandons_the_scan() {
    let backend = MockBackend::new().with_open_scan(vec![
        seen("A"),
        Err(BlescanError::ScanError("radio off".to_string())),
        seen("B"),
    ]);
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 2).await;

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(ids(screen.devices()), vec!["A"]);
}

#[tokio::test]
async fn failing_to_start_leaves_the_screen_idle() {
    let mut screen = mount(MockBackend::new().failing_start()).await;

    screen.start_scan().await;

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert!(screen.devices().is_empty());
}

#[tokio::test]
async fn closed_stream_returns_to_idle() {
    let backend = MockBackend::new().with_scan(vec![seen("A")]);
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 1).await;
    assert_eq!(screen.scan_state(), ScanState::Scanning);

    let event = screen.next_discovery().await;
    assert!(matches!(event, ScanEvent::Ended));
    screen.apply(event);

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(ids(screen.devices()), vec!["A"]);
}

#[tokio::test]
async fn sightings_after_stop_are_ignored() {
    let mut screen = mount(MockBackend::new()).await;

    let added = screen.apply(ScanEvent::Discovered(
        blescan::device::Advertisement::new("A"),
    ));

    assert!(added.is_none());
    assert!(screen.devices().is_empty());
}

// Connecting

#[tokio::test]
async fn connect_stops_the_scan_and_lists_services() {
    let backend = MockBackend::new().with_open_scan(vec![seen("A")]);
    let calls = backend.calls();
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    drain(&mut screen, 1).await;

    let connection = screen.connect("0").await.unwrap().clone();

    let ConnectionState::Connected { device } = connection else {
        panic!("expected a connection, got {connection:?}");
    };
    assert_eq!(device.id, DeviceId::from("A"));
    assert_eq!(device.services.len(), 1);
    assert_eq!(device.services[0].characteristics[0].flags, vec!["read", "notify"]);

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(ids(screen.devices()), vec!["A"]);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            Call::StartScan,
            Call::StopScan,
            Call::Connect("A".to_string()),
            Call::DiscoverServices("A".to_string()),
        ]
    );
}

#[tokio::test]
async fn connect_failure_is_kept_in_state() {
    let backend = MockBackend::new().failing_connect("out of range");
    let calls = backend.calls();
    let mut screen = mount(backend).await;

    let connection = screen.connect("AA:BB:CC:DD:EE:FF").await.unwrap();

    assert_eq!(
        *connection,
        ConnectionState::Failed {
            id: DeviceId::from("AA:BB:CC:DD:EE:FF"),
            reason: "out of range".to_string(),
        }
    );
    assert!(!calls
        .lock()
        .unwrap()
        .iter()
        .any(|call| matches!(call, Call::DiscoverServices(_))));
}

#[tokio::test]
async fn service_discovery_failure_is_a_failed_connection() {
    let mut screen = mount(MockBackend::new().failing_services("gatt busy")).await;

    let connection = screen.connect("A").await.unwrap();

    assert!(matches!(
        connection,
        ConnectionState::Failed { reason, .. } if reason == "gatt busy"
    ));
}

#[tokio::test]
async fn unknown_list_entry_is_rejected() {
    let mut screen = mount(MockBackend::new()).await;

    let result = screen.connect("3").await;

    assert!(matches!(result, Err(BlescanError::UnknownDevice(_))));
    assert_eq!(*screen.connection(), ConnectionState::Idle);
}

#[tokio::test]
async fn configured_timeout_bounds_a_hanging_connect() {
    let config = ScreenConfig {
        connect_timeout: Some(Duration::from_millis(50)),
        ..Default::default()
    };
    let mut screen = Screen::mount(MockBackend::new().hanging_connect(), &GrantAll, &config).await;

    let connection = screen.connect("A").await.unwrap();

    assert_eq!(
        *connection,
        ConnectionState::Failed {
            id: DeviceId::from("A"),
            reason: BlescanError::Timeout.to_string(),
        }
    );
}

// Lifecycle

#[tokio::test]
async fn denied_scan_permission_shows_notice_without_gating_scan() {
    let config = ScreenConfig {
        platform: Platform::Android,
        ..Default::default()
    };
    let backend = MockBackend::new().with_open_scan(vec![seen("A")]);
    let mut screen = Screen::mount(backend, &Deny(Permission::BluetoothScan), &config).await;

    let notice = screen.notice().expect("notice");
    assert_eq!(notice.title, "Permissions required");
    assert_eq!(notice.denied, vec![Permission::BluetoothScan]);

    screen.start_scan().await;
    drain(&mut screen, 1).await;
    assert_eq!(ids(screen.devices()), vec!["A"]);
}

#[tokio::test]
async fn destroy_stops_scanning_and_releases_once() {
    let backend = MockBackend::new();
    let calls = backend.calls();
    let mut screen = mount(backend).await;

    screen.start_scan().await;
    screen.destroy().await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::StartScan, Call::StopScan, Call::Destroy]
    );
}

// Run modes

#[tokio::test]
async fn timed_scan_ends_with_the_stream() {
    let backend = MockBackend::new().with_scan(vec![seen("A"), seen("B"), seen("A")]);
    let mut screen = mount(backend).await;

    application::scan_for(&mut screen, Duration::from_secs(30)).await;

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(ids(screen.devices()), vec!["A", "B"]);
}

#[tokio::test]
async fn timed_scan_stops_at_the_deadline() {
    let backend = MockBackend::new().with_open_scan(vec![seen("A")]);
    let calls = backend.calls();
    let mut screen = mount(backend).await;

    application::scan_for(&mut screen, Duration::from_millis(50)).await;

    assert_eq!(screen.scan_state(), ScanState::Idle);
    assert_eq!(ids(screen.devices()), vec!["A"]);
    assert_eq!(calls.lock().unwrap().last(), Some(&Call::StopScan));
}

#[tokio::test]
async fn interactive_session_connects_to_a_listed_device() {
    let backend = MockBackend::new().with_scan(vec![seen("A"), seen("B")]);
    let calls = backend.calls();
    let screen = mount(backend).await;

    let input: &[u8] = b"start\nbogus\nconnect 1\nquit\n";
    application::run_interactive(screen, input, &Output::new(false))
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert!(calls.contains(&Call::Connect("B".to_string())));
    assert_eq!(calls.last(), Some(&Call::Destroy));
}

#[tokio::test]
async fn interactive_session_ends_with_input() {
    let backend = MockBackend::new();
    let calls = backend.calls();
    let screen = mount(backend).await;

    let input: &[u8] = b"scan\n";
    application::run_interactive(screen, input, &Output::new(true))
        .await
        .unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::StartScan, Call::StopScan, Call::Destroy]
    );
}

#[tokio::test]
async fn unreadable_input_still_releases_the_session() {
    let backend = MockBackend::new();
    let calls = backend.calls();
    let screen = mount(backend).await;

    let input: &[u8] = b"scan\n\xff\xfe\nquit\n";
    let result = application::run_interactive(screen, input, &Output::new(false)).await;

    assert!(matches!(result, Err(BlescanError::IoError(_))));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![Call::StartScan, Call::StopScan, Call::Destroy]
    );
}

#[tokio::test]
async fn one_shot_connect_reports_failure() {
    let backend = MockBackend::new().failing_connect("refused");
    let calls = backend.calls();
    let screen = mount(backend).await;

    let result = application::run_connect(screen, "A", &Output::new(false)).await;

    assert!(matches!(result, Err(BlescanError::ConnectionError(reason)) if reason == "refused"));
    assert_eq!(calls.lock().unwrap().last(), Some(&Call::Destroy));
}
