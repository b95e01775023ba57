//! Cover behavior tests
//!
//! Drives `MochadCover` through a recording transport and checks:
//! - Position reporting and end-stop snapping
//! - Closed-state derivation
//! - Wire lines produced for open/close/set-position
//! - Device status interpretation

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use x10hub_devices::{
    CommMode, CoverConfig, CoverEntity, CoverPosition, MochadController, MochadCover,
    MochadTransport, RequestLock, X10Device, X10Result,
};

/// Transport that records every line and replays a fixed status report.
#[derive(Default)]
struct RecordingTransport {
    lines: Mutex<Vec<String>>,
    report: String,
}

impl RecordingTransport {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl MochadTransport for RecordingTransport {
    async fn send_line(&self, line: &str) -> X10Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    async fn status_report(&self) -> X10Result<String> {
        Ok(self.report.clone())
    }
}

/// Device that answers status queries with canned text.
struct CannedStatus(&'static str);

#[async_trait]
impl X10Device for CannedStatus {
    async fn get_status(&self) -> X10Result<String> {
        Ok(self.0.to_string())
    }

    async fn send_cmd(&self, _cmd: &str) -> X10Result<()> {
        Ok(())
    }
}

fn setup(address: &str) -> (Arc<RecordingTransport>, MochadCover) {
    setup_with(CoverConfig::new(address.parse().unwrap()), String::new())
}

fn setup_with(config: CoverConfig, report: String) -> (Arc<RecordingTransport>, MochadCover) {
    let transport = Arc::new(RecordingTransport {
        lines: Mutex::new(Vec::new()),
        report,
    });
    let controller = MochadController::with_transport(transport.clone(), "mock");
    let cover = MochadCover::new(&controller, &config);
    (transport, cover)
}

fn position(value: u8) -> CoverPosition {
    CoverPosition::new(value).unwrap()
}

#[tokio::test]
async fn test_initial_state_unknown() {
    let (transport, cover) = setup("a1");

    assert_eq!(cover.current_cover_position(), None);
    assert_eq!(cover.is_closed(), None);
    assert!(transport.lines().is_empty());
}

#[tokio::test]
async fn test_open_cover() {
    let (transport, cover) = setup("a1");

    cover.close_cover().await.unwrap();
    cover.open_cover().await.unwrap();

    assert_eq!(cover.current_cover_position(), Some(100));
    assert_eq!(cover.is_closed(), Some(false));
    assert_eq!(transport.lines(), vec!["pl a1 off", "pl a1 on"]);
}

#[tokio::test]
async fn test_close_cover() {
    let (transport, cover) = setup("c3");

    cover.set_cover_position(position(60)).await.unwrap();
    cover.close_cover().await.unwrap();

    assert_eq!(cover.current_cover_position(), Some(0));
    assert_eq!(cover.is_closed(), Some(true));
    assert_eq!(transport.lines().last().unwrap(), "pl c3 off");
}

#[tokio::test]
async fn test_set_position_midrange() {
    let (transport, cover) = setup("a1");

    cover.set_cover_position(position(50)).await.unwrap();

    assert_eq!(transport.lines(), vec!["pl a1 extended_code_1 0 3 12"]);
    assert_eq!(cover.current_cover_position(), Some(50));
    assert_eq!(cover.stored_position(), Some(50));
    assert_eq!(cover.is_closed(), Some(false));
}

#[tokio::test]
async fn test_set_position_near_closed_snaps_to_zero() {
    let (transport, cover) = setup("a1");

    cover.set_cover_position(position(3)).await.unwrap();

    assert_eq!(transport.lines(), vec!["pl a1 extended_code_1 0 3 0"]);
    assert_eq!(cover.stored_position(), Some(3));
    assert_eq!(cover.current_cover_position(), Some(0));
    assert_eq!(cover.is_closed(), Some(true));
}

#[tokio::test]
async fn test_set_position_fully_open() {
    let (transport, cover) = setup("a1");

    cover.set_cover_position(position(100)).await.unwrap();

    assert_eq!(transport.lines(), vec!["pl a1 extended_code_1 0 3 25"]);
    assert_eq!(cover.current_cover_position(), Some(100));
}

#[tokio::test]
async fn test_set_position_boundaries() {
    let (_transport, cover) = setup("a1");

    for (target, reported) in [(5, 0), (6, 6), (94, 94), (95, 100), (97, 100)] {
        cover.set_cover_position(position(target)).await.unwrap();
        assert_eq!(
            cover.current_cover_position(),
            Some(reported),
            "target {}",
            target
        );
        assert_eq!(cover.is_closed(), Some(reported == 0));
    }
}

#[tokio::test]
async fn test_rf_comm_type_and_custom_name() {
    let config = CoverConfig::new("b7".parse().unwrap())
        .with_name("Bedroom")
        .with_comm_type(CommMode::Rf);
    let (transport, cover) = setup_with(config, String::new());

    cover.open_cover().await.unwrap();

    assert_eq!(cover.name(), "Bedroom");
    assert_eq!(transport.lines(), vec!["rf b7 on"]);
}

#[tokio::test]
async fn test_device_status_from_report() {
    let report = "\
01/01 10:00:00 Device status
01/01 10:00:00 House A: 1=1,2=0
01/01 10:00:00 End status
"
    .to_string();

    let (_t, on_cover) = setup_with(CoverConfig::new("a1".parse().unwrap()), report.clone());
    let (_t, off_cover) = setup_with(CoverConfig::new("a2".parse().unwrap()), report.clone());
    let (_t, unknown_cover) = setup_with(CoverConfig::new("d9".parse().unwrap()), report);

    assert!(on_cover.get_device_status().await.unwrap());
    assert!(!off_cover.get_device_status().await.unwrap());
    assert!(!unknown_cover.get_device_status().await.unwrap());

    // Status reads do not feed the position.
    assert_eq!(on_cover.current_cover_position(), None);
}

#[tokio::test]
async fn test_device_status_exact_match() {
    let config = CoverConfig::new("a1".parse().unwrap());
    let cases = [
        ("on", true),
        ("on\n", true),
        ("on  \t\r\n", true),
        ("ON", false),
        ("On", false),
        (" on", false),
        ("", false),
        ("off", false),
        ("garbage", false),
    ];

    for (raw, expected) in cases {
        let cover = MochadCover::with_device(CannedStatus(raw), RequestLock::new(), &config);
        assert_eq!(
            cover.get_device_status().await.unwrap(),
            expected,
            "status {:?}",
            raw
        );
    }
}
