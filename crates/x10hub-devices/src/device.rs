//! Per-device protocol handle.

use async_trait::async_trait;
use tracing::debug;

use crate::address::{CommMode, X10Address};
use crate::controller::MochadController;
use crate::error::X10Result;

/// One addressable X10 device.
///
/// Implementations perform raw I/O only; callers are responsible for holding
/// the controller's request lock.
#[async_trait]
pub trait X10Device: Send + Sync {
    /// Raw on/off status text as the controller reports it.
    async fn get_status(&self) -> X10Result<String>;

    /// Send a command such as `on`, `off` or `extended_code_1 0 3 12`.
    async fn send_cmd(&self, cmd: &str) -> X10Result<()>;
}

/// Device handle bound to a mochad controller.
#[derive(Debug, Clone)]
pub struct MochadDevice {
    controller: MochadController,
    address: X10Address,
    comm_type: CommMode,
}

impl MochadDevice {
    pub fn new(controller: MochadController, address: X10Address, comm_type: CommMode) -> Self {
        Self {
            controller,
            address,
            comm_type,
        }
    }

    pub fn address(&self) -> X10Address {
        self.address
    }

    pub fn comm_type(&self) -> CommMode {
        self.comm_type
    }

    pub fn controller(&self) -> &MochadController {
        &self.controller
    }

    /// Wire line for a command addressed to this device.
    pub fn command_line(&self, cmd: &str) -> String {
        format!("{} {} {}", self.comm_type, self.address, cmd)
    }
}

#[async_trait]
impl X10Device for MochadDevice {
    async fn get_status(&self) -> X10Result<String> {
        let report = self.controller.status_report().await?;
        let on = unit_status(&report, self.address).unwrap_or(false);
        debug!(address = %self.address, on, "Device status");
        // mochad-style line ending; callers trim it
        Ok(if on { "on\n" } else { "off\n" }.to_string())
    }

    async fn send_cmd(&self, cmd: &str) -> X10Result<()> {
        self.controller.send_line(&self.command_line(cmd)).await
    }
}

/// Look up a unit's on/off bit in a mochad `st` report.
///
/// Only the "Device status" section is consulted; lines there look like
/// `01/01 10:00:00 House A: 1=1,2=0,3=1`. Returns `None` when the unit is not
/// listed.
pub fn unit_status(report: &str, address: X10Address) -> Option<bool> {
    let mut in_device_section = false;

    for line in report.lines() {
        if line.contains("Device status") {
            in_device_section = true;
            continue;
        }
        if line.contains("Security sensor status") || line.contains("End status") {
            in_device_section = false;
            continue;
        }
        if !in_device_section {
            continue;
        }

        let Some(idx) = line.find("House ") else {
            continue;
        };
        let rest = &line[idx + "House ".len()..];
        let Some((house, entries)) = rest.split_once(':') else {
            continue;
        };
        if !house.trim().eq_ignore_ascii_case(&address.house().to_string()) {
            continue;
        }

        for entry in entries.split(',') {
            let Some((unit, state)) = entry.trim().split_once('=') else {
                continue;
            };
            if unit.trim().parse::<u8>().ok() == Some(address.unit()) {
                return Some(state.trim() == "1");
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
02/01 16:44:23 Device selected
02/01 16:44:23 House A: 1
02/01 16:44:23 House B: 2
02/01 16:44:23 Device status
02/01 16:44:23 House A: 1=1,2=0,16=1
02/01 16:44:23 House B: 2=0
02/01 16:44:23 Security sensor status
02/01 16:44:23 End status
";

    fn addr(s: &str) -> X10Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_unit_status() {
        assert_eq!(unit_status(REPORT, addr("a1")), Some(true));
        assert_eq!(unit_status(REPORT, addr("a2")), Some(false));
        assert_eq!(unit_status(REPORT, addr("a16")), Some(true));
        assert_eq!(unit_status(REPORT, addr("b2")), Some(false));
    }

    #[test]
    fn test_unit_status_ignores_selected_section() {
        // "House B: 2" appears under "Device selected" only as a selection.
        assert_eq!(unit_status(REPORT, addr("b3")), None);
        assert_eq!(unit_status(REPORT, addr("c1")), None);
        assert_eq!(unit_status("", addr("a1")), None);
    }
}
