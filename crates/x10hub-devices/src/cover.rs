//! Cover entities backed by X10 shutter modules.
//!
//! X10 shutters are one-way devices: a command goes out and nothing comes
//! back. The entity therefore tracks its position optimistically, updating
//! it as soon as a command has been handed to the controller.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::address::{CommMode, X10Address};
use crate::config::CoverConfig;
use crate::controller::{MochadController, RequestLock};
use crate::device::{MochadDevice, X10Device};
use crate::error::X10Result;
use crate::position::{CoverPosition, reported_position};

/// Prefix of the name given to covers configured without one.
pub const DEFAULT_NAME_PREFIX: &str = "x10_shutter_dev_";

/// Operations a cover can advertise to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverFeature {
    Open,
    Close,
    SetPosition,
}

/// Feature set of every mochad cover.
pub const MOCHAD_COVER_FEATURES: &[CoverFeature] = &[
    CoverFeature::Open,
    CoverFeature::Close,
    CoverFeature::SetPosition,
];

/// Host-facing contract of a cover entity.
#[async_trait]
pub trait CoverEntity: Send + Sync {
    /// Display name.
    fn name(&self) -> &str;

    /// Position 0 (closed) to 100 (open), `None` when unknown.
    fn current_cover_position(&self) -> Option<u8>;

    /// Closed state derived from the reported position.
    fn is_closed(&self) -> Option<bool> {
        self.current_cover_position().map(|p| p == 0)
    }

    fn supported_features(&self) -> &'static [CoverFeature];

    async fn open_cover(&self) -> X10Result<()>;

    async fn close_cover(&self) -> X10Result<()>;

    async fn set_cover_position(&self, position: CoverPosition) -> X10Result<()>;
}

/// X10 shutter exposed as a cover.
pub struct MochadCover<D: X10Device = MochadDevice> {
    name: String,
    address: X10Address,
    comm_type: CommMode,
    device: D,
    lock: RequestLock,
    current_position: RwLock<Option<u8>>,
}

impl MochadCover<MochadDevice> {
    /// Build a cover and its device handle on `controller`.
    pub fn new(controller: &MochadController, config: &CoverConfig) -> Self {
        let comm_type = config.comm_type.unwrap_or_default();
        let device = MochadDevice::new(controller.clone(), config.address, comm_type);
        Self::with_device(device, controller.request_lock().clone(), config)
    }
}

impl<D: X10Device> MochadCover<D> {
    /// Build a cover around an existing device handle.
    ///
    /// `lock` must be the request lock of the controller `device` talks to.
    pub fn with_device(device: D, lock: RequestLock, config: &CoverConfig) -> Self {
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| format!("{}{}", DEFAULT_NAME_PREFIX, config.address));

        Self {
            name,
            address: config.address,
            comm_type: config.comm_type.unwrap_or_default(),
            device,
            lock,
            current_position: RwLock::new(None),
        }
    }

    pub fn address(&self) -> X10Address {
        self.address
    }

    pub fn comm_type(&self) -> CommMode {
        self.comm_type
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Last commanded position, before end-stop snapping.
    pub fn stored_position(&self) -> Option<u8> {
        *self.current_position.read()
    }

    /// Ask the device whether it is on.
    ///
    /// Anything other than exactly `on` (after trimming trailing whitespace)
    /// reads as off.
    pub async fn get_device_status(&self) -> X10Result<bool> {
        let status = {
            let _guard = self.lock.acquire().await;
            self.device.get_status().await?
        };
        Ok(status.trim_end() == "on")
    }

    async fn send(&self, cmd: &str) -> X10Result<()> {
        let result = {
            let _guard = self.lock.acquire().await;
            self.device.send_cmd(cmd).await
        };
        match &result {
            Ok(()) => debug!(cover = %self.name, address = %self.address, cmd, "Command sent"),
            Err(e) => warn!(cover = %self.name, address = %self.address, cmd, "Command failed: {}", e),
        }
        result
    }

    fn store_position(&self, position: u8) {
        *self.current_position.write() = Some(position);
    }
}

#[async_trait]
impl<D: X10Device> CoverEntity for MochadCover<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn current_cover_position(&self) -> Option<u8> {
        reported_position(self.stored_position())
    }

    fn supported_features(&self) -> &'static [CoverFeature] {
        MOCHAD_COVER_FEATURES
    }

    async fn open_cover(&self) -> X10Result<()> {
        let result = self.send("on").await;
        self.store_position(CoverPosition::OPEN.value());
        result
    }

    async fn close_cover(&self) -> X10Result<()> {
        let result = self.send("off").await;
        self.store_position(CoverPosition::CLOSED.value());
        result
    }

    async fn set_cover_position(&self, position: CoverPosition) -> X10Result<()> {
        let level = position.device_level();
        let result = self.send(&format!("extended_code_1 0 3 {}", level)).await;
        self.store_position(position.value());
        result
    }
}

impl<D: X10Device> std::fmt::Debug for MochadCover<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MochadCover")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("comm_type", &self.comm_type)
            .field("current_position", &self.stored_position())
            .finish()
    }
}
