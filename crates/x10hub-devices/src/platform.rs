//! Cover platform setup.

use std::sync::Arc;

use tracing::info;

use crate::config::{CoverConfig, X10HubConfig};
use crate::controller::MochadController;
use crate::cover::{CoverEntity, MochadCover};
use crate::error::X10Result;

/// Shared state handed to platforms: the controller every cover talks through.
#[derive(Debug, Clone)]
pub struct MochadHub {
    controller: MochadController,
}

impl MochadHub {
    pub fn new(controller: MochadController) -> Self {
        Self { controller }
    }

    /// Connect to the daemon named in `config`.
    pub async fn connect(config: &X10HubConfig) -> X10Result<Self> {
        let controller = MochadController::connect(&config.mochad.host, config.mochad.port).await?;
        Ok(Self::new(controller))
    }

    pub fn controller(&self) -> &MochadController {
        &self.controller
    }
}

/// Build one cover per configured device, in configuration order.
pub fn setup_platform(hub: &MochadHub, devices: &[CoverConfig]) -> Vec<Arc<MochadCover>> {
    devices
        .iter()
        .map(|dev| {
            let cover = MochadCover::new(hub.controller(), dev);
            info!(
                name = cover.name(),
                address = %dev.address,
                comm_type = %cover.comm_type(),
                "Registered X10 cover"
            );
            Arc::new(cover)
        })
        .collect()
}
