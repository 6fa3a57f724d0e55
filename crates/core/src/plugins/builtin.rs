//! Built-in plugin constructors.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::photos::PhotoSnapshot;
use crate::plugins::abi::{PhotoPlugin, PluginContext, PluginError};
use crate::plugins::services::PluginServices;

/// Entry key of the built-in logging plugin.
pub const PHOTO_LOGGER_ENTRY: &str = "photo-logger";

/// Constructor for the built-in logging plugin.
///
/// Logs every event it receives and keeps an invocation counter in its
/// persistent storage. Doubles as a reference implementation of the ABI.
pub fn photo_logger(ctx: PluginContext) -> Result<Box<dyn PhotoPlugin>, PluginError> {
    let logger = ctx.services.logger();
    logger.info(format!(
        "Initialized with config keys: {:?}",
        ctx.config.keys().collect::<Vec<_>>()
    ));
    Ok(Box::new(PhotoLogger {
        services: ctx.services,
    }))
}

struct PhotoLogger {
    services: PluginServices,
}

impl PhotoLogger {
    async fn bump_call_count(&self) -> Result<u64, PluginError> {
        let count = self
            .services
            .kv()
            .get("call_count")?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        self.services
            .kv()
            .set("call_count", &count.to_string())
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl PhotoPlugin for PhotoLogger {
    async fn on_global_change(&mut self) -> Result<(), PluginError> {
        let count = self.bump_call_count().await?;
        self.services
            .logger()
            .info(format!("Library changed (call #{})", count));
        Ok(())
    }

    async fn on_photo_publish(
        &mut self,
        photo: &PhotoSnapshot,
        params: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        let count = self.bump_call_count().await?;
        self.services.logger().info(format!(
            "Photo published: {} (uuid {}, call #{})",
            photo.title, photo.uuid, count
        ));
        for (key, value) in params {
            self.services.logger().info(format!("  param {}: {}", key, value));
        }

        // Exercise the asset lookup; absence is fine for unprocessed photos.
        if self.services.photo_asset(&photo.uuid, "thumbnail")?.is_some() {
            self.services.logger().info("  thumbnail variant present");
        }
        Ok(())
    }

    async fn on_photo_unpublish(
        &mut self,
        photo: &PhotoSnapshot,
        _params: &BTreeMap<String, String>,
    ) -> Result<(), PluginError> {
        let count = self.bump_call_count().await?;
        self.services.logger().info(format!(
            "Photo unpublished: {} (uuid {}, call #{})",
            photo.title, photo.uuid, count
        ));
        Ok(())
    }
}
