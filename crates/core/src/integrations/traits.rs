//! Store traits for integrations and their per-photo overrides.

use async_trait::async_trait;

use crate::errors::Result;
use crate::integrations::model::{ExclusionRule, Integration, PhotoParameters};

/// Store trait for integration records.
#[async_trait]
pub trait IntegrationStoreTrait: Send + Sync {
    /// Get all integrations.
    fn get_all(&self) -> Result<Vec<Integration>>;

    /// Get all integrations with the active flag set.
    fn get_active(&self) -> Result<Vec<Integration>>;

    /// Get an integration by its stable id.
    fn get_by_id(&self, id: &str) -> Result<Option<Integration>>;

    /// Module references of all Plugin integrations, active or not.
    fn get_plugin_modules(&self) -> Result<Vec<String>>;

    /// Insert a new integration record.
    async fn insert(&self, integration: Integration) -> Result<Integration>;

    /// Replace an existing integration record.
    async fn update(&self, integration: Integration) -> Result<Integration>;

    /// Delete an integration. Run history survives (weak reference).
    async fn delete(&self, id: &str) -> Result<usize>;
}

/// Store trait for per-photo exclusion rules.
#[async_trait]
pub trait ExclusionStoreTrait: Send + Sync {
    /// Integration ids a photo has opted out of.
    fn excluded_integration_ids(&self, photo_id: &str) -> Result<Vec<String>>;

    /// All exclusion rules.
    fn get_all(&self) -> Result<Vec<ExclusionRule>>;

    /// Add an exclusion; the (photo, integration) pair is unique.
    async fn insert(&self, rule: ExclusionRule) -> Result<ExclusionRule>;

    /// Remove the exclusion for a (photo, integration) pair.
    async fn delete(&self, photo_id: &str, integration_id: &str) -> Result<usize>;
}

/// Store trait for per-photo plugin parameters.
#[async_trait]
pub trait PhotoParameterStoreTrait: Send + Sync {
    /// Parameters for a (integration, photo) pair, if defined.
    fn get(&self, integration_id: &str, photo_id: &str) -> Result<Option<PhotoParameters>>;

    /// Insert or replace the parameters for a (integration, photo) pair.
    async fn upsert(&self, parameters: PhotoParameters) -> Result<PhotoParameters>;

    /// Remove the parameters for a (integration, photo) pair.
    async fn delete(&self, integration_id: &str, photo_id: &str) -> Result<usize>;
}
