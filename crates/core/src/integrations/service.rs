use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{Result, ValidationError};
use crate::integrations::model::{
    ExclusionRule, Integration, IntegrationSpec, PhotoParameters,
};
use crate::integrations::traits::{
    ExclusionStoreTrait, IntegrationStoreTrait, PhotoParameterStoreTrait,
};
use crate::utils::kv_text;

/// Operator-facing service for managing integrations and per-photo overrides.
///
/// All text-format validation happens here, synchronously, so malformed
/// definitions never reach dispatch.
pub struct IntegrationService {
    integrations: Arc<dyn IntegrationStoreTrait>,
    exclusions: Arc<dyn ExclusionStoreTrait>,
    parameters: Arc<dyn PhotoParameterStoreTrait>,
}

impl IntegrationService {
    pub fn new(
        integrations: Arc<dyn IntegrationStoreTrait>,
        exclusions: Arc<dyn ExclusionStoreTrait>,
        parameters: Arc<dyn PhotoParameterStoreTrait>,
    ) -> Self {
        IntegrationService {
            integrations,
            exclusions,
            parameters,
        }
    }

    pub fn get_all(&self) -> Result<Vec<Integration>> {
        self.integrations.get_all()
    }

    pub fn get(&self, id: &str) -> Result<Option<Integration>> {
        self.integrations.get_by_id(id)
    }

    /// Creates an integration. New records are inactive until an operator
    /// explicitly enables them.
    pub async fn create(&self, nickname: String, spec: IntegrationSpec) -> Result<Integration> {
        validate_spec(&spec)?;

        let now = Utc::now().to_rfc3339();
        let integration = Integration {
            id: Uuid::new_v4().to_string(),
            nickname,
            active: false,
            spec,
            created_at: now.clone(),
            updated_at: now,
        };
        self.integrations.insert(integration).await
    }

    /// Replaces the nickname and spec of an existing integration.
    ///
    /// Identity is independent of nickname: renaming never breaks run
    /// history joins.
    pub async fn update(
        &self,
        id: &str,
        nickname: String,
        spec: IntegrationSpec,
    ) -> Result<Integration> {
        validate_spec(&spec)?;

        let mut integration = self.get_required(id)?;
        integration.nickname = nickname;
        integration.spec = spec;
        integration.updated_at = Utc::now().to_rfc3339();
        self.integrations.update(integration).await
    }

    pub async fn set_active(&self, id: &str, active: bool) -> Result<Integration> {
        let mut integration = self.get_required(id)?;
        integration.active = active;
        integration.updated_at = Utc::now().to_rfc3339();
        self.integrations.update(integration).await
    }

    pub async fn delete(&self, id: &str) -> Result<usize> {
        self.integrations.delete(id).await
    }

    /// Opts a photo out of a specific integration's photo events.
    pub async fn exclude_photo(
        &self,
        photo_id: &str,
        integration_id: &str,
    ) -> Result<ExclusionRule> {
        self.get_required(integration_id)?;
        let rule = ExclusionRule {
            id: Uuid::new_v4().to_string(),
            photo_id: photo_id.to_string(),
            integration_id: integration_id.to_string(),
        };
        self.exclusions.insert(rule).await
    }

    pub async fn include_photo(&self, photo_id: &str, integration_id: &str) -> Result<usize> {
        self.exclusions.delete(photo_id, integration_id).await
    }

    /// Sets per-photo parameters for a plugin integration.
    ///
    /// The block is validated for the `key: value` line format and duplicate
    /// keys before it is stored.
    pub async fn set_photo_parameters(
        &self,
        integration_id: &str,
        photo_id: &str,
        parameters: String,
    ) -> Result<PhotoParameters> {
        kv_text::parse_kv_block(&parameters)?;
        self.get_required(integration_id)?;

        let existing_id = self
            .parameters
            .get(integration_id, photo_id)?
            .map(|p| p.id);
        let record = PhotoParameters {
            id: existing_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            integration_id: integration_id.to_string(),
            photo_id: photo_id.to_string(),
            parameters,
        };
        self.parameters.upsert(record).await
    }

    pub async fn clear_photo_parameters(
        &self,
        integration_id: &str,
        photo_id: &str,
    ) -> Result<usize> {
        self.parameters.delete(integration_id, photo_id).await
    }

    fn get_required(&self, id: &str) -> Result<Integration> {
        self.integrations.get_by_id(id)?.ok_or_else(|| {
            crate::errors::DatabaseError::NotFound(format!("Integration {}", id)).into()
        })
    }
}

/// Validates the operator-supplied text fields of a spec.
fn validate_spec(spec: &IntegrationSpec) -> Result<()> {
    match spec {
        IntegrationSpec::HttpCall(http) => {
            if http.url.trim().is_empty() {
                return Err(ValidationError::MissingField("url".to_string()).into());
            }
            kv_text::parse_header_block(&http.headers)?;
        }
        IntegrationSpec::Plugin(plugin) => {
            if plugin.module.trim().is_empty() {
                return Err(ValidationError::MissingField("module".to_string()).into());
            }
            kv_text::parse_kv_block(&plugin.config)?;
        }
    }
    Ok(())
}
