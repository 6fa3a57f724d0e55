use diesel::prelude::*;

use photofolio_core::errors::{DatabaseError, Error};
use photofolio_core::integrations::{
    ExclusionRule, HttpCallSpec, Integration, IntegrationKind, IntegrationSpec, PhotoParameters,
    PluginSpec,
};

/// Database row for an integration.
///
/// The two variants share one table; `kind` discriminates and the per-kind
/// columns are nullable.
#[derive(Queryable, Insertable, AsChangeset, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::integrations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IntegrationDb {
    pub id: String,
    pub nickname: String,
    pub kind: String,
    pub active: bool,
    pub http_method: Option<String>,
    pub url: Option<String>,
    pub headers: Option<String>,
    pub body: Option<String>,
    pub plugin_module: Option<String>,
    pub plugin_config: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Integration> for IntegrationDb {
    fn from(integration: Integration) -> Self {
        let mut row = IntegrationDb {
            id: integration.id,
            nickname: integration.nickname,
            kind: integration.spec.kind().as_str().to_string(),
            active: integration.active,
            http_method: None,
            url: None,
            headers: None,
            body: None,
            plugin_module: None,
            plugin_config: None,
            created_at: integration.created_at,
            updated_at: integration.updated_at,
        };
        match integration.spec {
            IntegrationSpec::HttpCall(spec) => {
                row.http_method = Some(spec.method.as_str().to_string());
                row.url = Some(spec.url);
                row.headers = Some(spec.headers);
                row.body = Some(spec.body);
            }
            IntegrationSpec::Plugin(spec) => {
                row.plugin_module = Some(spec.module);
                row.plugin_config = Some(spec.config);
            }
        }
        row
    }
}

impl TryFrom<IntegrationDb> for Integration {
    type Error = Error;

    fn try_from(row: IntegrationDb) -> Result<Self, Self::Error> {
        let spec = match row.kind.as_str() {
            k if k == IntegrationKind::HttpCall.as_str() => {
                let method = row
                    .http_method
                    .ok_or_else(|| corrupt_row(&row.id, "http_method"))?
                    .parse()?;
                IntegrationSpec::HttpCall(HttpCallSpec {
                    method,
                    url: row.url.ok_or_else(|| corrupt_row(&row.id, "url"))?,
                    headers: row.headers.unwrap_or_default(),
                    body: row.body.unwrap_or_default(),
                })
            }
            k if k == IntegrationKind::Plugin.as_str() => IntegrationSpec::Plugin(PluginSpec {
                module: row
                    .plugin_module
                    .ok_or_else(|| corrupt_row(&row.id, "plugin_module"))?,
                config: row.plugin_config.unwrap_or_default(),
            }),
            other => {
                return Err(Error::Database(DatabaseError::Internal(format!(
                    "Integration {} has unknown kind '{}'",
                    row.id, other
                ))))
            }
        };
        Ok(Integration {
            id: row.id,
            nickname: row.nickname,
            active: row.active,
            spec,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn corrupt_row(id: &str, column: &str) -> Error {
    Error::Database(DatabaseError::Internal(format!(
        "Integration {} is missing its {} column",
        id, column
    )))
}

/// Database row for a photo exclusion rule.
#[derive(Queryable, Insertable, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::photo_exclusions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExclusionDb {
    pub id: String,
    pub photo_id: String,
    pub integration_id: String,
}

impl From<ExclusionRule> for ExclusionDb {
    fn from(rule: ExclusionRule) -> Self {
        ExclusionDb {
            id: rule.id,
            photo_id: rule.photo_id,
            integration_id: rule.integration_id,
        }
    }
}

impl From<ExclusionDb> for ExclusionRule {
    fn from(row: ExclusionDb) -> Self {
        ExclusionRule {
            id: row.id,
            photo_id: row.photo_id,
            integration_id: row.integration_id,
        }
    }
}

/// Database row for per-photo plugin parameters.
#[derive(Queryable, Insertable, AsChangeset, Identifiable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::photo_parameters)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PhotoParametersDb {
    pub id: String,
    pub integration_id: String,
    pub photo_id: String,
    pub parameters: String,
}

impl From<PhotoParameters> for PhotoParametersDb {
    fn from(parameters: PhotoParameters) -> Self {
        PhotoParametersDb {
            id: parameters.id,
            integration_id: parameters.integration_id,
            photo_id: parameters.photo_id,
            parameters: parameters.parameters,
        }
    }
}

impl From<PhotoParametersDb> for PhotoParameters {
    fn from(row: PhotoParametersDb) -> Self {
        PhotoParameters {
            id: row.id,
            integration_id: row.integration_id,
            photo_id: row.photo_id,
            parameters: row.parameters,
        }
    }
}
