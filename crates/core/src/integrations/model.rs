use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// HTTP methods an HttpCall integration may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown HTTP method: {}",
                other
            ))
            .into()),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Outbound HTTP call definition.
///
/// `url`, header values, and `body` may reference `${ENV_VAR}` placeholders;
/// they are resolved at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpCallSpec {
    pub method: HttpMethod,
    pub url: String,
    /// One header per line in the format `Header: Value`.
    #[serde(default)]
    pub headers: String,
    #[serde(default)]
    pub body: String,
}

/// In-process plugin definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    /// Manifest file stem under the configured plugin directory.
    pub module: String,
    /// One entry per line in the format `key: value`; values may reference
    /// `${ENV_VAR}` placeholders resolved at execution time.
    #[serde(default)]
    pub config: String,
}

/// The two integration variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrationSpec {
    HttpCall(HttpCallSpec),
    Plugin(PluginSpec),
}

impl IntegrationSpec {
    pub fn kind(&self) -> IntegrationKind {
        match self {
            IntegrationSpec::HttpCall(_) => IntegrationKind::HttpCall,
            IntegrationSpec::Plugin(_) => IntegrationKind::Plugin,
        }
    }
}

/// Discriminator for the two integration variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationKind {
    HttpCall,
    Plugin,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::HttpCall => "HTTP_CALL",
            IntegrationKind::Plugin => "PLUGIN",
        }
    }
}

/// A registered external notification target.
///
/// `id` is the stable identity: it is never reused and run history joins on
/// it, so renaming an integration never breaks its audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: String,
    pub nickname: String,
    pub active: bool,
    #[serde(flatten)]
    pub spec: IntegrationSpec,
    pub created_at: String,
    pub updated_at: String,
}

impl Integration {
    pub fn kind(&self) -> IntegrationKind {
        self.spec.kind()
    }

    /// The plugin module reference, if this is a Plugin integration.
    pub fn plugin_module(&self) -> Option<&str> {
        match &self.spec {
            IntegrationSpec::Plugin(spec) => Some(spec.module.as_str()),
            IntegrationSpec::HttpCall(_) => None,
        }
    }
}

impl std::fmt::Display for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.nickname.is_empty() {
            return write!(f, "{}", self.nickname);
        }
        match &self.spec {
            IntegrationSpec::HttpCall(spec) => write!(f, "{} {}", spec.method, spec.url),
            IntegrationSpec::Plugin(spec) => write!(f, "plugin:{}", spec.module),
        }
    }
}

/// Persistent per-photo opt-out from a specific integration.
///
/// The (photo, integration) pair is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    pub id: String,
    pub photo_id: String,
    pub integration_id: String,
}

/// Per-photo key/value overrides handed to a plugin's photo handlers.
///
/// The (integration, photo) pair is unique; `parameters` is a validated
/// `key: value` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoParameters {
    pub id: String,
    pub integration_id: String,
    pub photo_id: String,
    pub parameters: String,
}
