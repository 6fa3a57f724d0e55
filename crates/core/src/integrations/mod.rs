//! Registered external notification targets.

pub mod model;
pub mod service;
pub mod traits;

pub use model::{
    ExclusionRule, HttpCallSpec, HttpMethod, Integration, IntegrationKind, IntegrationSpec,
    PhotoParameters, PluginSpec,
};
pub use service::IntegrationService;
pub use traits::{ExclusionStoreTrait, IntegrationStoreTrait, PhotoParameterStoreTrait};
