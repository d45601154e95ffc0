pub mod app_config;
pub mod catalog;
pub mod config;
pub mod generator;
pub mod reconcile;
pub mod search;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, LocationCatalog, DEFAULT_TOP_TIER};
pub use config::{load_app_config, load_app_config_from_env, resolve_catalog};
pub use generator::{generate, GenerateError, GenerationRequest};
pub use reconcile::{
    FailureReason, ReconcileFailure, ReconcileOutcome, ReconcileStatus, Reconciler, SearchStore,
    StoreError,
};
pub use search::{canonicalize, validate_search};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[source] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}
