use super::config::ConfigError;
use crate::core::models::catalog::CatalogError;
use crate::core::research::data::ResearchError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid optimization request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Research data error: {source}")]
    Research {
        #[from]
        source: ResearchError,
    },

    #[error("Tool catalog error: {source}")]
    Catalog {
        #[from]
        source: CatalogError,
    },

    #[error("Entity store error: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("Optimization phase '{phase}' failed: {reason}")]
    PhaseFailed { phase: &'static str, reason: String },
}
