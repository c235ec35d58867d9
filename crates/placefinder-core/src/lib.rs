//! Shared configuration and domain vocabulary for placefinder.
//!
//! Holds the env-driven [`AppConfig`], the partner directory file loader,
//! and the closed enums (`CategoryTag`, `PartnerTier`, `Language`) that the
//! engine and CLI both speak.

pub mod app_config;
pub mod category;
pub mod config;
pub mod partners;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use category::{CategoryTag, Language, ParseCategoryError, ParseLanguageError};
pub use config::{load_app_config, load_app_config_from_env};
pub use partners::{load_partners, PartnerConfig, PartnerTier, PartnersFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read partners file {path}: {source}")]
    PartnersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse partners file: {0}")]
    PartnersFileParse(#[source] serde_yaml::Error),

    #[error("partners file validation failed: {0}")]
    Validation(String),
}
