pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod goods;
pub mod order;

use std::fmt;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cart::{AddOutcome, Cart, CartStorage, CartStoreError, FileCartStorage, MemoryCartStorage};
pub use catalog::{Facet, FilterCriteria, SortKey};
pub use config::{load_app_config, load_app_config_from_env};
pub use delivery::{DeliveryFeePolicy, DeliveryInterval, FeeRule};
pub use goods::Good;
pub use order::{
    FieldError, FieldProblem, NewOrder, Order, OrderDraft, OrderField, OrderPatch,
    OrderValidationError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A user-facing message produced when an operation succeeds visibly or
/// degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
