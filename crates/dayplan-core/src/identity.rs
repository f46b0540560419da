//! Already-authenticated caller identity.
//!
//! The core never authenticates anyone. It receives a resolved identity and
//! uses it to scope every task-store call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, ValidationError};
use crate::storage::IdentityConfig;

pub const USER_ENV: &str = "DAYPLAN_USER";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    user_id: String,
}

impl Identity {
    /// # Errors
    /// Empty or whitespace-only ids.
    pub fn new(user_id: impl Into<String>) -> Result<Self, ValidationError> {
        let user_id = user_id.into().trim().to_string();
        if user_id.is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Picks the first non-blank of: `explicit`, `$DAYPLAN_USER`, the
    /// configured id.
    ///
    /// # Errors
    /// None of them is set.
    pub fn resolve(explicit: Option<&str>, config: &IdentityConfig) -> Result<Self, ConfigError> {
        let from_env = std::env::var(USER_ENV).ok();
        Self::first_of([explicit, from_env.as_deref(), config.user_id.as_deref()])
    }

    fn first_of<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Result<Self, ConfigError> {
        candidates
            .into_iter()
            .flatten()
            .find_map(|id| Self::new(id).ok())
            .ok_or_else(|| ConfigError::MissingKey("identity.user_id".into()))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_id)
    }
}
