//! Execution context resolution for scopelock.
//!
//! A lock key is derived from three ambient identities: the script every
//! caller belongs to, the document the caller is bound to (if any), and the
//! acting user. This module resolves them once per process so the
//! [`crate::locks::LockManager`] can turn a scope into a key.
//!
//! Each identity is taken from the first source that provides it:
//! 1. An explicit override (CLI flag or embedding code)
//! 2. The environment (`SCOPELOCK_SCRIPT_ID`, `SCOPELOCK_DOCUMENT_ID`, `SCOPELOCK_USER_ID`)
//! 3. The config file (`script_id`) or the login name (user)
//!
//! There is no fallback for the document: without one, document-scoped locks
//! are unavailable.

use crate::config::Config;
use crate::error::{Result, ScopeLockError};
use std::env;

/// Environment variable naming the script.
pub const SCRIPT_ID_ENV: &str = "SCOPELOCK_SCRIPT_ID";

/// Environment variable naming the bound document.
pub const DOCUMENT_ID_ENV: &str = "SCOPELOCK_DOCUMENT_ID";

/// Environment variable naming the acting user.
pub const USER_ID_ENV: &str = "SCOPELOCK_USER_ID";

/// Identities a lock key can be derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    script_id: String,
    document_id: Option<String>,
    user_id: String,
}

/// Explicit identities that take precedence over environment and config.
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub script_id: Option<String>,
    pub document_id: Option<String>,
    pub user_id: Option<String>,
}

impl ExecutionContext {
    /// Context with no bound document.
    pub fn new(script_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            script_id: script_id.into(),
            document_id: None,
            user_id: user_id.into(),
        }
    }

    /// Bind this context to a document.
    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Resolve the context from overrides, the environment and `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(ExecutionContext)` - All identities resolved
    /// * `Err(ScopeLockError::UserError)` - An explicitly given identity is empty
    pub fn resolve(config: &Config, overrides: &ContextOverrides) -> Result<Self> {
        let script_id = pick(overrides.script_id.as_deref(), SCRIPT_ID_ENV, "script id")?
            .unwrap_or_else(|| config.script_id.clone());

        let document_id = pick(overrides.document_id.as_deref(), DOCUMENT_ID_ENV, "document id")?;

        let user_id = pick(overrides.user_id.as_deref(), USER_ID_ENV, "user id")?
            .unwrap_or_else(login_name);

        Ok(Self {
            script_id,
            document_id,
            user_id,
        })
    }

    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    /// The bound document, if this execution has one.
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Take an explicit value, else a non-empty environment variable.
fn pick(explicit: Option<&str>, env_var: &str, what: &str) -> Result<Option<String>> {
    if let Some(value) = explicit {
        let value = value.trim();
        if value.is_empty() {
            return Err(ScopeLockError::UserError(format!("{} must not be empty", what)));
        }
        return Ok(Some(value.to_string()));
    }

    Ok(env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

/// Login name of the current user, or `unknown`.
pub fn login_name() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
