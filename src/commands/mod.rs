//! Command implementations for scopelock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Commands that touch locks run against a
//! [`CommandContext`], which bundles the lock manager with the audit log
//! destination so tests can drive them over an in-memory store.

mod clear;
mod run;
mod status;

pub use clear::cmd_clear;
pub use run::cmd_run;
pub use status::{cmd_list, cmd_status};

use crate::cli::{Cli, Command, ScopeArgs};
use scopelock::config::{Config, DEFAULT_CONFIG_PATH, StoreBackend};
use scopelock::context::ExecutionContext;
use scopelock::error::{Result, ScopeLockError};
use scopelock::events::{Event, append_event};
use scopelock::locks::{Lock, LockManager, LockScope};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Everything a lock command needs beyond its own arguments.
pub struct CommandContext {
    pub manager: LockManager,
    /// Store directory receiving audit events, if auditing is on.
    pub audit_dir: Option<PathBuf>,
}

impl CommandContext {
    /// Resolve the execution context and open the configured store.
    pub fn from_config(config: &Config, scope: &ScopeArgs) -> Result<Self> {
        let context = ExecutionContext::resolve(config, &scope.overrides())?;
        let manager = LockManager::from_config(config, context)?;

        // The memory backend has no shared directory to log into.
        let audit_dir = (config.audit_log && config.store.backend == StoreBackend::File)
            .then(|| config.store.dir.clone());

        Ok(Self { manager, audit_dir })
    }

    /// Handle on the lock for `scope`.
    ///
    /// # Returns
    ///
    /// * `Ok(Lock)` - The scope resolved to a key
    /// * `Err(ScopeLockError::UserError)` - Document scope without a bound document
    pub fn lock(&self, scope: LockScope) -> Result<Lock> {
        self.manager.get(scope).ok_or_else(|| {
            ScopeLockError::UserError(
                "document scope requires a bound document (use --document or set SCOPELOCK_DOCUMENT_ID)"
                    .to_string(),
            )
        })
    }

    /// Append an audit event. Failures are logged and otherwise ignored.
    pub fn record(&self, event: Event) {
        let Some(dir) = &self.audit_dir else {
            return;
        };
        if let Err(e) = append_event(dir, &event) {
            warn!(action = %event.action, key = %event.key, error = %e, "failed to append audit event");
        }
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let scope_args = cli.scope_args();

    match cli.command {
        Command::Config => cmd_config(&config),
        Command::List => cmd_list(scopelock::store::open(&config.store)?.as_ref()),
        Command::Status(_) => {
            let ctx = CommandContext::from_config(&config, &scope_args)?;
            cmd_status(&ctx, scope_args.lock_scope())
        }
        Command::Run(args) => {
            let ctx = CommandContext::from_config(&config, &scope_args)?;
            cmd_run(&ctx, scope_args.lock_scope(), args.timeout_ms, &args.program)
        }
        Command::Clear(args) => {
            let ctx = CommandContext::from_config(&config, &scope_args)?;
            cmd_clear(&ctx, scope_args.lock_scope(), args.force)
        }
    }
}

/// Load the config named on the command line, or the default file if present.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_or_default(DEFAULT_CONFIG_PATH),
    }
}

/// Print the effective configuration as YAML.
pub fn cmd_config(config: &Config) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}
