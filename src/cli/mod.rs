//! CLI argument parsing for scopelock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand, ValueEnum};
use scopelock::context::ContextOverrides;
use scopelock::locks::LockScope;
use std::path::PathBuf;

/// Scopelock: scoped lease locks for scripts sharing a lease store.
///
/// Every command works on the lock selected by `--scope` in the current
/// execution context (script, bound document and acting user).
#[derive(Parser, Debug)]
#[command(name = "scopelock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to .scopelock/config.yaml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for scopelock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a program while holding the lock.
    ///
    /// Waits up to `--timeout-ms` for the lease, runs the program as a
    /// child process, then releases. The program's failure is propagated.
    Run(RunArgs),

    /// Show who holds the lock, or `free`.
    Status(ScopeArgs),

    /// List every lease entry in the store.
    List,

    /// Forcibly remove the lease on the lock.
    ///
    /// Other holders are not notified; use only to recover from a stuck lease.
    Clear(ClearArgs),

    /// Print the effective configuration as YAML.
    Config,
}

/// Lock scope as accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeArg {
    #[default]
    Global,
    Document,
    User,
}

impl From<ScopeArg> for LockScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Global => LockScope::Global,
            ScopeArg::Document => LockScope::Document,
            ScopeArg::User => LockScope::User,
        }
    }
}

/// Selects the lock and overrides the execution context.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Which lock to use.
    #[arg(long, value_enum, default_value_t = ScopeArg::Global)]
    pub scope: ScopeArg,

    /// Script identifier (overrides SCOPELOCK_SCRIPT_ID and config).
    #[arg(long = "script")]
    pub script_id: Option<String>,

    /// Bound document (overrides SCOPELOCK_DOCUMENT_ID).
    #[arg(long = "document")]
    pub document_id: Option<String>,

    /// Acting user (overrides SCOPELOCK_USER_ID and the login name).
    #[arg(long = "user")]
    pub user_id: Option<String>,
}

impl ScopeArgs {
    pub fn lock_scope(&self) -> LockScope {
        self.scope.into()
    }

    pub fn overrides(&self) -> ContextOverrides {
        ContextOverrides {
            script_id: self.script_id.clone(),
            document_id: self.document_id.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// How long to wait for the lock, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Program to run and its arguments.
    #[arg(required = true, last = true, num_args = 1..)]
    pub program: Vec<String>,
}

/// Arguments for the `clear` command.
#[derive(Args, Debug)]
pub struct ClearArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Required; clearing bypasses the holder's token.
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Context flags of the chosen command, if it takes any.
    pub fn scope_args(&self) -> ScopeArgs {
        match &self.command {
            Command::Run(args) => args.scope.clone(),
            Command::Status(args) => args.clone(),
            Command::Clear(args) => args.scope.clone(),
            Command::List | Command::Config => ScopeArgs::default(),
        }
    }
}
