//! Implementation of the `scopelock run` command.
//!
//! Waits for the lock, runs the program as a child process and releases the
//! lease when the child exits. The child's stdio is inherited.

use super::CommandContext;
use scopelock::error::{Result, ScopeLockError};
use scopelock::events::{Event, EventAction};
use scopelock::locks::LockScope;
use serde_json::json;
use std::process::Command as ProcessCommand;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Run `program` while holding the lock for `scope`.
///
/// # Returns
///
/// * `Ok(())` - The program ran and exited successfully
/// * `Err(ScopeLockError::Timeout)` - The lock was not acquired within `timeout_ms`
/// * `Err(ScopeLockError::CommandFailed)` - The program exited unsuccessfully
/// * `Err(ScopeLockError::UserError)` - Bad scope or the program could not be started
pub fn cmd_run(ctx: &CommandContext, scope: LockScope, timeout_ms: u64, program: &[String]) -> Result<()> {
    let Some((program, args)) = program.split_first() else {
        return Err(ScopeLockError::UserError("no program given to run".to_string()));
    };

    let mut lock = ctx.lock(scope)?;
    let key = lock.key().clone();
    let start = Instant::now();

    let guard = match lock.guard(Duration::from_millis(timeout_ms)) {
        Ok(guard) => guard,
        Err(e) => {
            ctx.record(Event::new(EventAction::Timeout, &key).with_details(json!({
                "timeout_ms": timeout_ms,
                "program": program,
            })));
            return Err(e);
        }
    };

    let waited_ms = start.elapsed().as_millis() as u64;
    info!(key = %key, waited_ms, program = %program, "lock acquired");
    ctx.record(Event::new(EventAction::Acquire, &key).with_details(json!({
        "waited_ms": waited_ms,
        "program": program,
        "pid": std::process::id(),
    })));

    let status = ProcessCommand::new(program).args(args).status();

    if !guard.is_held() {
        warn!(key = %key, "lease expired while the program was running; exclusion was not guaranteed");
    }
    drop(guard);
    info!(key = %key, "lock released");

    let code = status.as_ref().ok().and_then(|status| status.code());
    ctx.record(Event::new(EventAction::Release, &key).with_details(json!({
        "held_ms": (start.elapsed().as_millis() as u64).saturating_sub(waited_ms),
        "exit_code": code,
    })));

    let status = status.map_err(|e| {
        ScopeLockError::UserError(format!("failed to run '{}': {}", program, e))
    })?;

    if status.success() {
        Ok(())
    } else {
        // Killed by a signal has no exit code.
        Err(ScopeLockError::CommandFailed {
            code: code.unwrap_or(-1),
        })
    }
}
