//! Implementation of the `scopelock clear` command.
//!
//! Removes the lease on a lock regardless of who holds it. The previous
//! holder is not told; its own release later becomes a no-op.

use super::CommandContext;
use scopelock::error::{Result, ScopeLockError};
use scopelock::events::{Event, EventAction};
use scopelock::locks::LockScope;
use serde_json::json;
use tracing::info;

/// Forcibly remove the lease for `scope`.
///
/// # Returns
///
/// * `Ok(())` - The lease was removed, or there was none
/// * `Err(ScopeLockError::UserError)` - `force` was not given, or the scope is unavailable
pub fn cmd_clear(ctx: &CommandContext, scope: LockScope, force: bool) -> Result<()> {
    let lock = ctx.lock(scope)?;
    let key = lock.key();

    if !force {
        return Err(ScopeLockError::UserError(format!(
            "refusing to clear lock '{}' without --force\n\n\
             Clearing bypasses the holder's token; the holder will not notice.",
            key
        )));
    }

    match ctx.manager.store().clear(key)? {
        Some(lease) => {
            info!(key = %key, previous_owner = %lease.owner, "lease cleared");
            ctx.record(Event::new(EventAction::Clear, key).with_details(json!({
                "previous_owner": lease.owner,
                "previous_pid": lease.pid,
                "was_expired": lease.is_expired(),
            })));
            println!("Cleared lock '{}' (was held by {}, {} ago)", key, lease.owner, lease.age_string());
        }
        None => println!("No lease on '{}'", key),
    }

    Ok(())
}
