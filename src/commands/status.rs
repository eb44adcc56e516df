//! Implementation of the `scopelock status` and `scopelock list` commands.
//!
//! Both are diagnostics: what they print may be stale by the time it is read.

use super::CommandContext;
use scopelock::error::Result;
use scopelock::locks::{LockKey, LockScope};
use scopelock::store::{Lease, LeaseStore};
use std::time::Duration;

/// Print who holds the lock for `scope`, or `free`.
pub fn cmd_status(ctx: &CommandContext, scope: LockScope) -> Result<()> {
    let lock = ctx.lock(scope)?;
    println!("{}", status_line(ctx.manager.store().as_ref(), lock.key())?);
    Ok(())
}

/// Print every lease entry in the store.
pub fn cmd_list(store: &dyn LeaseStore) -> Result<()> {
    let leases = store.list()?;

    if leases.is_empty() {
        println!("No leases.");
        return Ok(());
    }

    println!("Leases");
    println!("======");
    println!();
    for lease in &leases {
        println!("{}", list_line(lease));
    }
    println!();
    println!("Total: {} lease(s)", leases.len());

    Ok(())
}

fn status_line(store: &dyn LeaseStore, key: &LockKey) -> Result<String> {
    Ok(match store.peek(key)? {
        Some(lease) => format!(
            "{}: held by {}{} for {}, expires in {}",
            key,
            lease.owner,
            pid_suffix(&lease),
            lease.age_string(),
            format_duration(lease.remaining())
        ),
        None => format!("{}: free", key),
    })
}

fn list_line(lease: &Lease) -> String {
    let expiry = if lease.is_expired() {
        "[EXPIRED]".to_string()
    } else {
        format!("expires in {}", format_duration(lease.remaining()))
    };

    format!(
        "  {} (by {}{}, {} ago, {})",
        lease.key,
        lease.owner,
        pid_suffix(lease),
        lease.age_string(),
        expiry
    )
}

fn pid_suffix(lease: &Lease) -> String {
    lease
        .pid
        .map(|pid| format!(" pid {}", pid))
        .unwrap_or_default()
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
