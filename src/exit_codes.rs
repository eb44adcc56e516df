//! Exit code constants for the scopelock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config, missing context)
//! - 2: The guarded command exited unsuccessfully
//! - 3: Lease store failure
//! - 4: Lock could not be acquired before the timeout

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or missing context.
pub const USER_ERROR: i32 = 1;

/// The command run under the lock failed or could not be started.
pub const COMMAND_FAILURE: i32 = 2;

/// The lease store could not be read or written.
pub const STORE_FAILURE: i32 = 3;

/// Lock acquisition timed out.
pub const LOCK_TIMEOUT: i32 = 4;
