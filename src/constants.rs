// src/constants.rs

pub const GREETING: &str = "220 ferroftpd ready.";
pub const SYST_ID: &str = "215 UNIX Type: L8";

/// Synthetic owner/group shown in LIST output; the storage backends do not
/// carry ownership information.
pub const LIST_OWNER: &str = "owner";
pub const LIST_GROUP: &str = "group";
pub const LIST_PERMS_FILE: &str = "-rwxr-xr-x";
pub const LIST_PERMS_DIR: &str = "drwxr-xr-x";

pub const DATA_BUFFER_SIZE: usize = 64 * 1024;

/// Upper bound for a single rate-limiter sleep.
pub const RATE_LIMIT_MAX_WAIT_SECS: u64 = 5;
