// Executor constants (no magic values)
use std::time::Duration;

/// Default per-command timeout when a category sets none (20s)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(20);

/// Default timeout for security-scanning categories (30s)
/// Scanners like lynis/rkhunter/clamscan are slower than plain introspection
pub const SECURITY_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

/// Time in-flight probes get to report after cancellation (5s)
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Time between SIGTERM and SIGKILL when a command times out (500ms)
/// Shared with SubprocessRunner (infra-system)
pub const TERMINATE_GRACE: Duration = Duration::from_millis(500);
