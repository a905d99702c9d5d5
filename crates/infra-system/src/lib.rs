// HostAudit Infrastructure - System Adapters
// Implements: CommandRunner, ReportSink, and the sysinfo-backed host probe

pub mod host_info;
pub mod json_sink;
pub mod subprocess_runner;

pub use host_info::HostInfoProbe;
pub use json_sink::JsonFileSink;
pub use subprocess_runner::SubprocessRunner;
