// Port Layer - Interfaces for external dependencies

pub mod command_runner;
pub mod report_sink;
pub mod time_provider;

// Re-exports
pub use command_runner::{
    CommandError, CommandInvocation, CommandLine, CommandResult, CommandRunner, CommandStatus,
};
pub use report_sink::{ReportSink, SinkError};
pub use time_provider::TimeProvider;
