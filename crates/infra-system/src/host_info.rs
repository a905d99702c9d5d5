// Host information probe
// reason: sysinfo for cross-platform system facts without shelling out
use async_trait::async_trait;
use std::path::Path;
use sysinfo::{Disks, System};
use tracing::debug;

use hostaudit_core::application::{Capability, ProbeContext};
use hostaudit_core::domain::{ProbeError, ProbeValue, ValueMap};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Snapshot of the host: OS, kernel, hardware, memory and root disk usage
///
/// Runs no commands; everything comes from `sysinfo` on a blocking thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostInfoProbe;

impl HostInfoProbe {
    pub fn new() -> Self {
        Self
    }
}

/// Collect host facts (blocking)
fn collect() -> ValueMap {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu();

    let unknown = || "Unknown".to_string();

    let disks = Disks::new_with_refreshed_list();
    let root_usage = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .filter(|d| d.total_space() > 0)
        .map(|d| {
            let used = d.total_space() - d.available_space();
            format!("{:.1}%", used as f64 * 100.0 / d.total_space() as f64)
        })
        .unwrap_or_else(unknown);

    let map = ValueMap::new()
        .with("program_version", hostaudit_core::VERSION)
        .with("operating_system", System::name().unwrap_or_else(unknown))
        .with(
            "operating_system_name",
            System::long_os_version().unwrap_or_else(unknown),
        )
        .with(
            "operating_system_version",
            System::os_version().unwrap_or_else(unknown),
        )
        .with("kernel_version", System::kernel_version().unwrap_or_else(unknown))
        .with("hardware_platform", std::env::consts::ARCH)
        .with("hostname", System::host_name().unwrap_or_else(unknown))
        .with("uptime", format_uptime(System::uptime()))
        .with("cpu_count", sys.cpus().len().to_string())
        .with(
            "total_memory",
            format!("{:.2} GB", sys.total_memory() as f64 / GIB),
        )
        .with(
            "available_memory",
            format!("{:.2} GB", sys.available_memory() as f64 / GIB),
        )
        .with("disk_usage", root_usage)
        .with(
            "user_running_script",
            std::env::var("USER").unwrap_or_else(|_| unknown()),
        )
        .with(
            "language",
            std::env::var("LANG").unwrap_or_else(|_| unknown()),
        );

    debug!(entries = map.len(), "Host information collected");
    map
}

/// "up 3 days, 4 hours, 5 minutes" style
fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("{} {}", n, unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(plural(minutes, "minute"));
    }
    format!("up {}", parts.join(", "))
}

#[async_trait]
impl Capability for HostInfoProbe {
    async fn run(&self, _ctx: ProbeContext) -> Result<ProbeValue, ProbeError> {
        let map = tokio::task::spawn_blocking(collect)
            .await
            .map_err(|e| ProbeError::failed(format!("host info collection failed: {}", e)))?;
        Ok(ProbeValue::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostaudit_core::domain::ProbeKey;
    use hostaudit_core::port::command_runner::mocks::MockCommandRunner;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "up 0 minutes");
        assert_eq!(format_uptime(61), "up 1 minute");
        assert_eq!(format_uptime(90_061), "up 1 day, 1 hour, 1 minute");
        assert_eq!(format_uptime(2 * 86_400 + 7_200), "up 2 days, 2 hours");
    }

    #[tokio::test]
    async fn test_host_info_runs_no_commands() {
        let runner = Arc::new(MockCommandRunner::new());
        let ctx = ProbeContext::new(
            ProbeKey::new("sys_info", "host"),
            runner.clone(),
            Duration::from_secs(20),
        );

        let value = HostInfoProbe::new().run(ctx).await.unwrap();

        let map = value.as_map().unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys[0], "program_version");
        assert!(map.get("kernel_version").is_some());
        assert!(map
            .get("total_memory")
            .and_then(|v| v.as_text())
            .unwrap()
            .ends_with(" GB"));
        assert_eq!(runner.call_count(), 0);
    }
}
