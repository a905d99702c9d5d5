//! Audit run integration tests
//!
//! Full runs against real processes: registry → executor → aggregator → sinks.

#![cfg(target_os = "linux")]

use std::sync::Arc;
use std::time::{Duration, Instant};

use hostaudit_core::application::{cancel_channel, Executor, ExecutorConfig, ProbeContext, ProbeRegistry};
use hostaudit_core::domain::{OutcomeStatus, ProbeError, ProbeValue, RunStatus, DID_NOT_COMPLETE};
use hostaudit_core::port::time_provider::SystemTimeProvider;
use hostaudit_core::port::ReportSink;
use hostaudit_infra_system::{HostInfoProbe, JsonFileSink, SubprocessRunner};

mod common;
use common::{background_sleep_script, read_pid, wait_until_gone};

fn executor(config: ExecutorConfig) -> Executor {
    let time_provider = Arc::new(SystemTimeProvider);
    let runner = Arc::new(SubprocessRunner::new(time_provider.clone(), vec!["PATH".to_string()]));
    Executor::new(runner, config, time_provider)
}

/// A registry of probes that each sleep for the given number of seconds and report their name
fn sleeping_registry(probes: &[(&'static str, &'static str, f64)]) -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    for &(category, name, secs) in probes {
        registry
            .register_fn(category, name, move |ctx: ProbeContext| async move {
                let out = ctx.shell(&format!("sleep {}; echo {}", secs, name)).await?;
                Ok(ProbeValue::text(out))
            })
            .unwrap();
    }
    registry
}

#[tokio::test]
async fn test_network_scenario_with_two_workers() {
    let mut registry = ProbeRegistry::new();
    registry
        .register_fn("net", "dns", |ctx: ProbeContext| async move {
            Ok(ProbeValue::text(ctx.shell("echo 8.8.8.8").await?))
        })
        .unwrap();
    registry
        .register_fn("net", "gateway", |_ctx: ProbeContext| async move {
            Err::<ProbeValue, _>(ProbeError::failed("no default route"))
        })
        .unwrap();

    let report = executor(ExecutorConfig::default().with_concurrency(2))
        .run_to_completion(&registry)
        .await;

    assert_eq!(report.status(), RunStatus::Completed);

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    let net = &json["sections"]["net"];
    assert_eq!(net["dns"]["status"], "SUCCESS");
    assert_eq!(net["dns"]["value"], "8.8.8.8");
    assert_eq!(net["gateway"]["status"], "FAILURE");
    assert_eq!(net["gateway"]["error_message"], "no default route");
    assert!(net["gateway"].get("value").is_none());

    let summary = report.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_report_order_ignores_completion_order() {
    // a finishes last, c first
    let registry = sleeping_registry(&[
        ("net", "a", 0.6),
        ("net", "b", 0.3),
        ("net", "c", 0.0),
        ("kernel", "d", 0.1),
    ]);

    let report = executor(ExecutorConfig::default().with_concurrency(4))
        .run_to_completion(&registry)
        .await;

    assert_eq!(report.categories().collect::<Vec<_>>(), vec!["net", "kernel"]);
    let net = report.section("net").unwrap();
    assert_eq!(net.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(net.get("c").unwrap().value(), Some(&ProbeValue::text("c")));
}

#[tokio::test]
async fn test_concurrency_limit_bounds_wall_time() {
    let registry = sleeping_registry(&[
        ("slow", "one", 0.4),
        ("slow", "two", 0.4),
        ("slow", "three", 0.4),
        ("slow", "four", 0.4),
    ]);

    let start = Instant::now();
    let report = executor(ExecutorConfig::default().with_concurrency(2))
        .run_to_completion(&registry)
        .await;
    let elapsed = start.elapsed();

    assert_eq!(report.summary().succeeded, 4);
    // Two batches of two: at least 0.8s, far less than the serial 1.6s
    assert!(elapsed >= Duration::from_millis(790), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_command_timeout_is_reported_per_probe() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("hung.pid");
    let script = background_sleep_script(&pid_file);

    let mut registry = ProbeRegistry::new();
    registry
        .register_fn("kernel", "hung", move |ctx: ProbeContext| {
            let script = script.clone();
            async move { Ok(ProbeValue::text(ctx.shell(&script).await?)) }
        })
        .unwrap();
    registry
        .register_fn("kernel", "quick", |ctx: ProbeContext| async move {
            Ok(ProbeValue::text(ctx.shell("echo ok").await?))
        })
        .unwrap();

    let config = ExecutorConfig::default().with_default_timeout(Duration::from_millis(300));
    let start = Instant::now();
    let report = executor(config).run_to_completion(&registry).await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(report.status(), RunStatus::Completed);

    let hung = report.get("kernel", "hung").unwrap();
    assert_eq!(hung.status(), OutcomeStatus::Timeout);
    assert!(hung.error_message().unwrap().contains("timed out"));
    assert!(report.get("kernel", "quick").unwrap().is_success());

    let background = read_pid(&pid_file).await;
    assert!(
        wait_until_gone(background).await,
        "background sleep {} survived the timed-out run",
        background
    );
}

#[tokio::test]
async fn test_cancellation_stops_real_process() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("forever.pid");
    let script = background_sleep_script(&pid_file);

    let mut registry = ProbeRegistry::new();
    registry
        .register_fn("kernel", "forever", move |ctx: ProbeContext| {
            let script = script.clone();
            async move {
                ctx.shell(&script).await?;
                Ok(ProbeValue::text("woke up"))
            }
        })
        .unwrap();
    registry
        .register_fn("kernel", "instant", |_ctx: ProbeContext| async move {
            Ok::<_, ProbeError>(ProbeValue::text("done"))
        })
        .unwrap();

    let config = ExecutorConfig::default()
        .with_concurrency(2)
        .with_default_timeout(Duration::from_secs(60))
        .with_grace_period(Duration::from_millis(100));
    let (cancel_tx, cancel) = cancel_channel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(400)).await;
        cancel_tx.cancel();
    });

    let start = Instant::now();
    let report = executor(config).run(&registry, cancel).await;

    assert!(start.elapsed() < Duration::from_secs(5), "run hung after cancel");
    assert_eq!(report.status(), RunStatus::Cancelled);

    let forever = report.get("kernel", "forever").unwrap();
    assert_eq!(forever.status(), OutcomeStatus::Failure);
    assert_eq!(forever.error_message(), Some(DID_NOT_COMPLETE));
    assert!(report.get("kernel", "instant").unwrap().is_success());

    let background = read_pid(&pid_file).await;
    assert!(
        wait_until_gone(background).await,
        "background sleep {} survived the cancelled run",
        background
    );
}

#[tokio::test]
async fn test_run_deadline_cancels_run() {
    let registry = sleeping_registry(&[("net", "slow", 30.0), ("net", "fast", 0.0)]);

    let config = ExecutorConfig::default()
        .with_concurrency(2)
        .with_default_timeout(Duration::from_secs(60))
        .with_run_deadline(Duration::from_millis(400))
        .with_grace_period(Duration::from_millis(100));

    let start = Instant::now();
    let report = executor(config).run_to_completion(&registry).await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(report.is_cancelled());
    assert_eq!(report.get("net", "slow").unwrap().error_message(), Some(DID_NOT_COMPLETE));
    assert!(report.get("net", "fast").unwrap().is_success());
}

#[tokio::test]
async fn test_json_report_written_to_disk() {
    let mut registry = ProbeRegistry::new();
    registry.register("sys_info", "host", HostInfoProbe::new()).unwrap();
    registry
        .register_fn("kernel", "version", |ctx: ProbeContext| async move {
            Ok(ProbeValue::text(ctx.shell("uname -r").await?))
        })
        .unwrap();

    let report = executor(ExecutorConfig::default()).run_to_completion(&registry).await;

    let dir = tempfile::tempdir().unwrap();
    let sink = JsonFileSink::new(dir.path().join("reports"));
    let path = sink.write(&report).await.unwrap().unwrap();

    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("report_"));
    assert!(file_name.ends_with(".json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["status"], "COMPLETED");
    assert_eq!(json["summary"]["total"], 2);

    let host = &json["sections"]["sys_info"]["host"];
    assert_eq!(host["status"], "SUCCESS");
    assert_eq!(host["value"]["program_version"], hostaudit_core::VERSION);
    assert_eq!(json["sections"]["kernel"]["version"]["status"], "SUCCESS");
}

#[tokio::test]
async fn test_builtin_catalogue_subset_runs() {
    let registry = hostaudit_probes::builtin_registry()
        .unwrap()
        .filter_categories(&["sys_info", "kernel"]);
    let config = hostaudit_probes::with_scan_timeouts(ExecutorConfig::default());

    let report = executor(config).run_to_completion(&registry).await;

    // Outcomes vary by host, but every probe must be accounted for
    assert_eq!(report.summary().total, registry.len());
    assert_eq!(report.categories().collect::<Vec<_>>(), vec!["sys_info", "kernel"]);
    assert!(report.get("sys_info", "host").unwrap().is_success());
}
