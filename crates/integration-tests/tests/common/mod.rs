//! Process helpers shared by the integration tests (Linux /proc based)

#![allow(dead_code)]

use std::path::Path;
use std::time::{Duration, Instant};

/// Running processes have a /proc entry whose state is not Z (zombie)
pub fn is_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .map(|state| state != "Z")
            .unwrap_or(false),
        Err(_) => false,
    }
}

pub async fn wait_until_gone(pid: u32) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(3) {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

pub async fn read_pid(path: &Path) -> u32 {
    let start = Instant::now();
    loop {
        if let Ok(content) = std::fs::read_to_string(path) {
            if let Ok(pid) = content.trim().parse() {
                return pid;
            }
        }
        assert!(start.elapsed() < Duration::from_secs(3), "pid file never written");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Shell script that starts a background sleep, records its pid and waits
pub fn background_sleep_script(pid_file: &Path) -> String {
    format!("sleep 30 & echo $! > {}; wait", pid_file.display())
}
