// Checks that need more than one command or real parsing
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;

use hostaudit_core::application::ProbeContext;
use hostaudit_core::domain::{ProbeError, ProbeValue, ValueMap};
use hostaudit_core::port::CommandLine;

use crate::classifier::{key_values, lines};

pub type CheckResult = Result<ProbeValue, ProbeError>;

/// Signature shared by all checks so they fit in the catalogue table
pub type CheckFn = fn(ProbeContext) -> BoxFuture<'static, CheckResult>;

/// Kernel modules worth flagging when loaded
const DANGEROUS_MODULES: &[&str] = &["usb_storage", "firewire_core", "nfs", "cramfs", "jffs2"];

/// How many loaded modules are listed in the report
const LISTED_MODULES: usize = 10;

/// Mount points that should carry nodev, nosuid and noexec
const HARDENED_MOUNTS: &[&str] = &["/tmp", "/var/tmp", "/dev/shm"];
const HARDENED_OPTIONS: &[&str] = &["nodev", "nosuid", "noexec"];

const NOT_SET: &str = "Not Set or Commented";

// ---------------------------------------------------------------------------
// kernel
// ---------------------------------------------------------------------------

pub fn kernel_modules(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx.checked_output(&CommandLine::new("lsmod")).await?;
        let loaded = parse_lsmod(&out);

        let flagged: Vec<String> = loaded
            .iter()
            .filter(|m| DANGEROUS_MODULES.contains(&m.as_str()))
            .cloned()
            .collect();

        Ok(ValueMap::new()
            .with("loaded_count", loaded.len().to_string())
            .with(
                "loaded_modules",
                loaded.into_iter().take(LISTED_MODULES).collect::<Vec<_>>(),
            )
            .with("flagged_modules", flagged)
            .into())
    }
    .boxed()
}

/// Module names from `lsmod` output (header skipped)
fn parse_lsmod(out: &str) -> Vec<String> {
    out.lines()
        .skip(1)
        .filter_map(|l| l.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

pub fn cpu_support(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx.shell("grep -m1 '^flags' /proc/cpuinfo").await?;
        let flags: HashSet<&str> = out
            .split_once(':')
            .map(|(_, f)| f.split_whitespace().collect())
            .unwrap_or_default();

        let support = |flag: &str| {
            if flags.contains(flag) {
                "Supported"
            } else {
                "Not Supported"
            }
        };

        Ok(ValueMap::new()
            .with("nx", support("nx"))
            .with("pae", support("pae"))
            .into())
    }
    .boxed()
}

// ---------------------------------------------------------------------------
// updates
// ---------------------------------------------------------------------------

pub fn automatic_updates(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let status = ctx
            .shell("dpkg-query -W -f='${Status}' unattended-upgrades 2>/dev/null")
            .await?;
        if !status.contains("install ok installed") {
            return Ok(ProbeValue::text("Package not installed"));
        }

        let config = ctx
            .shell("cat /etc/apt/apt.conf.d/20auto-upgrades 2>/dev/null")
            .await?;
        let enabled = config
            .lines()
            .any(|l| l.contains("APT::Periodic::Unattended-Upgrade") && l.contains("\"1\""));

        Ok(ProbeValue::text(if enabled {
            "Configured"
        } else {
            "Not configured"
        }))
    }
    .boxed()
}

// ---------------------------------------------------------------------------
// users, groups, authentication
// ---------------------------------------------------------------------------

pub fn password_hashing(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx.checked_output(&CommandLine::shell("cut -d: -f2 /etc/shadow")).await?;
        let methods = hashing_methods(&out);
        if methods.is_empty() {
            return Ok(ProbeValue::text("No hashed passwords"));
        }
        Ok(methods.into())
    }
    .boxed()
}

/// Distinct hashing schemes in first-seen order; locked and empty entries skipped
fn hashing_methods(password_fields: &str) -> Vec<String> {
    let mut methods: Vec<String> = Vec::new();
    for field in password_fields.lines().map(str::trim) {
        if !field.starts_with('$') {
            continue;
        }
        let method = match field.split('$').nth(1).unwrap_or_default() {
            "6" => "SHA-512",
            "5" => "SHA-256",
            "y" => "yescrypt",
            "2a" | "2b" | "2y" => "bcrypt",
            "1" => "MD5",
            _ => "Other",
        };
        if !methods.iter().any(|m| m == method) {
            methods.push(method.to_string());
        }
    }
    methods
}

// ---------------------------------------------------------------------------
// service accounts
// ---------------------------------------------------------------------------

pub fn empty_passwords(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx.checked_output(&CommandLine::shell("cut -d: -f1,2 /etc/shadow")).await?;
        Ok(accounts_without_password(&out).into())
    }
    .boxed()
}

fn accounts_without_password(shadow: &str) -> Vec<String> {
    shadow
        .lines()
        .filter_map(|l| l.split_once(':'))
        .filter(|(_, password)| password.is_empty())
        .map(|(user, _)| user.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// security policies
// ---------------------------------------------------------------------------

pub fn password_policy(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx
            .shell("grep -E '^[[:space:]]*PASS_(MIN_LEN|MIN_DAYS|MAX_DAYS|WARN_AGE)[[:space:]]' /etc/login.defs")
            .await?;
        Ok(parse_password_policy(&out).into())
    }
    .boxed()
}

fn parse_password_policy(login_defs: &str) -> ValueMap {
    let settings: Vec<(&str, &str)> = login_defs
        .lines()
        .filter_map(|l| {
            let mut parts = l.split_whitespace();
            Some((parts.next()?, parts.next()?))
        })
        .collect();
    let lookup = |key: &str| {
        settings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
            .unwrap_or_else(|| NOT_SET.to_string())
    };

    ValueMap::new()
        .with("Min Length", lookup("PASS_MIN_LEN"))
        .with("Min Age", lookup("PASS_MIN_DAYS"))
        .with("Max Age", lookup("PASS_MAX_DAYS"))
        .with("Warn Age", lookup("PASS_WARN_AGE"))
}

// ---------------------------------------------------------------------------
// application security
// ---------------------------------------------------------------------------

pub fn apache_ssl(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let (module, listener) = tokio::join!(
            ctx.shell("apachectl -M 2>/dev/null | grep -i ssl_module"),
            ctx.shell("ss -tln | grep -E ':443[[:space:]]'"),
        );

        Ok(ValueMap::new()
            .with(
                "ssl_module",
                if module?.is_empty() { "Not Loaded" } else { "Loaded" },
            )
            .with(
                "https_listener",
                if listener?.is_empty() {
                    "Not Listening"
                } else {
                    "Listening"
                },
            )
            .into())
    }
    .boxed()
}

// ---------------------------------------------------------------------------
// storage
// ---------------------------------------------------------------------------

pub fn mount_options(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx.checked_output(&CommandLine::new("findmnt").arg("-rno").arg("TARGET,OPTIONS")).await?;
        Ok(evaluate_mounts(&out).into())
    }
    .boxed()
}

fn evaluate_mounts(findmnt: &str) -> ValueMap {
    let mounts = key_values(findmnt, " ");
    HARDENED_MOUNTS
        .iter()
        .map(|target| {
            let verdict = match mounts.get(target).and_then(|v| v.as_text()) {
                None => "Not a separate mount".to_string(),
                Some(options) => {
                    let options: Vec<&str> = options.split(',').collect();
                    let missing: Vec<&str> = HARDENED_OPTIONS
                        .iter()
                        .copied()
                        .filter(|o| !options.contains(o))
                        .collect();
                    if missing.is_empty() {
                        "OK".to_string()
                    } else {
                        format!("missing: {}", missing.join(", "))
                    }
                }
            };
            (*target, verdict)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// containers
// ---------------------------------------------------------------------------

pub fn docker_image_sources(ctx: ProbeContext) -> BoxFuture<'static, CheckResult> {
    async move {
        let out = ctx
            .checked_output(&CommandLine::new("docker").args(["images", "--format", "{{.Repository}}"]))
            .await?;
        let images = lines(&out);
        let unverified: Vec<String> = images
            .iter()
            .filter(|repo| repo.contains('/') || repo.as_str() == "<none>")
            .cloned()
            .collect();

        Ok(ValueMap::new()
            .with("images", images.len().to_string())
            .with("outside_official_library", unverified)
            .into())
    }
    .boxed()
}
