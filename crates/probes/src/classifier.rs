// Output classifiers for declarative command probes
use hostaudit_core::domain::{ProbeValue, ValueMap};

/// How a command's stdout becomes a probe value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// Output as-is
    Text,
    /// Output as-is, or the fallback when empty
    TextOr(&'static str),
    /// Non-empty lines
    Lines,
    /// Number of non-empty lines
    LineCount,
    /// Last whitespace-separated token (e.g. `runlevel` prints "N 5")
    LastWord,
    /// `found` when there is any output, `missing` otherwise
    Presence {
        found: &'static str,
        missing: &'static str,
    },
    /// `yes` when the output equals `expected`
    Equals {
        expected: &'static str,
        yes: &'static str,
        no: &'static str,
    },
    /// `yes` when the output contains `needle`
    Contains {
        needle: &'static str,
        yes: &'static str,
        no: &'static str,
    },
    /// `ok` when the command exited 0
    ExitStatus {
        ok: &'static str,
        failed: &'static str,
    },
    /// `key<sep>value` lines as an ordered mapping (lines without `sep` are skipped)
    KeyValue(&'static str),
}

impl Classifier {
    pub fn classify(&self, output: &str, exit_code: Option<i32>) -> ProbeValue {
        let output = output.trim();
        match *self {
            Classifier::Text => ProbeValue::text(output),
            Classifier::TextOr(fallback) => {
                ProbeValue::text(if output.is_empty() { fallback } else { output })
            }
            Classifier::Lines => ProbeValue::List(lines(output)),
            Classifier::LineCount => ProbeValue::text(lines(output).len().to_string()),
            Classifier::LastWord => {
                ProbeValue::text(output.split_whitespace().last().unwrap_or("Unknown"))
            }
            Classifier::Presence { found, missing } => {
                ProbeValue::text(if output.is_empty() { missing } else { found })
            }
            Classifier::Equals { expected, yes, no } => {
                ProbeValue::text(if output == expected { yes } else { no })
            }
            Classifier::Contains { needle, yes, no } => {
                ProbeValue::text(if output.contains(needle) { yes } else { no })
            }
            Classifier::ExitStatus { ok, failed } => {
                ProbeValue::text(if exit_code == Some(0) { ok } else { failed })
            }
            Classifier::KeyValue(sep) => ProbeValue::Map(key_values(output, sep)),
        }
    }
}

pub(crate) fn lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn key_values(output: &str, sep: &str) -> ValueMap {
    output
        .lines()
        .filter_map(|line| line.split_once(sep))
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
