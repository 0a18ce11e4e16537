use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Scripting name the application answers to ("Adobe Acrobat").
    pub app_name: String,
    /// Name the process carries in the OS process table ("AdobeAcrobat").
    pub process_name: String,
    pub save_interval: Duration,
    pub save_timeout: Duration,
    pub focus_settle: Duration,
    pub keystroke_settle: Duration,
}

#[cfg(test)]
impl RunConfig {
    /// Defaults mirroring the shipped configuration.
    pub(crate) fn for_tests() -> Self {
        Self {
            app_name: "Adobe Acrobat".to_string(),
            process_name: "AdobeAcrobat".to_string(),
            save_interval: Duration::from_secs(60),
            save_timeout: Duration::from_secs(10),
            focus_settle: Duration::from_millis(300),
            keystroke_settle: Duration::from_millis(500),
        }
    }
}

/// Result of the process-presence query. A failed query is kept distinct
/// from "not running" so bridge breakage can be logged instead of being
/// misread as absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Running,
    NotRunning,
    QueryFailed(String),
}

/// Classified report from the direct save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SaveOutcome {
    NoDocuments,
    Saved { checked: u64, modified: u64, saved: u64 },
    ScriptError { message: String },
    Malformed { raw: String },
}

impl SaveOutcome {
    /// Strictly classify the raw report string returned by the save script.
    ///
    /// The error marker is checked before the count format: a report that is
    /// otherwise well-formed but carries "error:" must still escalate.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "no documents" {
            return SaveOutcome::NoDocuments;
        }
        if trimmed.contains("error:") {
            return SaveOutcome::ScriptError {
                message: trimmed.to_string(),
            };
        }
        match parse_counts(trimmed) {
            Some((checked, modified, saved)) => SaveOutcome::Saved {
                checked,
                modified,
                saved,
            },
            None => SaveOutcome::Malformed {
                raw: trimmed.to_string(),
            },
        }
    }
}

/// Parse exactly `checked:<n>,modified:<m>,saved:<k>`; anything looser is
/// treated as malformed by the caller.
fn parse_counts(s: &str) -> Option<(u64, u64, u64)> {
    let mut fields = s.split(',');
    let checked = fields.next()?.strip_prefix("checked:")?.parse().ok()?;
    let modified = fields.next()?.strip_prefix("modified:")?.parse().ok()?;
    let saved = fields.next()?.strip_prefix("saved:")?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((checked, modified, saved))
}

/// Why the fallback path ran instead of trusting the direct request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FallbackReason {
    ScriptError { message: String },
    Malformed { raw: String },
    TimedOut,
    RequestFailed { error: String },
}

/// Final outcome of one save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CycleOutcome {
    NotRunning,
    PresenceUnknown { reason: String },
    NoDocuments,
    Saved { checked: u64, modified: u64, saved: u64 },
    FallbackSaved { reason: FallbackReason },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub timestamp_utc: String,
    pub outcome: CycleOutcome,
}

/// Events emitted by the orchestrator/scheduler and consumed by the CLI layer.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Message(String),
    CycleCompleted {
        // Boxed to keep WatchEvent small on the channel.
        report: Box<CycleReport>,
    },
}
