//! Save Orchestrator: one direct-then-fallback save attempt per cycle.

use super::emit;
use super::fallback::fallback_save;
use super::presence::check_presence;
use crate::bridge::AutomationBridge;
use crate::model::{
    CycleOutcome, CycleReport, FallbackReason, Presence, RunConfig, SaveOutcome, WatchEvent,
};
use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

/// Run one save cycle against the target application.
///
/// Absence and a failed presence query are no-op successes; a misbehaving
/// direct request escalates to the keystroke fallback exactly once. Only an
/// error escaping the fallback propagates.
pub(crate) async fn run_cycle<B: AutomationBridge + ?Sized>(
    bridge: &B,
    cfg: &RunConfig,
    event_tx: &UnboundedSender<WatchEvent>,
) -> Result<CycleReport> {
    let outcome = cycle_outcome(bridge, cfg, event_tx).await?;
    Ok(CycleReport {
        timestamp_utc: utc_timestamp(),
        outcome,
    })
}

async fn cycle_outcome<B: AutomationBridge + ?Sized>(
    bridge: &B,
    cfg: &RunConfig,
    event_tx: &UnboundedSender<WatchEvent>,
) -> Result<CycleOutcome> {
    match check_presence(bridge, &cfg.process_name).await {
        Presence::NotRunning => {
            emit(event_tx, format!("{} is not running", cfg.process_name));
            return Ok(CycleOutcome::NotRunning);
        }
        Presence::QueryFailed(reason) => {
            emit(
                event_tx,
                format!("Presence check failed ({reason}); skipping this cycle"),
            );
            return Ok(CycleOutcome::PresenceUnknown { reason });
        }
        Presence::Running => {}
    }

    emit(
        event_tx,
        format!("{} is running, checking all documents...", cfg.process_name),
    );

    let direct = tokio::time::timeout(
        cfg.save_timeout,
        bridge.save_modified_documents(&cfg.app_name),
    )
    .await;

    let reason = match direct {
        Ok(Ok(raw)) => match SaveOutcome::parse(&raw) {
            SaveOutcome::NoDocuments => {
                emit(event_tx, format!("No documents open in {}", cfg.app_name));
                return Ok(CycleOutcome::NoDocuments);
            }
            SaveOutcome::Saved {
                checked,
                modified,
                saved,
            } => {
                emit(
                    event_tx,
                    format!("checked:{checked},modified:{modified},saved:{saved}"),
                );
                return Ok(CycleOutcome::Saved {
                    checked,
                    modified,
                    saved,
                });
            }
            SaveOutcome::ScriptError { message } => {
                emit(
                    event_tx,
                    format!("Save report carried an error ({message}), trying fallback..."),
                );
                FallbackReason::ScriptError { message }
            }
            SaveOutcome::Malformed { raw } => {
                emit(
                    event_tx,
                    format!("Unexpected result {raw:?}, trying fallback..."),
                );
                FallbackReason::Malformed { raw }
            }
        },
        Ok(Err(e)) => {
            emit(
                event_tx,
                format!("Direct save request failed ({e:#}), trying fallback..."),
            );
            FallbackReason::RequestFailed {
                error: format!("{e:#}"),
            }
        }
        Err(_) => {
            emit(
                event_tx,
                "Direct save request timed out, trying fallback...",
            );
            FallbackReason::TimedOut
        }
    };

    fallback_save(bridge, cfg, event_tx).await?;
    Ok(CycleOutcome::FallbackSaved { reason })
}

/// RFC 3339 UTC stamp for machine-readable reports.
fn utc_timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}
