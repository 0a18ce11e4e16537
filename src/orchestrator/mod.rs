//! Save orchestration.
//!
//! One cycle = presence check, direct save request with a time budget, and a
//! single keystroke-fallback escalation when the direct path misbehaves. The
//! scheduler calls into this module; the CLI layer renders the events it emits.

mod cycle;
mod fallback;
mod presence;

pub(crate) use cycle::run_cycle;

use crate::model::WatchEvent;
use tokio::sync::mpsc::UnboundedSender;

/// Emit a status line for the presentation layer.
pub(crate) fn emit(event_tx: &UnboundedSender<WatchEvent>, text: impl Into<String>) {
    let _ = event_tx.send(WatchEvent::Message(text.into()));
}
