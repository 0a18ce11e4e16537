//! Timer loop driving one save cycle per interval.
//!
//! The first tick fires immediately, then once per configured interval until
//! a stop command arrives on the control channel.

use crate::bridge::AutomationBridge;
use crate::model::{RunConfig, WatchEvent};
use crate::orchestrator::run_cycle;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;

/// Commands accepted by the running scheduler.
#[derive(Debug, Clone)]
pub(crate) enum SchedulerControl {
    Stop,
}

/// Run save cycles until told to stop.
///
/// Cycle outcomes travel back as [`WatchEvent::CycleCompleted`]; an error
/// escaping a cycle (a broken fallback) ends the loop and propagates.
pub(crate) async fn run_scheduler<B: AutomationBridge>(
    bridge: Arc<B>,
    cfg: RunConfig,
    event_tx: UnboundedSender<WatchEvent>,
    mut ctrl_rx: UnboundedReceiver<SchedulerControl>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(cfg.save_interval);
    // A cycle running past its slot delays the next tick instead of bursting.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = run_cycle(bridge.as_ref(), &cfg, &event_tx).await?;
                let _ = event_tx.send(WatchEvent::CycleCompleted {
                    report: Box::new(report),
                });
            }
            // Stay pending when the control channel closes so a dropped sender
            // does not spin this branch.
            ctrl = async {
                match ctrl_rx.recv().await {
                    Some(c) => c,
                    None => futures::future::pending().await,
                }
            } => {
                match ctrl {
                    SchedulerControl::Stop => break,
                }
            }
        }
    }
    Ok(())
}
