//! Fallback Save Trigger: synthesized keystrokes with a focus round-trip.

use super::emit;
use crate::bridge::AutomationBridge;
use crate::model::{RunConfig, WatchEvent};
use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

/// Drive a save through synthesized keystrokes.
///
/// UI focus is the shared resource here: whatever was frontmost before this
/// runs is restored on every exit path, including when the keystroke steps
/// fail, and only then does an error propagate.
pub(crate) async fn fallback_save<B: AutomationBridge + ?Sized>(
    bridge: &B,
    cfg: &RunConfig,
    event_tx: &UnboundedSender<WatchEvent>,
) -> Result<()> {
    // Capture before stealing focus. Best effort: if the query fails there
    // is nothing to restore.
    let previous = match bridge.frontmost_process().await {
        Ok(name) => Some(name),
        Err(e) => {
            emit(
                event_tx,
                format!("Could not capture frontmost application: {e:#}"),
            );
            None
        }
    };

    let result = drive_keystrokes(bridge, cfg).await;

    if let Some(name) = previous {
        if let Err(e) = bridge.set_frontmost(&name).await {
            emit(
                event_tx,
                format!("Could not restore focus to {name}: {e:#}"),
            );
        }
    }

    result?;
    emit(
        event_tx,
        format!(
            "Save All command sent to {} (focus restored)",
            cfg.process_name
        ),
    );
    Ok(())
}

async fn drive_keystrokes<B: AutomationBridge + ?Sized>(bridge: &B, cfg: &RunConfig) -> Result<()> {
    bridge.set_frontmost(&cfg.process_name).await?;
    tokio::time::sleep(cfg.focus_settle).await;

    // Only the Save All combination downgrades; a failing plain save propagates.
    if bridge
        .send_save_all_keystroke(&cfg.process_name)
        .await
        .is_err()
    {
        bridge.send_save_keystroke(&cfg.process_name).await?;
    }
    tokio::time::sleep(cfg.keystroke_settle).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::{Call, FakeBridge};
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn focus_round_trip_on_success() {
        let bridge = FakeBridge::running("no documents");
        let (tx, _rx) = mpsc::unbounded_channel();
        fallback_save(&bridge, &RunConfig::for_tests(), &tx)
            .await
            .unwrap();

        assert_eq!(
            bridge.calls(),
            vec![
                Call::FrontmostProcess,
                Call::SetFrontmost("AdobeAcrobat".into()),
                Call::SaveAllKeystroke("AdobeAcrobat".into()),
                Call::SetFrontmost("Safari".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn save_all_failure_downgrades_to_plain_save() {
        let bridge = FakeBridge {
            save_all_keystroke_fails: true,
            ..FakeBridge::running("no documents")
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        fallback_save(&bridge, &RunConfig::for_tests(), &tx)
            .await
            .unwrap();

        let calls = bridge.calls();
        assert!(calls.contains(&Call::SaveAllKeystroke("AdobeAcrobat".into())));
        assert!(calls.contains(&Call::SaveKeystroke("AdobeAcrobat".into())));
        assert_eq!(calls.last(), Some(&Call::SetFrontmost("Safari".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn focus_is_restored_even_when_both_keystrokes_fail() {
        let bridge = FakeBridge {
            save_all_keystroke_fails: true,
            save_keystroke_fails: true,
            ..FakeBridge::running("no documents")
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = fallback_save(&bridge, &RunConfig::for_tests(), &tx).await;

        assert!(result.is_err());
        assert_eq!(
            bridge.calls().last(),
            Some(&Call::SetFrontmost("Safari".into()))
        );
    }
}
