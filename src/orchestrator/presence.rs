use crate::bridge::AutomationBridge;
use crate::model::Presence;

/// Query the process table for the target application.
///
/// A failed query maps to [`Presence::QueryFailed`] rather than "not
/// running", so automation-bridge breakage stays visible to callers.
pub(crate) async fn check_presence<B: AutomationBridge + ?Sized>(
    bridge: &B,
    process_name: &str,
) -> Presence {
    match bridge.process_exists(process_name).await {
        Ok(true) => Presence::Running,
        Ok(false) => Presence::NotRunning,
        Err(e) => Presence::QueryFailed(format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::FakeBridge;

    #[tokio::test]
    async fn maps_running_and_not_running() {
        let bridge = FakeBridge::running("no documents");
        assert_eq!(check_presence(&bridge, "AdobeAcrobat").await, Presence::Running);

        let bridge = FakeBridge::not_running();
        assert_eq!(
            check_presence(&bridge, "AdobeAcrobat").await,
            Presence::NotRunning
        );
    }

    #[tokio::test]
    async fn query_failure_is_not_absence() {
        let bridge = FakeBridge {
            presence: Err("bridge unavailable".to_string()),
            ..FakeBridge::running("no documents")
        };
        match check_presence(&bridge, "AdobeAcrobat").await {
            Presence::QueryFailed(reason) => assert!(reason.contains("bridge unavailable")),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }
}
