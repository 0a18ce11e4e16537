//! Outbound automation calls to the OS scripting service.
//!
//! The orchestrator talks to the desktop through [`AutomationBridge`]; the
//! production implementation shells out to `osascript`, tests substitute a
//! recording fake.

mod scripts;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// The automation calls the save orchestration needs, one method per
/// outbound script.
#[async_trait]
pub trait AutomationBridge: Send + Sync {
    /// Query the OS process table for a process with the given name.
    async fn process_exists(&self, process_name: &str) -> Result<bool>;

    /// Name of the process currently holding UI focus.
    async fn frontmost_process(&self) -> Result<String>;

    /// Ask the application to save all modified open documents and return
    /// its raw report string.
    async fn save_modified_documents(&self, app_name: &str) -> Result<String>;

    /// Bring the named process to the foreground.
    async fn set_frontmost(&self, process_name: &str) -> Result<()>;

    /// Send the Save All keyboard shortcut to the named process.
    async fn send_save_all_keystroke(&self, process_name: &str) -> Result<()>;

    /// Send the plain save keyboard shortcut to the named process.
    async fn send_save_keystroke(&self, process_name: &str) -> Result<()>;
}

/// Production bridge: one `osascript -e <source>` subprocess per call.
#[derive(Debug)]
pub struct OsascriptBridge {
    program: std::path::PathBuf,
}

impl Default for OsascriptBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl OsascriptBridge {
    pub fn new() -> Self {
        Self {
            program: "osascript".into(),
        }
    }

    #[cfg(test)]
    fn with_program(program: impl Into<std::path::PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run_script(&self, source: &str) -> Result<String> {
        // The caller bounds this future with a timeout; kill_on_drop keeps a
        // timed-out script from lingering and saving behind the fallback's back.
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(source)
            .kill_on_drop(true)
            .output()
            .await
            .context("failed to spawn osascript")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("osascript exited with {}: {}", output.status, stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl AutomationBridge for OsascriptBridge {
    async fn process_exists(&self, process_name: &str) -> Result<bool> {
        let out = self
            .run_script(&scripts::process_exists(process_name))
            .await?;
        Ok(out == "true")
    }

    async fn frontmost_process(&self) -> Result<String> {
        self.run_script(&scripts::frontmost_process()).await
    }

    async fn save_modified_documents(&self, app_name: &str) -> Result<String> {
        self.run_script(&scripts::save_modified_documents(app_name))
            .await
    }

    async fn set_frontmost(&self, process_name: &str) -> Result<()> {
        self.run_script(&scripts::set_frontmost(process_name))
            .await?;
        Ok(())
    }

    async fn send_save_all_keystroke(&self, process_name: &str) -> Result<()> {
        self.run_script(&scripts::keystroke_save_all(process_name))
            .await?;
        Ok(())
    }

    async fn send_save_keystroke(&self, process_name: &str) -> Result<()> {
        self.run_script(&scripts::keystroke_save(process_name))
            .await?;
        Ok(())
    }
}


#[cfg(test)]
pub(crate) mod testing {
    //! Recording fake bridge for orchestrator and scheduler tests.

    use super::AutomationBridge;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        ProcessExists(String),
        FrontmostProcess,
        SaveModifiedDocuments(String),
        SetFrontmost(String),
        SaveAllKeystroke(String),
        SaveKeystroke(String),
    }

    /// Scripted behavior for the direct save request.
    pub(crate) enum SaveResponse {
        Reply(String),
        Fail(String),
        /// Never completes; exercises the orchestrator timeout.
        Hang,
    }

    pub(crate) struct FakeBridge {
        pub presence: Result<bool, String>,
        pub frontmost: String,
        pub save_response: SaveResponse,
        pub save_all_keystroke_fails: bool,
        pub save_keystroke_fails: bool,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeBridge {
        /// A running application whose direct request yields `reply`.
        pub(crate) fn running(reply: &str) -> Self {
            Self {
                presence: Ok(true),
                frontmost: "Safari".to_string(),
                save_response: SaveResponse::Reply(reply.to_string()),
                save_all_keystroke_fails: false,
                save_keystroke_fails: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn not_running() -> Self {
            Self {
                presence: Ok(false),
                ..Self::running("no documents")
            }
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn fallback_invocations(&self) -> usize {
            self.calls()
                .iter()
                .filter(|c| matches!(c, Call::FrontmostProcess))
                .count()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl AutomationBridge for FakeBridge {
        async fn process_exists(&self, process_name: &str) -> Result<bool> {
            self.record(Call::ProcessExists(process_name.to_string()));
            self.presence.clone().map_err(|e| anyhow!(e))
        }

        async fn frontmost_process(&self) -> Result<String> {
            self.record(Call::FrontmostProcess);
            Ok(self.frontmost.clone())
        }

        async fn save_modified_documents(&self, app_name: &str) -> Result<String> {
            self.record(Call::SaveModifiedDocuments(app_name.to_string()));
            match &self.save_response {
                SaveResponse::Reply(s) => Ok(s.clone()),
                SaveResponse::Fail(e) => Err(anyhow!(e.clone())),
                SaveResponse::Hang => futures::future::pending().await,
            }
        }

        async fn set_frontmost(&self, process_name: &str) -> Result<()> {
            self.record(Call::SetFrontmost(process_name.to_string()));
            Ok(())
        }

        async fn send_save_all_keystroke(&self, process_name: &str) -> Result<()> {
            self.record(Call::SaveAllKeystroke(process_name.to_string()));
            if self.save_all_keystroke_fails {
                return Err(anyhow!("Save All shortcut not bound"));
            }
            Ok(())
        }

        async fn send_save_keystroke(&self, process_name: &str) -> Result<()> {
            self.record(Call::SaveKeystroke(process_name.to_string()));
            if self.save_keystroke_fails {
                return Err(anyhow!("keystroke rejected"));
            }
            Ok(())
        }
    }
}
