use crate::bridge::{AutomationBridge, OsascriptBridge};
use crate::model::{RunConfig, WatchEvent};
use crate::orchestrator::run_cycle;
use crate::scheduler::{run_scheduler, SchedulerControl};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Pause after forcing a focus change, letting the window server settle.
const FOCUS_SETTLE: Duration = Duration::from_millis(300);
/// Pause after a synthesized keystroke.
const KEYSTROKE_SETTLE: Duration = Duration::from_millis(500);

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "acrobat-autosave",
    version,
    about = "Periodically save modified Adobe Acrobat documents"
)]
pub struct Cli {
    /// Interval between save cycles
    #[arg(long, default_value = "60s")]
    pub interval: humantime::Duration,

    /// Time budget for the direct save request before falling back to keystrokes
    #[arg(long, default_value = "10s")]
    pub save_timeout: humantime::Duration,

    /// Application name used for document scripting
    #[arg(long, default_value = "Adobe Acrobat")]
    pub app_name: String,

    /// Process-table name used for presence checks and keystroke targeting
    #[arg(long, default_value = "AdobeAcrobat")]
    pub process_name: String,

    /// Run a single save cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Print one JSON report per cycle on stdout (status lines go to stderr)
    #[arg(long)]
    pub json: bool,
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        app_name: args.app_name.clone(),
        process_name: args.process_name.clone(),
        save_interval: Duration::from(args.interval),
        save_timeout: Duration::from(args.save_timeout),
        focus_settle: FOCUS_SETTLE,
        keystroke_settle: KEYSTROKE_SETTLE,
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let bridge = Arc::new(OsascriptBridge::new());
    let (out_tx, out_handle) = spawn_output_writer();

    let res = if args.once {
        run_once(bridge.as_ref(), &cfg, args.json, &out_tx).await
    } else {
        watch(bridge, cfg, args.json, &out_tx).await
    };

    drop(out_tx);
    let _ = out_handle.await;
    res
}

/// Run exactly one save cycle, render its events, and exit.
async fn run_once(
    bridge: &dyn AutomationBridge,
    cfg: &RunConfig,
    json: bool,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<WatchEvent>();
    let report = run_cycle(bridge, cfg, &evt_tx).await?;
    drop(evt_tx);
    while let Ok(ev) = evt_rx.try_recv() {
        render_event(&ev, json, out_tx);
    }
    if json {
        let out = serde_json::to_string(&report)?;
        let _ = out_tx.send(OutputLine::Stdout(out));
    }
    Ok(())
}

/// The default mode: save immediately, then once per interval until Ctrl-C.
async fn watch(
    bridge: Arc<OsascriptBridge>,
    cfg: RunConfig,
    json: bool,
    out_tx: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    let banner = [
        format!("Acrobat AutoSave started at {}", full_timestamp()),
        format!(
            "Saving all modified documents every {}",
            humantime::format_duration(cfg.save_interval)
        ),
        "Press Ctrl+C to stop".to_string(),
    ];
    for line in banner {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }

    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<WatchEvent>();
    let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel::<SchedulerControl>();

    let sched = tokio::spawn(run_scheduler(bridge, cfg, evt_tx, ctrl_rx));

    // Ctrl-C is the one planned shutdown path.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = ctrl_tx.send(SchedulerControl::Stop);
        }
    });

    // The scheduler owns the only event sender; this loop ends when it stops.
    while let Some(ev) = evt_rx.recv().await {
        render_event(&ev, json, out_tx);
    }

    let res = sched.await.context("scheduler task failed")?;
    if let Some(line) = shutdown_line(&res) {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    res
}

/// The stop message belongs to a clean shutdown only; a scheduler error
/// surfaces through the propagated error instead.
fn shutdown_line(res: &Result<()>) -> Option<String> {
    res.is_ok()
        .then(|| format!("AutoSave stopped at {}", full_timestamp()))
}

fn render_event(ev: &WatchEvent, json: bool, out_tx: &mpsc::UnboundedSender<OutputLine>) {
    match ev {
        WatchEvent::Message(msg) => {
            let line = format!("{} - {}", local_timestamp(), msg);
            let _ = out_tx.send(if json {
                OutputLine::Stderr(line)
            } else {
                OutputLine::Stdout(line)
            });
        }
        WatchEvent::CycleCompleted { report } => {
            if json {
                match serde_json::to_string(report) {
                    Ok(s) => {
                        let _ = out_tx.send(OutputLine::Stdout(s));
                    }
                    Err(e) => {
                        let _ = out_tx.send(OutputLine::Stderr(format!(
                            "Failed to encode cycle report: {e}"
                        )));
                    }
                }
            }
        }
    }
}

/// `HH:MM:SS` in local time for per-event console lines.
fn local_timestamp() -> String {
    let fmt = time::macros::format_description!("[hour]:[minute]:[second]");
    now_local().format(&fmt).unwrap_or_else(|_| "--:--:--".into())
}

/// Full local date-time for the startup banner and shutdown message.
fn full_timestamp() -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    now_local().format(&fmt).unwrap_or_else(|_| "now".into())
}

fn now_local() -> time::OffsetDateTime {
    time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc())
}
