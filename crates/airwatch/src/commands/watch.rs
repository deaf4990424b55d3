//! Polling mode: reload a snapshot (file or Kismet server) on an
//! interval, analyze it on the engine task, and stream newly raised
//! alerts as they appear.
//!
//! While running, stdin accepts `ack <id>`, `active`, `history` and
//! `quit`. Ctrl-C stops the loop.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use airwatch_core::{Alert, AnySource, CoreError, EngineHandle, SnapshotSource};

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

const INPUT_HELP: &str = "commands: ack <id> | active | history | quit";

pub async fn handle(args: WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let source = util::resolve_source(args.snapshot.as_deref(), ctx)?;
    let interval = match args.interval.as_deref() {
        Some(raw) => parse_interval(raw)?,
        None => ctx.config.source.poll_interval(),
    };

    let handle = EngineHandle::spawn(util::build_engine(ctx)?);
    let printer = spawn_printer(handle.subscribe(), ctx.format, ctx.color, ctx.quiet());

    if !ctx.quiet() {
        eprintln!(
            "Watching {} every {} ({INPUT_HELP})",
            source.describe(),
            humantime::format_duration(interval)
        );
    }

    let result = poll_loop(&handle, &source, interval, args.cycles, ctx).await;

    // The printer drains buffered alerts and exits once every sender is gone.
    handle.shutdown();
    drop(handle);
    if let Err(e) = printer.await {
        warn!(error = %e, "alert printer task failed");
    }
    result
}

fn parse_interval(raw: &str) -> Result<Duration, CliError> {
    let interval = humantime::parse_duration(raw).map_err(|e| CliError::Validation {
        field: "--interval".into(),
        reason: e.to_string(),
    })?;
    if interval.is_zero() {
        return Err(CliError::Validation {
            field: "--interval".into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(interval)
}

// ── Poll loop ───────────────────────────────────────────────────────

async fn poll_loop(
    handle: &EngineHandle,
    source: &AnySource,
    interval: Duration,
    cycles: Option<u64>,
    ctx: &Context,
) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut input = spawn_stdin_reader();
    let mut input_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut completed: u64 = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
            _ = ticker.tick() => {
                run_cycle(handle, source).await?;
                completed += 1;
                if cycles.is_some_and(|limit| completed >= limit) {
                    break;
                }
            }
            line = input.recv(), if input_open => match line {
                Some(line) => {
                    if !handle_input(handle, line.trim(), ctx).await? {
                        break;
                    }
                }
                None => input_open = false,
            },
        }
    }
    debug!(cycles = completed, "watch finished");
    Ok(())
}

/// One poll. A failed load is logged and the loop keeps going.
async fn run_cycle(handle: &EngineHandle, source: &AnySource) -> Result<(), CliError> {
    match source.load().await {
        Ok(snapshot) => {
            let raised = handle.analyze(snapshot).await?;
            debug!(raised = raised.len(), "cycle finished");
        }
        Err(e) => warn!(source = %source.describe(), error = %e, "snapshot poll failed"),
    }
    Ok(())
}

/// Handle one stdin command. Returns `false` to stop watching.
async fn handle_input(handle: &EngineHandle, line: &str, ctx: &Context) -> Result<bool, CliError> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (None, _) => {}
        (Some("quit" | "exit" | "q"), _) => return Ok(false),
        (Some("active"), _) => util::print_alerts(&handle.list_active().await?, ctx),
        (Some("history"), _) => util::print_alerts(&handle.list_history().await?, ctx),
        (Some("ack"), Some(id)) => match handle.acknowledge(id).await {
            Ok(alert) => eprintln!("Acknowledged {}", alert.id),
            Err(CoreError::AlertNotFound { alert_id }) => {
                eprintln!("Alert '{alert_id}' is not active");
            }
            Err(e) => return Err(e.into()),
        },
        _ => eprintln!("Unknown input '{line}' ({INPUT_HELP})"),
    }
    Ok(true)
}

// ── Background helpers ──────────────────────────────────────────────

/// Read stdin lines on a plain thread; a blocking read there never
/// holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn spawn_printer(
    mut rx: broadcast::Receiver<Arc<Alert>>,
    format: OutputFormat,
    color: bool,
    quiet: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(alert) => {
                    let line = output::render_alert_line(&alert, format, color);
                    output::print_output(&line, quiet);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "alert stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
