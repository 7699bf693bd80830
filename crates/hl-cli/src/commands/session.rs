//! Session command - a live page driven over stdin/stdout
//!
//! Each stdin line is a JSON object:
//!
//! | line                              | reply                      |
//! |-----------------------------------|----------------------------|
//! | `{"type":"TOGGLE"}`               | `{"enabled":bool}`         |
//! | `{"type":"STATE"}`                | `{"enabled":bool}`         |
//! | `{"type":"INSERT","html":"..."}`  | `{"inserted":n,"scheduled":bool}` |
//! | `{"type":"DUMP"}`                 | `{"html":"..."}`           |
//! | `{"type":"STATS"}`                | pipeline counters          |
//!
//! Anything else gets no reply. Debounced passes run on their own timer and
//! the policy store is polled for external edits.

use anyhow::{Context, Result};
use clap::Args;
use crossbeam_channel::Receiver;
use hl_core::{parse_message, Config, Document, Pipeline, PolicyStore, StorageChange};
use hl_platform::JsonFileStore;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use super::PageHost;

/// Session command arguments
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Initial HTML page
    pub input: PathBuf,

    #[command(flatten)]
    pub page: PageHost,

    /// How often to check the policy store for external edits (ms)
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub reload_ms: u64,
}

/// Session-only commands (page simulation)
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum SessionCommand {
    /// Append markup to the body, as a page script would
    Insert { html: String },
    /// Print the current document
    Dump,
    /// Print pipeline counters
    Stats,
}

/// Execute session command
pub fn execute(args: SessionArgs, config: &Config, store: Option<&Path>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(run(args, config, store))
}

async fn run(args: SessionArgs, config: &Config, store_path: Option<&Path>) -> Result<()> {
    let host = args.page.resolve()?;
    let source = super::read_input(&args.input)?;
    let store = super::open_store(store_path, config)?;
    let changes = store.subscribe();

    let start = Instant::now();
    let now_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut pipeline = Pipeline::new(Document::parse_html(&source), &host, store.load()?, config);
    let enabled = pipeline.start(now_ms());
    info!(host = %host, enabled, "Session started");

    let (stop_tx, mut stop_rx) = tokio::sync::mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .context("Failed to set signal handler")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reload = tokio::time::interval(Duration::from_millis(args.reload_ms.max(1)));
    let origin = tokio::time::Instant::from_std(start);

    loop {
        let deadline = pipeline.next_deadline();
        let wake = origin + Duration::from_millis(deadline.unwrap_or_default());

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    debug!("stdin closed");
                    break;
                };
                if let Some(reply) = handle_line(&mut pipeline, line.trim(), now_ms()) {
                    println!("{}", reply);
                }
            }
            () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                pipeline.poll(now_ms());
            }
            _ = reload.tick() => {
                sync_policy(&store, &changes, &mut pipeline);
            }
            _ = stop_rx.recv() => {
                info!("Received interrupt signal, shutting down...");
                break;
            }
        }
    }

    let stats = pipeline.stats();
    info!(
        passes = stats.passes_run,
        suppressed = stats.passes_suppressed,
        leaves = stats.leaves_transformed,
        "Session ended"
    );
    Ok(())
}

fn sync_policy(
    store: &JsonFileStore,
    changes: &Receiver<StorageChange>,
    pipeline: &mut Pipeline,
) {
    if let Err(e) = store.check_reload() {
        warn!("Policy store reload failed: {}", e);
    }
    for change in changes.try_iter() {
        pipeline.apply_change(&change);
    }
}

/// Handle one input line; `None` means no reply
fn handle_line(pipeline: &mut Pipeline, line: &str, now_ms: u64) -> Option<Value> {
    if line.is_empty() {
        return None;
    }

    if let Ok(command) = serde_json::from_str::<SessionCommand>(line) {
        return Some(match command {
            SessionCommand::Insert { html } => insert(pipeline, &html, now_ms),
            SessionCommand::Dump => json!({ "html": pipeline.document().to_html() }),
            SessionCommand::Stats => serde_json::to_value(pipeline.stats()).unwrap_or(Value::Null),
        });
    }

    let message = parse_message(line)?;
    let response = pipeline.handle_message(message, now_ms);
    serde_json::to_value(response).ok()
}

fn insert(pipeline: &mut Pipeline, html: &str, now_ms: u64) -> Value {
    let doc = pipeline.document_mut();
    let Some(parent) = doc.body().or_else(|| doc.document_element()) else {
        return json!({ "inserted": 0, "scheduled": false });
    };
    match doc.append_html(parent, html) {
        Ok(nodes) => {
            let scheduled = pipeline.on_mutations(now_ms);
            json!({ "inserted": nodes.len(), "scheduled": scheduled })
        }
        Err(e) => {
            debug!("Insert refused: {}", e);
            json!({ "inserted": 0, "scheduled": false })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hl_core::policy::store::default_snapshot;

    fn pipeline() -> Pipeline {
        Pipeline::new(
            Document::parse_html("<p>Hello there</p>"),
            "medium.com",
            default_snapshot(),
            &Config::default(),
        )
    }

    #[test]
    fn test_messages_reply_with_state() {
        let mut p = pipeline();
        assert_eq!(handle_line(&mut p, r#"{"type":"STATE"}"#, 0), Some(json!({"enabled": false})));
        assert_eq!(handle_line(&mut p, r#"{"type":"TOGGLE"}"#, 0), Some(json!({"enabled": true})));
    }

    #[test]
    fn test_unknown_lines_get_no_reply() {
        let mut p = pipeline();
        assert_eq!(handle_line(&mut p, "", 0), None);
        assert_eq!(handle_line(&mut p, "TOGGLE", 0), None);
        assert_eq!(handle_line(&mut p, r#"{"type":"RELOAD"}"#, 0), None);
    }

    #[test]
    fn test_insert_schedules_pass() {
        let mut p = pipeline();
        p.enable(0);
        let reply = handle_line(&mut p, r#"{"type":"INSERT","html":"<p>More text</p>"}"#, 1_000).unwrap();
        assert_eq!(reply, json!({"inserted": 1, "scheduled": true}));
        assert_eq!(p.next_deadline(), Some(1_150));
    }

    #[test]
    fn test_dump_returns_document() {
        let mut p = pipeline();
        let reply = handle_line(&mut p, r#"{"type":"DUMP"}"#, 0).unwrap();
        assert!(reply["html"].as_str().unwrap().contains("<p>Hello there</p>"));
    }
}
