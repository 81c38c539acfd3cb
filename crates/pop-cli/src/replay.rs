//! `pop replay` and `pop inspect`
//!
//! The sandbox is single-threaded and its document is not `Send`, so the
//! whole session is built and run on a worker thread. Only plain artifacts
//! come back. The main thread enforces the wall-clock budget.

use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pop_demo::{Corridor, CorridorSettings};
use pop_replay::{
    Blake3Digester, GameplayRecord, Sandbox, SandboxConfig, SessionSummary, VirtualClock,
};
use tracing::{error, info};

use crate::commands::{InspectArgs, ReplayArgs};

/// Exit status when the replay diverges from the claim
pub const EXIT_FLAGGED: u8 = 2;
/// Exit status when the budget runs out
pub const EXIT_TIMEOUT: i32 = 124;

/// What the worker hands back
struct Artifacts {
    record_json: String,
    still_png: Option<Vec<u8>>,
    summary: SessionSummary,
    markup: String,
}

fn read_record(path: &Path) -> Result<GameplayRecord> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    GameplayRecord::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "wrote");
    Ok(())
}

fn replay_session(config: SandboxConfig, record: GameplayRecord) -> Result<Artifacts> {
    let mut sandbox = Sandbox::new(config, VirtualClock::default(), Blake3Digester);
    sandbox.arm(record);
    let outcome = sandbox.run(&mut Corridor::new(CorridorSettings::default()))?;

    Ok(Artifacts {
        record_json: outcome.record.to_json_pretty()?,
        summary: SessionSummary::from_outcome(&outcome),
        markup: outcome.document.serialize(),
        still_png: outcome.still_png,
    })
}

pub fn replay(args: ReplayArgs) -> Result<ExitCode> {
    let record = read_record(&args.record)?;
    let config = SandboxConfig::load(args.config.as_deref()).context("loading sandbox configuration")?;

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("replay".to_string())
        .spawn(move || {
            // The receiver is gone only if the budget already ran out.
            let _ = tx.send(replay_session(config, record));
        })
        .context("spawning replay worker")?;

    let artifacts = match rx.recv_timeout(Duration::from_secs(args.budget_secs)) {
        Ok(result) => result?,
        Err(RecvTimeoutError::Timeout) => {
            error!(budget_secs = args.budget_secs, "replay exceeded its wall-clock budget");
            std::process::exit(EXIT_TIMEOUT);
        }
        Err(RecvTimeoutError::Disconnected) => bail!("replay worker exited without a result"),
    };

    if let Some(path) = &args.out {
        write_file(path, artifacts.record_json.as_bytes())?;
    }
    if let Some(path) = &args.summary {
        let json = serde_json::to_vec_pretty(&artifacts.summary).context("encoding summary")?;
        write_file(path, &json)?;
    }
    if let Some(path) = &args.png {
        match &artifacts.still_png {
            Some(png) => write_file(path, png)?,
            None => tracing::warn!("no still frame was captured"),
        }
    }
    if args.dump_dom {
        println!("{}", artifacts.markup);
    }

    let summary = &artifacts.summary;
    println!("{}: {}", summary.player_name, summary.status);
    println!("time: {}", summary.time_text());
    println!("digest: {}", summary.digest);

    Ok(if summary.verified {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_FLAGGED)
    })
}

pub fn inspect(args: InspectArgs) -> Result<ExitCode> {
    let record = read_record(&args.record)?;
    let first = record.events.first().map_or(0.0, |e| e.time_stamp);
    let last = record.last_event_time().unwrap_or(0.0);

    println!("player: {}", record.player_name.as_deref().unwrap_or("(none)"));
    println!("events: {}", record.events.len());
    println!("span: {first} ms .. {last} ms");
    println!("stats: {}", record.stats.len());
    match &record.digest {
        Some(digest) => println!("claimed digest: {digest}"),
        None => println!("claimed digest: (none)"),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_session_artifacts() {
        let record = GameplayRecord::from_json(
            r#"{"events":[{"type":"keydown","key":"w","timeStamp":0},{"type":"keyup","key":"w","timeStamp":100}]}"#,
        )
        .unwrap();
        let config = SandboxConfig {
            frame_width: 32,
            frame_height: 24,
            ..Default::default()
        };
        let artifacts = replay_session(config, record).unwrap();

        let replayed = GameplayRecord::from_json(&artifacts.record_json).unwrap();
        assert!(!replayed.stats.is_empty());
        assert_eq!(artifacts.summary.player_name, "Anonymous");
        assert!(!artifacts.summary.verified);
        assert!(artifacts.still_png.is_some());
        assert!(artifacts.markup.contains("id=\"screen\""));
    }
}
