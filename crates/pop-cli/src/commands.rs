use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pop", version, about = "Replay and verify recorded gameplay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a gameplay record in the sandbox and verify its digest
    Replay(ReplayArgs),
    /// Print a summary of a gameplay record without running it
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Gameplay record (JSON) to replay
    #[arg(short, long)]
    pub record: PathBuf,
    /// Sandbox configuration (YAML); `POP_*` environment variables override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Write the still frame here
    #[arg(long)]
    pub png: Option<PathBuf>,
    /// Write the replayed record (new stats and computed digest) here
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Write the session summary (JSON) here
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Print the final page markup
    #[arg(long)]
    pub dump_dom: bool,
    /// Wall-clock budget for the whole replay
    #[arg(long, default_value_t = 120)]
    pub budget_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Gameplay record (JSON) to inspect
    #[arg(short, long)]
    pub record: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replay_defaults() {
        let cli = Cli::try_parse_from(["pop", "replay", "--record", "game.json"]).unwrap();
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.record, PathBuf::from("game.json"));
        assert_eq!(args.budget_secs, 120);
        assert!(!args.dump_dom);
        assert!(args.png.is_none());
    }

    #[test]
    fn test_inspect_requires_record() {
        assert!(Cli::try_parse_from(["pop", "inspect"]).is_err());
    }
}
