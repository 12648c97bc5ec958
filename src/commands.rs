//! REPL command grammar
//!
//! Each input line is split with shlex and parsed by clap, then mapped onto
//! either an [`EngineCommand`] or a local action of the terminal front-end.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use resonance_core::EngineCommand;
use resonance_types::{SearchMode, SortColumn};

#[derive(Parser, Debug)]
#[command(about = "resonance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the meter table
    Show,
    /// Print mode, duration, connection and pause state
    Status,
    /// Sort by a column; repeating the column flips the direction
    Sort { column: String },
    /// Exclude entities without recent activity from ranking and totals
    Idle { state: Switch },
    /// Filter rows by name, or by id prefix with --id. No query clears it.
    Filter {
        query: Option<String>,
        #[arg(long)]
        id: bool,
    },
    /// Show the skill summary of one entity
    Inspect { id: i64 },
    /// Save the current view as a snapshot file
    Save,
    /// Display a snapshot file instead of live data
    Load { path: PathBuf },
    /// Leave the snapshot view and return to live data
    Live,
    /// Toggle the backend pause state
    Pause,
    /// Clear backend and local data
    Reset,
    /// Reset, then record for a fixed number of seconds
    Countdown { seconds: u32 },
    /// Stop a running countdown
    Abort,
    Exit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Switch {
    On,
    Off,
}

/// What the REPL does with one input line.
#[derive(Debug, PartialEq)]
pub enum Action {
    Engine(EngineCommand),
    Show,
    Status,
    Exit,
    Nothing,
}

pub fn parse_line(line: &str) -> Result<Action, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "resonance".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    let action = match cli.command {
        None => Action::Nothing,
        Some(Commands::Show) => Action::Show,
        Some(Commands::Status) => Action::Status,
        Some(Commands::Exit) => Action::Exit,
        Some(Commands::Sort { column }) => {
            let column = SortColumn::parse(&column).ok_or_else(|| unknown_column(&column))?;
            Action::Engine(EngineCommand::SortBy(column))
        }
        Some(Commands::Idle { state }) => {
            Action::Engine(EngineCommand::SetIdleMode(state == Switch::On))
        }
        Some(Commands::Filter { query, id }) => Action::Engine(EngineCommand::SetFilter {
            mode: if id { SearchMode::ById } else { SearchMode::ByName },
            query: query.unwrap_or_default(),
        }),
        Some(Commands::Inspect { id }) => Action::Engine(EngineCommand::Inspect(id)),
        Some(Commands::Save) => Action::Engine(EngineCommand::SaveSnapshot),
        Some(Commands::Load { path }) => Action::Engine(EngineCommand::LoadSnapshot(path)),
        Some(Commands::Live) => Action::Engine(EngineCommand::ExitSnapshot),
        Some(Commands::Pause) => Action::Engine(EngineCommand::TogglePause),
        Some(Commands::Reset) => Action::Engine(EngineCommand::Reset),
        Some(Commands::Countdown { seconds }) => {
            Action::Engine(EngineCommand::StartCountdown(seconds))
        }
        Some(Commands::Abort) => Action::Engine(EngineCommand::AbortCountdown),
    };
    Ok(action)
}

fn unknown_column(input: &str) -> String {
    let known: Vec<&str> = SortColumn::ALL.iter().map(|c| c.label()).collect();
    format!("error: unknown column '{input}' (one of: {})", known.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_accepts_labels() {
        assert_eq!(
            parse_line("sort dps").unwrap(),
            Action::Engine(EngineCommand::SortBy(SortColumn::DamageRate))
        );
        assert!(parse_line("sort nonsense").unwrap_err().contains("unknown column"));
    }

    #[test]
    fn test_filter_modes() {
        assert_eq!(
            parse_line("filter --id 12").unwrap(),
            Action::Engine(EngineCommand::SetFilter {
                mode: SearchMode::ById,
                query: "12".into()
            })
        );
        assert_eq!(
            parse_line("filter").unwrap(),
            Action::Engine(EngineCommand::SetFilter {
                mode: SearchMode::ByName,
                query: String::new()
            })
        );
    }

    #[test]
    fn test_quoted_snapshot_path() {
        assert_eq!(
            parse_line("load \"my snapshots/resonance-1.json\"").unwrap(),
            Action::Engine(EngineCommand::LoadSnapshot(PathBuf::from(
                "my snapshots/resonance-1.json"
            )))
        );
        assert!(parse_line("load \"unterminated").is_err());
    }

    #[test]
    fn test_local_actions() {
        assert_eq!(parse_line("show").unwrap(), Action::Show);
        assert_eq!(parse_line("exit").unwrap(), Action::Exit);
        assert_eq!(
            parse_line("idle off").unwrap(),
            Action::Engine(EngineCommand::SetIdleMode(false))
        );
        assert!(parse_line("countdown -5").is_err());
    }
}
