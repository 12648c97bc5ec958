use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use resonance::commands::{Action, parse_line};
use resonance::repl::readline_async;
use resonance::{CliContext, Startup, logging};

#[derive(Parser)]
#[command(version, about = "Live damage meter for a combat data collector")]
struct Args {
    /// Collector base URL (http, https, ws or wss)
    #[arg(short, long)]
    backend: Option<String>,
    /// Settings file to use instead of the platform config location
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Open a snapshot file at startup
    #[arg(short, long)]
    load: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    let _log_guard = logging::init();

    let ctx = CliContext::start(Startup {
        backend_url: args.backend,
        config_path: args.config,
        snapshot: args.load,
    })
    .await?;

    loop {
        let line = match readline_async().await {
            Ok(line) => line,
            Err(e) => {
                tracing::info!(reason = %e, "Input closed");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    ctx.shutdown().await;
    Ok(())
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    match parse_line(line)? {
        Action::Engine(command) => ctx.send(command).await?,
        Action::Show => println!("{}", board(ctx)?.render()),
        Action::Status => println!("{}", board(ctx)?.status_line()),
        Action::Exit => return Ok(true),
        Action::Nothing => {}
    }
    Ok(false)
}

fn board(ctx: &CliContext) -> Result<resonance::presenter::Board, String> {
    ctx.board
        .lock()
        .map(|board| board.clone())
        .map_err(|e| e.to_string())
}
