//! Full-screen countdown built on `countdown-widget`.
//!
//! ```text
//! cargo run -- --seconds 30
//! RUST_LOG=debug cargo run -- --log countdown.log
//! ```

use anyhow::{Context, Result};
use bubbletea_rs::{quit, Cmd, KeyMsg, Model, Msg, Program};
use clap::Parser;
use countdown_widget::prelude::*;
use countdown_widget::progress;
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use once_cell::sync::OnceCell;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "countdown", about = "A countdown timer in your terminal")]
struct Args {
    /// Countdown length in seconds
    #[arg(long, default_value_t = 30)]
    seconds: u64,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Message shown when the countdown ends
    #[arg(long, default_value = "Done!")]
    done_text: String,

    /// Width of the progress bar in cells
    #[arg(long, default_value_t = 40)]
    width: i32,

    /// Start counting immediately
    #[arg(long)]
    autostart: bool,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long)]
    log: Option<PathBuf>,
}

// `Model::init` takes no arguments, so the parsed flags are parked here.
static ARGS: OnceCell<Args> = OnceCell::new();
static CONFIG: OnceCell<Config> = OnceCell::new();

struct App {
    countdown: Countdown,
    finished_runs: u32,
}

impl Model for App {
    fn init() -> (Self, Option<Cmd>) {
        let config = CONFIG.get().cloned().unwrap_or_default();
        let width = ARGS.get().map_or(40, |a| a.width);
        let autostart = ARGS.get().is_some_and(|a| a.autostart);

        let bar = progress::new(&[progress::with_width(width)]);
        let mut countdown = Countdown::with_config(config).with_bar(bar);
        let cmd = if autostart { countdown.start() } else { None };

        (
            App {
                countdown,
                finished_runs: 0,
            },
            cmd,
        )
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            let ctrl_c = key.key == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || key.key == KeyCode::Char('q') || key.key == KeyCode::Esc {
                self.countdown.teardown();
                return Some(quit());
            }
        }

        if let Some(finished) = msg.downcast_ref::<FinishedMsg>() {
            if finished.id == self.countdown.id() {
                self.finished_runs += 1;
                log::info!("countdown finished ({} so far)", self.finished_runs);
            }
            return None;
        }

        self.countdown.update(msg)
    }

    fn view(&self) -> String {
        let footer = Style::new()
            .faint(true)
            .render(&format!("q quit • finished {} time(s)", self.finished_runs));
        format!("\n{}\n\n{}\n", self.countdown.view(), footer)
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;

    let config = Config::new(&[
        with_duration(Duration::from_secs(args.seconds)),
        with_interval(Duration::from_millis(args.interval_ms)),
        with_done_text(args.done_text.clone()),
    ])
    .context("invalid countdown options")?;
    log::debug!("starting with {:?}", config);

    let _ = CONFIG.set(config);
    let _ = ARGS.set(args);

    let program = Program::<App>::builder().alt_screen(true).build()?;
    program.run().await?;
    Ok(())
}
