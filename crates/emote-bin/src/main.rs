//! Emote entrypoint.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core_config::load_from;
use core_model::EmojiContext;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod loader;
mod render;

const LOG_FILE_NAME: &str = "emote.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "emote", version, about = "Resolve :emoji: tokens against asset packs")]
struct Args {
    /// Resource pack roots; every file under `<DIR>/emoji/` is offered to the registry.
    #[arg(long = "assets", value_name = "DIR")]
    pub assets: Vec<PathBuf>,
    /// Optional configuration file path (overrides discovery of `emote.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Directory receiving `emote.log`.
    #[arg(long = "log-dir", default_value = ".")]
    pub log_dir: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process text (arguments, or stdin lines when none are given).
    Render {
        text: Vec<String>,
        /// Count every resolved icon as a use and persist the statistics.
        #[arg(long)]
        record: bool,
    },
    /// List visible categories and their members.
    Categories,
    /// Print one random emoji code.
    Random {
        /// Fall back to builtin emojis when no user emoji is loaded.
        #[arg(long)]
        include_builtin: bool,
    },
    /// Complete the token at the end of INPUT.
    Suggest { input: String },
    /// Hide (or with --show, unhide) a category and persist the setting.
    Hide {
        category: String,
        #[arg(long)]
        show: bool,
    },
}

fn configure_logging(log_dir: &Path, debug: bool) -> Option<WorkerGuard> {
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn render_lines(ctx: &EmojiContext, lines: &[String], record: bool) -> Result<bool> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut recorded = false;
    for line in lines {
        let processor = ctx.process(Some(line));
        writeln!(out, "{}", render::display_line(&processor))?;
        for entry in render::describe_index(&processor) {
            writeln!(out, "{entry}")?;
        }
        if record {
            for (_, lit) in processor.literals().filter(|(_, l)| !l.is_escaped()) {
                recorded |= ctx.record_usage(lit.emoji().name()).is_some();
            }
        }
    }
    Ok(recorded)
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(core_config::discover);
    let config = load_from(Some(config_path.clone()))?;
    let _log_guard = configure_logging(&args.log_dir, config.debug_enabled());
    install_panic_hook();
    info!(
        target: "runtime",
        config = %config_path.display(),
        roots = args.assets.len(),
        "startup"
    );

    let ctx = EmojiContext::new(config);
    let assets = loader::discover(&args.assets).context("discovering emoji assets")?;
    let summary = ctx.reload(assets);

    let stdout = std::io::stdout();
    match args.command {
        Command::Render { text, record } => {
            let lines = if text.is_empty() {
                std::io::stdin()
                    .lock()
                    .lines()
                    .collect::<std::io::Result<Vec<_>>>()
                    .context("reading stdin")?
            } else {
                text
            };
            if render_lines(&ctx, &lines, record)? {
                ctx.save_config(&config_path)?;
            }
        }
        Command::Categories => {
            let mut out = stdout.lock();
            for category in ctx.visible_categories() {
                let members = ctx.category_emojis(&category).unwrap_or_default();
                let codes: Vec<&str> = members.iter().map(|e| e.code()).collect();
                writeln!(
                    out,
                    "{} ({}): {}",
                    ctx.category_display_name(&category),
                    category,
                    codes.join(" ")
                )?;
            }
        }
        Command::Random { include_builtin } => {
            let mut out = stdout.lock();
            match ctx.registry().random_emoji(include_builtin) {
                Some(emoji) => writeln!(out, "{}", emoji.code())?,
                None => writeln!(out, "no emoji available ({} loaded)", summary.total)?,
            }
        }
        Command::Suggest { input } => {
            let mut out = stdout.lock();
            for code in ctx.suggestions(&input) {
                writeln!(out, "{code}")?;
            }
        }
        Command::Hide { category, show } => {
            if ctx.set_category_hidden(&category, !show) {
                ctx.save_config(&config_path)?;
            }
        }
    }

    info!(target: "runtime", "shutdown");
    Ok(())
}

fn main() -> Result<()> {
    run(Args::parse())
}
