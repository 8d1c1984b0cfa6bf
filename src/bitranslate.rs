use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use rust_bitranslator::marian::MarianModelStore;
use rust_bitranslator::pipelines::common::{ModelTier, TranslationDirection};
use rust_bitranslator::pipelines::session::TranslatorSession;
use rust_bitranslator::pipelines::worker::{StatusListener, TranslatorStatus};
use rust_bitranslator::{DevicePreference, Precision, TranslatorConfig, TranslatorError};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// English <-> Chinese translator for long texts
#[derive(Parser, Debug)]
#[command(name = "bitranslate")]
#[command(
    about = "English <-> Chinese translation of long texts with fine-tuned Marian models",
    long_about = None
)]
struct Args {
    /// Configuration file (JSON). Defaults to <config dir>/bitranslate/config.json if present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the checkpoints
    #[arg(long, global = true)]
    model_root: Option<PathBuf>,

    /// Device running the model: auto, cpu or cuda
    #[arg(long, global = true)]
    device: Option<DevicePreference>,

    /// Load the model in half precision (accelerator only)
    #[arg(long, global = true)]
    half: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate lines typed on the standard input
    Interactive {
        /// Checkpoint tier: small or full
        #[arg(long)]
        tier: Option<ModelTier>,

        /// Translation direction: en-zh or zh-en
        #[arg(long)]
        direction: Option<TranslationDirection>,

        /// Translate automatically once the input has been quiet for the debounce interval
        #[arg(long)]
        auto: bool,
    },
    /// Translate a text file
    File {
        /// File to translate
        input: PathBuf,

        /// Output file, the translation is printed on the standard output if missing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Checkpoint tier: small or full
        #[arg(long)]
        tier: Option<ModelTier>,

        /// Translation direction: en-zh or zh-en
        #[arg(long)]
        direction: Option<TranslationDirection>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "bitranslate=debug,rust_bitranslator=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut config = TranslatorConfig::load(args.config.as_deref())?;
    if let Some(model_root) = args.model_root {
        config.model_root = model_root;
    }
    if let Some(device) = args.device {
        config.device = device;
    }
    if args.half {
        config.precision = Precision::Half;
    }

    match args.command {
        Command::Interactive {
            tier,
            direction,
            auto,
        } => {
            apply_overrides(&mut config, tier, direction);
            config.auto_translate |= auto;
            interactive(&config)
        }
        Command::File {
            input,
            output,
            tier,
            direction,
        } => {
            apply_overrides(&mut config, tier, direction);
            translate_file(&config, input, output)
        }
    }
}

fn apply_overrides(
    config: &mut TranslatorConfig,
    tier: Option<ModelTier>,
    direction: Option<TranslationDirection>,
) {
    if let Some(tier) = tier {
        config.tier = tier;
    }
    if let Some(direction) = direction {
        config.direction = direction;
    }
}

fn print_status() -> StatusListener {
    Arc::new(|status: TranslatorStatus| match status {
        TranslatorStatus::Loading(key) => eprintln!("loading {}...", key),
        TranslatorStatus::Translating {
            completed, total, ..
        } if total > 1 => eprint!("\r{}/{} chunks", completed, total),
        TranslatorStatus::Error(message) => eprintln!("error: {}", message),
        _ => {}
    })
}

fn print_prompt(session: &TranslatorSession) {
    print!("[{} {}] > ", session.state().direction, session.state().tier);
    let _ = io::stdout().flush();
}

fn interactive(config: &TranslatorConfig) -> anyhow::Result<()> {
    let mut session = TranslatorSession::new(
        Box::new(MarianModelStore::new()),
        config,
        Some(print_status()),
    );
    session.preload()?;

    let (line_sender, lines) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_sender.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    eprintln!(":swap toggles the direction, :tier small|full selects the model, :quit exits");
    print_prompt(&session);
    loop {
        session.pump();
        let line = match lines.recv_timeout(PUMP_INTERVAL) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let line = line.trim();
        match line.split_whitespace().collect::<Vec<&str>>().as_slice() {
            [] => {}
            [":quit"] | [":q"] => break,
            [":swap"] => {
                session.toggle_direction();
            }
            [":tier", tier] => match tier.parse::<ModelTier>() {
                Ok(tier) => {
                    session.set_tier(tier);
                    session.preload()?;
                }
                Err(error) => eprintln!("{}", error),
            },
            [":auto"] => {
                let auto_translate = !session.state().auto_translate;
                session.set_auto_translate(auto_translate);
                eprintln!("auto-translate {}", if auto_translate { "on" } else { "off" });
            }
            _ => {
                let on_result = |result: Result<String, TranslatorError>| {
                    match result {
                        Ok(translation) => println!("\n{}", translation),
                        Err(error) => eprintln!("\ntranslation failed: {}", error),
                    }
                    let _ = io::stdout().flush();
                };
                session.submit_input(line, on_result)?;
            }
        }
        print_prompt(&session);
    }
    println!();
    session.close()?;
    Ok(())
}

fn translate_file(
    config: &TranslatorConfig,
    input: PathBuf,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("could not read {}", input.display()))?;
    let session = TranslatorSession::new(
        Box::new(MarianModelStore::new()),
        config,
        Some(print_status()),
    );

    let done = Arc::new(AtomicBool::new(false));
    let translation = Arc::new(Mutex::new(None));
    {
        let done = Arc::clone(&done);
        let translation = Arc::clone(&translation);
        session.translate(&text, move |result| {
            if let Ok(mut slot) = translation.lock() {
                *slot = Some(result);
            }
            done.store(true, Ordering::SeqCst);
        })?;
    }
    while !done.load(Ordering::SeqCst) {
        session.pump_blocking(PUMP_INTERVAL);
    }
    eprintln!();

    let result = translation
        .lock()
        .map_err(|_| anyhow!("translation result poisoned"))?
        .take()
        .ok_or_else(|| anyhow!("no translation received"))?;
    let translation = result?;
    match output {
        Some(path) => std::fs::write(&path, translation + "\n")
            .with_context(|| format!("could not write {}", path.display()))?,
        None => println!("{}", translation),
    }
    session.close()?;
    Ok(())
}
