use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::{execute, terminal};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};

use webterm::api::{BackendApi, HttpBackend, HttpIpLookup, IpLookup};
use webterm::config::Config;
use webterm::console::{self, ConsoleEvent, Renderer};
use webterm::interpreter::Interpreter;
use webterm::reporter::SessionReporter;

/// Web terminal runtime - guarded command interpreter with session telemetry
#[derive(Parser, Debug)]
#[command(name = "webterm", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend API base URL (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Do not start a telemetry session or log commands
    #[arg(long)]
    no_telemetry: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }
    if args.no_telemetry {
        config.api.telemetry = false;
    }

    let backend: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(config.api.clone())?);
    let lookup: Arc<dyn IpLookup> = Arc::new(HttpIpLookup::new(&config.ip_lookup)?);
    let reporter = if config.api.telemetry {
        SessionReporter::new(Arc::clone(&backend))
    } else {
        SessionReporter::disabled()
    };

    let mut term = Interpreter::new(&config)?
        .with_backend(backend)
        .with_reporter(reporter)
        .with_ip_lookup(lookup);
    term.start_session();
    info!(base_url = %config.api.base_url, telemetry = config.api.telemetry, "terminal started");

    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnableBracketedPaste)?;

    let result = run(&mut term).await;

    if let Err(e) = execute!(io::stdout(), DisableBracketedPaste) {
        warn!(error = %e, "failed to disable bracketed paste");
    }
    terminal::disable_raw_mode()?;
    println!();
    result
}

async fn run(term: &mut Interpreter) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    // crossterm reads block, so keys come in on their own thread.
    std::thread::spawn(move || loop {
        match console::poll_event(Duration::from_millis(100)) {
            Ok(Some(event)) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {
                if tx.is_closed() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "terminal input failed");
                break;
            }
        }
    });

    let mut renderer = Renderer::new();
    let mut stdout = io::stdout();
    let mut redraw = tokio::time::interval(Duration::from_millis(50));

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(ConsoleEvent::Key(key)) => term.handle_key(key),
                Some(ConsoleEvent::Paste(text)) => {
                    term.input(&text.lines().collect::<Vec<_>>().join(" "));
                }
                Some(ConsoleEvent::Quit) | None => break,
            },
            // Picks up output appended by background tasks.
            _ = redraw.tick() => {}
        }

        renderer.draw(&mut stdout, term.output(), term.prompt(), term.buffer())?;
        if term.has_exited() {
            break;
        }
    }

    Ok(())
}
