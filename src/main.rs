// memtty: live stack/heap memory diagrams for JavaScript snippets

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use memtty::interpreter::JsExecutor;
use memtty::layout::geometry::size;
use memtty::layout::{LayoutConfig, LayoutEngine, MonospaceMeasurer};
use memtty::run::{Orchestrator, SnippetFile, DEFAULT_QUIET_PERIOD};
use memtty::ui::App;

/// Viewport used for `--dump`, in the pixel-like default units
const DUMP_VIEWPORT: (f64, f64) = (800.0, 600.0);

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "MEMTTY_LOG";

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("no snippet file provided")]
    MissingSnippet,
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("{0} expects a value")]
    MissingValue(&'static str),
    #[error("invalid value '{value}' for {flag}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("file '{0}' not found")]
    NotFound(PathBuf),
}

/// Command-line configuration
#[derive(Debug, PartialEq)]
struct Config {
    snippet: PathBuf,
    dump: bool,
    seed: Option<u64>,
    debounce: Duration,
    log: Option<PathBuf>,
    help: bool,
}

impl Config {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ConfigError> {
        let mut snippet = None;
        let mut dump = false;
        let mut seed = None;
        let mut debounce = DEFAULT_QUIET_PERIOD;
        let mut log = None;
        let mut help = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => help = true,
                "--dump" => dump = true,
                "--seed" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--seed"))?;
                    seed = Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: "--seed",
                        value,
                    })?);
                }
                "--debounce" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--debounce"))?;
                    let millis: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: "--debounce",
                        value,
                    })?;
                    debounce = Duration::from_millis(millis);
                }
                "--log" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--log"))?;
                    log = Some(PathBuf::from(value));
                }
                flag if flag.starts_with('-') => {
                    return Err(ConfigError::UnexpectedArgument(arg));
                }
                _ if snippet.is_none() => snippet = Some(PathBuf::from(arg)),
                _ => return Err(ConfigError::UnexpectedArgument(arg)),
            }
        }

        if help {
            return Ok(Config {
                snippet: snippet.unwrap_or_default(),
                dump,
                seed,
                debounce,
                log,
                help,
            });
        }

        let snippet = snippet.ok_or(ConfigError::MissingSnippet)?;
        if !snippet.exists() {
            return Err(ConfigError::NotFound(snippet));
        }

        Ok(Config {
            snippet,
            dump,
            seed,
            debounce,
            log,
            help,
        })
    }
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <snippet.js> [options]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dump             Run once and print the diagram as text");
    eprintln!("  --seed <u64>       Seed the heap layout jitter");
    eprintln!("  --debounce <ms>    Quiet period before re-running (default 300)");
    eprintln!(
        "  --log <file>       Write logs to a file ({} sets the filter)",
        LOG_ENV
    );
    eprintln!("  -h, --help         Show this message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} demos/aliasing.js", program_name);
    eprintln!("  {} demos/cycles.js --dump --seed 7", program_name);
}

/// Install the tracing subscriber; the TUI owns the terminal, so without a
/// log file only dump mode logs (to stderr)
fn init_logging(config: &Config) -> io::Result<()> {
    let filter = || EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = &config.log {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if config.dump {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args();
    let program_name = args.next().unwrap_or_else(|| "memtty".to_string());

    let config = match Config::parse(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(&program_name);
            std::process::exit(1);
        }
    };

    if config.help {
        print_usage(&program_name);
        return Ok(());
    }

    init_logging(&config)?;

    if config.dump {
        let source = fs::read_to_string(&config.snippet)?;
        let mut orchestrator = Orchestrator::new(
            JsExecutor::new(),
            MonospaceMeasurer::default(),
            LayoutEngine::new(LayoutConfig::default(), config.seed),
            size(DUMP_VIEWPORT.0, DUMP_VIEWPORT.1),
        );
        let diagram = orchestrator.run(&source);
        print!("{}", diagram.to_text());
        return Ok(());
    }

    let mut snippet = SnippetFile::new(config.snippet.clone());
    let source = snippet.read()?;
    info!(path = %config.snippet.display(), "starting");

    // The first draw resizes the viewport to the memory pane and re-runs
    let orchestrator = Orchestrator::new(
        JsExecutor::new(),
        MonospaceMeasurer::cells(),
        LayoutEngine::new(LayoutConfig::terminal(), config.seed),
        size(1.0, 1.0),
    );
    let mut app = App::new(orchestrator, source, config.debounce).watch(snippet);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        Config::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_flags() {
        let snippet = env!("CARGO_MANIFEST_DIR").to_string() + "/demos/aliasing.js";
        let config = parse(&[&snippet, "--dump", "--seed", "7", "--debounce", "120"]).unwrap();
        assert!(config.dump);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.debounce, Duration::from_millis(120));
        assert_eq!(config.log, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(&[]), Err(ConfigError::MissingSnippet)));
        assert!(matches!(
            parse(&["a.js", "--seed"]),
            Err(ConfigError::MissingValue("--seed"))
        ));
        assert!(matches!(
            parse(&["a.js", "--seed", "x"]),
            Err(ConfigError::InvalidValue { flag: "--seed", .. })
        ));
        assert!(matches!(
            parse(&["a.js", "--verbose"]),
            Err(ConfigError::UnexpectedArgument(_))
        ));
        assert!(matches!(
            parse(&["/no/such/snippet.js"]),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_help_needs_no_snippet() {
        assert!(parse(&["--help"]).unwrap().help);
    }
}
