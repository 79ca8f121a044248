use std::path::PathBuf;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::Duration;

use retroclock::config::{get_config_path, load_config};
use retroclock::markup::render_document;
use retroclock::terminal::{color_enabled, plain_lines, TerminalCard};
use retroclock::{ConfigWatcher, HostContext, RetroClock, ThreadScheduler, TimerHandle};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often the main loop wakes up to look for config changes.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

enum Event {
    Tick(TimerHandle),
    Shutdown,
}

impl From<TimerHandle> for Event {
    fn from(handle: TimerHandle) -> Self {
        Event::Tick(handle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Live,
    Html,
    Once,
}

fn print_help() {
    println!(
        "retroclock {}
A self-refreshing two-line retro clock

USAGE:
    retroclock [OPTIONS]

OPTIONS:
    -h, --help           Print this help message
    -v, --version        Print version information
    -c, --config PATH    Read configuration from PATH (.toml or .json)
        --html           Print one rendered HTML card and exit
        --once           Print both lines once and exit

ENVIRONMENT:
    RUST_LOG         Set log level (error, warn, info, debug, trace)
    TZ               Host time zone, used when the config names none
    LANG, LC_TIME    Host locale, used when the config names none
    NO_COLOR         Disable colored terminal output

CONFIG:
    ~/.config/retroclock/config.toml

EXAMPLES:
    retroclock                          Run in the terminal
    retroclock --html > clock.html      Render a standalone card
    RUST_LOG=debug retroclock           Run with debug logging",
        VERSION
    );
}

fn init_logging() {
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    logger
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:>5} {}] {}",
                chrono::Utc::now().to_rfc3339(),
                record.level(),
                record.target(),
                record.args()
            )?;
            buf.flush()
        })
        .init();
}

fn host_context() -> HostContext {
    HostContext {
        time_zone: std::env::var("TZ").ok().filter(|tz| !tz.is_empty()),
        locale: None,
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let mut config_path = None;
    let mut mode = Mode::Live;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-v" | "--version" => {
                println!("retroclock {}", VERSION);
                return;
            }
            "-c" | "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("Missing value for {}", arg);
                    std::process::exit(1);
                }
            },
            "--html" => mode = Mode::Html,
            "--once" => mode = Mode::Once,
            _ => {
                eprintln!("Unknown argument: {}", arg);
                eprintln!("Try 'retroclock --help' for more information.");
                std::process::exit(1);
            }
        }
    }

    init_logging();

    let config_path = config_path.unwrap_or_else(get_config_path);
    let (tx, rx) = channel::<Event>();

    let mut clock =
        RetroClock::new(ThreadScheduler::new(tx.clone())).with_host_context(host_context());
    clock.configure(load_config(&config_path));

    match mode {
        Mode::Html => {
            print!("{}", render_document(clock.state()));
            return;
        }
        Mode::Once => {
            for line in plain_lines(clock.state()) {
                println!("{}", line);
            }
            return;
        }
        Mode::Live => {}
    }

    log::info!("Starting retroclock v{}", VERSION);

    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.send(Event::Shutdown);
    }) {
        log::warn!("Failed to install signal handler: {}", e);
    }

    let watcher = match ConfigWatcher::new(config_path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            log::warn!("Config hot-reload disabled: {}", e);
            None
        }
    };

    let mut card = TerminalCard::new(std::io::stdout(), color_enabled());
    if let Err(e) = card.draw(clock.state()) {
        log::error!("Failed to draw clock: {}", e);
        return;
    }
    clock.start();

    loop {
        let redraw = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Event::Tick(handle)) => clock.on_tick(handle).is_some_and(|c| c.any()),
            Ok(Event::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let reloaded = watcher
            .as_ref()
            .and_then(|watcher| watcher.check_and_reload())
            .map(|config| clock.configure(config).any())
            .unwrap_or(false);

        if redraw || reloaded {
            if let Err(e) = card.draw(clock.state()) {
                log::error!("Failed to draw clock: {}", e);
                break;
            }
        }
    }

    clock.stop();
    log::info!("Stopped");
}
