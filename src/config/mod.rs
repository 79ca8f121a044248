mod types;

pub use types::{ClockConfig, ConfigIssue, DEFAULT_INTERVAL_MS, MIN_INTERVAL_MS};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a config file. Files ending in `.json` are JSON, anything else TOML.
pub fn read_config(path: &Path) -> Result<ClockConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Ok(serde_json::from_str(&contents)?)
    } else {
        Ok(toml::from_str(&contents)?)
    }
}

/// Loads the config at `path`, falling back to defaults when it is missing,
/// unreadable or has validation errors.
pub fn load_config(path: &Path) -> ClockConfig {
    let config = if path.exists() {
        match read_config(path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::error!("{}", e);
                ClockConfig::default()
            }
        }
    } else {
        log::info!("No config file found at {:?}, using defaults", path);
        ClockConfig::default()
    };

    let issues = config.validate();
    let errors: Vec<_> = issues.iter().filter(|i| i.is_error).collect();
    let warnings: Vec<_> = issues.iter().filter(|i| !i.is_error).collect();

    for warning in &warnings {
        log::warn!("Config: {}", warning);
    }
    for error in &errors {
        log::error!("Config: {}", error);
    }

    if !issues.is_empty() {
        log::info!(
            "Config validation: {} error(s), {} warning(s)",
            errors.len(),
            warnings.len()
        );
    }

    if !errors.is_empty() {
        log::error!("Config has errors; falling back to defaults.");
        return ClockConfig::default();
    }

    config
}

pub fn get_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("retroclock")
        .join("config.toml")
}

/// Watches one config file and reloads it when it changes.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    path: PathBuf,
    last_reload: Mutex<Instant>,
    /// A change was seen inside the debounce window and still needs a reload.
    pending: AtomicBool,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf) -> Result<Self, notify::Error> {
        let (tx, rx) = channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;

        // Watch the directory so editors that replace the file are still seen.
        let config_dir = path.parent().unwrap_or(&path);
        if !config_dir.exists() {
            let _ = std::fs::create_dir_all(config_dir);
        }

        watcher.watch(config_dir, RecursiveMode::NonRecursive)?;
        log::info!("Watching config directory: {:?}", config_dir);

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            path,
            last_reload: Mutex::new(Instant::now()),
            pending: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drains pending file events and returns the reloaded config if the file
    /// changed. A change inside the 500 ms debounce window is held back and
    /// reloaded by the first call after the window closes.
    pub fn check_and_reload(&self) -> Option<ClockConfig> {
        let file_name = self.path.file_name()?;
        let mut should_reload = self.pending.load(Ordering::SeqCst);

        while let Ok(event) = self.receiver.try_recv() {
            match event {
                Ok(event) => {
                    let is_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name));

                    if is_config && (event.kind.is_modify() || event.kind.is_create()) {
                        should_reload = true;
                    }
                }
                Err(e) => {
                    log::error!("Config watch error: {}", e);
                }
            }
        }

        if !should_reload {
            return None;
        }

        let now = Instant::now();
        let mut last_reload = self.last_reload.lock().ok()?;
        if now.duration_since(*last_reload) <= RELOAD_DEBOUNCE {
            log::debug!("Config change within debounce window, reloading later");
            self.pending.store(true, Ordering::SeqCst);
            return None;
        }

        log::info!("Config file changed, reloading...");
        self.pending.store(false, Ordering::SeqCst);
        *last_reload = now;
        Some(load_config(&self.path))
    }
}
