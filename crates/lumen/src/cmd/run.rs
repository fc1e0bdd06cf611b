use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use lumen_sync::{
    main_thread_queue, ConnectionManager, PortResolver, Schedule, SettingsHandle, Snapshot,
    SyncWorker, SystemResolver,
};
use lumen_transport::SerialConnector;
use tracing::{info, warn};

use crate::cmd::listen::install_ctrlc_handler;
use crate::cmd::{parse_duration, RunArgs};
use crate::config::LumenConfig;
use crate::exit::{sync_error, CliResult, SUCCESS};
use crate::host::StaticHost;

/// How long the main loop blocks on the capture queue per iteration.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How often the settings file is checked for changes.
const CONFIG_CHECK_INTERVAL: Duration = Duration::from_secs(1);

pub fn run(args: RunArgs) -> CliResult<i32> {
    let schedule = Schedule {
        state_period: parse_duration(&args.state_period)?,
        skin_period: parse_duration(&args.skin_period)?,
        ..Schedule::default()
    };
    let deadline = match &args.duration {
        Some(duration) => Some(Instant::now() + parse_duration(duration)?),
        None => None,
    };

    let mut watcher = ConfigWatcher::new(&args.config, args.port.clone());
    let settings = SettingsHandle::new(watcher.load().connection_settings());
    warn_if_unconfigured(&settings.get().port_path);

    let manager = ConnectionManager::new(SerialConnector::default(), settings.clone());
    let (capture, queue) = main_thread_queue::<StaticHost>();
    let worker =
        SyncWorker::spawn(manager, capture, schedule).map_err(|err| sync_error("run failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let snapshot = Snapshot::new(args.mode, args.health, args.max_health);
    let mut host = StaticHost::new(snapshot, args.skin.as_deref());
    info!(mode = %args.mode, health = args.health, max_health = args.max_health, "lumen host running");

    let mut last_config_check = Instant::now();
    while running.load(Ordering::SeqCst) && deadline.is_none_or(|at| Instant::now() < at) {
        queue.run_for(&mut host, POLL_INTERVAL);

        if last_config_check.elapsed() >= CONFIG_CHECK_INTERVAL {
            last_config_check = Instant::now();
            if let Some(config) = watcher.reload_if_changed() {
                let policy = config.policy();
                settings.reconfigure(config.port_path.clone(), policy);
            }
        }
    }

    info!("shutting down");
    // Unblocks a capture the worker may be waiting on.
    drop(queue);
    worker.shutdown();
    Ok(SUCCESS)
}

fn warn_if_unconfigured(port_path: &str) {
    if SystemResolver.resolve(port_path).is_none() {
        warn!("no serial port configured; use --port, the settings file or LUMEN_SERIAL_PORT");
    }
}

/// Tracks the settings file and re-reads it when its modification time changes.
struct ConfigWatcher<'a> {
    path: &'a Path,
    port_override: Option<String>,
    modified: Option<SystemTime>,
}

impl<'a> ConfigWatcher<'a> {
    fn new(path: &'a Path, port_override: Option<String>) -> Self {
        Self {
            path,
            port_override,
            modified: None,
        }
    }

    fn load(&mut self) -> LumenConfig {
        self.modified = modified_time(self.path);
        let mut config = LumenConfig::load(self.path);
        if let Some(port) = &self.port_override {
            config.port_path = port.trim().to_string();
        }
        config
    }

    fn reload_if_changed(&mut self) -> Option<LumenConfig> {
        let modified = modified_time(self.path);
        if modified == self.modified {
            return None;
        }
        info!(path = %self.path.display(), "settings file changed, reloading");
        Some(self.load())
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "lumen-run-{tag}-{}-{}",
            std::process::id(),
            SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn port_override_wins_over_file() {
        let dir = unique_temp_dir("override");
        let path = dir.join("lumen.json");
        LumenConfig {
            port_path: "/dev/ttyACM0".to_string(),
            ..LumenConfig::default()
        }
        .save(&path)
        .unwrap();

        let mut watcher = ConfigWatcher::new(&path, Some("/dev/ttyUSB3".to_string()));
        assert_eq!(watcher.load().port_path, "/dev/ttyUSB3");

        let mut watcher = ConfigWatcher::new(&path, None);
        assert_eq!(watcher.load().port_path, "/dev/ttyACM0");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn reload_only_when_file_appears_or_changes() {
        let dir = unique_temp_dir("reload");
        let path = dir.join("lumen.json");
        let mut watcher = ConfigWatcher::new(&path, None);
        assert_eq!(watcher.load(), LumenConfig::default());
        assert_eq!(watcher.reload_if_changed(), None);

        LumenConfig {
            port_path: "COM9".to_string(),
            ..LumenConfig::default()
        }
        .save(&path)
        .unwrap();
        let reloaded = watcher.reload_if_changed().expect("new file should be picked up");
        assert_eq!(reloaded.port_path, "COM9");
        assert_eq!(watcher.reload_if_changed(), None);
        let _ = fs::remove_dir_all(&dir);
    }
}
