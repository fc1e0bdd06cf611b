use serde::Serialize;
use tracing::info;

use crate::cmd::ConfigArgs;
use crate::config::LumenConfig;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct ConfigOutput {
    path: String,
    saved: bool,
    #[serde(flatten)]
    config: LumenConfig,
}

impl Report for ConfigOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let port = if self.config.port_path.is_empty() {
            "<auto>".to_string()
        } else {
            self.config.port_path.clone()
        };
        vec![
            ("path", self.path.clone()),
            ("port_path", port),
            ("auto_reconnect", self.config.auto_reconnect.to_string()),
            (
                "reconnect_period_seconds",
                self.config.reconnect_period_seconds.to_string(),
            ),
            ("saved", self.saved.to_string()),
        ]
    }
}

pub fn run(args: ConfigArgs, format: OutputFormat) -> CliResult<i32> {
    let mut config = LumenConfig::load(&args.config);
    let changed =
        args.port.is_some() || args.auto_reconnect.is_some() || args.reconnect_period.is_some();

    if let Some(port) = args.port {
        config.port_path = port;
    }
    if let Some(auto_reconnect) = args.auto_reconnect {
        config.auto_reconnect = auto_reconnect;
    }
    if let Some(period) = args.reconnect_period {
        config.reconnect_period_seconds = period;
    }
    let config = config.normalized();

    if changed {
        config.save(&args.config).map_err(|err| {
            io_error(&format!("failed writing {}", args.config.display()), err)
        })?;
        info!(path = %args.config.display(), "settings saved");
    }

    print_report(
        &ConfigOutput {
            path: args.config.display().to_string(),
            saved: changed,
            config,
        },
        format,
    );
    Ok(SUCCESS)
}
