use lumen_transport::{list_ports, locator::preferred_port, resolve_port_path, PORT_ENV_VAR};
use serde::Serialize;

use crate::cmd::PortsArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{new_table, print_raw, OutputFormat};

#[derive(Serialize)]
struct PortsOutput {
    ports: Vec<String>,
    auto_detected: Option<String>,
    env_override: Option<String>,
    selected: Option<String>,
}

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = list_ports().map_err(|err| transport_error("port enumeration failed", err))?;
    let env_override = std::env::var(PORT_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    let output = PortsOutput {
        auto_detected: preferred_port(&ports),
        selected: resolve_port_path(""),
        env_override,
        ports,
    };
    print_ports(&output, format);
    Ok(SUCCESS)
}

fn print_ports(output: &PortsOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PORT", "SELECTED"]);
            for port in &output.ports {
                let selected = output.selected.as_deref() == Some(port.as_str());
                table.add_row(vec![port.clone(), if selected { "*" } else { "" }.to_string()]);
            }
            if let Some(env) = &output.env_override {
                if !output.ports.contains(env) {
                    table.add_row(vec![format!("{env} ({PORT_ENV_VAR})"), "*".to_string()]);
                }
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in &output.ports {
                println!("{port}");
            }
            println!(
                "selected={}",
                output.selected.as_deref().unwrap_or("<none>")
            );
        }
        OutputFormat::Raw => {
            let mut text = output.ports.join("\n");
            if !text.is_empty() {
                text.push('\n');
            }
            print_raw(text.as_bytes());
        }
    }
}
