use radariq_transport::available_ports;
use serde::Serialize;

use crate::cmd::PortsArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{emit_list, OutputFormat, Render};

#[derive(Serialize)]
struct PortOutput {
    name: String,
    kind: &'static str,
    product: Option<String>,
}

impl Render for PortOutput {
    fn rows(&self) -> Vec<(String, String)> {
        vec![
            ("port".to_string(), self.name.clone()),
            ("kind".to_string(), self.kind.to_string()),
            (
                "product".to_string(),
                self.product.clone().unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }

    fn raw(&self) -> String {
        self.name.clone()
    }
}

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports: Vec<PortOutput> = available_ports()
        .map_err(|err| transport_error("port enumeration failed", err))?
        .into_iter()
        .map(|port| PortOutput {
            name: port.name,
            kind: port.kind,
            product: port.product,
        })
        .collect();

    if ports.is_empty() {
        tracing::info!("no serial ports found");
    }
    emit_list(&ports, &["PORT", "KIND", "PRODUCT"], format);
    Ok(SUCCESS)
}
