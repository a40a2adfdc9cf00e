//! CI-V status utility
//! Opens a configured transceiver session and prints its current state as JSON

use civ_rs::drivers::{list_models, Transceiver};
use civ_rs::serial::{list_ports, FakeTransceiver, Transport};
use civ_rs::{
    level_percent, Address, CivConfig, Filter, Measurement, OperatingMode, RadioResult,
};
use serde::Serialize;
use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[derive(Debug, Serialize)]
struct Status {
    model: String,
    address: Address,
    transceiver_id: Address,
    frequency_hz: u32,
    mode: OperatingMode,
    filter: Option<Filter>,
    smeter: u16,
    smeter_percent: f32,
    smeter_db: Measurement,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!("       {} --list-models", args[0]);
        eprintln!("       {} --list-ports", args[0]);
        eprintln!("\nExample config:");
        eprintln!(r#"  {{"port": "/dev/ttyUSB0", "baud_rate": 19200, "model": "IC-7300"}}"#);
        std::process::exit(1);
    }

    civ_rs::init_drivers();

    match args[1].as_str() {
        "--list-models" => {
            for model in list_models() {
                println!(
                    "{:<12} {}  {}",
                    model.id, model.default_address, model.description
                );
            }
            return Ok(());
        }
        "--list-ports" => {
            for port in list_ports()? {
                println!("{}", port);
            }
            return Ok(());
        }
        _ => {}
    }

    let config = CivConfig::from_json_file(&args[1])?;
    config.register_models()?;

    let status = if config.fake {
        tracing::info!("Using simulated transceiver");
        let address = match config.transceiver_address()? {
            Some(address) => address,
            None => civ_rs::lookup_model(&config.model)?.default_address,
        };
        let fake = FakeTransceiver::new(address).with_baud_rate(config.baud_rate);
        let mut radio = Transceiver::from_config(fake, &config)?;
        read_status(&mut radio).await
    } else {
        tracing::info!("Opening {}...", config.port);
        let mut radio = Transceiver::open(&config)?;
        read_status(&mut radio).await
    }?;

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn read_status<T: Transport>(radio: &mut Transceiver<T>) -> RadioResult<Status> {
    let transceiver_id = radio.read_transceiver_id().await?;
    let frequency_hz = radio.read_operating_frequency().await?;
    let (mode, filter) = radio.read_operating_mode().await?;
    let smeter = radio.read_smeter().await?;
    let smeter_db = radio.model().scale_meter(&civ_rs::civ::commands::READ_SMETER.code, smeter);

    let status = Status {
        model: radio.model().id.clone(),
        address: radio.address(),
        transceiver_id,
        frequency_hz,
        mode,
        filter,
        smeter,
        smeter_percent: level_percent(smeter),
        smeter_db,
    };
    radio.close()?;
    Ok(status)
}
