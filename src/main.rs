// src/main.rs
// Entry point for the Argus node: serves next-best-view planning over TCP.

use log::{error, info};
use std::env;
use std::path::Path;
use std::process;

use argus::io::{CloudPublisher, TcpMapClient};
use argus::{ArgusConfig, ArgusError, NbvService, NbvSolver};

const DEFAULT_CONFIG_PATH: &str = "config/argus.yaml";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("argus failed: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ArgusError> {
    let config = load_config()?;

    info!("starting argus next-best-view planner");
    info!("  service address: {}", config.io.bind_address);
    info!("  map server: {}", config.io.map_server_address);
    match &config.io.cloud_publish_address {
        Some(address) => info!("  unknown-cloud publisher: {}", address),
        None => info!("  unknown-cloud publisher: disabled"),
    }
    info!("  map resolution: {} m", config.map.resolution);
    info!(
        "  sensor: {}x{} rays over {}x{} deg, {} m range",
        config.sensor.horizontal_rays,
        config.sensor.vertical_rays,
        config.sensor.horizontal_fov_deg,
        config.sensor.vertical_fov_deg,
        config.sensor.max_range
    );
    info!(
        "  exploration bounds: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
        config.bounds.min.x,
        config.bounds.min.y,
        config.bounds.min.z,
        config.bounds.max.x,
        config.bounds.max.y,
        config.bounds.max.z
    );

    let solver = NbvSolver::new(&config)?;
    let map_client = TcpMapClient::from_config(&config.io);
    let publisher = match &config.io.cloud_publish_address {
        Some(address) => Some(CloudPublisher::bind(address)?),
        None => None,
    };

    let service = NbvService::bind(
        &config.io.bind_address,
        solver,
        Box::new(map_client),
        publisher,
    )?;
    service.serve_forever()
}

fn load_config() -> Result<ArgusConfig, ArgusError> {
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    return Err(ArgusError::Config(
                        "--config needs a file path".to_string(),
                    ));
                }
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    match config_path {
        Some(path) => {
            let config = ArgusConfig::from_file(&path)?;
            info!("loaded configuration from {}", path);
            Ok(config)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            let config = ArgusConfig::from_file(DEFAULT_CONFIG_PATH)?;
            info!("loaded configuration from {}", DEFAULT_CONFIG_PATH);
            Ok(config)
        }
        None => {
            info!("no configuration file found, using built-in defaults");
            Ok(ArgusConfig::default())
        }
    }
}

fn print_help() {
    println!("argus - next-best-view planning service");
    println!();
    println!("USAGE:");
    println!("    argus [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!(
        "    -c, --config <FILE>    Configuration file (default: {})",
        DEFAULT_CONFIG_PATH
    );
    println!("    -h, --help             Print help information");
}
