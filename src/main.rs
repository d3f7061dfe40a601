mod config;
mod importer;
mod storage;
mod web;

use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::Config;
use crate::importer::{import_csv, ColumnAliases, ImportedFlight};
use crate::storage::Storage;

#[derive(Parser)]
#[command(name = "flight-o-mat")]
#[command(about = "Drone flight log import and track service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV flight log, storing it when a config is given
    Import {
        file: PathBuf,
        #[arg(long)]
        config: Option<String>,
        /// Print the summary and all samples as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the HTTP API server
    Serve {
        #[arg(long)]
        config: String,
    },
    /// List stored flights
    List {
        #[arg(long)]
        config: String,
    },
    /// Print the GeoJSON track of a stored flight
    Track {
        id: String,
        #[arg(long)]
        config: String,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { file, config, json } => import(&file, config.as_deref(), json),
        Commands::Serve { config } => serve(&config),
        Commands::List { config } => list(&config),
        Commands::Track { id, config } => track(&id, &config),
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

fn import(path: &Path, config_path: Option<&str>, json: bool) -> ExitCode {
    let config = match config_path {
        Some(p) => match load_config(p) {
            Some(c) => Some(c),
            None => return ExitCode::FAILURE,
        },
        None => None,
    };
    let aliases = config
        .as_ref()
        .map(|c| c.import.columns.clone())
        .unwrap_or_else(ColumnAliases::default);

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let flight = match import_csv(file, &source_name, chrono::Utc::now(), &aliases) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Import failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&flight) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error encoding JSON: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_summary(&flight);
    }

    if let Some(config) = config {
        let storage = Storage::new(config.storage.base_folder);
        match storage.save_flight(flight) {
            Ok(entry) => println!("Stored as {}", entry.id),
            Err(e) => {
                eprintln!("Error storing flight: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_summary(flight: &ImportedFlight) {
    let s = &flight.summary;
    println!("{}", s.source_name);
    println!("  start:        {}", s.start_time);
    println!("  end:          {}", s.end_time);
    println!("  samples:      {}", flight.samples.len());
    println!("  distance:     {:.1} m", s.distance_meters);
    println!("  max altitude: {:.1} m", s.max_altitude_meters);
    println!("  min battery:  {}%", s.min_battery_percent);
}

fn serve(config_path: &str) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn list(config_path: &str) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let storage = Storage::new(config.storage.base_folder);
    match storage.list_flights() {
        Ok(entries) => {
            println!("{} stored flight(s)", entries.len());
            for entry in entries {
                println!(
                    "  {}  {}  {:.1} m  {} samples",
                    entry.id,
                    entry.summary.source_name,
                    entry.summary.distance_meters,
                    entry.sample_count
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error listing flights: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn track(id: &str, config_path: &str) -> ExitCode {
    let Some(config) = load_config(config_path) else {
        return ExitCode::FAILURE;
    };

    let storage = Storage::new(config.storage.base_folder);
    let line = match storage.track(id) {
        Ok(line) => line,
        Err(e) => {
            eprintln!("Error loading track: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string(&line) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding JSON: {}", e);
            ExitCode::FAILURE
        }
    }
}
