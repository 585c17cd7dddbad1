// File: args.rs
use crate::context::PlayerOptions;
use crate::error::DashResult;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogLevel {
    Trace = 0, // Designates very fine-grained informational events, extremely verbose.
    Debug = 1, // Designates fine-grained informational events.
    Info = 2, // Designates informational messages.
    Warn = 3, // Designates hazardous situations.
    Error = 4, // Designates very serious errors.
}

#[derive(Parser, Debug)]
#[command(version, about, long_about="Downloads a DASH presentation, picking each segment by measured bandwidth.")]
pub struct Args {
    /// Local path or http(s) URL of the manifest
    pub manifest: String,
    /// JSON file with player options; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    #[arg(short = 'x', long, action = clap::ArgAction::SetTrue)]
    pub xml_validation: bool,
    #[arg(short, long)]
    pub schema: Option<PathBuf>,
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,
}

pub fn parse_args() -> Args {
    Args::parse()
}

pub fn get_log_level_filter(args: &Args) -> LevelFilter {
    // Map the LogLevel enum to the LevelFilter enum
    match args.log_level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

/// Options from the config file (or defaults) with command line overrides applied.
pub fn player_options(args: &Args) -> DashResult<PlayerOptions> {
    let mut options = match &args.config {
        Some(path) => PlayerOptions::from_json_file(path)?,
        None => PlayerOptions::default(),
    };
    if args.xml_validation {
        options.xml_validation = true;
    }
    if let Some(schema) = &args.schema {
        options.schema_path = schema.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        options.output_dir = output_dir.clone();
    }
    Ok(options)
}
