// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: region OCR and document tags from the terminal.
//
// Entry point. Initialises logging and backend services, then dispatches the
// requested command.

mod services;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scanwerk_core::types::Point;
use tokio::runtime::Runtime;

use services::app_services::{AppServices, RecognizeRequest};
use services::console::ConsoleSink;

#[derive(Parser)]
#[command(
    name = "scanwerk",
    about = "Recognize text in part of a scanned page and manage document tags",
    version
)]
struct Cli {
    /// Data directory holding config.json and the tag file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the set of available tags
    Tags {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Recognize text in an image
    Ocr {
        /// Scanned page (PNG, JPEG, TIFF, ...)
        image: PathBuf,

        /// Drag rectangle in display coordinates (e.g., "10,10,220,160")
        #[arg(short, long, value_parser = parse_selection)]
        select: Option<(Point, Point)>,

        /// Zoom level the selection was made at
        #[arg(short, long)]
        zoom: Option<f32>,

        /// Run recognition without offering Ctrl-C cancellation
        #[arg(long)]
        no_cancel: bool,

        /// Also write the selected region to this file
        #[arg(long)]
        save_selection: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Print every stored tag, one per line
    List,
    /// Add a tag
    Add { tag: String },
    /// Remove a tag
    Remove { tag: String },
    /// Print where the tag file lives
    Path,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings as JSON
    Show,
    /// Change settings; options not given keep their current value
    Set {
        /// Tag file location
        #[arg(long)]
        tag_file: Option<PathBuf>,

        /// Offer Ctrl-C cancellation during recognition (true/false)
        #[arg(long)]
        cancelable_ocr: Option<bool>,

        /// Zoom level assumed when `ocr --zoom` is not given
        #[arg(long)]
        default_zoom: Option<f32>,

        /// Directory holding the OCR models
        #[arg(long)]
        ocr_model_dir: Option<PathBuf>,
    },
}

fn parse_selection(s: &str) -> Result<(Point, Point), String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match parts.as_slice() {
        &[x1, y1, x2, y2] => Ok((Point::new(x1, y1), Point::new(x2, y2))),
        _ => Err(format!("expected X1,Y1,X2,Y2 but got {} values", parts.len())),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: could not start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match block_on_detached(runtime, run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        // The message sink has already told the user what went wrong.
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn build_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Drive `future` to completion, then shut the runtime down without waiting
/// for blocking workers that a canceled recognition run left behind.
fn block_on_detached<F: Future>(runtime: Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    output
}

async fn run(cli: Cli) -> Result<()> {
    let mut services = match cli.data_dir {
        Some(dir) => AppServices::with_data_dir(dir, ConsoleSink),
        None => AppServices::init(ConsoleSink),
    };
    tracing::info!(data_dir = %services.data_dir().display(), "Scanwerk starting");

    match cli.command {
        Commands::Tags { action } => match action {
            TagAction::List => {
                for tag in services.list_tags()? {
                    println!("{tag}");
                }
            }
            TagAction::Add { tag } => services.add_tag(&tag)?,
            TagAction::Remove { tag } => services.remove_tag(&tag)?,
            TagAction::Path => println!("{}", services.tag_file().display()),
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(services.config())?);
            }
            ConfigAction::Set {
                tag_file,
                cancelable_ocr,
                default_zoom,
                ocr_model_dir,
            } => {
                let mut config = services.config().clone();
                if tag_file.is_some() {
                    config.tag_file = tag_file;
                }
                if let Some(cancelable) = cancelable_ocr {
                    config.cancelable_ocr = cancelable;
                }
                if let Some(zoom) = default_zoom {
                    config.default_zoom = zoom;
                }
                if ocr_model_dir.is_some() {
                    config.ocr_model_dir = ocr_model_dir;
                }
                services.save_config(config)?;
            }
        },

        Commands::Ocr {
            image,
            select,
            zoom,
            no_cancel,
            save_selection,
        } => {
            let request = RecognizeRequest {
                image,
                selection: select,
                zoom,
                no_cancel,
                save_selection,
            };
            match services.recognize(&request).await? {
                Some(text) => println!("{text}"),
                None => eprintln!("Recognition canceled."),
            }
        }
    }

    Ok(())
}
