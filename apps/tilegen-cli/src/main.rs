use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tilegen_catalogue::Catalogue;
use tilegen_common::Direction;
use tilegen_solver::{FinalResult, Solver, SolverConfig};
use tilegen_tools::GridInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tilegen-cli", about = "CLI tool for tile map generation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Fill a grid from a single seed at its center
    Generate {
        /// Grid width in cells
        #[arg(long, default_value = "12")]
        width: usize,
        /// Grid height in cells
        #[arg(long, default_value = "12")]
        height: usize,
        /// RNG seed
        #[arg(short, long, default_value = "0")]
        seed: u64,
        /// Catalogue JSON file (defaults to the standard catalogue)
        #[arg(short, long)]
        catalogue: Option<PathBuf>,
        /// Stop after this many collapses
        #[arg(long)]
        steps: Option<usize>,
        /// Print the grid as JSON instead of a text dump
        #[arg(long)]
        json: bool,
    },
    /// List the variants of a catalogue
    Catalogue {
        /// Catalogue JSON file (defaults to the standard catalogue)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Write the catalogue as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn load_catalogue(path: Option<&Path>) -> anyhow::Result<Catalogue> {
    match path {
        Some(path) => Catalogue::load_json(path)
            .with_context(|| format!("loading catalogue from {}", path.display())),
        None => Ok(Catalogue::standard()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("tilegen-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("catalogue: {}", tilegen_catalogue::crate_info());
            println!("solver: {}", tilegen_solver::crate_info());
            println!("tools: {}", tilegen_tools::crate_info());
            println!("standard catalogue: {} variants", Catalogue::standard().len());
        }
        Commands::Generate {
            width,
            height,
            seed,
            catalogue,
            steps,
            json,
        } => {
            let catalogue = load_catalogue(catalogue.as_deref())?;
            let config = SolverConfig {
                width,
                height,
                rng_seed: seed,
            };
            let mut solver = Solver::with_default_seed(&catalogue, &config)?;
            let result = match steps {
                Some(limit) => solver.run_with_limit(limit),
                None => solver.run_to_completion(),
            };
            tracing::debug!(?result, events = solver.events().len(), "generation finished");

            let summary = GridInspector::summary(&solver);
            if json {
                let out = serde_json::json!({
                    "config": config,
                    "summary": summary,
                    "tiles": GridInspector::tile_names(&solver),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", GridInspector::dump(&solver));
                println!("{summary}");
                match result {
                    FinalResult::Solved => println!("Result: solved"),
                    FinalResult::Stuck(cells) => {
                        println!("Result: stuck with {} unresolved cells", cells.len());
                        for at in solver.grid().contradictions() {
                            if let Some(info) = GridInspector::inspect_cell(&solver, at) {
                                println!("  {info}");
                            }
                        }
                    }
                    FinalResult::Interrupted { steps } => {
                        println!("Result: interrupted after {steps} steps")
                    }
                }
            }
        }
        Commands::Catalogue { path, export } => {
            let catalogue = load_catalogue(path.as_deref())?;
            println!("Catalogue: {} variants", catalogue.len());
            if let Some(default) = catalogue.default_tile() {
                println!("Default tile: {}", catalogue.name(default));
            }
            for variant in catalogue.iter() {
                let counts: Vec<String> = Direction::ALL
                    .iter()
                    .map(|d| format!("{}={}", d.letter(), variant.compatible(*d).len()))
                    .collect();
                println!(
                    "  {} {:<14} {:?} weight={:.1} [{}]",
                    variant.id,
                    variant.name,
                    variant.kind,
                    variant.weight,
                    counts.join(" ")
                );
            }
            if let Some(out) = export {
                catalogue
                    .save_json(&out)
                    .with_context(|| format!("writing catalogue to {}", out.display()))?;
                println!("Exported to {}", out.display());
            }
        }
    }

    Ok(())
}
