//! reveal-sim
//!
//! Run reveal / unreveal transitions headlessly over a TOML scene and print
//! the resulting timeline.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Result};
use blinc_reveal::sim::SimHost;
use blinc_reveal::Choreographer;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod scene;

use scene::{Scene, EXAMPLE_SCENE};

#[derive(Parser)]
#[command(name = "reveal-sim")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulate reveal transitions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scene and print its trace
    Run {
        /// Scene file
        scene: PathBuf,

        /// Run the scene's [unreveal] instead of its [reveal]
        #[arg(short, long)]
        unreveal: bool,
    },

    /// Print a sample scene
    Example,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { scene, unreveal } => cmd_run(&scene, unreveal),
        Commands::Example => {
            print!("{EXAMPLE_SCENE}");
            Ok(())
        }
    }
}

fn cmd_run(path: &Path, unreveal: bool) -> Result<()> {
    let mut scene = Scene::load(path)?;
    let mut choreographer = Choreographer::new();

    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    let end_action = move || flag.set(true);

    if unreveal {
        info!("Running unreveal from {}", path.display());
        scene.start_unreveal(&mut choreographer, end_action)?;
    } else {
        info!("Running reveal from {}", path.display());
        scene.start_reveal(&mut choreographer, end_action)?;
    }

    let mut printed = print_new(&scene.host, 0);
    let mut reported = false;
    while let Some(event) = scene.host.next_event() {
        scene.host.deliver(&mut choreographer, event)?;
        printed = print_new(&scene.host, printed);

        if fired.get() && !reported {
            println!("{:>6}ms  end action", scene.host.now_ms());
            reported = true;
        }
    }

    if !reported {
        bail!("Transition did not fire its end action");
    }
    info!("Finished at {}ms", scene.host.now_ms());
    Ok(())
}

/// Print trace entries from `from` on; returns the new trace length
fn print_new(host: &SimHost, from: usize) -> usize {
    let trace = host.trace();
    for entry in &trace[from..] {
        println!("{entry}");
    }
    trace.len()
}
