//! LC-3 Emulator - CLI Entry Point
//!
//! Commands:
//! - `lc3-emu run <image>...` - Run one or more object images
//! - `lc3-emu disasm <image>` - Disassemble an object image

use clap::{Parser, Subcommand};
use log::*;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lc3-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An emulator for the LC-3 educational computer")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run programs until they halt, each on a fresh machine
    Run {
        /// Object images to execute, in order
        #[arg(required = true)]
        images: Vec<String>,
        /// Stop a run after this many instructions
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Print a JSON register report to stderr after each run
        #[arg(short, long)]
        report: bool,
    },
    /// Disassemble an object image
    Disasm {
        /// Path to the object image
        image: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { images, max_cycles, report } => run_images(&images, max_cycles, report),
        Commands::Disasm { image } => disassemble_file(&image),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run_images(paths: &[String], max_cycles: Option<u64>, report: bool) -> ExitCode {
    use lc3::{load_image, Cpu, StdConsole};

    // Every image must load before anything runs
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match load_image(path) {
            Ok(image) => images.push((path, image)),
            Err(e) => {
                eprintln!("❌ Failed to load image {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        }
    }

    let mut console = StdConsole::new();
    let mut failed = false;

    for (path, image) in &images {
        let mut cpu = Cpu::with_image(image);
        info!("Running: {}", path);

        let result = match max_cycles {
            Some(limit) => cpu.run_limited(&mut console, limit),
            None => cpu.run(&mut console),
        };

        match result {
            Ok(cycles) => {
                info!("{} finished after {} instructions ({:?})", path, cycles, cpu.state);
                if cpu.is_running() {
                    warn!("{} reached the instruction limit without halting", path);
                }
            }
            Err(e) => {
                let at = cpu.fault_pc.unwrap_or_else(|| cpu.regs.pc());
                eprintln!("❌ Execution of {} failed at PC={:#06x}: {}", path, at, e);
                failed = true;
            }
        }

        if report {
            match serde_json::to_string_pretty(&cpu.report()) {
                Ok(json) => eprintln!("{}", json),
                Err(e) => error!("could not render report: {}", e),
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn disassemble_file(path: &str) -> ExitCode {
    use lc3::{disassemble, load_image};

    match load_image(path) {
        Ok(image) => {
            println!("{}", disassemble(&image));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Failed to load image {}: {}", path, e);
            ExitCode::FAILURE
        }
    }
}
