use std::process::ExitCode;

use blimp_internal::SERIAL_BAUD;
use clap::{Parser, Subcommand};
use gcs_blimp::{link, sim};
use log::error;

#[derive(Parser)]
struct GcsArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Talk to a blimp over its XBee or USB serial port
    Link {
        #[arg(short, long)]
        port: String,
        #[arg(short, long, default_value_t = SERIAL_BAUD)]
        baud: u32,
    },
    /// Fly a simulated blimp
    Sim {
        #[arg(short, long)]
        compass: bool,
        /// Compass bearing of the IR beacon
        #[arg(short, long, default_value_t = 90.0)]
        beacon: f32,
    },
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let args = GcsArgs::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Could not build tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(async {
        match args.mode {
            Mode::Link { port, baud } => link::run(&port, baud).await,
            Mode::Sim { compass, beacon } => sim::run(compass, beacon).await,
        }
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
