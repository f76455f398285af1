use routetime::prelude::*;
use std::{process::ExitCode, time::Instant};
use tracing::{error, info};

fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    info!("Building route time list...");
    let now = Instant::now();
    match run() {
        Ok(()) => {
            info!("Building route time list took {:?}", now.elapsed());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Failed to build route time list: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), merge::Error> {
    let mut merger = Merger::from_config(source::Config::default(), merge::Config::default())?;
    let data = merger.run()?;
    for path in write_files(".", merger.config(), &data)? {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
