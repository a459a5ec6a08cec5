use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use powersim_core::prelude::*;
use powersim::{BatteryModelNode, LoadEstimatorNode, PowersimConfig};

#[derive(Parser)]
#[command(name = "powersim")]
#[command(about = "Battery load estimation for simulated robots")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run for a bounded number of seconds instead of until Ctrl+C
    #[arg(short, long)]
    duration: Option<f64>,

    /// Run the battery model in-process instead of waiting for an
    /// external one
    #[arg(long)]
    with_battery: bool,
}

fn main() -> PowerResult<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => PowersimConfig::from_yaml_file(path)?,
        None => PowersimConfig::default(),
    };
    config.validate()?;

    let mut scheduler = Scheduler::new().name("powersim");

    // The battery model initializes first so the estimator's startup
    // service wait finds it already registered.
    if cli.with_battery {
        scheduler.add(BatteryModelNode::new(config.battery.clone())?, 10);
    }
    scheduler.add(LoadEstimatorNode::new(config.estimator.clone())?, 50);

    match cli.duration {
        Some(secs) => scheduler.run_for(Duration::from_secs_f64(secs)),
        None => scheduler.run(),
    }
}
