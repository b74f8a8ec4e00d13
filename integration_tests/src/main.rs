//! Integration tests for the UV sensor BLE firmware.
//!
//! Run after flashing the firmware to read the sensor test service over BLE.

mod ble_client;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use ble_client::SensorClient;
use tests::{print_results, run_all_tests};

#[derive(Parser)]
#[command(name = "integration-tests")]
#[command(about = "Integration tests for the UV sensor BLE firmware")]
struct Args {
    /// Advertised name prefix of the device
    #[arg(short, long, default_value = "UvSensor-")]
    name: String,

    /// Seconds to scan before giving up
    #[arg(short, long, default_value = "10")]
    scan_timeout: u64,

    /// Reads per repeated-read test
    #[arg(short, long, default_value = "5")]
    reads: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("{}", "UV Sensor Integration Tests".bold());
    println!("Name prefix: {}", args.name);
    println!();

    println!("Scanning...");
    let client = SensorClient::connect_by_prefix(&args.name, Duration::from_secs(args.scan_timeout)).await?;
    println!("{} {}", "Connected to".green(), client.name());

    println!("\nRunning tests...\n");

    let results = run_all_tests(&client, args.reads).await;
    print_results(&results);

    client.disconnect().await.ok();

    let failed = results.iter().filter(|r| !r.passed).count();
    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
