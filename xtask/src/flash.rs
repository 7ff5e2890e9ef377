use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

use crate::step::{cargo, OnFailure, TARGET};

const CHIP: &str = "STM32F411RETx";
const BIN: &str = "fault-demo";

pub fn run(release: bool, extra_features: &str) -> Result<()> {
    let mode = if release { "release" } else { "debug" };
    let features = if extra_features.is_empty() {
        "hardware".to_string()
    } else {
        format!("hardware,{extra_features}")
    };

    println!();
    println!(
        "{}",
        format!("🔨 Building {BIN} ({mode} mode, features: {features})...")
            .cyan()
            .bold()
    );
    println!();

    let mut args = vec![
        "build",
        "-p",
        "fault-handler",
        "--bin",
        BIN,
        "--target",
        TARGET,
        "--features",
        features.as_str(),
    ];
    if release {
        args.push("--release");
    }
    cargo("Build", &args, OnFailure::Abort)?;

    let binary = format!("target/{TARGET}/{mode}/{BIN}");
    show_binary_size(&binary);

    println!("{}", format!("📡 Running on {CHIP}...").cyan().bold());
    println!(
        "   {}",
        "The demo faults on purpose; the report appears on ITM port 0".dimmed()
    );

    let flash_start = Instant::now();
    let status = Command::new("probe-rs")
        .args(["run", binary.as_str(), "--chip", CHIP, "--probe-index", "0"])
        .status()
        .context("Failed to run probe-rs. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !status.success() {
        eprintln!("{}", "✗ probe-rs exited with an error".red().bold());
        anyhow::bail!("Flash failed - check that the probe is connected and the device is powered");
    }

    println!(
        "{}",
        format!(
            "✓ Session ended after {:.2}s",
            flash_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    Ok(())
}

fn show_binary_size(binary: &str) {
    // rust-size ships with cargo-binutils; skip quietly if it is missing
    if let Ok(out) = Command::new("rust-size").args([binary, "-A"]).output() {
        if out.status.success() {
            println!("{}", "📊 Binary size:".cyan());
            for line in String::from_utf8_lossy(&out.stdout).lines() {
                println!("   {}", line.dimmed());
            }
            println!();
        }
    }
}
