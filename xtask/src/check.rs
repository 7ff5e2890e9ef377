use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, finish, OnFailure, TARGET};

/// Feature sets the fault handler must build with on the target.
const HARDWARE_FEATURE_SETS: &[&str] = &[
    "hardware",
    "hardware,memmanage,busfault,usagefault",
    "hardware,policy-halt",
    "hardware,policy-reboot",
    "hardware,busfault,policy-breakpoint-else-reboot",
];

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking fault handler builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // fault-core must stay no_std with and without defmt
    cargo(
        "Checking fault-core (no_std)",
        &["check", "-p", "fault-core", "--target", TARGET],
        OnFailure::Abort,
    )?;
    cargo(
        "Checking fault-core (no_std + defmt)",
        &["check", "-p", "fault-core", "--target", TARGET, "--features", "defmt"],
        OnFailure::Abort,
    )?;

    for &features in HARDWARE_FEATURE_SETS {
        cargo(
            &format!("Checking fault-handler [{features}]"),
            &[
                "check",
                "-p",
                "fault-handler",
                "--target",
                TARGET,
                "--features",
                features,
                "--bins",
            ],
            OnFailure::Abort,
        )?;
    }

    cargo(
        "Running clippy lints",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        OnFailure::Warn,
    )?;

    let fmt = cargo(
        "Checking code formatting",
        &["fmt", "--all", "--check"],
        OnFailure::Warn,
    )?;
    if !fmt.status.success() {
        eprintln!("     Run 'cargo fmt --all' to fix");
        println!();
    }

    finish("All checks", total_start);
    Ok(())
}
