use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// Embedded target every hardware build uses.
pub const TARGET: &str = "thumbv7em-none-eabihf";

/// How a failed step affects the task.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Warn,
}

/// Run `cargo <args>`, print a timed pass/fail line and return the output.
pub fn cargo(label: &str, args: &[&str], on_failure: OnFailure) -> Result<Output> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))?;

    if output.status.success() {
        println!(
            "{}",
            format!("  ✓ {label} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
        );
    } else {
        match on_failure {
            OnFailure::Abort => {
                eprintln!("{}", format!("  ✗ {label} failed").red().bold());
                eprintln!();
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
                for line in String::from_utf8_lossy(&output.stdout).lines() {
                    eprintln!("  {line}");
                }
                anyhow::bail!("{label} failed");
            }
            OnFailure::Warn => {
                eprintln!("{}", format!("  ⚠ {label} reported problems").yellow().bold());
                eprintln!();
                eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            }
        }
    }
    println!();

    Ok(output)
}

/// Print the closing line of a task.
pub fn finish(what: &str, start: Instant) {
    println!(
        "{}",
        format!("✓ {what} completed in {:.2}s", start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();
}
