use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::{cargo, finish, OnFailure};

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let start = Instant::now();

    let mut args = vec![
        "doc",
        "--workspace",
        "--no-deps",
        "--document-private-items",
        "--features",
        "fault-core/std",
    ];
    if open {
        args.push("--open");
    }
    cargo("Documentation", &args, OnFailure::Abort)?;

    if !open {
        println!(
            "   {}",
            "Open target/doc/fault_core/index.html in your browser".dimmed()
        );
        println!();
    }

    finish("Documentation", start);
    Ok(())
}
