//! Example: Diff two HTML fragments and check the delta both ways
//!
//! Prints the delta as JSON, then applies it forward and backward.
//!
//! Usage: cargo run --example diff <left.html> <right.html>

use std::env;
use html_diffpatch::{html, DiffPatch};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <left.html> <right.html>", args[0]);
        std::process::exit(1);
    }

    eprintln!("Parsing left: {}", args[1]);
    let left = html::parse_file(&args[1])?;

    eprintln!("Parsing right: {}", args[2]);
    let right = html::parse_file(&args[2])?;

    let dp = DiffPatch::new();
    let Some(delta) = dp.diff(&left, &right) else {
        eprintln!("Fragments are identical");
        return Ok(());
    };

    println!("{}", delta.to_json_string_pretty()?);

    // Both directions must land on the other side exactly.
    let patched = dp.patch(&left, &delta)?;
    let unpatched = dp.unpatch(&right, &delta)?;
    eprintln!(
        "\n{} changes; patch {}, unpatch {}",
        delta.len(),
        if patched == right { "ok" } else { "MISMATCH" },
        if unpatched == left { "ok" } else { "MISMATCH" },
    );

    Ok(())
}
