//! `patient-keygen` — print a random hex key suitable for `ENCRYPTION_SECRET_KEY`.
//!
//! Usage: `patient-keygen [LENGTH_BYTES]` (default 32).

use anyhow::{Context, Result};

use patient_svc::crypto::{generate_key, KEY_LEN};

fn main() -> Result<()> {
    let length = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .with_context(|| format!("LENGTH_BYTES must be a positive integer, got {arg:?}"))?,
        None => KEY_LEN,
    };
    if length == 0 {
        anyhow::bail!("LENGTH_BYTES must be a positive integer");
    }

    println!("{}", generate_key(length));
    Ok(())
}
