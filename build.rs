//! Build script for spotmix.
//!
//! Copies `.env.example` from the crate root into the local data directory,
//! next to where the binary looks for its `.env` file.

use std::{env, fs, path::PathBuf};

/// Copies the configuration template.
///
/// Nothing here can fail the build: a missing template or an unwritable data
/// directory only produces a cargo warning.
///
/// Destination:
/// - Linux: `~/.local/share/spotmix/.env.example`
/// - macOS: `~/Library/Application Support/spotmix/.env.example`
/// - Windows: `%LOCALAPPDATA%/spotmix/.env.example`
fn main() {
    println!("cargo:rerun-if-changed=.env.example");

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping .env.example copy");
        return;
    };
    let env_example_path = PathBuf::from(manifest_dir).join(".env.example");
    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return;
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotmix");

    let copied = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&env_example_path, out_dir.join(".env.example")));
    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }
}
