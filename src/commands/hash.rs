//! # Hash Command Implementation
//!
//! Prints the content hash of each platform, one `platform<TAB>hash` line per
//! platform, or the bare hash when `--platform` is given.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use lockweave::hash;

use super::read_document;

/// Print the content hash of each platform
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Resolution document (only its specification is read).
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Print only this platform's hash.
    #[arg(short, long, value_name = "PLATFORM")]
    pub platform: Option<String>,
}

/// Execute the `hash` command.
pub fn execute(args: HashArgs) -> Result<()> {
    let document = read_document(&args.input)?;
    match args.platform {
        Some(platform) => {
            println!("{}", hash::content_hash_for_platform(&document.spec, &platform)?);
        }
        None => {
            for (platform, digest) in hash::content_hashes(&document.spec)? {
                println!("{}\t{}", platform, digest);
            }
        }
    }
    Ok(())
}
