use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use rcollib::format::{
    chunk::read_chunk,
    rcol::{ChunkPolicy, Rcol, RcolLayout},
};
use serde_json::json;

use crate::util::file::{first_mismatch, map_file};

#[derive(FromArgs, PartialEq, Debug)]
/// process RCOL containers
#[argh(subcommand, name = "rcol")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    List(ListArgs),
    Verify(VerifyArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// lists the chunks of an RCOL container
#[argh(subcommand, name = "list")]
pub struct ListArgs {
    #[argh(positional)]
    /// input file
    input: PathBuf,
    #[argh(switch)]
    /// print JSON instead of a table
    json: bool,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// re-serializes every chunk of RCOL containers and reports mismatches
#[argh(subcommand, name = "verify")]
pub struct VerifyArgs {
    #[argh(positional)]
    /// input files
    inputs: Vec<PathBuf>,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::List(c_args) => list(c_args),
        SubCommand::Verify(c_args) => verify(c_args),
    }
}

fn list(args: ListArgs) -> Result<()> {
    let mmap = map_file(&args.input)?;
    let rcol = Rcol::read(&mmap, ChunkPolicy::Preserve)
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;
    let layout = RcolLayout::read(&mmap)?;

    if args.json {
        let chunks = rcol
            .chunks
            .iter()
            .zip(&layout.chunks)
            .map(|(entry, raw)| {
                json!({
                    "key": entry.key.to_string(),
                    "tag": entry.chunk.tag().map(|tag| tag.to_string()),
                    "size": raw.data.len(),
                    "parsed": entry.chunk.is_known_type(),
                })
            })
            .collect::<Vec<_>>();
        let external = rcol.external_resources.iter().map(|key| key.to_string()).collect::<Vec<_>>();
        let value = json!({
            "version": rcol.version,
            "public_chunks": rcol.public_chunk_count,
            "chunks": chunks,
            "external_resources": external,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "RCOL version {} with {} chunks ({} public), {} external resources",
        rcol.version,
        rcol.chunks.len(),
        rcol.public_chunk_count,
        rcol.external_resources.len()
    );
    for (i, (entry, raw)) in rcol.chunks.iter().zip(&layout.chunks).enumerate() {
        let tag = entry.chunk.tag().map_or_else(|| "????".to_string(), |tag| tag.to_string());
        let state = if entry.chunk.is_known_type() { "" } else { " (raw)" };
        println!("{i:>3}: {tag} {} {:#X} bytes{state}", entry.key, raw.data.len());
    }
    for key in &rcol.external_resources {
        println!("  ext: {key}");
    }
    Ok(())
}

fn verify(args: VerifyArgs) -> Result<()> {
    let mut failures = 0usize;
    for input in &args.inputs {
        match verify_file(input) {
            Ok(0) => log::info!("{}: OK", input.display()),
            Ok(count) => {
                log::info!("{}: {count} chunk(s) differ", input.display());
                failures += 1;
            }
            Err(e) => {
                log::error!("{}: {e:#}", input.display());
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{failures} of {} file(s) failed verification", args.inputs.len());
    }
    Ok(())
}

/// Returns the number of chunks whose re-encoded bytes differ from the input.
fn verify_file(path: &Path) -> Result<usize> {
    let mmap = map_file(path)?;
    let layout = RcolLayout::read(&mmap)?;
    let mut mismatches = 0;
    for (i, raw) in layout.chunks.iter().enumerate() {
        let chunk = read_chunk(raw.key.resource_type, raw.data)
            .with_context(|| format!("Failed to read chunk {i} ({})", raw.key))?;
        let bytes = chunk.to_bytes().with_context(|| format!("Failed to write chunk {i}"))?;
        if let Some(pos) = first_mismatch(raw.data, &bytes) {
            log::info!(
                "- chunk {i} ({}): mismatch at {pos:#X} (read {:#X} bytes, wrote {:#X})",
                raw.key,
                raw.data.len(),
                bytes.len()
            );
            mismatches += 1;
        }
    }

    // The container itself is normalized on write, so it only has to re-read cleanly
    let rcol = Rcol::read(&mmap, ChunkPolicy::Strict)?;
    let reread = Rcol::read(&rcol.to_bytes()?, ChunkPolicy::Strict)?;
    if reread != rcol {
        log::info!("- container differs after re-reading");
        mismatches += 1;
    }
    Ok(mismatches)
}
