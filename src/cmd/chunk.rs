use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use rcollib::format::chunk::read_chunk;

use crate::{
    cmd::{parse_resource_type, resolve_resource_type},
    util::file::{first_mismatch, map_file},
};

#[derive(FromArgs, PartialEq, Debug)]
/// process single chunk files
#[argh(subcommand, name = "chunk")]
pub struct Args {
    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommand {
    Dump(DumpArgs),
    Verify(VerifyArgs),
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// prints a parsed chunk
#[argh(subcommand, name = "dump")]
pub struct DumpArgs {
    #[argh(positional)]
    /// input file
    input: PathBuf,
    #[argh(option, long = "type", from_str_fn(parse_resource_type))]
    /// resource type id (hex) or tag; taken from the chunk's tag if omitted
    resource_type: Option<u32>,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// round-trips a chunk and compares the bytes
#[argh(subcommand, name = "verify")]
pub struct VerifyArgs {
    #[argh(positional)]
    /// input file
    input: PathBuf,
    #[argh(option, long = "type", from_str_fn(parse_resource_type))]
    /// resource type id (hex) or tag; taken from the chunk's tag if omitted
    resource_type: Option<u32>,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        SubCommand::Dump(c_args) => dump(c_args),
        SubCommand::Verify(c_args) => verify(c_args),
    }
}

fn dump(args: DumpArgs) -> Result<()> {
    let mmap = map_file(&args.input)?;
    let resource_type = resolve_resource_type(args.resource_type, &mmap)?;
    let chunk = read_chunk(resource_type, &mmap)
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;
    println!("{chunk:#?}");
    Ok(())
}

fn verify(args: VerifyArgs) -> Result<()> {
    let mmap = map_file(&args.input)?;
    let resource_type = resolve_resource_type(args.resource_type, &mmap)?;
    let chunk = read_chunk(resource_type, &mmap)
        .with_context(|| format!("Failed to read '{}'", args.input.display()))?;
    if !chunk.is_known_type() {
        log::warn!("Type {resource_type:#010X} is not registered, compared as raw bytes");
    }
    let bytes = chunk.to_bytes()?;
    if let Some(pos) = first_mismatch(&mmap, &bytes) {
        bail!(
            "Mismatch at {pos:#X} (read {:#X} bytes, wrote {:#X})",
            mmap.len(),
            bytes.len()
        );
    }
    log::info!("{}: OK", args.input.display());
    Ok(())
}
