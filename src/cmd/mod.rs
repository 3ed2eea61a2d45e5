pub mod chunk;
pub mod rcol;

use anyhow::{anyhow, Result};
use argh::FromArgs;
use rcollib::format::chunk::registered_types;

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub enum SubCommand {
    Rcol(rcol::Args),
    Chunk(chunk::Args),
}

/// Parses a chunk resource type given either as a hex id (`0x01D0E76B`) or a tag (`SKIN`).
pub fn parse_resource_type(value: &str) -> Result<u32, String> {
    let hex = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"));
    if let Some(hex) = hex {
        return u32::from_str_radix(hex, 16).map_err(|e| format!("invalid type id '{value}': {e}"));
    }
    registered_types()
        .iter()
        .find(|(_, tag)| tag.to_string().eq_ignore_ascii_case(value))
        .map(|&(resource_type, _)| resource_type)
        .or_else(|| u32::from_str_radix(value, 16).ok())
        .ok_or_else(|| format!("unknown chunk type '{value}'"))
}

/// Resource type used for a chunk file: the explicit one, else the one matching its tag.
pub fn resolve_resource_type(explicit: Option<u32>, data: &[u8]) -> Result<u32> {
    if let Some(resource_type) = explicit {
        return Ok(resource_type);
    }
    let tag = rcollib::format::peek_four_cc(data)
        .ok_or_else(|| anyhow!("Chunk is too short to hold a tag, pass --type"))?;
    registered_types()
        .iter()
        .find(|(_, t)| *t == tag)
        .map(|&(resource_type, _)| resource_type)
        .ok_or_else(|| anyhow!("No registered chunk type for tag {tag:?}, pass --type"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_names() {
        assert_eq!(Ok(0x01D0E76B), parse_resource_type("SKIN"));
        assert_eq!(Ok(0x01D0E76B), parse_resource_type("skin"));
        assert_eq!(Ok(0x0229684B), parse_resource_type("0x0229684B"));
        assert_eq!(Ok(0x0355E0A6), parse_resource_type("0355E0A6"));
        assert!(parse_resource_type("NOPE").is_err());
    }

    #[test]
    fn resolve_from_tag() {
        assert_eq!(0x01D0E76B, resolve_resource_type(None, b"SKIN\x01\0\0\0").unwrap());
        assert_eq!(7, resolve_resource_type(Some(7), b"SKIN").unwrap());
        assert!(resolve_resource_type(None, b"SK").is_err());
    }
}
