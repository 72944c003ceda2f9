use crate::format::{format_function, format_unit};
use crate::function::Function;
use crate::unit::CompilationUnit;
use crate::Result;
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub fn save_unit(unit: &CompilationUnit, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(unit)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_unit(path: impl AsRef<Path>) -> Result<CompilationUnit> {
    let json = fs::read_to_string(path)?;
    let unit = serde_json::from_str(&json)?;
    Ok(unit)
}

/// SHA-256 of the function's text form, hex encoded.
pub fn fingerprint_function(function: &Function) -> String {
    digest(format_function(function).as_bytes())
}

pub fn fingerprint_unit(unit: &CompilationUnit) -> String {
    digest(format_unit(unit).as_bytes())
}

/// Per-declaration fingerprints, in declaration order.
pub fn snapshot(unit: &CompilationUnit) -> IndexMap<String, String> {
    unit.declarations
        .iter()
        .map(|(name, function)| (name.clone(), fingerprint_function(function)))
        .collect()
}

/// Names of declarations whose fingerprint differs between two snapshots.
pub fn changed_declarations(
    before: &IndexMap<String, String>,
    after: &IndexMap<String, String>,
) -> Vec<String> {
    after
        .iter()
        .filter(|(name, hash)| before.get(*name) != Some(*hash))
        .map(|(name, _)| name.clone())
        .collect()
}

fn digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
