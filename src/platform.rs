//! Platform inference from release asset names.
//!
//! This is a best-effort substring heuristic, not a parser. Aliases are tried
//! longest first so that `arm64` wins over `arm` and `darwin` wins over `win`.

use crate::types::PlatformInfo;
use std::cmp::Reverse;
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_ARCH: &str = "amd64";

pub type AliasTable = &'static [(&'static str, &'static [&'static str])];

pub const OS_ALIASES: AliasTable = &[
    ("linux", &["linux"]),
    ("darwin", &["darwin", "macos", "osx", "apple"]),
    ("windows", &["windows", "win64", "win32", "win"]),
    ("freebsd", &["freebsd"]),
    ("openbsd", &["openbsd"]),
    ("netbsd", &["netbsd"]),
];

pub const ARCH_ALIASES: AliasTable = &[
    ("amd64", &["amd64", "x86_64", "x86-64", "x64"]),
    ("386", &["386", "i386", "i686", "x86"]),
    ("arm64", &["arm64", "aarch64"]),
    ("arm", &["armv7", "armv6", "armhf", "arm"]),
    ("ppc64le", &["ppc64le"]),
    ("s390x", &["s390x"]),
    ("riscv64", &["riscv64"]),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("could not determine OS from '{0}'")]
    UnknownOs(String),
    #[error("alias '{alias}' is listed under both '{first}' and '{second}'")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },
}

/// Host platform using the same canonical names as the alias tables.
pub fn get_system_info() -> PlatformInfo {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };

    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64le",
        other => other,
    };

    PlatformInfo {
        os: os.to_string(),
        arch: arch.to_string(),
    }
}

/// Flattens a table into `(alias, canonical)` pairs sorted longest alias
/// first. Ties are broken alphabetically so the order never depends on table
/// layout.
pub fn sorted_aliases(table: AliasTable) -> Result<Vec<(&'static str, &'static str)>, PlatformError> {
    let mut reverse: HashMap<&'static str, &'static str> = HashMap::new();
    for &(canonical, aliases) in table {
        for &alias in aliases {
            if let Some(existing) = reverse.insert(alias, canonical) {
                if existing != canonical {
                    return Err(PlatformError::AliasCollision {
                        alias: alias.to_string(),
                        first: existing.to_string(),
                        second: canonical.to_string(),
                    });
                }
            }
        }
    }

    let mut pairs: Vec<_> = reverse.into_iter().collect();
    pairs.sort_by_key(|(alias, _)| (Reverse(alias.len()), *alias));
    Ok(pairs)
}

/// Returns the canonical value of the first (longest) alias found in `name`.
pub fn lookup(table: AliasTable, name: &str) -> Result<Option<&'static str>, PlatformError> {
    let name = name.to_lowercase();
    let found = sorted_aliases(table)?
        .into_iter()
        .find(|(alias, _)| name.contains(alias))
        .map(|(alias, canonical)| {
            tracing::trace!("'{}' matched alias '{}' -> {}", name, alias, canonical);
            canonical
        });
    Ok(found)
}

/// Infers `(os, arch)` from an asset name. The OS must be present; a missing
/// architecture falls back to [`DEFAULT_ARCH`].
pub fn find_platform(asset_name: &str) -> Result<PlatformInfo, PlatformError> {
    let os = lookup(OS_ALIASES, asset_name)?
        .ok_or_else(|| PlatformError::UnknownOs(asset_name.to_string()))?;
    let arch = lookup(ARCH_ALIASES, asset_name)?.unwrap_or(DEFAULT_ARCH);

    Ok(PlatformInfo {
        os: os.to_string(),
        arch: arch.to_string(),
    })
}
