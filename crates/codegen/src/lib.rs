// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Firmware descriptor export.
//!
//! The exporter turns the `(symbolic name, base)` pairs recorded during SoC
//! assembly into the files firmware is built against. It never trusts the
//! entries on their own: every base is checked against the live decoder, so
//! firmware can only ever see addresses the fabric actually routes.

mod c_header;
mod json;
mod linker;
mod rust;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use socfab_core::decoder::Decoder;
use socfab_core::map::{DescriptorEntry, MemoryRegions, Region};
use socfab_core::ConfigError;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

pub const HEADER_FILE: &str = "soc.h";
pub const LINKER_FILE: &str = "sections.lds";
pub const RUST_FILE: &str = "soc.rs";
pub const JSON_FILE: &str = "soc.json";

/// Generated descriptor files, keyed by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    files: BTreeMap<String, String>,
}

impl Artifact {
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// SHA-256 over every file name and content, in name order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, content) in &self.files {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update(content.as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Write the files into `dir`, leaving untouched any file whose content
    /// is already current. Returns the number of files written.
    pub fn write_to(&self, dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;

        let mut written = 0;
        for (name, content) in &self.files {
            let path = dir.join(name);
            if std::fs::read_to_string(&path).ok().as_deref() == Some(content.as_str()) {
                debug!("{:?} is up to date", path);
                continue;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {:?}", path))?;
            written += 1;
        }
        info!("Wrote {} of {} descriptor files to {:?}", written, self.files.len(), dir);
        Ok(written)
    }
}

/// Descriptor data after validation, shared by the individual generators.
pub(crate) struct Descriptor<'a> {
    pub soc: &'a str,
    pub entries: &'a [DescriptorEntry],
    pub regions: &'a MemoryRegions,
}

impl Descriptor<'_> {
    /// Distinct driver names, sorted.
    pub fn drivers(&self) -> Vec<&str> {
        let mut drivers: Vec<&str> = self.entries.iter().map(|e| e.driver.as_str()).collect();
        drivers.sort_unstable();
        drivers.dedup();
        drivers
    }
}

pub struct Exporter<'a> {
    decoder: &'a Decoder,
    soc: String,
}

impl<'a> Exporter<'a> {
    pub fn new(decoder: &'a Decoder) -> Self {
        Self {
            decoder,
            soc: "soc".to_string(),
        }
    }

    /// Name recorded in the generated file banners.
    pub fn named(mut self, soc: impl Into<String>) -> Self {
        self.soc = soc.into();
        self
    }

    pub fn export(
        &self,
        entries: &[DescriptorEntry],
        regions: &MemoryRegions,
    ) -> Result<Artifact, ConfigError> {
        self.validate(entries, regions)?;

        let desc = Descriptor {
            soc: &self.soc,
            entries,
            regions,
        };
        let mut files = BTreeMap::new();
        files.insert(HEADER_FILE.to_string(), c_header::render(&desc));
        files.insert(LINKER_FILE.to_string(), linker::render(&desc));
        files.insert(RUST_FILE.to_string(), rust::render(&desc));
        files.insert(JSON_FILE.to_string(), json::render(&desc));

        info!(
            "Exported {} peripherals for '{}' ({} files)",
            entries.len(),
            self.soc,
            files.len()
        );
        Ok(Artifact { files })
    }

    /// Every check runs before anything is generated.
    pub fn validate(
        &self,
        entries: &[DescriptorEntry],
        regions: &MemoryRegions,
    ) -> Result<(), ConfigError> {
        let mut seen: HashMap<&str, u32> = HashMap::new();
        for e in entries {
            if let Some(first) = seen.insert(&e.symbolic_name, e.base_address) {
                return Err(ConfigError::DuplicateName {
                    name: e.symbolic_name.clone(),
                    first,
                    second: e.base_address,
                });
            }
        }

        for e in entries {
            check_identifier(&e.symbolic_name)?;
            check_identifier(&e.driver)?;
            check_generated_names(&e.symbolic_name, entries)?;
            self.check_entry(e)?;
        }

        self.check_region("rom", &regions.rom)?;
        self.check_region("ram", &regions.ram)?;
        Ok(())
    }

    fn check_entry(&self, e: &DescriptorEntry) -> Result<(), ConfigError> {
        let mismatch = |detail: String| ConfigError::RangeMismatch {
            name: e.symbolic_name.clone(),
            address: e.base_address,
            detail,
        };

        let registered = self
            .decoder
            .lookup(&e.target)
            .ok_or_else(|| mismatch(format!("no range is registered for target '{}'", e.target)))?;
        let target = registered
            .target
            .ok_or_else(|| mismatch(format!("'{}' is a reserved window", e.target)))?;

        if registered.range.base != e.base_address {
            return Err(mismatch(format!(
                "'{}' is registered at {}",
                e.target, registered.range
            )));
        }
        if self.decoder.route(e.base_address) != Some(target) {
            return Err(mismatch(format!("the base does not route to '{}'", e.target)));
        }
        debug!("{} -> '{}' {}", e.symbolic_name, e.target, registered.range);
        Ok(())
    }

    fn check_region(&self, which: &str, region: &Region) -> Result<(), ConfigError> {
        let range = region.as_range();
        match self.decoder.entry_at(region.base) {
            Some(entry) if entry.target.is_some() && entry.range.contains_range(&range) => Ok(()),
            Some(entry) => Err(ConfigError::RangeMismatch {
                name: which.to_string(),
                address: region.base,
                detail: format!("{} is not contained in '{}' {}", range, entry.name, entry.range),
            }),
            None => Err(ConfigError::RangeMismatch {
                name: which.to_string(),
                address: region.base,
                detail: format!("{} is not inside any registered range", range),
            }),
        }
    }
}

/// C keywords that are not also Rust keywords (`syn` rejects those).
const C_KEYWORDS: &[&str] = &[
    "auto",
    "bool",
    "case",
    "char",
    "default",
    "double",
    "float",
    "goto",
    "inline",
    "int",
    "long",
    "register",
    "restrict",
    "short",
    "signed",
    "sizeof",
    "switch",
    "typedef",
    "union",
    "unsigned",
    "void",
    "volatile",
    "_Alignas",
    "_Alignof",
    "_Atomic",
    "_Bool",
    "_Complex",
    "_Generic",
    "_Imaginary",
    "_Noreturn",
    "_Static_assert",
    "_Thread_local",
];

/// Names `soc.h` defines besides the peripheral pointers.
const HEADER_NAMES: &[&str] = &[
    "SOC_H",
    "SOC_ROM_BASE",
    "SOC_ROM_SIZE",
    "SOC_RAM_BASE",
    "SOC_RAM_SIZE",
];

/// Constants `soc.rs` defines besides the `<NAME>_BASE` ones.
const MODULE_NAMES: &[&str] = &[
    "ROM_BASE",
    "ROM_SIZE",
    "RAM_BASE",
    "RAM_SIZE",
    "PERIPHERALS",
];

/// Symbols end up as C and Rust identifiers, so keywords of both languages
/// are rejected.
fn check_identifier(name: &str) -> Result<(), ConfigError> {
    let valid = syn::parse_str::<syn::Ident>(name).is_ok()
        && name.is_ascii()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && !C_KEYWORDS.contains(&name);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidSymbol(name.to_string()))
    }
}

/// A peripheral symbol must not collide with anything else the generators emit.
fn check_generated_names(symbol: &str, entries: &[DescriptorEntry]) -> Result<(), ConfigError> {
    let base_const = format!("{}_BASE", symbol);
    let clashes = HEADER_NAMES.contains(&symbol)
        || MODULE_NAMES.contains(&base_const.as_str())
        || entries.iter().any(|e| symbol == format!("{}_regs_t", e.driver));
    if clashes {
        return Err(ConfigError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}
