// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The address map: the one place address constants enter the system.
//!
//! Built once from a [`SocDescriptor`] and shared read-only (behind an `Arc`)
//! by decoder registration and descriptor export.

use crate::{AddressRange, ConfigError};
use serde::Serialize;
use socfab_config::{RegionConfig, SizeSpec, SocDescriptor};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSpec {
    pub symbol: String,
    pub driver: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapEntry {
    pub id: String,
    pub kind: String,
    pub range: AddressRange,
    pub enabled: bool,
    pub latency: u32,
    pub export: Option<ExportSpec>,
    #[serde(skip)]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub name: String,
    pub range: AddressRange,
}

/// A firmware placement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub base: u32,
    pub size: u32,
}

impl Region {
    pub fn as_range(&self) -> AddressRange {
        AddressRange::new(self.base, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegions {
    pub rom: Region,
    pub ram: Region,
}

/// One line of the firmware descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorEntry {
    pub symbolic_name: String,
    pub driver: String,
    /// Decoder name of the target behind this entry.
    pub target: String,
    pub base_address: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressMap {
    pub soc: String,
    pub entries: Vec<MapEntry>,
    pub reserved: Vec<Reservation>,
    pub regions: MemoryRegions,
    /// Always inside `regions.rom`.
    pub reset_vector: u32,
}

fn size_u32(id: &str, size: &SizeSpec) -> Result<u32, ConfigError> {
    let bytes = size.bytes().map_err(|e| ConfigError::InvalidSize {
        id: id.to_string(),
        reason: format!("{:#}", e),
    })?;
    u32::try_from(bytes).map_err(|_| ConfigError::InvalidSize {
        id: id.to_string(),
        reason: format!("{:#x} bytes does not fit the 32-bit address space", bytes),
    })
}

impl AddressMap {
    pub fn from_descriptor(desc: &SocDescriptor) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(desc.targets.len());
        for t in &desc.targets {
            let size = size_u32(&t.id, &t.size)?;
            entries.push(MapEntry {
                id: t.id.clone(),
                kind: t.r#type.clone(),
                range: AddressRange::new(t.base_address, size),
                enabled: t.enabled,
                latency: t.latency,
                export: t.export.as_ref().map(|e| ExportSpec {
                    symbol: e.name.clone(),
                    driver: e.driver.clone().unwrap_or_else(|| t.r#type.clone()),
                }),
                options: t.config.clone(),
            });
        }

        let reserved = desc
            .reserved
            .iter()
            .map(|r| {
                Ok(Reservation {
                    name: r.name.clone(),
                    range: AddressRange::new(r.base_address, size_u32(&r.name, &r.size)?),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut map = Self {
            soc: desc.name.clone(),
            entries,
            reserved,
            regions: MemoryRegions {
                rom: Region { base: 0, size: 0 },
                ram: Region { base: 0, size: 0 },
            },
            reset_vector: 0,
        };
        map.regions = MemoryRegions {
            rom: map.region("rom", &desc.software.rom)?,
            ram: map.region("ram", &desc.software.ram)?,
        };

        let rom = map.regions.rom.as_range();
        map.reset_vector = desc.cpu.reset_vector.unwrap_or(rom.base);
        if !rom.contains(map.reset_vector) {
            return Err(ConfigError::ResetVector {
                address: map.reset_vector,
                rom,
            });
        }
        Ok(map)
    }

    /// Resolve a placement window relative to the target it lives in.
    fn region(&self, which: &str, cfg: &RegionConfig) -> Result<Region, ConfigError> {
        let entry = self
            .entry(&cfg.target)
            .ok_or_else(|| ConfigError::UnknownTarget {
                id: cfg.target.clone(),
                context: format!("the {} region", which),
            })?;
        let size = size_u32(which, &cfg.size)?;
        let base = entry
            .range
            .base
            .checked_add(cfg.offset)
            .ok_or_else(|| ConfigError::InvalidRegion {
                region: which.to_string(),
                reason: format!("offset {:#x} overflows the address space", cfg.offset),
            })?;
        let region = Region { base, size };

        if size == 0 || !entry.range.contains_range(&region.as_range()) {
            return Err(ConfigError::InvalidRegion {
                region: which.to_string(),
                reason: format!(
                    "{} does not fit inside '{}' {}",
                    region.as_range(),
                    entry.id,
                    entry.range
                ),
            });
        }
        Ok(region)
    }

    pub fn entry(&self, id: &str) -> Option<&MapEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn enabled(&self) -> impl Iterator<Item = &MapEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }

    /// Descriptor lines for every enabled, exported target, in declaration order.
    pub fn descriptor_entries(&self) -> Vec<DescriptorEntry> {
        self.enabled()
            .filter_map(|e| {
                let export = e.export.as_ref()?;
                Some(DescriptorEntry {
                    symbolic_name: export.symbol.clone(),
                    driver: export.driver.clone(),
                    target: e.id.clone(),
                    base_address: e.range.base,
                })
            })
            .collect()
    }
}
