// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod csr;
pub mod soc_id;
pub mod timer;

use crate::map::MapEntry;
use crate::memory::Memory;
use crate::{BusTarget, ConfigError};

/// Instantiate the stand-in device for a map entry, keyed by its type.
pub fn build_target(entry: &MapEntry) -> Result<Box<dyn BusTarget>, ConfigError> {
    let size = entry.range.size as usize;
    let dev: Box<dyn BusTarget> = match entry.kind.as_str() {
        "sram" => Box::new(Memory::new(size, true, entry.latency)),
        "spiflash" => Box::new(Memory::rom(size, entry.latency)),
        "csr" => Box::new(csr::CsrBank::new(entry.latency)),
        "soc_id" => {
            let type_id = option_u32(entry, "type_id")?.unwrap_or(soc_id::DEFAULT_TYPE_ID);
            let version = option_u32(entry, "version")?.unwrap_or(soc_id::DEFAULT_VERSION);
            Box::new(soc_id::SocId::new(type_id, version))
        }
        "plat_timer" => Box::new(timer::PlatformTimer::new()),
        other => {
            return Err(ConfigError::UnknownTargetType {
                id: entry.id.clone(),
                kind: other.to_string(),
            })
        }
    };
    Ok(dev)
}

fn option_u32(entry: &MapEntry, key: &str) -> Result<Option<u32>, ConfigError> {
    let Some(value) = entry.options.get(key) else {
        return Ok(None);
    };
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidTargetConfig {
            id: entry.id.clone(),
            reason: format!("'{}' must be a 32-bit unsigned integer", key),
        })
}
