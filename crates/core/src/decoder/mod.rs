// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{AddressRange, ConfigError, TargetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderEntry {
    pub name: String,
    pub range: AddressRange,
    /// `None` for reserved windows, which claim address space but never route.
    pub target: Option<TargetId>,
}

/// Maps transaction addresses to the unique target whose range contains them.
///
/// Entries are kept sorted by base address. Since `register` rejects any
/// overlap, a binary search over the bases finds the only candidate.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    entries: Vec<DecoderEntry>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        range: AddressRange,
        target: TargetId,
    ) -> Result<(), ConfigError> {
        self.insert(name.into(), range, Some(target))
    }

    /// Claim a window without a target behind it.
    pub fn reserve(
        &mut self,
        name: impl Into<String>,
        range: AddressRange,
    ) -> Result<(), ConfigError> {
        self.insert(name.into(), range, None)
    }

    fn insert(
        &mut self,
        name: String,
        range: AddressRange,
        target: Option<TargetId>,
    ) -> Result<(), ConfigError> {
        // Overlap first so a mis-sized window is reported against its neighbour.
        if let Some(existing) = self.entries.iter().find(|e| e.range.overlaps(&range)) {
            return Err(ConfigError::Overlap {
                name,
                range,
                existing: existing.name.clone(),
                existing_range: existing.range,
            });
        }

        if !range.is_aligned() {
            return Err(ConfigError::Alignment { name, range });
        }

        if let Some(existing) = self.entries.iter().find(|e| e.name == name) {
            return Err(ConfigError::DuplicateName {
                name,
                first: existing.range.base,
                second: range.base,
            });
        }

        tracing::debug!("Decoder: {} -> {} ({:?})", name, range, target);

        let idx = self.entries.partition_point(|e| e.range.base < range.base);
        self.entries.insert(
            idx,
            DecoderEntry {
                name,
                range,
                target,
            },
        );
        Ok(())
    }

    /// Pure lookup: `None` when no target claims `address`.
    pub fn route(&self, address: u32) -> Option<TargetId> {
        self.entry_at(address).and_then(|e| e.target)
    }

    /// The entry (target or reservation) containing `address`.
    pub fn entry_at(&self, address: u32) -> Option<&DecoderEntry> {
        let idx = self.entries.partition_point(|e| e.range.base <= address);
        let candidate = self.entries.get(idx.checked_sub(1)?)?;
        candidate.range.contains(address).then_some(candidate)
    }

    pub fn lookup(&self, name: &str) -> Option<&DecoderEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn range_of(&self, target: TargetId) -> Option<AddressRange> {
        self.entries
            .iter()
            .find(|e| e.target == Some(target))
            .map(|e| e.range)
    }

    /// Entries in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &DecoderEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
