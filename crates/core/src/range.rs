// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `[base, base + size)` window of the 32-bit address space.
///
/// Interval arithmetic is done in `u64` so a window ending at 4GiB does not wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRange {
    pub base: u32,
    pub size: u32,
}

impl AddressRange {
    pub const fn new(base: u32, size: u32) -> Self {
        Self { base, size }
    }

    /// One past the last byte.
    pub fn end(&self) -> u64 {
        self.base as u64 + self.size as u64
    }

    /// Power-of-two size with the base a multiple of it.
    pub fn is_aligned(&self) -> bool {
        self.size.is_power_of_two() && self.base % self.size == 0
    }

    pub fn contains(&self, addr: u32) -> bool {
        let addr = addr as u64;
        addr >= self.base as u64 && addr < self.end()
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        (self.base as u64) < other.end() && (other.base as u64) < self.end()
    }

    pub fn contains_range(&self, other: &AddressRange) -> bool {
        other.base >= self.base && other.end() <= self.end()
    }

    pub fn offset_of(&self, addr: u32) -> Option<u32> {
        self.contains(addr).then(|| addr - self.base)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}+{:#x}", self.base, self.size)
    }
}
