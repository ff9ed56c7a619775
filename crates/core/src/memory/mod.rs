// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{BusTarget, ByteStrobes};
use std::any::Any;
use std::fmt;

/// A simple flat memory target. Read-only memories ignore bus writes but can
/// still be preloaded with [`Memory::load`].
pub struct Memory {
    data: Vec<u8>,
    writable: bool,
    latency: u32,
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("size", &self.data.len())
            .field("writable", &self.writable)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

impl Memory {
    pub fn new(size: usize, writable: bool, latency: u32) -> Self {
        Self {
            data: vec![0; size],
            writable,
            latency,
        }
    }

    pub fn ram(size: usize) -> Self {
        Self::new(size, true, 0)
    }

    pub fn rom(size: usize, latency: u32) -> Self {
        Self::new(size, false, latency)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Copy `bytes` in at `offset`. Fails without writing anything if the
    /// image does not fit.
    pub fn load(&mut self, offset: usize, bytes: &[u8]) -> bool {
        let Some(end) = offset.checked_add(bytes.len()) else {
            return false;
        };
        if end > self.data.len() {
            return false;
        }
        self.data[offset..end].copy_from_slice(bytes);
        true
    }

    fn word(&self, offset: usize) -> u32 {
        let mut bytes = [0u8; 4];
        for (lane, b) in bytes.iter_mut().enumerate() {
            *b = self.data.get(offset + lane).copied().unwrap_or(0);
        }
        u32::from_le_bytes(bytes)
    }
}

impl BusTarget for Memory {
    fn read(&mut self, offset: u32) -> u32 {
        self.word(offset as usize)
    }

    fn write(&mut self, offset: u32, value: u32, strobes: ByteStrobes) {
        if !self.writable {
            tracing::debug!("Write to read-only memory at offset {:#x} ignored", offset);
            return;
        }
        let offset = offset as usize;
        for (lane, byte) in value.to_le_bytes().iter().enumerate() {
            if strobes.bits() & (1 << lane) == 0 {
                continue;
            }
            if let Some(slot) = self.data.get_mut(offset + lane) {
                *slot = *byte;
            }
        }
    }

    fn latency(&self) -> u32 {
        self.latency
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "size": self.data.len(),
            "writable": self.writable,
            "latency": self.latency,
        })
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::ram(1024);

        mem.write(0x0, 0x1234_5678, ByteStrobes::ALL);
        mem.write(0x3FC, 0xCAFE_F00D, ByteStrobes::ALL); // Last word

        assert_eq!(mem.read(0x0), 0x1234_5678);
        assert_eq!(mem.read(0x3FC), 0xCAFE_F00D);
    }

    #[test]
    fn test_byte_strobes() {
        let mut mem = Memory::ram(16);
        mem.write(0x4, 0xAABB_CCDD, ByteStrobes::ALL);
        mem.write(0x4, 0x1122_3344, ByteStrobes::BYTE0);
        assert_eq!(mem.read(0x4), 0xAABB_CC44);
        mem.write(0x4, 0x1122_3344, ByteStrobes::BYTE2 | ByteStrobes::BYTE3);
        assert_eq!(mem.read(0x4), 0x1122_CC44);
        mem.write(0x4, 0xFFFF_FFFF, ByteStrobes::empty());
        assert_eq!(mem.read(0x4), 0x1122_CC44);
    }

    #[test]
    fn test_rom_ignores_writes() {
        let mut mem = Memory::rom(16, 3);
        assert!(mem.load(0, &[0x13, 0x00, 0x00, 0x00]));
        mem.write(0x0, 0xFFFF_FFFF, ByteStrobes::ALL);
        assert_eq!(mem.read(0x0), 0x13);
        assert_eq!(mem.latency(), 3);
    }

    #[test]
    fn test_load_bounds() {
        let mut mem = Memory::ram(1024);

        assert!(mem.load(0, &[1, 2, 3]));
        assert_eq!(mem.read(0), 0x0003_0201);

        // Overlaps end boundary
        assert!(!mem.load(0x3FE, &[10, 20, 30]));
        assert_eq!(mem.read(0x3FC), 0);

        // Exact fit at the end
        assert!(mem.load(0x3FE, &[0xAA, 0xBB]));
        assert_eq!(mem.read(0x3FC), 0xBBAA_0000);
    }
}
