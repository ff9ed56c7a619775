// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{BusTarget, ByteStrobes};

pub const DEFAULT_TYPE_ID: u32 = 0xCA7F_100F;
pub const DEFAULT_VERSION: u32 = 1;

/// Read-only identification registers: `type` at 0x0, `version` at 0x4.
#[derive(Debug, serde::Serialize)]
pub struct SocId {
    type_id: u32,
    version: u32,
}

impl SocId {
    pub fn new(type_id: u32, version: u32) -> Self {
        Self { type_id, version }
    }
}

impl BusTarget for SocId {
    fn read(&mut self, offset: u32) -> u32 {
        match offset & !3 {
            0x0 => self.type_id,
            0x4 => self.version,
            _ => 0,
        }
    }

    fn write(&mut self, _offset: u32, _value: u32, _strobes: ByteStrobes) {}

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
