// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{BusTarget, ByteStrobes};
use std::collections::BTreeMap;

/// Opaque CSR window: a sparse bank of 32-bit registers that reads back what
/// was written. Stands in for peripherals whose internals are not modelled.
#[derive(Debug, Default, serde::Serialize)]
pub struct CsrBank {
    regs: BTreeMap<u32, u32>, // word offset -> value
    #[serde(skip)]
    latency: u32,
}

impl CsrBank {
    pub fn new(latency: u32) -> Self {
        Self {
            regs: BTreeMap::new(),
            latency,
        }
    }
}

impl BusTarget for CsrBank {
    fn read(&mut self, offset: u32) -> u32 {
        self.regs.get(&(offset & !3)).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u32, value: u32, strobes: ByteStrobes) {
        let reg = self.regs.entry(offset & !3).or_insert(0);
        *reg = strobes.merge(*reg, value);
    }

    fn latency(&self) -> u32 {
        self.latency
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
