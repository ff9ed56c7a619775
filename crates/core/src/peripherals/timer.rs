// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{BusTarget, ByteStrobes, TargetTickResult};

const COUNTER_MASK: u64 = (1 << 48) - 1;

const CTRL_ENABLE: u32 = 1 << 0;
const CTRL_IRQ_ENABLE: u32 = 1 << 1;

/// 48-bit free-running platform timer with a compare interrupt.
///
/// | offset | register          |
/// |--------|-------------------|
/// | 0x00   | count[31:0]       |
/// | 0x04   | count[47:32]      |
/// | 0x08   | compare[31:0]     |
/// | 0x0C   | compare[47:32]    |
/// | 0x10   | ctrl (EN, IRQ_EN) |
#[derive(Debug, Default, serde::Serialize)]
pub struct PlatformTimer {
    count: u64,
    compare: u64,
    ctrl: u32,
}

impl PlatformTimer {
    pub fn new() -> Self {
        Self {
            compare: COUNTER_MASK,
            ..Default::default()
        }
    }

    fn irq_pending(&self) -> bool {
        (self.ctrl & CTRL_IRQ_ENABLE) != 0 && self.count >= self.compare
    }

    fn read_reg(&self, offset: u32) -> u32 {
        match offset {
            0x00 => self.count as u32,
            0x04 => (self.count >> 32) as u32,
            0x08 => self.compare as u32,
            0x0C => (self.compare >> 32) as u32,
            0x10 => self.ctrl,
            _ => 0,
        }
    }
}

fn set_low(reg: u64, value: u32) -> u64 {
    (reg & !0xFFFF_FFFF) | value as u64
}

fn set_high(reg: u64, value: u32) -> u64 {
    ((reg & 0xFFFF_FFFF) | ((value as u64) << 32)) & COUNTER_MASK
}

impl BusTarget for PlatformTimer {
    fn read(&mut self, offset: u32) -> u32 {
        self.read_reg(offset & !3)
    }

    fn write(&mut self, offset: u32, value: u32, strobes: ByteStrobes) {
        let offset = offset & !3;
        let value = strobes.merge(self.read_reg(offset), value);
        match offset {
            0x00 => self.count = set_low(self.count, value),
            0x04 => self.count = set_high(self.count, value),
            0x08 => self.compare = set_low(self.compare, value),
            0x0C => self.compare = set_high(self.compare, value),
            0x10 => self.ctrl = value & (CTRL_ENABLE | CTRL_IRQ_ENABLE),
            _ => {}
        }
    }

    fn tick(&mut self) -> TargetTickResult {
        if (self.ctrl & CTRL_ENABLE) != 0 {
            self.count = (self.count + 1) & COUNTER_MASK;
        }
        // Level-triggered: stays high until compare is moved past count.
        TargetTickResult {
            irq: self.irq_pending(),
        }
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
