// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod arbiter;
pub mod decoder;
pub mod interconnect;
pub mod map;
pub mod master;
pub mod memory;
pub mod peripherals;
pub mod range;
pub mod sideband;
pub mod system;

use std::any::Any;

pub use range::AddressRange;
pub use system::Soc;
pub use socfab_config::IrqLineKind;

mod tests;

/// Value returned for reads that hit no registered target.
pub const UNMAPPED_READ_VALUE: u32 = 0xFFFF_FFFF;

/// Index of a master port in arbitration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct MasterId(pub usize);

/// Index of a registered target in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct TargetId(pub usize);

bitflags::bitflags! {
    /// Byte lanes of the 32-bit data bus selected by a transaction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ByteStrobes: u8 {
        const BYTE0 = 0b0001;
        const BYTE1 = 0b0010;
        const BYTE2 = 0b0100;
        const BYTE3 = 0b1000;
        const ALL = Self::BYTE0.bits()
            | Self::BYTE1.bits()
            | Self::BYTE2.bits()
            | Self::BYTE3.bits();
    }
}

impl ByteStrobes {
    /// Bit mask covering the selected byte lanes.
    pub fn lane_mask(self) -> u32 {
        (0..4)
            .filter(|lane| self.bits() & (1 << lane) != 0)
            .fold(0u32, |mask, lane| mask | (0xFF << (lane * 8)))
    }

    /// Merge `value` into `old` on the selected lanes only.
    pub fn merge(self, old: u32, value: u32) -> u32 {
        let mask = self.lane_mask();
        (old & !mask) | (value & mask)
    }
}

impl Default for ByteStrobes {
    fn default() -> Self {
        ByteStrobes::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub address: u32,
    pub write: bool,
    pub data: u32,
    pub strobes: ByteStrobes,
    pub requestor: MasterId,
}

impl Transaction {
    pub fn read(requestor: MasterId, address: u32) -> Self {
        Self {
            address,
            write: false,
            data: 0,
            strobes: ByteStrobes::ALL,
            requestor,
        }
    }

    pub fn write(requestor: MasterId, address: u32, data: u32, strobes: ByteStrobes) -> Self {
        Self {
            address,
            write: true,
            data,
            strobes,
            requestor,
        }
    }
}

/// Acknowledge returned to the master that owned the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Response {
    pub data: u32,
    pub err: bool,
}

impl Response {
    pub fn ack(data: u32) -> Self {
        Self { data, err: false }
    }

    /// The fixed response for an access that decodes to no target.
    pub fn unmapped() -> Self {
        Self {
            data: UNMAPPED_READ_VALUE,
            err: true,
        }
    }
}

/// Build-time address map errors. Any of these aborts SoC assembly or export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Misaligned range for '{name}': {range} (size must be a power of two and base a multiple of size)")]
    Alignment { name: String, range: AddressRange },
    #[error("Range {range} of '{name}' overlaps {existing_range} of '{existing}'")]
    Overlap {
        name: String,
        range: AddressRange,
        existing: String,
        existing_range: AddressRange,
    },
    #[error("Duplicate name '{name}' (at {first:#010x} and {second:#010x})")]
    DuplicateName {
        name: String,
        first: u32,
        second: u32,
    },
    #[error("'{name}' at {address:#010x} does not match the decoder: {detail}")]
    RangeMismatch {
        name: String,
        address: u32,
        detail: String,
    },
    #[error("Unknown target type '{kind}' for '{id}'")]
    UnknownTargetType { id: String, kind: String },
    #[error("Invalid size for '{id}': {reason}")]
    InvalidSize { id: String, reason: String },
    #[error("Unknown target '{id}' referenced by {context}")]
    UnknownTarget { id: String, context: String },
    #[error("Invalid {region} region: {reason}")]
    InvalidRegion { region: String, reason: String },
    #[error("Invalid configuration for '{id}': {reason}")]
    InvalidTargetConfig { id: String, reason: String },
    #[error("Reset vector {address:#010x} lies outside the rom region {rom}")]
    ResetVector { address: u32, rom: AddressRange },
    #[error("Unknown bus master '{0}'")]
    UnknownMaster(String),
    #[error("Duplicate bus master '{0}'")]
    DuplicateMaster(String),
    #[error("'{0}' is not a valid C/Rust identifier")]
    InvalidSymbol(String),
    #[error("Interrupt line '{0:?}' is driven more than once")]
    IrqLineConflict(IrqLineKind),
}

/// Runtime bus conditions. These never stop the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("Unmapped access at {0:#010x}")]
    UnmappedAccess(u32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetTickResult {
    pub irq: bool,
}

/// A component reachable at a fixed address range over the shared bus.
///
/// Offsets are relative to the target's base. The fabric always hands
/// word-aligned offsets to targets; byte lanes are selected by strobes.
pub trait BusTarget: std::fmt::Debug + Send {
    fn read(&mut self, offset: u32) -> u32;
    fn write(&mut self, offset: u32, value: u32, strobes: ByteStrobes);

    /// Extra cycles the target withholds its acknowledge.
    fn latency(&self) -> u32 {
        0
    }
    fn tick(&mut self) -> TargetTickResult {
        TargetTickResult::default()
    }
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}

/// A component that initiates transactions on the shared bus.
pub trait BusMaster: std::fmt::Debug + Send {
    /// The transaction this master is presenting, if any. It must keep
    /// presenting the same transaction until [`BusMaster::complete`] is called.
    fn request(&mut self) -> Option<Transaction>;
    fn complete(&mut self, response: Response);
    fn interrupts(&mut self, _levels: sideband::IrqLevels) {}
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}
