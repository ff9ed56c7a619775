// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const SCHEMA_VERSION: &str = "1.0";

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_true() -> bool {
    true
}

/// A byte count written either as a plain integer or as a human-readable
/// string such as `"8KiB"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SizeSpec {
    Bytes(u64),
    Human(String),
}

impl SizeSpec {
    pub fn bytes(&self) -> Result<u64> {
        match self {
            SizeSpec::Bytes(n) => Ok(*n),
            SizeSpec::Human(s) => parse_size(s),
        }
    }
}

impl From<u64> for SizeSpec {
    fn from(n: u64) -> Self {
        SizeSpec::Bytes(n)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CpuConfig {
    pub name: String,
    #[serde(default)]
    pub variant: Option<String>,
    /// First instruction fetched after reset. Defaults to the rom region base.
    #[serde(default)]
    pub reset_vector: Option<u32>,
}

fn default_addr_width() -> u8 {
    30
}

fn default_data_width() -> u8 {
    32
}

fn default_granularity() -> u8 {
    8
}

/// Shape of the shared bus. Only 32-bit data with byte granularity is modelled.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BusConfig {
    #[serde(default = "default_addr_width")]
    pub addr_width: u8,
    #[serde(default = "default_data_width")]
    pub data_width: u8,
    #[serde(default = "default_granularity")]
    pub granularity: u8,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            addr_width: default_addr_width(),
            data_width: default_data_width(),
            granularity: default_granularity(),
        }
    }
}

/// How a target shows up in the firmware descriptor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Symbolic name, e.g. `UART0`.
    pub name: String,
    /// Driver family used for the register struct, e.g. `uart`.
    /// Defaults to the target type.
    #[serde(default)]
    pub driver: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TargetConfig {
    pub id: String,
    pub r#type: String, // "sram", "spiflash", "csr", "soc_id", "plat_timer"
    pub base_address: u32,
    pub size: SizeSpec,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Wait states inserted before the target acknowledges.
    #[serde(default)]
    pub latency: u32,
    #[serde(default)]
    pub export: Option<ExportConfig>,
    #[serde(default)]
    pub config: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReservedConfig {
    pub name: String,
    pub base_address: u32,
    pub size: SizeSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IrqLineKind {
    Timer,
    Software,
}

/// One side-band wire into the CPU. A missing `source` ties the line low.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InterruptConfig {
    pub line: IrqLineKind,
    #[serde(default)]
    pub source: Option<String>,
}

/// A firmware placement window carved out of a target's range.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegionConfig {
    pub target: String,
    #[serde(default)]
    pub offset: u32,
    pub size: SizeSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SoftwareConfig {
    pub rom: RegionConfig,
    pub ram: RegionConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SocDescriptor {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    pub cpu: CpuConfig,
    #[serde(default)]
    pub bus: BusConfig,
    pub masters: Vec<String>,
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub reserved: Vec<ReservedConfig>,
    #[serde(default)]
    pub interrupts: Vec<InterruptConfig>,
    pub software: SoftwareConfig,
}

impl SocDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading SoC descriptor {:?}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SoC descriptor at {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid SoC descriptor {:?}", path))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let desc: Self =
            serde_yaml::from_str(yaml).context("Failed to parse SoC Descriptor YAML")?;
        desc.validate()?;
        Ok(desc)
    }

    /// Shape checks only. Address-map consistency is checked at assembly time.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '{}'",
                self.schema_version,
                SCHEMA_VERSION
            );
        }

        if self.name.trim().is_empty() {
            anyhow::bail!("SoC 'name' cannot be empty");
        }

        if self.bus.data_width != 32 || self.bus.granularity != 8 {
            anyhow::bail!(
                "Unsupported bus shape: data_width {} / granularity {} (only 32/8 is supported)",
                self.bus.data_width,
                self.bus.granularity
            );
        }

        // Word addressing: addr_width plus the byte-lane bits must span 32 bits.
        let lane_bits = (self.bus.data_width / self.bus.granularity).trailing_zeros();
        if u32::from(self.bus.addr_width) + lane_bits != 32 {
            anyhow::bail!(
                "addr_width {} does not give a 32-bit byte address space (expected {})",
                self.bus.addr_width,
                32 - lane_bits
            );
        }

        if self.masters.is_empty() {
            anyhow::bail!("At least one bus master is required");
        }

        let mut ids = HashSet::new();
        for t in &self.targets {
            if t.id.trim().is_empty() {
                anyhow::bail!("Target 'id' cannot be empty");
            }
            if !ids.insert(t.id.as_str()) {
                anyhow::bail!("Duplicate target id '{}'", t.id);
            }
        }

        Ok(())
    }

    pub fn target(&self, id: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplayOp {
    Read,
    Write,
}

fn default_strobes() -> u8 {
    0xF
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReplayStep {
    pub master: String,
    pub op: ReplayOp,
    pub address: u32,
    #[serde(default)]
    pub data: u32,
    #[serde(default = "default_strobes")]
    pub strobes: u8,
}

/// A list of bus transactions fed to named masters, in order per master.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    pub schema_version: String,
    #[serde(default)]
    pub max_cycles: Option<u64>,
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open replay script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Replay Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '{}'",
                self.schema_version,
                SCHEMA_VERSION
            );
        }
        if let Some(step) = self.steps.iter().find(|s| s.strobes > 0xF) {
            anyhow::bail!(
                "Byte strobes {:#x} for {:#010x} exceed the 4-byte bus width",
                step.strobes,
                step.address
            );
        }
        Ok(())
    }
}

pub fn parse_size(size_str: &str) -> Result<u64> {
    use human_size::{Byte, Size, SpecificSize};
    let s: Size = size_str
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid size format '{}': {}", size_str, e))?;
    let bytes: SpecificSize<Byte> = s.into();
    Ok(bytes.value() as u64)
}
