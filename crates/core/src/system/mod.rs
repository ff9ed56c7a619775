// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod builder;

use crate::decoder::Decoder;
use crate::interconnect::{CycleOutcome, Interconnect, TargetSlot};
use crate::map::AddressMap;
use crate::memory::Memory;
use crate::sideband::{IrqConnection, Sideband};
use crate::{BusMaster, ConfigError, MasterId, TargetId};
use socfab_config::SocDescriptor;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct MasterSlot {
    pub name: String,
    pub dev: Option<Box<dyn BusMaster>>,
}

/// An assembled SoC: address map, bus fabric, master ports and side-band wiring.
pub struct Soc {
    map: Arc<AddressMap>,
    interconnect: Interconnect,
    masters: Vec<MasterSlot>,
    sideband: Sideband,
    cycles: u64,
}

impl Soc {
    /// Elaborate a SoC from its descriptor. Fails on the first inconsistency;
    /// no partially built SoC is ever returned.
    pub fn assemble(desc: &SocDescriptor) -> Result<Self, ConfigError> {
        let map = Arc::new(AddressMap::from_descriptor(desc)?);
        info!("Assembling SoC '{}'", map.soc);

        // Reservations go in first so a clash is reported against the live target.
        let mut decoder = Decoder::new();
        for entry in map.entries.iter().filter(|e| !e.enabled) {
            // Keep the slot so re-enabling it can never collide.
            decoder.reserve(&entry.id, entry.range)?;
            warn!("Target '{}' is disabled; {} stays reserved", entry.id, entry.range);
        }
        for r in &map.reserved {
            decoder.reserve(&r.name, r.range)?;
        }

        let mut targets = Vec::new();
        for entry in map.enabled() {
            let id = TargetId(targets.len());
            decoder.register(&entry.id, entry.range, id)?;
            targets.push(TargetSlot {
                name: entry.id.clone(),
                dev: crate::peripherals::build_target(entry)?,
            });
        }

        let mut masters: Vec<MasterSlot> = Vec::new();
        for name in &desc.masters {
            if masters.iter().any(|m| &m.name == name) {
                return Err(ConfigError::DuplicateMaster(name.clone()));
            }
            masters.push(MasterSlot {
                name: name.clone(),
                dev: None,
            });
        }

        let mut sideband = Sideband::new();
        for irq in &desc.interrupts {
            let source = match &irq.source {
                Some(src) => Some(decoder.lookup(src).and_then(|e| e.target).ok_or_else(|| {
                    ConfigError::UnknownTarget {
                        id: src.clone(),
                        context: format!("the {:?} interrupt line", irq.line),
                    }
                })?),
                None => None,
            };
            // Interrupt inputs belong to the CPU, whose first port is the sink.
            sideband.connect(IrqConnection {
                line: irq.line,
                source,
                sink: MasterId(0),
            })?;
        }

        info!(
            "SoC '{}': {} targets, {} masters, {} side-band connections",
            map.soc,
            targets.len(),
            masters.len(),
            sideband.connections().len()
        );

        Ok(Self {
            interconnect: Interconnect::new(masters.len(), decoder, targets),
            map,
            masters,
            sideband,
            cycles: 0,
        })
    }

    pub fn map(&self) -> &Arc<AddressMap> {
        &self.map
    }

    pub fn decoder(&self) -> &Decoder {
        self.interconnect.decoder()
    }

    pub fn interconnect(&self) -> &Interconnect {
        &self.interconnect
    }

    pub fn sideband(&self) -> &Sideband {
        &self.sideband
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn master_id(&self, name: &str) -> Option<MasterId> {
        self.masters.iter().position(|m| m.name == name).map(MasterId)
    }

    pub fn master_names(&self) -> impl Iterator<Item = &str> {
        self.masters.iter().map(|m| m.name.as_str())
    }

    pub fn attach_master(
        &mut self,
        name: &str,
        dev: Box<dyn BusMaster>,
    ) -> Result<MasterId, ConfigError> {
        let id = self
            .master_id(name)
            .ok_or_else(|| ConfigError::UnknownMaster(name.to_string()))?;
        debug!("Attaching master '{}' as {:?}", name, id);
        self.masters[id.0].dev = Some(dev);
        Ok(id)
    }

    pub fn master(&self, name: &str) -> Option<&dyn BusMaster> {
        self.masters
            .iter()
            .find(|m| m.name == name)
            .and_then(|m| m.dev.as_deref())
    }

    /// Preload a memory target, e.g. a firmware image into flash.
    pub fn load_memory(&mut self, target: &str, offset: u32, bytes: &[u8]) -> anyhow::Result<()> {
        let id = self
            .decoder()
            .lookup(target)
            .and_then(|e| e.target)
            .ok_or_else(|| anyhow::anyhow!("No enabled target named '{}'", target))?;
        let slot = self
            .interconnect
            .target_mut(id)
            .ok_or_else(|| anyhow::anyhow!("Target '{}' has no device", target))?;
        let mem = slot
            .dev
            .as_any_mut()
            .and_then(|any| any.downcast_mut::<Memory>())
            .ok_or_else(|| anyhow::anyhow!("Target '{}' is not a memory", target))?;
        if !mem.load(offset as usize, bytes) {
            anyhow::bail!(
                "Image of {} bytes at offset {:#x} does not fit '{}' ({} bytes)",
                bytes.len(),
                offset,
                target,
                mem.size()
            );
        }
        info!("Loaded {} bytes into '{}' at offset {:#x}", bytes.len(), target, offset);
        Ok(())
    }

    /// One bus clock: arbitrate, advance the outstanding transaction, return
    /// its response to the owner, tick targets and propagate interrupts.
    pub fn step(&mut self) -> CycleOutcome {
        self.cycles += 1;

        let requests: Vec<_> = self
            .masters
            .iter_mut()
            .enumerate()
            .map(|(i, m)| {
                m.dev.as_mut().and_then(|d| d.request()).map(|mut txn| {
                    txn.requestor = MasterId(i);
                    txn
                })
            })
            .collect();

        let outcome = self.interconnect.cycle(&requests);
        if let Some(done) = &outcome.completed {
            if let Some(dev) = self.masters[done.master.0].dev.as_mut() {
                dev.complete(done.response);
            }
        }

        let ticks = self.interconnect.tick_targets();
        let levels = self.sideband.propagate(&ticks, self.masters.len());
        for (m, l) in self.masters.iter_mut().zip(levels) {
            if let Some(dev) = m.dev.as_mut() {
                dev.interrupts(l);
            }
        }

        outcome
    }

    /// Step until no master has anything to issue and the bus is free, or
    /// `max_cycles` elapse. Returns the outcome of every cycle that completed
    /// a transaction.
    pub fn run(&mut self, max_cycles: u64) -> Vec<CycleOutcome> {
        let mut done = Vec::new();
        for _ in 0..max_cycles {
            let outcome = self.step();
            if outcome.completed.is_some() {
                done.push(outcome);
            }
            if outcome.granted.is_none() && !self.interconnect.is_busy() {
                break;
            }
        }
        done
    }

    pub fn peek_target(&self, name: &str) -> Option<serde_json::Value> {
        self.interconnect
            .targets()
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.dev.snapshot())
    }
}
