// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{ConfigError, IrqLineKind, MasterId, TargetId, TargetTickResult};

/// Interrupt inputs of a master, sampled once per cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IrqLevels {
    pub timer: bool,
    pub software: bool,
}

impl IrqLevels {
    pub fn set(&mut self, line: IrqLineKind, level: bool) {
        match line {
            IrqLineKind::Timer => self.timer = level,
            IrqLineKind::Software => self.software = level,
        }
    }

    pub fn get(&self, line: IrqLineKind) -> bool {
        match line {
            IrqLineKind::Timer => self.timer,
            IrqLineKind::Software => self.software,
        }
    }
}

/// A wire from a target's interrupt output to one input of a master.
/// A `source` of `None` ties the input low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqConnection {
    pub line: IrqLineKind,
    pub source: Option<TargetId>,
    pub sink: MasterId,
}

/// Side-band signal table. Interrupts never travel over the bus and are not
/// subject to arbitration.
#[derive(Debug, Clone, Default)]
pub struct Sideband {
    connections: Vec<IrqConnection>,
}

impl Sideband {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, connection: IrqConnection) -> Result<(), ConfigError> {
        if self
            .connections
            .iter()
            .any(|c| c.line == connection.line && c.sink == connection.sink)
        {
            return Err(ConfigError::IrqLineConflict(connection.line));
        }
        tracing::debug!(
            "Sideband: {:?} -> {:?} of {:?}",
            connection.source,
            connection.line,
            connection.sink
        );
        self.connections.push(connection);
        Ok(())
    }

    pub fn connections(&self) -> &[IrqConnection] {
        &self.connections
    }

    /// Compute the interrupt levels seen by each of `masters` from this
    /// cycle's target tick results (indexed by [`TargetId`]).
    pub fn propagate(&self, ticks: &[TargetTickResult], masters: usize) -> Vec<IrqLevels> {
        let mut levels = vec![IrqLevels::default(); masters];
        for c in &self.connections {
            let level = c
                .source
                .and_then(|t| ticks.get(t.0))
                .is_some_and(|r| r.irq);
            if let Some(l) = levels.get_mut(c.sink.0) {
                l.set(c.line, level);
            }
        }
        levels
    }
}
