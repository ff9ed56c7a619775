// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::sideband::IrqLevels;
use crate::{BusMaster, Response, Transaction};
use std::any::Any;
use std::collections::VecDeque;

/// A master that issues a fixed queue of transactions, one at a time, and
/// records every response. Stands in for a CPU port.
#[derive(Debug, Default)]
pub struct ScriptedMaster {
    queue: VecDeque<Transaction>,
    completed: Vec<(Transaction, Response)>,
    irqs: IrqLevels,
}

impl ScriptedMaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, txn: Transaction) {
        self.queue.push_back(txn);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn completed(&self) -> &[(Transaction, Response)] {
        &self.completed
    }

    pub fn irqs(&self) -> IrqLevels {
        self.irqs
    }
}

impl FromIterator<Transaction> for ScriptedMaster {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl BusMaster for ScriptedMaster {
    fn request(&mut self) -> Option<Transaction> {
        self.queue.front().copied()
    }

    fn complete(&mut self, response: Response) {
        match self.queue.pop_front() {
            Some(txn) => self.completed.push((txn, response)),
            None => tracing::warn!("Response {:?} with no transaction in flight", response),
        }
    }

    fn interrupts(&mut self, levels: IrqLevels) {
        self.irqs = levels;
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}
