// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::MasterId;

/// Round-robin bus arbiter.
///
/// Once a master is granted it owns the bus until [`Arbiter::release`] is
/// called, whatever the other request lines do. After a release the search
/// starts at the master following the previous owner, so with N masters
/// requesting continuously each one waits for at most N - 1 transactions.
#[derive(Debug, Clone)]
pub struct Arbiter {
    masters: usize,
    owner: Option<MasterId>,
    last: Option<MasterId>,
}

impl Arbiter {
    pub fn new(masters: usize) -> Self {
        Self {
            masters,
            owner: None,
            last: None,
        }
    }

    pub fn masters(&self) -> usize {
        self.masters
    }

    /// Select the master that drives the bus this cycle.
    ///
    /// `requests[i]` is the request line of master `i`; missing lines read as
    /// deasserted.
    pub fn grant(&mut self, requests: &[bool]) -> Option<MasterId> {
        if let Some(owner) = self.owner {
            return Some(owner);
        }
        if self.masters == 0 {
            return None;
        }

        let start = self.last.map_or(0, |m| m.0 + 1);
        let chosen = (0..self.masters)
            .map(|i| (start + i) % self.masters)
            .find(|&i| requests.get(i).copied().unwrap_or(false))
            .map(MasterId)?;

        tracing::trace!("Arbiter: grant {:?}", chosen);
        self.owner = Some(chosen);
        self.last = Some(chosen);
        Some(chosen)
    }

    /// End of the owner's transaction.
    pub fn release(&mut self) {
        self.owner = None;
    }

    pub fn owner(&self) -> Option<MasterId> {
        self.owner
    }

    pub fn is_locked(&self) -> bool {
        self.owner.is_some()
    }
}
