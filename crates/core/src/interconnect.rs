// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::arbiter::Arbiter;
use crate::decoder::Decoder;
use crate::{BusError, BusTarget, MasterId, Response, TargetId, TargetTickResult, Transaction};

pub struct TargetSlot {
    pub name: String,
    pub dev: Box<dyn BusTarget>,
}

/// A transaction latched at grant time and held stable until the target acks.
#[derive(Debug, Clone, Copy)]
struct Outstanding {
    txn: Transaction,
    target: Option<(TargetId, u32)>,
    wait: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub master: MasterId,
    pub transaction: Transaction,
    pub target: Option<TargetId>,
    pub response: Response,
    pub error: Option<BusError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub granted: Option<MasterId>,
    pub completed: Option<Completion>,
}

/// Arbiter, decoder and targets of one shared bus.
pub struct Interconnect {
    arbiter: Arbiter,
    decoder: Decoder,
    targets: Vec<TargetSlot>,
    outstanding: Option<Outstanding>,
    unmapped_accesses: u64,
}

impl Interconnect {
    /// `targets[i]` must be the device registered in `decoder` as `TargetId(i)`.
    pub fn new(masters: usize, decoder: Decoder, targets: Vec<TargetSlot>) -> Self {
        Self {
            arbiter: Arbiter::new(masters),
            decoder,
            targets,
            outstanding: None,
            unmapped_accesses: 0,
        }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    pub fn targets(&self) -> &[TargetSlot] {
        &self.targets
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut TargetSlot> {
        self.targets.get_mut(id.0)
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn unmapped_accesses(&self) -> u64 {
        self.unmapped_accesses
    }

    /// Evaluate one bus cycle.
    ///
    /// `requests[i]` is what master `i` presents this cycle. While a
    /// transaction is outstanding the requests of other masters are ignored
    /// and the latched transaction is used, not whatever the owner presents.
    pub fn cycle(&mut self, requests: &[Option<Transaction>]) -> CycleOutcome {
        let lines: Vec<bool> = requests.iter().map(Option::is_some).collect();
        let Some(master) = self.arbiter.grant(&lines) else {
            return CycleOutcome::default();
        };

        if self.outstanding.is_none() {
            let Some(mut txn) = requests.get(master.0).copied().flatten() else {
                self.arbiter.release();
                return CycleOutcome::default();
            };
            txn.requestor = master;
            self.outstanding = Some(self.latch(txn));
        }

        let mut outcome = CycleOutcome {
            granted: Some(master),
            completed: None,
        };

        if let Some(out) = self.outstanding.as_mut() {
            if out.wait > 0 {
                out.wait -= 1;
                return outcome;
            }
        }

        if let Some(out) = self.outstanding.take() {
            outcome.completed = Some(self.finish(out));
            self.arbiter.release();
        }
        outcome
    }

    fn latch(&self, txn: Transaction) -> Outstanding {
        let target = self.decoder.route(txn.address).and_then(|t| {
            let range = self.decoder.range_of(t)?;
            Some((t, range.offset_of(txn.address)? & !3))
        });
        let wait = target
            .and_then(|(t, _)| self.targets.get(t.0))
            .map_or(0, |slot| slot.dev.latency());
        Outstanding { txn, target, wait }
    }

    fn finish(&mut self, out: Outstanding) -> Completion {
        let txn = out.txn;
        let slot = out
            .target
            .and_then(|(t, offset)| self.targets.get_mut(t.0).map(|s| (t, offset, s)));

        let Some((target, offset, slot)) = slot else {
            self.unmapped_accesses += 1;
            let error = BusError::UnmappedAccess(txn.address);
            tracing::warn!("{} from {:?}", error, txn.requestor);
            return Completion {
                master: txn.requestor,
                transaction: txn,
                target: None,
                response: Response::unmapped(),
                error: Some(error),
            };
        };

        let response = if txn.write {
            slot.dev.write(offset, txn.data, txn.strobes);
            Response::ack(0)
        } else {
            Response::ack(slot.dev.read(offset))
        };
        tracing::trace!(
            "{} {:#010x} via {:?} -> {} {:#010x}",
            if txn.write { "W" } else { "R" },
            txn.address,
            txn.requestor,
            slot.name,
            response.data
        );

        Completion {
            master: txn.requestor,
            transaction: txn,
            target: Some(target),
            response,
            error: None,
        }
    }

    /// Advance every target by one cycle. Results are indexed by [`TargetId`].
    pub fn tick_targets(&mut self) -> Vec<TargetTickResult> {
        self.targets.iter_mut().map(|t| t.dev.tick()).collect()
    }
}
