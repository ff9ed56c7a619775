// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use socfab_config::{ReplayOp, ReplayScript};
use socfab_core::interconnect::Completion;
use socfab_core::master::ScriptedMaster;
use socfab_core::{ByteStrobes, Soc, Transaction};
use tracing::{debug, info};

/// One completed transaction, printed as a JSON line.
#[derive(Debug, Serialize)]
pub struct ReplayRecord {
    pub cycle: u64,
    pub master: String,
    pub op: ReplayOp,
    pub address: String,
    pub data: String,
    pub target: Option<String>,
    pub err: bool,
}

/// Value shown for a completed transaction: what was written, or what came back.
fn record_data(done: &Completion) -> u32 {
    if done.transaction.write && !done.response.err {
        done.transaction.data
    } else {
        done.response.data
    }
}

/// Hand every master port its share of the script, in script order.
pub fn attach_script(soc: &mut Soc, script: &ReplayScript) -> Result<usize> {
    let names: Vec<String> = soc.master_names().map(str::to_string).collect();
    let mut queues: Vec<ScriptedMaster> = names.iter().map(|_| ScriptedMaster::new()).collect();

    for step in &script.steps {
        let id = soc
            .master_id(&step.master)
            .ok_or_else(|| anyhow!("Replay step uses unknown master '{}'", step.master))?;
        let txn = match step.op {
            ReplayOp::Read => Transaction::read(id, step.address),
            ReplayOp::Write => Transaction::write(
                id,
                step.address,
                step.data,
                ByteStrobes::from_bits_truncate(step.strobes),
            ),
        };
        queues[id.0].push(txn);
    }

    for (name, queue) in names.iter().zip(queues) {
        debug!("Master '{}' replays {} transactions", name, queue.pending());
        soc.attach_master(name, Box::new(queue))?;
    }
    Ok(script.steps.len())
}

/// Clock the SoC until `expected` transactions completed and the bus is idle.
pub fn run(
    soc: &mut Soc,
    expected: usize,
    max_cycles: u64,
    mut emit: impl FnMut(&ReplayRecord) -> Result<()>,
) -> Result<usize> {
    let names: Vec<String> = soc.master_names().map(str::to_string).collect();
    let mut completed = 0;

    for _ in 0..max_cycles {
        let outcome = soc.step();
        if let Some(done) = outcome.completed {
            let target = done
                .target
                .and_then(|t| soc.interconnect().targets().get(t.0))
                .map(|slot| slot.name.clone());
            emit(&ReplayRecord {
                cycle: soc.cycles(),
                master: names[done.master.0].clone(),
                op: if done.transaction.write {
                    ReplayOp::Write
                } else {
                    ReplayOp::Read
                },
                address: format!("{:#010x}", done.transaction.address),
                data: format!("{:#010x}", record_data(&done)),
                target,
                err: done.response.err,
            })?;
            completed += 1;
        }
        if outcome.granted.is_none() && !soc.interconnect().is_busy() {
            break;
        }
    }

    if completed < expected {
        bail!(
            "Replay stopped after {} cycles with {} of {} transactions completed",
            soc.cycles(),
            completed,
            expected
        );
    }
    info!(
        "Replayed {} transactions in {} cycles ({} unmapped)",
        completed,
        soc.cycles(),
        soc.interconnect().unmapped_accesses()
    );
    Ok(completed)
}
