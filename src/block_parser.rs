// Copyright 2024, The Tari Development Community
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! §4.4 Block Parser: connects a raw block to the chain, detects genesis, iterates txs
//! driving the Op-Return Decoder and Tx Output Classifier, and resolves same-block
//! dependency chains with the fixed-point work-list from §9.

use crate::{
    classifier::{self, ClassifyContext},
    config::DaoConfig,
    error::BlockParseError,
    ledger::{Block, BlockHeader, LedgerState},
    op_return::{self, OpReturnIntent},
    raw::{RawBlock, RawTx, TxOutputKey},
    tx::{OutputType, Tx, TxType},
};
use std::collections::HashMap;

const LOG_TARGET: &str = "dao::block_parser";

/// Validates that `raw` connects to the stored chain tip (§4.4).
pub fn validate_linkage(ledger: &LedgerState, config: &DaoConfig, raw: &RawBlock) -> Result<(), BlockParseError> {
    match ledger.last_block() {
        None => {
            if raw.height != config.genesis_block_height {
                return Err(BlockParseError::BlockNotConnecting { height: raw.height });
            }
        },
        Some(last) => {
            let connects = last.header.hash == raw.prev_hash && last.header.height + 1 == raw.height;
            if !connects {
                return Err(BlockParseError::BlockNotConnecting { height: raw.height });
            }
        },
    }
    Ok(())
}

/// Synthesizes the genesis tx: outputs are GENESIS up to `total_supply`, the remainder is
/// BTC_OUT via the same latch rule the classifier uses elsewhere (§4.4).
fn synthesize_genesis_tx(raw: &RawTx, total_supply: u64) -> Tx {
    let ctx = ClassifyContext {
        op_return_index: None,
        intent: None,
        unlock_target_valid: false,
        available_input: total_supply,
        has_colored_input: false,
        is_genesis_tx: true,
    };
    let outcome = classifier::classify(raw, &raw.outputs, &ctx);
    let outputs = outcome
        .outputs
        .into_iter()
        .map(|mut o| {
            if o.output_type == OutputType::Colored {
                o.output_type = OutputType::Genesis;
            }
            o
        })
        .collect();
    Tx {
        tx_type: TxType::Genesis,
        id: raw.id,
        block_height: 0, // overwritten by caller
        inputs: vec![],
        outputs,
        burnt_fee: outcome.burnt_fee,
        lock_time: None,
    }
}

/// Synthesizes the tx that pays out a cycle's accepted CompensationProposals as ISSUANCE
/// outputs at the next cycle's first block (§4.7 step 5): built directly, the same way
/// `synthesize_genesis_tx` builds the genesis tx, since there is no wire tx to classify —
/// the payout exists only because the governance cycle accepted it.
pub fn synthesize_issuance_tx(block_height: u32, cycle_index: u32, awards: &[crate::tally::CompensationAward]) -> Option<Tx> {
    if awards.is_empty() {
        return None;
    }
    let mut seed = b"dao-issuance".to_vec();
    seed.extend_from_slice(&cycle_index.to_le_bytes());
    let id = crate::raw::TxId(crate::crypto::sha256(&seed));
    let outputs = awards
        .iter()
        .enumerate()
        .map(|(index, award)| crate::tx::TxOutput {
            tx_id: id,
            index: index as u32,
            value: award.amount,
            address: award.payout_address.clone(),
            output_type: OutputType::Issuance,
            spent: false,
        })
        .collect();
    Some(Tx {
        tx_type: TxType::CompensationRequest,
        id,
        block_height,
        inputs: vec![],
        outputs,
        burnt_fee: 0,
        lock_time: None,
    })
}

struct PendingTx<'a> {
    raw: &'a RawTx,
    resolved: bool,
}

/// Parses every tx in `raw`, resolving same-block colored-input dependency chains with a
/// fixed-point work-list (§4.4, §9): a tx whose input references a same-block parent output
/// is deferred and retried after the rest of the block, until a pass adds nothing.
fn parse_txs(ledger: &LedgerState, config: &DaoConfig, raw: &RawBlock) -> Vec<Tx> {
    let mut txs = Vec::with_capacity(raw.txs.len());
    let mut local_utxos: HashMap<TxOutputKey, u64> = HashMap::new();
    let mut local_lockups: HashMap<crate::raw::TxId, (TxOutputKey, bool)> = HashMap::new();

    if let Some(genesis_raw) = raw.txs.iter().find(|t| t.id == config.genesis_tx_id) {
        if raw.height == config.genesis_block_height {
            let mut genesis_tx = synthesize_genesis_tx(genesis_raw, config.total_supply);
            genesis_tx.block_height = raw.height;
            for o in &genesis_tx.outputs {
                if matches!(o.output_type, OutputType::Genesis) {
                    local_utxos.insert((o.tx_id, o.index), o.value);
                }
            }
            txs.push(genesis_tx);
        }
    }

    let mut pending: Vec<PendingTx> = raw
        .txs
        .iter()
        .filter(|t| t.id != config.genesis_tx_id || raw.height != config.genesis_block_height)
        .map(|raw_tx| PendingTx { raw: raw_tx, resolved: false })
        .collect();

    let max_passes = pending.len().max(1);
    for _pass in 0..max_passes {
        let mut made_progress = false;
        let still_pending_ids: std::collections::HashSet<crate::raw::TxId> =
            pending.iter().filter(|e| !e.resolved).map(|e| e.raw.id).collect();

        for idx in 0..pending.len() {
            if pending[idx].resolved {
                continue;
            }
            let raw_tx = pending[idx].raw;
            let lookup = |key: TxOutputKey| local_utxos.get(&key).copied().or_else(|| ledger.colored_value_at(key));
            // A tx resolves this pass if every input is either unspendable-from-here (no
            // colored ancestor, fine) or already present in ledger/local_utxos.
            let all_inputs_decidable = raw_tx.inputs.iter().all(|i| {
                let key = (i.prev_tx_id, i.prev_index);
                lookup(key).is_some() || !still_pending_ids.contains(&key.0)
            });
            if !all_inputs_decidable {
                continue;
            }

            let (inputs, available) = classifier::resolve_inputs(raw_tx, lookup);
            let has_colored_input = available > 0;

            let op_return_index = raw_tx.outputs.iter().rposition(|o| op_return::is_op_return(&o.script));
            let (intent, decode_failed) = match op_return_index {
                Some(idx) => match op_return::decode(&raw_tx.outputs[idx].script) {
                    Ok(intent) => (Some(intent), false),
                    Err(err) => {
                        log::warn!(target: LOG_TARGET, "tx {} op-return decode failed: {}", raw_tx.id, err);
                        (None, true)
                    },
                },
                None => (None, false),
            };

            let unlock_target_valid = match intent {
                Some(OpReturnIntent::Unlock { lockup_tx_id }) => {
                    let lockup_tx_id = crate::raw::TxId(lockup_tx_id);
                    local_lockups
                        .get(&lockup_tx_id)
                        .map(|(_, spent)| !spent)
                        .or_else(|| ledger.lockup(lockup_tx_id).map(|l| !l.spent))
                        .unwrap_or(false)
                },
                _ => false,
            };

            let ctx = ClassifyContext {
                op_return_index,
                intent,
                unlock_target_valid,
                available_input: available,
                has_colored_input,
                is_genesis_tx: false,
            };
            let outcome = classifier::classify(raw_tx, &raw_tx.outputs, &ctx);
            let tx_type = if decode_failed { TxType::Irregular } else { outcome.tx_type };

            for o in &outcome.outputs {
                if matches!(o.output_type, OutputType::Colored | OutputType::Lockup | OutputType::Unlock) {
                    local_utxos.insert((o.tx_id, o.index), o.value);
                }
                if o.output_type == OutputType::Lockup {
                    local_lockups.insert(raw_tx.id, ((o.tx_id, o.index), false));
                }
            }
            if let Some(OpReturnIntent::Unlock { lockup_tx_id }) = intent {
                if unlock_target_valid {
                    if let Some(entry) = local_lockups.get_mut(&crate::raw::TxId(lockup_tx_id)) {
                        entry.1 = true;
                    }
                }
            }

            let lock_time = match intent {
                Some(OpReturnIntent::Lockup { lock_time }) => Some(lock_time),
                _ => None,
            };

            txs.push(Tx {
                tx_type,
                id: raw_tx.id,
                block_height: raw.height,
                inputs,
                outputs: outcome.outputs,
                burnt_fee: outcome.burnt_fee,
                lock_time,
            });
            pending[idx].resolved = true;
            made_progress = true;
        }
        if !made_progress {
            break;
        }
    }

    // Anything left unresolved after the fixed point is treated as having no colored
    // inputs at all (§4.4).
    for entry in pending.into_iter().filter(|e| !e.resolved) {
        let raw_tx = entry.raw;
        let ctx = ClassifyContext {
            op_return_index: None,
            intent: None,
            unlock_target_valid: false,
            available_input: 0,
            has_colored_input: false,
            is_genesis_tx: false,
        };
        let outcome = classifier::classify(raw_tx, &raw_tx.outputs, &ctx);
        txs.push(Tx {
            tx_type: outcome.tx_type,
            id: raw_tx.id,
            block_height: raw.height,
            inputs: raw_tx.inputs.iter().map(|i| crate::tx::TxInput { prev_tx_id: i.prev_tx_id, prev_index: i.prev_index, spent_colored_value: None }).collect(),
            outputs: outcome.outputs,
            burnt_fee: outcome.burnt_fee,
            lock_time: None,
        });
    }

    txs
}

/// Parses `raw` into a `Block`, validating chain linkage first. Does not mutate `ledger` —
/// the caller commits the result once parsing succeeds (§5: a block runs to completion or
/// is discarded wholesale, never committed partially).
pub fn parse_block(ledger: &LedgerState, config: &DaoConfig, raw: &RawBlock) -> Result<Block, BlockParseError> {
    validate_linkage(ledger, config, raw)?;
    if ledger.block_at(raw.height).is_some() {
        return Err(BlockParseError::DuplicateBlock { height: raw.height });
    }
    let header = BlockHeader { height: raw.height, time: raw.time, hash: raw.hash, prev_hash: raw.prev_hash };
    let txs = parse_txs(ledger, config, raw);
    log::info!(target: LOG_TARGET, "parsed block {} with {} tx(s)", raw.height, txs.len());
    Ok(Block { header, txs })
}
