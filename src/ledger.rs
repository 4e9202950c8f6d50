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

//! §3 Ledger State: the height-addressed chain of parsed blocks, the colored UTXO set,
//! and the per-tx index. Mutation is exclusive to the block-ingest task (§5); readers get
//! an immutable, versioned snapshot (§9 "reactive observable lists" replacement).

use crate::{
    raw::{TxId, TxOutputKey},
    tx::{OutputType, Tx, TxOutput},
};
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u32,
    pub time: u64,
    pub hash: [u8; 32],
    pub prev_hash: [u8; 32],
}

/// Parsed view of a raw block, restricted to colored/governance-relevant txs (§3 Block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<Tx>,
}

#[derive(Debug, Clone, Copy)]
pub struct LockupInfo {
    pub output_key: TxOutputKey,
    pub lock_time: u32,
    pub spent: bool,
}

/// An immutable, `Arc`-shared view of the ledger as of the last committed block. Cheap to
/// clone; external readers (wallet, UI) hold one of these rather than locking the writer.
#[derive(Clone)]
pub struct LedgerSnapshot {
    pub version: u64,
    pub chain_height: Option<u32>,
    pub blocks: Arc<Vec<Block>>,
}

#[derive(Default)]
pub struct LedgerState {
    blocks: Vec<Block>,
    utxos: HashMap<TxOutputKey, TxOutput>,
    tx_index: HashMap<TxId, Tx>,
    lockups: HashMap<TxId, LockupInfo>,
    version: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chain_height(&self) -> Option<u32> {
        self.blocks.last().map(|b| b.header.height)
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn block_at(&self, height: u32) -> Option<&Block> {
        self.blocks.iter().find(|b| b.header.height == height)
    }

    pub fn colored_value_at(&self, key: TxOutputKey) -> Option<u64> {
        self.utxos.get(&key).filter(|o| !o.spent).map(|o| o.value)
    }

    pub fn tx(&self, id: TxId) -> Option<&Tx> {
        self.tx_index.get(&id)
    }

    pub fn lockup(&self, lockup_tx_id: TxId) -> Option<&LockupInfo> {
        self.lockups.get(&lockup_tx_id)
    }

    /// Commits a parsed block: marks spent inputs, indexes new colored outputs, and
    /// records lockup/unlock bookkeeping. Called once per block from the Block Parser.
    pub fn commit_block(&mut self, block: Block) {
        for tx in &block.txs {
            for input in &tx.inputs {
                if input.spent_colored_value.is_some() {
                    let key = (input.prev_tx_id, input.prev_index);
                    if let Some(out) = self.utxos.get_mut(&key) {
                        out.spent = true;
                    }
                    if let Some(lockup) = self.lockups.get_mut(&input.prev_tx_id) {
                        if lockup.output_key == key {
                            lockup.spent = true;
                        }
                    }
                }
            }
            for out in &tx.outputs {
                if matches!(out.output_type, OutputType::Colored | OutputType::Genesis | OutputType::Issuance | OutputType::Lockup | OutputType::Unlock)
                {
                    self.utxos.insert((out.tx_id, out.index), out.clone());
                }
                if out.output_type == OutputType::Lockup {
                    self.lockups.insert(
                        tx.id,
                        LockupInfo {
                            output_key: (out.tx_id, out.index),
                            lock_time: tx.lock_time.unwrap_or(0),
                            spent: false,
                        },
                    );
                }
            }
            self.tx_index.insert(tx.id, tx.clone());
        }
        self.blocks.push(block);
        self.version += 1;
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: self.version,
            chain_height: self.chain_height(),
            blocks: Arc::new(self.blocks.clone()),
        }
    }
}
