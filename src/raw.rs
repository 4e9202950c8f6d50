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

//! The inbound wire shape delivered by the external block source (§6).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A transaction id: the SHA-256+RIPEMD-160 digest of a raw transaction, big-endian.
///
/// Ordering is lexicographic on bytes, matching the tie-break rule in §4.7: ballots and
/// blind votes are processed in ascending tx-id order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub const fn zero() -> Self {
        TxId([0u8; 32])
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", hex_string(&self.0))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex_string(&self.0))
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Key identifying a single output: its owning tx and index.
pub type TxOutputKey = (TxId, u32);

/// A reference to a prior output, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInput {
    pub prev_tx_id: TxId,
    pub prev_index: u32,
}

/// A raw transaction output: value in base units plus the locking script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub value: u64,
    pub script: Vec<u8>,
}

/// A raw transaction exactly as delivered by the block source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTx {
    pub id: TxId,
    pub inputs: Vec<RawInput>,
    pub outputs: Vec<RawOutput>,
}

/// A raw block exactly as delivered by the block source (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub height: u32,
    pub time: u64,
    pub hash: [u8; 32],
    pub prev_hash: [u8; 32],
    pub txs: Vec<RawTx>,
}
