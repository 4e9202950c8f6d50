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

//! §3 parsed transaction/output data model.

use crate::raw::TxId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Undefined,
    Genesis,
    Colored,
    BtcOut,
    ProposalOpReturn,
    CompRequestOpReturn,
    BlindVoteOpReturn,
    VoteRevealOpReturn,
    Issuance,
    Lockup,
    Unlock,
    OpReturnOther,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Undefined,
    TransferColored,
    PayTradeFee,
    Proposal,
    CompensationRequest,
    BlindVote,
    VoteReveal,
    Lockup,
    Unlock,
    Genesis,
    AssetRemoval,
    Irregular,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub tx_id: TxId,
    pub index: u32,
    pub value: u64,
    pub address: String,
    pub output_type: OutputType,
    pub spent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxInput {
    pub prev_tx_id: TxId,
    pub prev_index: u32,
    /// Populated once the referenced output has been resolved against the colored UTXO set.
    pub spent_colored_value: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub tx_type: TxType,
    pub id: TxId,
    pub block_height: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub burnt_fee: u64,
    /// Populated from the op-return payload for LOCKUP txs (§6 "4-byte little-endian lock-time").
    pub lock_time: Option<u32>,
}

impl Tx {
    pub fn colored_input_value(&self) -> u64 {
        self.inputs.iter().filter_map(|i| i.spent_colored_value).sum()
    }

    pub fn colored_output_value(&self) -> u64 {
        self.outputs
            .iter()
            .filter(|o| matches!(o.output_type, OutputType::Colored | OutputType::Issuance | OutputType::Lockup))
            .map(|o| o.value)
            .sum()
    }
}
