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

//! Fixture builders shared by unit and integration tests.

use crate::{
    config::DaoConfig,
    op_return,
    param::ParamId,
    raw::{RawBlock, RawInput, RawOutput, RawTx, TxId},
};

pub fn tx_id(byte: u8) -> TxId {
    TxId([byte; 32])
}

pub fn p2pkh_script(tag: u8) -> Vec<u8> {
    vec![0x76, 0xa9, tag, 0x88, 0xac]
}

pub fn colored_out(value: u64, tag: u8) -> RawOutput {
    RawOutput { value, script: p2pkh_script(tag) }
}

fn op_return_push(type_tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = vec![type_tag, 0u8];
    data.extend_from_slice(payload);
    let mut script = vec![op_return::OP_RETURN, data.len() as u8];
    script.extend_from_slice(&data);
    script
}

pub fn proposal_op_return(hash: [u8; 20]) -> RawOutput {
    RawOutput { value: 0, script: op_return_push(op_return::TYPE_PROPOSAL, &hash) }
}

pub fn blind_vote_op_return(commitment: [u8; 20]) -> RawOutput {
    RawOutput { value: 0, script: op_return_push(op_return::TYPE_BLIND_VOTE, &commitment) }
}

pub fn vote_reveal_op_return(merit_digest: [u8; 20], key: [u8; 16]) -> RawOutput {
    let mut payload = merit_digest.to_vec();
    payload.extend_from_slice(&key);
    RawOutput { value: 0, script: op_return_push(op_return::TYPE_VOTE_REVEAL, &payload) }
}

pub fn lockup_op_return(lock_time: u32) -> RawOutput {
    RawOutput { value: 0, script: op_return_push(op_return::TYPE_LOCKUP, &lock_time.to_le_bytes()) }
}

pub fn unlock_op_return(lockup_tx_id: TxId) -> RawOutput {
    RawOutput { value: 0, script: op_return_push(op_return::TYPE_UNLOCK, &lockup_tx_id.0) }
}

pub fn raw_tx(id: TxId, inputs: Vec<RawInput>, outputs: Vec<RawOutput>) -> RawTx {
    RawTx { id, inputs, outputs }
}

pub fn raw_input(prev: TxId, index: u32) -> RawInput {
    RawInput { prev_tx_id: prev, prev_index: index }
}

pub fn raw_block(height: u32, prev_hash: [u8; 32], hash: [u8; 32], txs: Vec<RawTx>) -> RawBlock {
    RawBlock { height, time: 1_700_000_000 + height as u64 * 600, hash, prev_hash, txs }
}

/// A registry with every phase one block long except PROPOSAL (3) and BLIND_VOTE/VOTE_REVEAL
/// (3 each), matching the cadence used across the module-level scenario tests.
pub fn scenario_param_defaults() -> Vec<(ParamId, i64)> {
    vec![
        (ParamId::ProposalFee, 100),
        (ParamId::BlindVoteFee, 100),
        (ParamId::QuorumCompensation, 1_000),
        (ParamId::QuorumChangeParam, 1_000),
        (ParamId::QuorumRemoveAsset, 1_000),
        (ParamId::QuorumGenericProposal, 1_000),
        (ParamId::QuorumBurnBond, 1_000),
        (ParamId::ThresholdCompensation, 5_000),
        (ParamId::ThresholdChangeParam, 5_000),
        (ParamId::ThresholdRemoveAsset, 5_000),
        (ParamId::ThresholdGenericProposal, 5_000),
        (ParamId::ThresholdBurnBond, 5_000),
        (ParamId::PhaseProposal, 3),
        (ParamId::PhaseBreak1, 1),
        (ParamId::PhaseBlindVote, 3),
        (ParamId::PhaseBreak2, 1),
        (ParamId::PhaseVoteReveal, 3),
        (ParamId::PhaseBreak3, 1),
        (ParamId::PhaseResult, 1),
        (ParamId::PhaseBreak4, 1),
        (ParamId::LockTimeMin, 1),
        (ParamId::LockTimeMax, 1_000_000),
    ]
}

pub fn scenario_config(genesis_tx_id: TxId, total_supply: u64) -> DaoConfig {
    DaoConfig::new(genesis_tx_id, 200, total_supply, scenario_param_defaults())
}
