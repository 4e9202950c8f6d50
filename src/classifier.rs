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

//! §4.3 Tx Output Classifier: the per-output colored/base split plus the under-funded
//! latch rule, and the TxType derivation that follows from it.

use crate::{
    crypto::hash160,
    op_return::OpReturnIntent,
    raw::{RawOutput, RawTx},
    tx::{OutputType, TxInput, TxOutput, TxType},
};

const LOG_TARGET: &str = "dao::classifier";

/// Everything the classifier needs to know about the tx's decoded intent, beyond the
/// ordered raw outputs and the running colored input balance.
pub struct ClassifyContext {
    pub op_return_index: Option<usize>,
    pub intent: Option<OpReturnIntent>,
    /// `true` if `intent` is `Unlock` and it references a known, unspent LOCKUP output.
    pub unlock_target_valid: bool,
    pub available_input: u64,
    pub has_colored_input: bool,
    pub is_genesis_tx: bool,
}

pub struct ClassifyOutcome {
    pub outputs: Vec<TxOutput>,
    pub burnt_fee: u64,
    pub tx_type: TxType,
}

fn script_address(script: &[u8]) -> String {
    crate::raw::hex_string(&hash160(script))
}

/// Walks outputs in index order applying the §4.3 algorithm, then derives the tx's TxType.
pub fn classify(raw: &RawTx, outputs: &[RawOutput], ctx: &ClassifyContext) -> ClassifyOutcome {
    let mut available = ctx.available_input;
    let mut latched = false;
    let mut classified = Vec::with_capacity(outputs.len());
    let mut required_output_missing = false;
    let mut saw_lockup_output = false;

    for (index, out) in outputs.iter().enumerate() {
        let output_type = if Some(index) == ctx.op_return_index && ctx.intent.is_some() {
            match ctx.intent.as_ref().unwrap() {
                OpReturnIntent::Proposal { .. } => OutputType::ProposalOpReturn,
                OpReturnIntent::CompensationRequest { .. } => OutputType::CompRequestOpReturn,
                OpReturnIntent::BlindVote { .. } => OutputType::BlindVoteOpReturn,
                OpReturnIntent::VoteReveal { .. } => OutputType::VoteRevealOpReturn,
                OpReturnIntent::Lockup { .. } | OpReturnIntent::Unlock { .. } | OpReturnIntent::AssetRemoval { .. } => {
                    OutputType::OpReturnOther
                },
            }
        } else if latched {
            OutputType::BtcOut
        } else if available >= out.value {
            available -= out.value;
            match ctx.intent {
                Some(OpReturnIntent::Lockup { .. }) if index == 0 => {
                    saw_lockup_output = true;
                    OutputType::Lockup
                },
                Some(OpReturnIntent::Unlock { .. }) if index == 0 && ctx.unlock_target_valid => OutputType::Unlock,
                _ => OutputType::Colored,
            }
        } else {
            latched = true;
            available = 0;
            OutputType::BtcOut
        };

        classified.push(TxOutput {
            tx_id: raw.id,
            index: index as u32,
            value: out.value,
            address: script_address(&out.script),
            output_type,
            spent: false,
        });
    }

    match ctx.intent {
        Some(OpReturnIntent::Lockup { .. }) if !saw_lockup_output => required_output_missing = true,
        Some(OpReturnIntent::Unlock { .. }) if !ctx.unlock_target_valid => required_output_missing = true,
        _ => {},
    }

    let burnt_fee = available;
    let tx_type = derive_tx_type(ctx, required_output_missing, burnt_fee);
    if tx_type == TxType::Irregular {
        log::warn!(target: LOG_TARGET, "tx {} classified as IRREGULAR", raw.id);
    }

    ClassifyOutcome { outputs: classified, burnt_fee, tx_type }
}

fn derive_tx_type(ctx: &ClassifyContext, required_output_missing: bool, burnt_fee: u64) -> TxType {
    if required_output_missing {
        return TxType::Irregular;
    }
    if !ctx.has_colored_input {
        return if ctx.is_genesis_tx { TxType::TransferColored } else { TxType::Undefined };
    }
    match ctx.intent {
        Some(OpReturnIntent::Proposal { .. }) => TxType::Proposal,
        Some(OpReturnIntent::CompensationRequest { .. }) => TxType::CompensationRequest,
        Some(OpReturnIntent::BlindVote { .. }) => TxType::BlindVote,
        Some(OpReturnIntent::VoteReveal { .. }) => TxType::VoteReveal,
        Some(OpReturnIntent::Lockup { .. }) => TxType::Lockup,
        Some(OpReturnIntent::Unlock { .. }) => TxType::Unlock,
        Some(OpReturnIntent::AssetRemoval { .. }) => TxType::AssetRemoval,
        None if burnt_fee > 0 => TxType::PayTradeFee,
        None => TxType::TransferColored,
    }
}

/// Resolves a tx's inputs against the colored UTXO set, returning the running available
/// input value (§4.3) for the classifier.
pub fn resolve_inputs<F>(raw: &RawTx, mut lookup: F) -> (Vec<TxInput>, u64)
where
    F: FnMut(crate::raw::TxOutputKey) -> Option<u64>,
{
    let mut available = 0u64;
    let mut inputs = Vec::with_capacity(raw.inputs.len());
    for input in &raw.inputs {
        let value = lookup((input.prev_tx_id, input.prev_index));
        if let Some(v) = value {
            available += v;
        }
        inputs.push(TxInput {
            prev_tx_id: input.prev_tx_id,
            prev_index: input.prev_index,
            spent_colored_value: value,
        });
    }
    (inputs, available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::TxId;

    fn tx_with_outputs(values: &[u64]) -> RawTx {
        RawTx {
            id: TxId([1u8; 32]),
            inputs: vec![],
            outputs: values.iter().map(|v| RawOutput { value: *v, script: vec![0x76, 0xa9] }).collect(),
        }
    }

    fn ctx(available: u64) -> ClassifyContext {
        ClassifyContext {
            op_return_index: None,
            intent: None,
            unlock_target_valid: false,
            available_input: available,
            has_colored_input: available > 0,
            is_genesis_tx: false,
        }
    }

    #[test]
    fn simple_transfer_colors_until_exhausted() {
        let raw = tx_with_outputs(&[200, 300, 100]);
        let outcome = classify(&raw, &raw.outputs, &ctx(600));
        assert_eq!(outcome.tx_type, TxType::TransferColored);
        assert_eq!(outcome.burnt_fee, 0);
        assert!(outcome.outputs.iter().all(|o| o.output_type == OutputType::Colored));
    }

    #[test]
    fn fee_burn_is_pay_trade_fee() {
        let raw = tx_with_outputs(&[500]);
        let outcome = classify(&raw, &raw.outputs, &ctx(600));
        assert_eq!(outcome.tx_type, TxType::PayTradeFee);
        assert_eq!(outcome.burnt_fee, 100);
    }

    #[test]
    fn under_funded_output_latches_remaining_as_btc_out() {
        let raw = tx_with_outputs(&[50, 200, 30]);
        let outcome = classify(&raw, &raw.outputs, &ctx(100));
        assert_eq!(outcome.outputs[0].output_type, OutputType::Colored);
        assert_eq!(outcome.outputs[1].output_type, OutputType::BtcOut);
        // Output 2 would fit in the pre-latch balance (30 <= 50) but the latch is one-way.
        assert_eq!(outcome.outputs[2].output_type, OutputType::BtcOut);
        assert_eq!(outcome.tx_type, TxType::TransferColored);
    }
}
