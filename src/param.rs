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

//! §4.1 Param Registry.
//!
//! Parameters are an identifier (persistence-stable, never reused) plus a default value
//! and a height-indexed override list, following the "enum-with-default-value" design note:
//! the identifier itself carries no value, the registry is the single source of truth for
//! both defaults and overrides.

use crate::error::ParamError;
use std::collections::HashMap;

const LOG_TARGET: &str = "dao::param";

/// A stable governance parameter identifier. Renaming a variant is forbidden once shipped;
/// the identifier is what ties historical overrides to meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    DefaultMakerFeeColored,
    DefaultTakerFeeColored,
    MinMakerFeeColored,
    MinTakerFeeColored,
    DefaultMakerFeeBase,
    DefaultTakerFeeBase,
    MinMakerFeeBase,
    MinTakerFeeBase,
    ProposalFee,
    BlindVoteFee,
    QuorumCompensation,
    QuorumChangeParam,
    QuorumRemoveAsset,
    QuorumGenericProposal,
    QuorumBurnBond,
    ThresholdCompensation,
    ThresholdChangeParam,
    ThresholdRemoveAsset,
    ThresholdGenericProposal,
    ThresholdBurnBond,
    PhaseProposal,
    PhaseBreak1,
    PhaseBlindVote,
    PhaseBreak2,
    PhaseVoteReveal,
    PhaseBreak3,
    PhaseResult,
    PhaseBreak4,
    LockTimeMin,
    LockTimeMax,
}

impl ParamId {
    pub const ALL: &'static [ParamId] = &[
        ParamId::DefaultMakerFeeColored,
        ParamId::DefaultTakerFeeColored,
        ParamId::MinMakerFeeColored,
        ParamId::MinTakerFeeColored,
        ParamId::DefaultMakerFeeBase,
        ParamId::DefaultTakerFeeBase,
        ParamId::MinMakerFeeBase,
        ParamId::MinTakerFeeBase,
        ParamId::ProposalFee,
        ParamId::BlindVoteFee,
        ParamId::QuorumCompensation,
        ParamId::QuorumChangeParam,
        ParamId::QuorumRemoveAsset,
        ParamId::QuorumGenericProposal,
        ParamId::QuorumBurnBond,
        ParamId::ThresholdCompensation,
        ParamId::ThresholdChangeParam,
        ParamId::ThresholdRemoveAsset,
        ParamId::ThresholdGenericProposal,
        ParamId::ThresholdBurnBond,
        ParamId::PhaseProposal,
        ParamId::PhaseBreak1,
        ParamId::PhaseBlindVote,
        ParamId::PhaseBreak2,
        ParamId::PhaseVoteReveal,
        ParamId::PhaseBreak3,
        ParamId::PhaseResult,
        ParamId::PhaseBreak4,
        ParamId::LockTimeMin,
        ParamId::LockTimeMax,
    ];

    /// The persistence-stable string identifier. Never rename these once shipped.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamId::DefaultMakerFeeColored => "DEFAULT_MAKER_FEE_COLORED",
            ParamId::DefaultTakerFeeColored => "DEFAULT_TAKER_FEE_COLORED",
            ParamId::MinMakerFeeColored => "MIN_MAKER_FEE_COLORED",
            ParamId::MinTakerFeeColored => "MIN_TAKER_FEE_COLORED",
            ParamId::DefaultMakerFeeBase => "DEFAULT_MAKER_FEE_BASE",
            ParamId::DefaultTakerFeeBase => "DEFAULT_TAKER_FEE_BASE",
            ParamId::MinMakerFeeBase => "MIN_MAKER_FEE_BASE",
            ParamId::MinTakerFeeBase => "MIN_TAKER_FEE_BASE",
            ParamId::ProposalFee => "PROPOSAL_FEE",
            ParamId::BlindVoteFee => "BLIND_VOTE_FEE",
            ParamId::QuorumCompensation => "QUORUM_COMPENSATION",
            ParamId::QuorumChangeParam => "QUORUM_CHANGE_PARAM",
            ParamId::QuorumRemoveAsset => "QUORUM_REMOVE_ASSET",
            ParamId::QuorumGenericProposal => "QUORUM_GENERIC_PROPOSAL",
            ParamId::QuorumBurnBond => "QUORUM_BURN_BOND",
            ParamId::ThresholdCompensation => "THRESHOLD_COMPENSATION",
            ParamId::ThresholdChangeParam => "THRESHOLD_CHANGE_PARAM",
            ParamId::ThresholdRemoveAsset => "THRESHOLD_REMOVE_ASSET",
            ParamId::ThresholdGenericProposal => "THRESHOLD_GENERIC_PROPOSAL",
            ParamId::ThresholdBurnBond => "THRESHOLD_BURN_BOND",
            ParamId::PhaseProposal => "PHASE_PROPOSAL",
            ParamId::PhaseBreak1 => "PHASE_BREAK1",
            ParamId::PhaseBlindVote => "PHASE_BLIND_VOTE",
            ParamId::PhaseBreak2 => "PHASE_BREAK2",
            ParamId::PhaseVoteReveal => "PHASE_VOTE_REVEAL",
            ParamId::PhaseBreak3 => "PHASE_BREAK3",
            ParamId::PhaseResult => "PHASE_RESULT",
            ParamId::PhaseBreak4 => "PHASE_BREAK4",
            ParamId::LockTimeMin => "LOCK_TIME_MIN",
            ParamId::LockTimeMax => "LOCK_TIME_MAX",
        }
    }

    pub fn quorum_for(proposal: crate::proposal::ProposalKind) -> ParamId {
        use crate::proposal::ProposalKind::*;
        match proposal {
            Compensation => ParamId::QuorumCompensation,
            ChangeParam => ParamId::QuorumChangeParam,
            RemoveAsset => ParamId::QuorumRemoveAsset,
            BurnBond => ParamId::QuorumBurnBond,
            Generic => ParamId::QuorumGenericProposal,
        }
    }

    pub fn threshold_for(proposal: crate::proposal::ProposalKind) -> ParamId {
        use crate::proposal::ProposalKind::*;
        match proposal {
            Compensation => ParamId::ThresholdCompensation,
            ChangeParam => ParamId::ThresholdChangeParam,
            RemoveAsset => ParamId::ThresholdRemoveAsset,
            BurnBond => ParamId::ThresholdBurnBond,
            Generic => ParamId::ThresholdGenericProposal,
        }
    }
}

/// Height-indexed governance parameter store.
///
/// Per id, overrides are kept strictly increasing by height so lookup is a binary search
/// and `appendOverride` only ever needs to check against the last entry.
#[derive(Debug, Clone, Default)]
pub struct ParamRegistry {
    defaults: HashMap<ParamId, i64>,
    overrides: HashMap<ParamId, Vec<(u32, i64)>>,
}

impl ParamRegistry {
    pub fn new(defaults: impl IntoIterator<Item = (ParamId, i64)>) -> Self {
        ParamRegistry {
            defaults: defaults.into_iter().collect(),
            overrides: HashMap::new(),
        }
    }

    /// Returns the most recent override at or before `at_height`, else the default.
    pub fn param_value(&self, id: ParamId, at_height: u32) -> i64 {
        if let Some(overrides) = self.overrides.get(&id) {
            // Binary search for the last entry with height <= at_height.
            let idx = overrides.partition_point(|(h, _)| *h <= at_height);
            if idx > 0 {
                return overrides[idx - 1].1;
            }
        }
        *self.defaults.get(&id).unwrap_or(&0)
    }

    /// Appends an override, valid only if `at_height` is strictly greater than the last
    /// override's height for this id.
    pub fn append_override(&mut self, id: ParamId, at_height: u32, value: i64) -> Result<(), ParamError> {
        let list = self.overrides.entry(id).or_default();
        if let Some((last_height, _)) = list.last() {
            if at_height <= *last_height {
                return Err(ParamError::StaleOverride {
                    id: id.as_str().to_string(),
                    height: at_height,
                });
            }
        }
        list.push((at_height, value));
        log::debug!(target: LOG_TARGET, "appended override {}={} at height {}", id.as_str(), value, at_height);
        Ok(())
    }

    pub fn enumerate(&self) -> impl Iterator<Item = (ParamId, i64)> + '_ {
        ParamId::ALL.iter().map(move |id| (*id, *self.defaults.get(id).unwrap_or(&0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ParamRegistry {
        ParamRegistry::new([(ParamId::ProposalFee, 100)])
    }

    #[test]
    fn default_before_any_override() {
        let r = registry();
        assert_eq!(r.param_value(ParamId::ProposalFee, 50), 100);
    }

    #[test]
    fn override_takes_effect_at_its_height() {
        let mut r = registry();
        r.append_override(ParamId::ProposalFee, 214, 150).unwrap();
        assert_eq!(r.param_value(ParamId::ProposalFee, 212), 100);
        assert_eq!(r.param_value(ParamId::ProposalFee, 214), 150);
        assert_eq!(r.param_value(ParamId::ProposalFee, 9999), 150);
    }

    #[test]
    fn stale_override_is_rejected() {
        let mut r = registry();
        r.append_override(ParamId::ProposalFee, 300, 150).unwrap();
        let err = r.append_override(ParamId::ProposalFee, 300, 200).unwrap_err();
        assert!(matches!(err, ParamError::StaleOverride { .. }));
        let err = r.append_override(ParamId::ProposalFee, 100, 200).unwrap_err();
        assert!(matches!(err, ParamError::StaleOverride { .. }));
    }
}
