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

//! §3 Proposal. The variant-over-kind data model, common fields factored out.

use crate::raw::TxId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalKind {
    Compensation,
    ChangeParam,
    BurnBond,
    RemoveAsset,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalCommon {
    pub name: String,
    pub title: String,
    pub description: String,
    pub link: String,
    pub proposer_tx_id: TxId,
    pub cycle_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalDetails {
    Compensation { requested_amount: u64, payout_address: String },
    ChangeParam { param: crate::param::ParamId, new_value: i64 },
    BurnBond { bonded_role: String },
    RemoveAsset { ticker: String },
    Generic,
}

impl ProposalDetails {
    pub fn kind(&self) -> ProposalKind {
        match self {
            ProposalDetails::Compensation { .. } => ProposalKind::Compensation,
            ProposalDetails::ChangeParam { .. } => ProposalKind::ChangeParam,
            ProposalDetails::BurnBond { .. } => ProposalKind::BurnBond,
            ProposalDetails::RemoveAsset { .. } => ProposalKind::RemoveAsset,
            ProposalDetails::Generic => ProposalKind::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub common: ProposalCommon,
    pub details: ProposalDetails,
}

impl Proposal {
    pub fn kind(&self) -> ProposalKind {
        self.details.kind()
    }

    pub fn tx_id(&self) -> TxId {
        self.common.proposer_tx_id
    }

    /// Syntactic admission check (§4.6): non-empty name/title and a well-formed kind.
    pub fn validate(&self) -> Result<(), crate::error::BallotError> {
        if self.common.name.is_empty() || self.common.title.is_empty() {
            return Err(crate::error::BallotError::ValidationFailed {
                reason: "proposal name and title must not be empty".into(),
            });
        }
        match &self.details {
            ProposalDetails::Compensation { requested_amount, payout_address } => {
                if *requested_amount == 0 || payout_address.is_empty() {
                    return Err(crate::error::BallotError::ValidationFailed {
                        reason: "compensation proposal requires a non-zero amount and payout address".into(),
                    });
                }
            },
            ProposalDetails::RemoveAsset { ticker } if ticker.is_empty() => {
                return Err(crate::error::BallotError::ValidationFailed {
                    reason: "asset-removal proposal requires a ticker".into(),
                });
            },
            _ => {},
        }
        Ok(())
    }
}
