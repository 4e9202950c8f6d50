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

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("override for {id} at height {height} is not strictly after the last override")]
    StaleOverride { id: String, height: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpReturnError {
    #[error("op-return payload shorter than required for its type")]
    ShortOpReturn,
    #[error("unknown op-return type tag {0:#04x}")]
    UnknownOpReturnType(u8),
    #[error("unsupported op-return version {0}")]
    UnsupportedVersion(u8),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlockParseError {
    #[error("block at height {height} does not connect to the stored chain tip")]
    BlockNotConnecting { height: u32 },
    #[error("block at height {height} has already been committed")]
    DuplicateBlock { height: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TallyError {
    #[error("blind vote {0} failed to decrypt with the revealed key")]
    DecryptionFailed(String),
    #[error("vote reveal for blind vote {0} does not match its commitment")]
    CommitmentMismatch(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BallotError {
    #[error("ballot mutation attempted outside the proposal phase")]
    PhaseLocked,
    #[error("proposal validation failed: {reason}")]
    ValidationFailed { reason: String },
}

/// Aggregate error surfaced across the crate's public API boundary.
#[derive(Debug, Error)]
pub enum DaoError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    OpReturn(#[from] OpReturnError),
    #[error(transparent)]
    BlockParse(#[from] BlockParseError),
    #[error(transparent)]
    Tally(#[from] TallyError),
    #[error(transparent)]
    Ballot(#[from] BallotError),
}
