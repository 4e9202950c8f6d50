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

//! Deployment-supplied configuration the engine treats as external input.

use crate::{param::ParamId, raw::TxId};

/// The half-life, in blocks, used by the merit decay function (§4.7 step 3).
pub const MERIT_DECAY_WINDOW_BLOCKS: u64 = 52_560; // ~1 year at 10-minute blocks

#[derive(Debug, Clone)]
pub struct DaoConfig {
    pub genesis_tx_id: TxId,
    pub genesis_block_height: u32,
    pub total_supply: u64,
    pub param_defaults: Vec<(ParamId, i64)>,
}

impl DaoConfig {
    pub fn new(genesis_tx_id: TxId, genesis_block_height: u32, total_supply: u64, param_defaults: Vec<(ParamId, i64)>) -> Self {
        DaoConfig { genesis_tx_id, genesis_block_height, total_supply, param_defaults }
    }
}
