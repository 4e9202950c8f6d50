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

//! §4.8 Parameter Change Applier.

use crate::{param::ParamRegistry, tally::CycleResult};

const LOG_TARGET: &str = "dao::param_applier";

pub struct ParamChangeApplier;

impl ParamChangeApplier {
    /// Applies a cycle's accepted CHANGE_PARAM decisions at `next_cycle_first_block`, in
    /// ascending param-identifier order (§4.7 tie-break, §4.8). A failing append indicates a
    /// height regression and violates the monotone-height invariant (§3) — fatal, per §7.
    pub fn apply(result: &CycleResult, registry: &mut ParamRegistry, next_cycle_first_block: u32) {
        for (id, value) in &result.param_changes {
            registry.append_override(*id, next_cycle_first_block, *value).unwrap_or_else(|err| {
                panic!(
                    "fatal: failed to apply accepted param change for cycle {}: {}",
                    result.cycle_index, err
                )
            });
            log::info!(
                target: LOG_TARGET,
                "applied param change {}={} at height {} (cycle {})",
                id.as_str(),
                value,
                next_cycle_first_block,
                result.cycle_index
            );
        }
    }
}
