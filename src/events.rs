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

//! In-process observer dispatch, grounded on `ChainMetadataHandle` /
//! `ChainMetadataEvent` in the teacher's `chain_metadata_service`: a broadcast channel
//! carrying a typed event enum, fired synchronously and in registration order (§5).

use crate::{ledger::Block, period::Phase, tally::CycleResult};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub enum DaoEvent {
    NewBlockHeight(u32),
    EmptyBlockAdded(Arc<Block>),
    ParseBlockComplete(Arc<Block>),
    PhaseChanged(Phase),
    CycleComplete(Arc<CycleResult>),
}

/// Single subscription list shared by every component that raises events (§9 design note:
/// "Observer callbacks with multiple listener kinds").
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<DaoEvent>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        EventBus { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DaoEvent>> {
        self.sender.subscribe()
    }

    /// Fire-and-forget: listeners that have dropped their receiver simply miss the event,
    /// matching the teacher's use of `broadcast` for best-effort fan-out to live observers.
    pub fn publish(&self, event: DaoEvent) {
        let _ = self.sender.send(Arc::new(event));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
