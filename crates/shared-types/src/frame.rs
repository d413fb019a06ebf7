//! Account frames (spec §3.3) and the ring buffer that retains them.

use crate::account_tx::AccountTx;
use crate::canonical::CanonicalEncode;
use crate::ids::{Hash, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// An immutable, hash-chained unit of account-scope state progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFrame {
    pub height: u64,
    pub timestamp: u64,
    pub account_txs: Vec<AccountTx>,
    pub token_ids: Vec<TokenId>,
    /// True when the proposer of this frame was the `left` side.
    pub by_left: bool,
    pub state_hash: Hash,
    pub prev_state_hash: Hash,
}

impl CanonicalEncode for AccountFrame {
    fn canonical_encode(&self, out: &mut Vec<u8>) {
        self.height.canonical_encode(out);
        self.timestamp.canonical_encode(out);
        self.account_txs.canonical_encode(out);
        let mut token_ids = self.token_ids.clone();
        token_ids.sort();
        (token_ids.len() as u32).canonical_encode(out);
        for t in &token_ids {
            t.0.canonical_encode(out);
        }
        self.by_left.canonical_encode(out);
        self.prev_state_hash.canonical_encode(out);
    }
}

/// A finite ring of the most recently finalized frames, retained for dispute
/// evidence. Must retain at least 32 entries (spec §3.4).
pub const MIN_FRAME_HISTORY: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameHistory {
    capacity: usize,
    frames: VecDeque<AccountFrame>,
}

impl Default for FrameHistory {
    fn default() -> Self {
        FrameHistory::new(MIN_FRAME_HISTORY)
    }
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        FrameHistory {
            capacity: capacity.max(MIN_FRAME_HISTORY),
            frames: VecDeque::new(),
        }
    }

    pub fn push(&mut self, frame: AccountFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn last(&self) -> Option<&AccountFrame> {
        self.frames.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountFrame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True iff every retained frame's `prev_state_hash` matches the
    /// preceding frame's `state_hash` and heights are contiguous
    /// (spec §8 testable property 4, bounded to the retained window).
    pub fn is_contiguous(&self) -> bool {
        let mut iter = self.frames.iter();
        let Some(mut prev) = iter.next() else {
            return true;
        };
        for frame in iter {
            if frame.height != prev.height + 1 {
                return false;
            }
            if frame.prev_state_hash != prev.state_hash {
                return false;
            }
            prev = frame;
        }
        true
    }
}
