//! Nullable chain: an in-order stream of block headers for testing.

use std::cell::Cell;

use dpos_types::{BlockHash, BlockHeader, Timestamp};

/// Produces block headers in height order.
///
/// Time only advances when you tell it to. Hashes are derived from the
/// block number so every header is distinct.
pub struct NullChain {
    number: Cell<u64>,
    time: Cell<u64>,
}

impl NullChain {
    /// A chain whose first block will be block 1 at `start_millis`.
    pub fn starting_at(start_millis: u64) -> Self {
        Self {
            number: Cell::new(0),
            time: Cell::new(start_millis),
        }
    }

    /// Emit the next block, `gap_millis` after the previous one.
    pub fn next_block(&self, gap_millis: u64) -> BlockHeader {
        let number = self.number.get() + 1;
        self.number.set(number);
        if number > 1 {
            self.time.set(self.time.get() + gap_millis);
        }
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&number.to_be_bytes());
        BlockHeader::new(number, Timestamp::new(self.time.get()), BlockHash::new(hash))
    }

    /// Height of the last emitted block, 0 before the first.
    pub fn height(&self) -> u64 {
        self.number.get()
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.time.get())
    }
}
