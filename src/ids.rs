//! Snowflake-style document ids.
//!
//! ```text
//! | 41 bits: ms since EPOCH_MS | 10 bits: node | 12 bits: sequence |
//! ```
//!
//! Ids are unique per node and roughly time-ordered. They are rendered as
//! decimal strings and treated as opaque everywhere else.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// 2010-11-04 01:42:54.657 UTC.
const EPOCH_MS: u64 = 1_288_834_974_657;

const NODE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const NODE_MASK: u64 = (1 << NODE_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

struct State {
    last_ms: u64,
    sequence: u64,
}

pub struct IdGenerator {
    node: u64,
    state: Mutex<State>,
}

impl IdGenerator {
    pub fn new(node: u16) -> anyhow::Result<Self> {
        let node = u64::from(node);
        anyhow::ensure!(node <= NODE_MASK, "snowflake node must be within 0..={NODE_MASK}");
        Ok(Self {
            node,
            state: Mutex::new(State { last_ms: 0, sequence: 0 }),
        })
    }

    pub fn generate(&self) -> String {
        let mut state = self.state.lock();
        let mut now = now_ms().max(state.last_ms);

        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // sequence exhausted for this millisecond
                while now <= state.last_ms {
                    std::hint::spin_loop();
                    now = now_ms();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        let id = (now << (NODE_BITS + SEQUENCE_BITS)) | (self.node << SEQUENCE_BITS) | state.sequence;
        id.to_string()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
        .saturating_sub(EPOCH_MS)
}
