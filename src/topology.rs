use serde::{Deserialize, Serialize};

/// A single ordering rule between chain position codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    /// `slot` sits somewhere after `anchor`
    After { slot: u8, anchor: u8 },
    /// `slot` sits directly after `anchor`
    ImmediatelyAfter { slot: u8, anchor: u8 },
    /// `slot` is the final element of the chain
    Last { slot: u8 },
}

impl Constraint {
    /// Missing slots never satisfy a rule.
    pub fn holds(&self, chain: &[u8]) -> bool {
        let index = |code: u8| chain.iter().position(|&c| c == code);

        match *self {
            Constraint::After { slot, anchor } => match (index(slot), index(anchor)) {
                (Some(s), Some(a)) => s > a,
                _ => false,
            },
            Constraint::ImmediatelyAfter { slot, anchor } => {
                match (index(slot), index(anchor)) {
                    (Some(s), Some(a)) => s == a + 1,
                    _ => false,
                }
            }
            Constraint::Last { slot } => {
                index(slot).is_some_and(|s| s + 1 == chain.len())
            }
        }
    }
}

/// The fixed signal-flow rules a chain ordering must respect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTopology {
    pub constraints: Vec<Constraint>,
}

impl Default for ChainTopology {
    fn default() -> Self {
        Self::gt100()
    }
}

pub mod gt100 {
    pub const PREAMP_A: u8 = 2;
    pub const PREAMP_B: u8 = 3;
    pub const NS1: u8 = 13;
    pub const NS2: u8 = 14;
    pub const USB: u8 = 16;
    pub const DIV1: u8 = 17;
    pub const MIX1_DIV2: u8 = 18;
    pub const MIX2: u8 = 19;
}

impl ChainTopology {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    /// Dual preamp routing of the GT-100: DIV1 splits into preamp A and its
    /// noise suppressor, MIX1/DIV2 feeds preamp B and NS2, MIX2 merges, and
    /// USB terminates the chain.
    pub fn gt100() -> Self {
        use Constraint::{After, ImmediatelyAfter, Last};
        use gt100::*;

        Self::new(vec![
            After {
                slot: PREAMP_A,
                anchor: DIV1,
            },
            ImmediatelyAfter {
                slot: NS1,
                anchor: PREAMP_A,
            },
            After {
                slot: MIX1_DIV2,
                anchor: NS1,
            },
            After {
                slot: PREAMP_B,
                anchor: MIX1_DIV2,
            },
            ImmediatelyAfter {
                slot: NS2,
                anchor: PREAMP_B,
            },
            After {
                slot: MIX2,
                anchor: NS2,
            },
            Last { slot: USB },
        ])
    }

    pub fn is_satisfied(&self, chain: &[u8]) -> bool {
        self.constraints.iter().all(|c| c.holds(chain))
    }
}
