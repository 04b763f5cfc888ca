use log::{debug, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt::Write;

use super::{MutationContext, MutationError};
use crate::fx::EffectInfo;
use crate::topology::ChainTopology;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    Moved {
        effect: String,
        from: usize,
        to: usize,
    },
    /// No enabled, movable effect in the batch
    NoCandidate,
    /// The chosen effect has no position the topology allows
    NoValidPlacement { effect: String },
}

/// Every index at which `code` could be reinserted into `chain` (with `code`
/// removed) such that the result differs from `chain` and satisfies `topology`.
pub fn legal_insertions(chain: &[u8], code: u8, topology: &ChainTopology) -> Vec<usize> {
    let Some(from) = chain.iter().position(|&c| c == code) else {
        return Vec::new();
    };

    let mut rest = chain.to_vec();
    rest.remove(from);

    (0..rest.len())
        .filter(|&to| to != from)
        .filter(|&to| {
            let mut candidate = rest.clone();
            candidate.insert(to, code);
            topology.is_satisfied(&candidate)
        })
        .collect()
}

impl<'a, R: Rng + ?Sized> MutationContext<'a, R> {
    /// Move one enabled effect to a new legal spot in the chain.
    ///
    /// All legal insertion points are enumerated and one is drawn uniformly,
    /// so the search always terminates.
    pub fn reorder(&mut self) -> Result<ReorderOutcome, MutationError> {
        let mut candidates: Vec<(&'a EffectInfo, u8)> = Vec::new();
        for &fx in &self.effects {
            let (Some(code), Some(key)) = (fx.position, fx.enable_key.as_deref()) else {
                continue;
            };
            if self.patch.is_on(key)? && self.patch.chain().contains(&code) {
                candidates.push((fx, code));
            }
        }

        let Some(&(fx, code)) = candidates.choose(&mut *self.rng) else {
            debug!("reorder: no enabled effect to move");
            return Ok(ReorderOutcome::NoCandidate);
        };

        let chain = self.patch.chain();
        let from = chain.iter().position(|&c| c == code).unwrap_or_default();
        let legal = legal_insertions(chain, code, self.mutator.topology());

        let Some(&to) = legal.choose(&mut *self.rng) else {
            warn!("reorder: no valid placement for {}", fx.name);
            let stuck = self.chain_name(code);
            let _ = writeln!(self.log, "  order: *{stuck}* unchanged, no valid placement");
            return Ok(ReorderOutcome::NoValidPlacement {
                effect: fx.name.clone(),
            });
        };

        let mut order = chain.to_vec();
        order.remove(from);
        order.insert(to, code);

        let before = to.checked_sub(1).map(|i| self.chain_name(order[i]));
        let after = order.get(to + 1).map(|&c| self.chain_name(c));
        let moved = self.chain_name(code);

        self.patch.set_chain(order);

        self.log.push_str("  order: [");
        if let Some(name) = before {
            let _ = write!(self.log, "{name}, ");
        }
        let _ = write!(self.log, "*{moved}*");
        if let Some(name) = after {
            let _ = write!(self.log, ", {name}");
        }
        self.log.push_str("]\n");

        Ok(ReorderOutcome::Moved {
            effect: fx.name.clone(),
            from,
            to,
        })
    }
}
