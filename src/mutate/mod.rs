use log::debug;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use std::str::FromStr;
use thiserror::Error;

use crate::fx::{EffectInfo, EffectRegistry};
use crate::patch::Patch;
use crate::tables::{FrobIndex, ParameterTables};
use crate::topology::ChainTopology;

pub mod context;
pub mod enable;
pub mod finish;
pub mod reorder;
pub mod value;

pub use context::MutationContext;
pub use reorder::ReorderOutcome;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MutationError {
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    #[error("parameter not present in patch: {0}")]
    UnknownParameter(String),

    #[error("no value table for parameter: {0}")]
    MissingTable(String),
}

/// The kinds of mutation, in the order they are applied within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MutationKind {
    Enable,
    Reorder,
    Value,
    Assign,
}

impl MutationKind {
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Enable,
        MutationKind::Reorder,
        MutationKind::Value,
        MutationKind::Assign,
    ];

    pub fn apply<R: Rng + ?Sized>(
        self,
        ctx: &mut MutationContext<'_, R>,
    ) -> Result<(), MutationError> {
        match self {
            MutationKind::Enable => ctx.enable(),
            MutationKind::Reorder => ctx.reorder().map(|outcome| {
                debug!("reorder: {outcome:?}");
            }),
            MutationKind::Value => ctx.frob_value(),
            MutationKind::Assign => {
                ctx.assign();
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::Enable => write!(f, "enable"),
            MutationKind::Reorder => write!(f, "reorder"),
            MutationKind::Value => write!(f, "value"),
            MutationKind::Assign => write!(f, "assign"),
        }
    }
}

/// Relative weights for enable, reorder, value and assign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights(pub [f64; 4]);

impl Default for Weights {
    fn default() -> Self {
        Self([10.0, 20.0, 50.0, 20.0])
    }
}

impl FromStr for Weights {
    type Err = MutationError;

    /// Parses `"enable,reorder,value,assign"`, e.g. `"10,20,50,20"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<f64>()
                    .map_err(|_| MutationError::InvalidWeights(format!("not a number: '{p}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let weights: [f64; 4] = parts.try_into().map_err(|parts: Vec<f64>| {
            MutationError::InvalidWeights(format!("expected 4 weights, got {}", parts.len()))
        })?;

        normalise_weights(&weights)?;
        Ok(Self(weights))
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [e, r, v, a] = self.0;
        write!(f, "{e},{r},{v},{a}")
    }
}

/// Scale weights so they sum to 1.
pub fn normalise_weights(weights: &[f64]) -> Result<Vec<f64>, MutationError> {
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(MutationError::InvalidWeights(format!(
            "weights must be non-negative, got {w}"
        )));
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(MutationError::InvalidWeights(
            "weights must not all be zero".to_string(),
        ));
    }

    Ok(weights.iter().map(|w| w / total).collect())
}

/// Draw `count` mutation kinds with replacement and sort them into apply order.
pub fn select_mutations<R: Rng + ?Sized>(
    weights: &Weights,
    count: usize,
    rng: &mut R,
) -> Result<Vec<MutationKind>, MutationError> {
    let normalised = normalise_weights(&weights.0)?;
    let dist = WeightedIndex::new(&normalised)
        .map_err(|e| MutationError::InvalidWeights(e.to_string()))?;

    let mut kinds: Vec<MutationKind> = (0..count)
        .map(|_| MutationKind::ALL[dist.sample(rng)])
        .collect();
    kinds.sort();
    Ok(kinds)
}

/// Everything a batch needs that outlives it: registry, tables and topology.
pub struct Mutator {
    registry: EffectRegistry,
    tables: Box<dyn ParameterTables>,
    topology: ChainTopology,
    frob_index: FrobIndex,
}

impl Mutator {
    pub fn new(
        registry: EffectRegistry,
        tables: Box<dyn ParameterTables>,
        topology: ChainTopology,
    ) -> Self {
        let frob_index = FrobIndex::build(tables.descriptors());
        Self {
            registry,
            tables,
            topology,
            frob_index,
        }
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn tables(&self) -> &dyn ParameterTables {
        self.tables.as_ref()
    }

    pub fn topology(&self) -> &ChainTopology {
        &self.topology
    }

    pub fn frob_index(&self) -> &FrobIndex {
        &self.frob_index
    }

    pub fn context<'a, R: Rng + ?Sized>(
        &'a self,
        patch: &'a mut Patch,
        effects: Vec<&'a EffectInfo>,
        rng: &'a mut R,
    ) -> MutationContext<'a, R> {
        MutationContext::new(self, patch, effects, rng)
    }

    /// Run one batch over `patch` and return the mutation log.
    ///
    /// When `effects` is narrower than the registry, the named effects are
    /// switched on first so the batch actually exercises them.
    pub fn mutate_patch<R: Rng + ?Sized>(
        &self,
        patch: &mut Patch,
        effects: &[&EffectInfo],
        kinds: &[MutationKind],
        rng: &mut R,
    ) -> Result<String, MutationError> {
        let header = format!("Mutating \"{}\"\n", patch.name.trim_end());
        let narrowed = effects.len() != self.registry.len();

        let mut ctx = self.context(patch, effects.to_vec(), rng);
        ctx.log.push_str(&header);

        if narrowed {
            ctx.enable_all()?;
        }

        for kind in kinds {
            kind.apply(&mut ctx)?;
        }

        ctx.write_chain_summary();
        ctx.finish();
        Ok(ctx.into_log())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_normalise_weights_sums_to_one() {
        for weights in [
            vec![10.0, 20.0, 50.0, 20.0],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.3, 0.3, 0.3],
            vec![1e-9, 5e6, 7.0, 0.0],
        ] {
            let normalised = normalise_weights(&weights).unwrap();
            let sum: f64 = normalised.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum was {sum} for {weights:?}");
        }
    }

    #[test]
    fn test_normalise_rejects_bad_weights() {
        assert!(matches!(
            normalise_weights(&[0.0, 0.0, 0.0, 0.0]),
            Err(MutationError::InvalidWeights(_))
        ));
        assert!(normalise_weights(&[1.0, -1.0, 0.0, 0.0]).is_err());
        assert!(normalise_weights(&[f64::NAN, 1.0, 0.0, 0.0]).is_err());
        assert!(normalise_weights(&[]).is_err());
    }

    #[test]
    fn test_select_mutations_is_sorted_and_sized() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [0, 1, 5, 40] {
            let kinds = select_mutations(&Weights::default(), count, &mut rng).unwrap();
            assert_eq!(kinds.len(), count);
            assert!(kinds.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_select_mutations_respects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let kinds = select_mutations(&Weights([0.0, 3.0, 0.0, 1.0]), 50, &mut rng).unwrap();
        assert!(
            kinds
                .iter()
                .all(|k| matches!(k, MutationKind::Reorder | MutationKind::Assign))
        );
    }

    #[test]
    fn test_select_mutations_rejects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_mutations(&Weights([0.0; 4]), 3, &mut rng).is_err());
    }

    #[test]
    fn test_parse_weights() {
        let weights: Weights = "10, 20,50,20".parse().unwrap();
        assert_eq!(weights, Weights::default());
        assert_eq!(weights.to_string(), "10,20,50,20");

        assert!("1,2,3".parse::<Weights>().is_err());
        assert!("1,2,x,4".parse::<Weights>().is_err());
        assert!("0,0,0,0".parse::<Weights>().is_err());
    }
}
