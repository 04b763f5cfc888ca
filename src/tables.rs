use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::topology::ChainTopology;

/// Valid codes of one parameter mapped to their display names.
pub type ValueTable = BTreeMap<i64, String>;

/// One mutable parameter and the effect namespace it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub key: String,
    /// Owning effect block, e.g. "FX1"
    pub effect: String,
    /// Type name this parameter belongs to, for nested effects
    #[serde(default)]
    pub variant: Option<String>,
}

impl ParamDescriptor {
    pub fn new(key: &str, effect: &str) -> Self {
        Self {
            key: key.to_string(),
            effect: effect.to_string(),
            variant: None,
        }
    }

    pub fn with_variant(mut self, variant: &str) -> Self {
        self.variant = Some(variant.to_string());
        self
    }
}

/// Read-only access to the unit's parameter tables.
pub trait ParameterTables {
    /// Valid values and display names for a parameter key.
    fn table_for_key(&self, key: &str) -> Option<&ValueTable>;

    /// Display names for chain position codes.
    fn chain_names(&self) -> &ValueTable;

    /// Translate a table code into the representation stored in a patch.
    fn byte_to_index(&self, code: i64) -> Option<i64>;

    /// Every mutable parameter.
    fn descriptors(&self) -> &[ParamDescriptor];
}

/// Parameter tables loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSet {
    pub values: BTreeMap<String, ValueTable>,
    pub chain_names: ValueTable,
    pub byte_to_index: BTreeMap<i64, i64>,
    pub descriptors: Vec<ParamDescriptor>,
    /// Overrides the default chain topology when present
    #[serde(default)]
    pub topology: Option<ChainTopology>,
}

impl TableSet {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read tables file {}", path.display()))?;
        let tables: TableSet =
            serde_json::from_str(&content).context("Failed to parse tables JSON")?;
        debug!(
            "Loaded {} value tables and {} descriptors from {:?}",
            tables.values.len(),
            tables.descriptors.len(),
            path
        );
        Ok(tables)
    }

    pub fn topology(&self) -> ChainTopology {
        self.topology.clone().unwrap_or_default()
    }
}

impl ParameterTables for TableSet {
    fn table_for_key(&self, key: &str) -> Option<&ValueTable> {
        self.values.get(key)
    }

    fn chain_names(&self) -> &ValueTable {
        &self.chain_names
    }

    fn byte_to_index(&self, code: i64) -> Option<i64> {
        self.byte_to_index.get(&code).copied()
    }

    fn descriptors(&self) -> &[ParamDescriptor] {
        &self.descriptors
    }
}

#[derive(Debug, Clone, Default)]
struct Subspace {
    flat: Vec<String>,
    by_type: BTreeMap<String, Vec<String>>,
}

/// Frobbable parameter keys per effect, and per selected type for nested
/// effects. Built once from the descriptor list.
#[derive(Debug, Clone, Default)]
pub struct FrobIndex {
    effects: BTreeMap<String, Subspace>,
}

impl FrobIndex {
    pub fn build(descriptors: &[ParamDescriptor]) -> Self {
        let mut effects: BTreeMap<String, Subspace> = BTreeMap::new();
        for d in descriptors {
            let space = effects.entry(d.effect.clone()).or_default();
            space.flat.push(d.key.clone());
            if let Some(variant) = &d.variant {
                space
                    .by_type
                    .entry(variant.clone())
                    .or_default()
                    .push(d.key.clone());
            }
        }
        Self { effects }
    }

    /// Every parameter of an effect regardless of type.
    pub fn keys(&self, effect: &str) -> &[String] {
        self.effects
            .get(effect)
            .map(|s| s.flat.as_slice())
            .unwrap_or_default()
    }

    /// Parameters of an effect that belong to the given type name.
    pub fn keys_for_type(&self, effect: &str, type_name: &str) -> &[String] {
        self.effects
            .get(effect)
            .and_then(|s| s.by_type.get(type_name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
