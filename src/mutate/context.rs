use rand::Rng;
use std::collections::HashSet;
use std::fmt::Write;

use super::{MutationError, Mutator};
use crate::fx::EffectInfo;
use crate::patch::Patch;
use crate::tables::{ParameterTables, ValueTable};

/// State of a single mutation batch.
///
/// Owns the log and the set of parameter keys already changed in this batch;
/// borrows the patch exclusively until the batch is finished.
pub struct MutationContext<'a, R: Rng + ?Sized> {
    pub(super) mutator: &'a Mutator,
    pub patch: &'a mut Patch,
    pub effects: Vec<&'a EffectInfo>,
    pub log: String,
    pub(super) changed: HashSet<String>,
    pub(super) rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> MutationContext<'a, R> {
    pub fn new(
        mutator: &'a Mutator,
        patch: &'a mut Patch,
        effects: Vec<&'a EffectInfo>,
        rng: &'a mut R,
    ) -> Self {
        Self {
            mutator,
            patch,
            effects,
            log: String::new(),
            changed: HashSet::new(),
            rng,
        }
    }

    pub fn is_changed(&self, key: &str) -> bool {
        self.changed.contains(key)
    }

    pub fn changed(&self) -> &HashSet<String> {
        &self.changed
    }

    pub fn into_log(self) -> String {
        self.log
    }

    pub(super) fn tables(&self) -> &'a dyn ParameterTables {
        self.mutator.tables()
    }

    pub(super) fn table(&self, key: &str) -> Result<&'a ValueTable, MutationError> {
        self.tables()
            .table_for_key(key)
            .ok_or_else(|| MutationError::MissingTable(key.to_string()))
    }

    /// Store a value, mark the key as changed and log `key: display name`.
    pub(super) fn set(&mut self, key: &str, stored: i64, display: &str) -> Result<(), MutationError> {
        self.patch.set_value(key, stored)?;
        self.changed.insert(key.to_string());
        let _ = writeln!(self.log, "  {key}: {display}");
        Ok(())
    }

    pub(super) fn chain_name(&self, code: u8) -> String {
        self.tables()
            .chain_names()
            .get(&i64::from(code))
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    /// Append the full chain order, by position name.
    pub fn write_chain_summary(&mut self) {
        let names: Vec<String> = self
            .patch
            .chain()
            .iter()
            .map(|&code| self.chain_name(code))
            .collect();
        let _ = writeln!(self.log, "  chain: {}", names.join(" > "));
    }

    /// Placeholder for assign mutations: spends a slot without touching the patch.
    pub fn assign(&mut self) {
        self.log.push_str("  assign: not supported yet\n");
    }
}
