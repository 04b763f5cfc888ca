use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mutate::MutationError;

pub mod set;

pub use set::PatchSet;

/// Chain order stored twice: as a list and as `position1..positionN` fields.
///
/// Both encodings are only ever written together through [`ChainParams::set_order`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    position_list: Vec<u8>,
    #[serde(flatten)]
    positions: BTreeMap<String, u8>,
}

impl ChainParams {
    pub fn new(order: Vec<u8>) -> Self {
        let mut chain = Self::default();
        chain.set_order(order);
        chain
    }

    pub fn order(&self) -> &[u8] {
        &self.position_list
    }

    pub fn set_order(&mut self, order: Vec<u8>) {
        self.positions = order
            .iter()
            .enumerate()
            .map(|(i, &code)| (position_key(i), code))
            .collect();
        self.position_list = order;
    }

    /// Positional field `positionN` (1-based), as stored.
    pub fn position(&self, n: usize) -> Option<u8> {
        self.positions.get(&format!("position{n}")).copied()
    }

    /// True when every positional field mirrors the list and nothing extra is stored.
    pub fn is_consistent(&self) -> bool {
        self.positions.len() == self.position_list.len()
            && self
                .position_list
                .iter()
                .enumerate()
                .all(|(i, &code)| self.positions.get(&position_key(i)) == Some(&code))
    }
}

fn position_key(index: usize) -> String {
    format!("position{}", index + 1)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchParams {
    #[serde(default)]
    pub patchname: String,
    pub chain_params: ChainParams,
    #[serde(flatten)]
    pub values: BTreeMap<String, i64>,
}

/// A complete configuration record for the effects unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub name: String,
    /// First half of the name, as shown on the unit's display
    pub gt100_name1: String,
    pub gt100_name2: String,
    pub id: String,
    #[serde(default)]
    pub note: String,
    pub params: PatchParams,
}

impl Patch {
    pub fn new(name: &str, values: BTreeMap<String, i64>, order: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            params: PatchParams {
                patchname: name.to_string(),
                chain_params: ChainParams::new(order),
                values,
            },
            ..Self::default()
        }
    }

    pub fn value(&self, key: &str) -> Result<i64, MutationError> {
        self.params
            .values
            .get(key)
            .copied()
            .ok_or_else(|| MutationError::UnknownParameter(key.to_string()))
    }

    pub fn set_value(&mut self, key: &str, value: i64) -> Result<(), MutationError> {
        match self.params.values.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MutationError::UnknownParameter(key.to_string())),
        }
    }

    pub fn is_on(&self, key: &str) -> Result<bool, MutationError> {
        self.value(key).map(|v| v != 0)
    }

    pub fn chain(&self) -> &[u8] {
        self.params.chain_params.order()
    }

    pub fn set_chain(&mut self, order: Vec<u8>) {
        self.params.chain_params.set_order(order);
    }
}
