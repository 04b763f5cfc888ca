use log::{debug, warn};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{MutationContext, MutationError};
use crate::fx::EffectInfo;

impl<'a, R: Rng + ?Sized> MutationContext<'a, R> {
    /// Parameters of `fx` that may be frobbed right now.
    ///
    /// Nested effects only offer the parameters of their selected type.
    pub fn frob_candidates(&self, fx: &EffectInfo) -> Result<Vec<&'a str>, MutationError> {
        let index = self.mutator.frob_index();
        let keys: &[String] = match (fx.nested, fx.type_key.as_deref()) {
            (true, Some(type_key)) => {
                let selected = self.patch.value(type_key)?;
                match self.table(type_key)?.get(&selected) {
                    Some(type_name) => index.keys_for_type(&fx.name, type_name),
                    None => {
                        debug!("value: {type_key}={selected} has no type name");
                        &[]
                    }
                }
            }
            _ => index.keys(&fx.name),
        };

        Ok(keys
            .iter()
            .map(String::as_str)
            .filter(|&key| fx.enable_key.as_deref() != Some(key))
            .filter(|&key| fx.type_key.as_deref() != Some(key))
            .filter(|&key| !self.is_changed(key))
            .collect())
    }

    /// Set one random parameter of a random effect to a random valid value.
    ///
    /// Runs only if some effect in the batch is switched on, but the target
    /// effect itself is drawn from the whole batch.
    pub fn frob_value(&mut self) -> Result<(), MutationError> {
        let mut any_enabled = false;
        for fx in &self.effects {
            if let Some(key) = fx.enable_key.as_deref()
                && self.patch.is_on(key)?
            {
                any_enabled = true;
                break;
            }
        }
        if !any_enabled {
            debug!("value: no enabled effect");
            return Ok(());
        }

        let Some(&fx) = self.effects.choose(&mut *self.rng) else {
            return Ok(());
        };

        let candidates = self.frob_candidates(fx)?;
        let Some(&key) = candidates.choose(&mut *self.rng) else {
            debug!("value: nothing left to change on {}", fx.name);
            return Ok(());
        };

        let table = self.table(key)?;
        let codes: Vec<i64> = table.keys().copied().collect();
        let Some(&code) = codes.choose(&mut *self.rng) else {
            return Ok(());
        };

        let stored = self.tables().byte_to_index(code).unwrap_or_else(|| {
            warn!("value: no index translation for {code}, storing it as is");
            code
        });

        self.set(key, stored, &table[&code])
    }
}
