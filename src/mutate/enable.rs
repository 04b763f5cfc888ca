use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{MutationContext, MutationError};
use crate::fx::EffectInfo;

impl<'a, R: Rng + ?Sized> MutationContext<'a, R> {
    fn untouched_switches(&self) -> Vec<(&'a EffectInfo, &'a str)> {
        self.effects
            .iter()
            .filter_map(|&fx| fx.enable_key.as_deref().map(|key| (fx, key)))
            .filter(|(_, key)| !self.is_changed(key))
            .collect()
    }

    fn switch(&mut self, fx: &'a EffectInfo, key: &str, on: bool) -> Result<(), MutationError> {
        let value = i64::from(on);
        let display = self
            .tables()
            .table_for_key(key)
            .and_then(|t| t.get(&value))
            .cloned()
            .unwrap_or_else(|| if on { "ON" } else { "OFF" }.to_string());

        self.set(key, value, &display)?;
        if on {
            self.select_type(fx)?;
        }
        Ok(())
    }

    /// Flip the on/off switch of one random effect not yet touched this batch.
    /// Effects switched on also get a random type.
    pub fn enable(&mut self) -> Result<(), MutationError> {
        let candidates = self.untouched_switches();
        let Some(&(fx, key)) = candidates.choose(&mut *self.rng) else {
            debug!("enable: no untouched switch left");
            return Ok(());
        };

        let on = !self.patch.is_on(key)?;
        self.switch(fx, key, on)
    }

    /// Switch on every untouched effect in the batch and give each a type.
    pub fn enable_all(&mut self) -> Result<(), MutationError> {
        for (fx, key) in self.untouched_switches() {
            self.switch(fx, key, true)?;
        }
        Ok(())
    }

    /// Pick a random type for an effect unless its selector was already set.
    pub fn select_type(&mut self, fx: &EffectInfo) -> Result<(), MutationError> {
        let Some(key) = fx.type_key.as_deref() else {
            return Ok(());
        };
        if self.is_changed(key) {
            return Ok(());
        }

        let table = self.table(key)?;
        let codes: Vec<i64> = table.keys().copied().collect();
        let Some(&code) = codes.choose(&mut *self.rng) else {
            return Ok(());
        };

        self.set(key, code, &table[&code])
    }
}
