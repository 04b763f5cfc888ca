use anyhow::Result;
use patch_rando::fx::EffectRegistry;
use patch_rando::mutate::Mutator;
use patch_rando::patch::{Patch, PatchSet};
use patch_rando::tables::TableSet;
use std::path::PathBuf;

pub fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file)
}

/// GT-100 tables and the base patch, every effect switched off.
pub fn load_fixture() -> Result<(Mutator, Patch)> {
    let tables = TableSet::load(data_path("tables.json"))?;
    let set = PatchSet::load(data_path("base.json"))?;
    let patch = set.patches()[0].clone();

    let topology = tables.topology();
    let mutator = Mutator::new(EffectRegistry::gt100(), Box::new(tables), topology);
    Ok((mutator, patch))
}
