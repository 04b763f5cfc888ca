use patch_rando::fx::EffectRegistry;
use patch_rando::mutate::Mutator;
use patch_rando::patch::{Patch, PatchSet};
use patch_rando::tables::TableSet;
use std::path::PathBuf;

fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file)
}

pub fn create_fixture() -> (Mutator, Patch) {
    let tables = TableSet::load(data_path("tables.json")).unwrap();
    let set = PatchSet::load(data_path("base.json")).unwrap();
    let mut patch = set.patches()[0].clone();
    for fx in EffectRegistry::gt100().effects() {
        if let Some(key) = fx.enable_key.as_deref() {
            patch.set_value(key, 1).unwrap();
        }
    }

    let topology = tables.topology();
    let mutator = Mutator::new(EffectRegistry::gt100(), Box::new(tables), topology);
    (mutator, patch)
}
