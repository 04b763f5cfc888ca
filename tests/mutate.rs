mod common;

use anyhow::Result;
use common::load_fixture;
use patch_rando::fx::EffectInfo;
use patch_rando::mutate::{MutationKind, ReorderOutcome, Weights, select_mutations};
use patch_rando::patch::PatchSet;
use rand::SeedableRng;
use rand::rngs::StdRng;

const SWITCHES: [&str; 11] = [
    "comp_on_off",
    "eq_on_off",
    "fx1_on_off",
    "fx2_on_off",
    "od_ds_on_off",
    "delay_on_off",
    "preamp_a_on_off",
    "preamp_b_on_off",
    "reverb_on_off",
    "chorus_on_off",
    "pedal_fx_on_off",
];

#[test]
fn single_enable_switches_one_effect_on() -> Result<()> {
    let (mutator, base) = load_fixture()?;

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let kinds = select_mutations(&Weights([1.0, 0.0, 0.0, 0.0]), 1, &mut rng)?;
        assert_eq!(kinds, vec![MutationKind::Enable]);

        let mut patch = base.clone();
        let effects: Vec<&EffectInfo> = mutator.registry().effects().iter().collect();
        mutator.mutate_patch(&mut patch, &effects, &kinds, &mut rng)?;

        let flipped: Vec<&str> = SWITCHES
            .iter()
            .copied()
            .filter(|key| patch.value(key).unwrap() == 1)
            .collect();
        assert_eq!(flipped.len(), 1, "seed {seed}: {flipped:?}");

        let fx = mutator
            .registry()
            .effects()
            .iter()
            .find(|fx| fx.enable_key.as_deref() == Some(flipped[0]))
            .unwrap();
        if let Some(type_key) = fx.type_key.as_deref() {
            let table = mutator.tables().table_for_key(type_key).unwrap();
            assert!(table.contains_key(&patch.value(type_key)?));
        }

        assert_eq!(patch.chain(), base.chain());
        assert!(patch.params.chain_params.is_consistent());
    }

    Ok(())
}

#[test]
fn single_reorder_moves_only_the_enabled_effect() -> Result<()> {
    let (mutator, mut base) = load_fixture()?;
    base.set_value("reverb_on_off", 1)?;
    const REVERB: u8 = 9;

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let kinds = select_mutations(&Weights([0.0, 1.0, 0.0, 0.0]), 1, &mut rng)?;

        let mut patch = base.clone();
        let effects: Vec<&EffectInfo> = mutator.registry().effects().iter().collect();
        let log = mutator.mutate_patch(&mut patch, &effects, &kinds, &mut rng)?;

        let old_index = base.chain().iter().position(|&c| c == REVERB).unwrap();
        let new_index = patch.chain().iter().position(|&c| c == REVERB).unwrap();
        assert_ne!(old_index, new_index);

        let strip = |chain: &[u8]| chain.iter().copied().filter(|&c| c != REVERB).collect::<Vec<_>>();
        assert_eq!(strip(patch.chain()), strip(base.chain()));

        assert!(mutator.topology().is_satisfied(patch.chain()));
        for (i, &code) in patch.chain().iter().enumerate() {
            assert_eq!(patch.params.chain_params.position(i + 1), Some(code));
        }
        assert!(log.contains("*REVERB*"));
    }

    Ok(())
}

#[test]
fn reorder_keeps_topology_over_many_moves() -> Result<()> {
    let (mutator, mut patch) = load_fixture()?;
    for key in SWITCHES {
        patch.set_value(key, 1)?;
    }
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..200 {
        let before = patch.chain().to_vec();
        let effects: Vec<&EffectInfo> = mutator.registry().effects().iter().collect();
        let mut ctx = mutator.context(&mut patch, effects, &mut rng);
        let outcome = ctx.reorder()?;
        drop(ctx);

        assert!(matches!(outcome, ReorderOutcome::Moved { .. }), "{outcome:?}");
        assert_ne!(patch.chain(), before.as_slice());
        assert!(mutator.topology().is_satisfied(patch.chain()));
        assert!(patch.params.chain_params.is_consistent());
    }

    Ok(())
}

#[test]
fn full_batch_writes_log_and_identity() -> Result<()> {
    let (mutator, base) = load_fixture()?;
    let mut rng = StdRng::seed_from_u64(77);

    let kinds = select_mutations(&Weights::default(), 10, &mut rng)?;
    let mut patch = base.clone();
    let effects: Vec<&EffectInfo> = mutator.registry().effects().iter().collect();
    let log = mutator.mutate_patch(&mut patch, &effects, &kinds, &mut rng)?;

    assert!(log.starts_with("Mutating \"Base\"\n"));
    assert!(log.contains("  chain: "));
    assert!(log.ends_with(&format!("  name: {}\n", patch.name)));
    assert!(log.starts_with(&patch.note));
    assert_ne!(patch.name, base.name);
    assert_eq!(patch.name, format!("{}{}", patch.gt100_name1, patch.gt100_name2));
    assert_eq!(patch.id.len(), 10);
    assert!(mutator.topology().is_satisfied(patch.chain()));

    Ok(())
}

#[test]
fn same_seed_same_mutant() -> Result<()> {
    let (mutator, base) = load_fixture()?;
    let effects: Vec<&EffectInfo> = mutator.registry().effects().iter().collect();

    let run = |seed: u64| -> Result<_> {
        let mut rng = StdRng::seed_from_u64(seed);
        let kinds = select_mutations(&Weights::default(), 12, &mut rng)?;
        let mut patch = base.clone();
        let log = mutator.mutate_patch(&mut patch, &effects, &kinds, &mut rng)?;
        Ok((patch, log))
    };

    assert_eq!(run(5)?, run(5)?);
    Ok(())
}

#[test]
fn narrowed_batch_enables_requested_effects() -> Result<()> {
    let (mutator, base) = load_fixture()?;
    let mut rng = StdRng::seed_from_u64(3);
    let effects = mutator.registry().select(&["DELAY", "REVERB"], &[])?;

    let mut patch = base.clone();
    let log = mutator.mutate_patch(&mut patch, &effects, &[MutationKind::Assign], &mut rng)?;

    assert_eq!(patch.value("delay_on_off")?, 1);
    assert_eq!(patch.value("reverb_on_off")?, 1);
    assert_eq!(patch.value("comp_on_off")?, 0);
    assert!(log.contains("  delay_on_off: ON\n"));
    assert!(log.contains("  assign: "));

    Ok(())
}

#[test]
fn mutants_round_trip_through_a_collection() -> Result<()> {
    let (mutator, base) = load_fixture()?;
    let mut rng = StdRng::seed_from_u64(10);
    let effects: Vec<&EffectInfo> = mutator.registry().effects().iter().collect();

    let mut out = PatchSet::new("mutants");
    for _ in 0..4 {
        let kinds = select_mutations(&Weights::default(), 6, &mut rng)?;
        let mut patch = base.clone();
        mutator.mutate_patch(&mut patch, &effects, &kinds, &mut rng)?;
        out.add_patch(patch);
    }

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mutants.json");
    out.store(&path)?;

    let loaded = PatchSet::load(&path)?;
    assert_eq!(loaded.patches(), out.patches());
    Ok(())
}
