use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use patch_rando::fx::{EffectInfo, EffectRegistry};
use patch_rando::mutate::{Mutator, Weights, select_mutations};
use patch_rando::patch::{Patch, PatchSet};
use patch_rando::settings::Settings;
use patch_rando::tables::TableSet;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rando")]
#[command(version)]
#[command(about = "Generate random but structurally valid variations of effects patches.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate mutated patches from every patch of a collection
    Rand {
        /// Patch collection to mutate patches from
        input: PathBuf,
        /// Where to save the mutated patches
        output: PathBuf,
        /// Number of mutated patches to generate
        #[arg(long)]
        count: Option<usize>,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Apply one mutation batch to a single patch and append the result
    Mutate {
        /// Patch collection holding the base patch
        input: PathBuf,
        /// Collection the mutated patch is appended to
        output: PathBuf,
        /// Name of the base patch (defaults to the last one)
        #[arg(long)]
        patch: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct CommonArgs {
    /// Parameter tables JSON
    #[arg(long, env = "RANDO_TABLES")]
    tables: Option<PathBuf>,
    /// Number of mutations per patch
    #[arg(long)]
    mutations: Option<usize>,
    /// Relative weights for choosing the mutation kind
    #[arg(long, value_name = "ENABLE,REORDER,VALUE,ASSIGN")]
    weights: Option<Weights>,
    /// Comma separated effects to mutate (default: all)
    #[arg(long, value_delimiter = ',')]
    fx: Vec<String>,
    /// Comma separated effects to leave alone
    #[arg(long, value_delimiter = ',')]
    fx_ignore: Vec<String>,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

struct Run {
    mutator: Mutator,
    weights: Weights,
    mutations: usize,
    effects: Vec<EffectInfo>,
    rng: StdRng,
}

impl Run {
    fn new(common: CommonArgs, settings: &Settings) -> Result<Self> {
        let tables_path = common
            .tables
            .unwrap_or_else(|| PathBuf::from(&settings.tables_path));
        let tables = TableSet::load(&tables_path)?;
        let topology = tables.topology();
        let registry = EffectRegistry::gt100();

        let weights = match common.weights {
            Some(w) => w,
            None => settings.weights()?,
        };

        let fx = if common.fx.is_empty() {
            registry.names().into_iter().map(str::to_string).collect()
        } else {
            common.fx
        };
        let fx_ignore = if common.fx_ignore.is_empty() {
            settings.fx_ignore.clone()
        } else {
            common.fx_ignore
        };

        let effects: Vec<EffectInfo> = registry
            .select(&fx, &fx_ignore)?
            .into_iter()
            .cloned()
            .collect();
        info!(
            "Effects: {}",
            effects.iter().map(|e| e.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let rng = match common.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            mutator: Mutator::new(registry, Box::new(tables), topology),
            weights,
            mutations: common.mutations.unwrap_or(settings.mutations),
            effects,
            rng,
        })
    }

    /// Mutate a deep copy of `base`, returning it with its log.
    fn mutate(&mut self, base: &Patch) -> Result<(Patch, String)> {
        let kinds = select_mutations(&self.weights, self.mutations, &mut self.rng)?;
        info!(
            "Applying {}",
            kinds.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        );

        let effects: Vec<&EffectInfo> = self.effects.iter().collect();
        let mut result = base.clone();
        let log = self
            .mutator
            .mutate_patch(&mut result, &effects, &kinds, &mut self.rng)?;
        Ok((result, log))
    }
}

fn load_or_new(path: &Path) -> Result<PatchSet> {
    if path.exists() {
        PatchSet::load(path)
    } else {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("mutations");
        Ok(PatchSet::new(name))
    }
}

fn run_rand(input: &Path, output: &Path, count: usize, run: &mut Run) -> Result<()> {
    let source = PatchSet::load(input)?;
    if source.is_empty() {
        anyhow::bail!("no patches in '{}'", input.display());
    }

    let mut out = PatchSet::new(
        output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("mutations"),
    );

    for base in source.patches().iter().cycle().take(count) {
        info!("Mutating {}", base.name.trim_end());
        let (result, _) = run.mutate(base)?;
        out.add_patch(result);
    }

    out.store(output)
        .with_context(|| format!("failed to save '{}'", output.display()))?;
    info!("Wrote {} patches to {}", out.len(), output.display());
    Ok(())
}

fn run_mutate(input: &Path, output: &Path, patch: Option<&str>, run: &mut Run) -> Result<()> {
    let source = PatchSet::load(input)?;
    let base = match patch {
        Some(name) => source
            .get_patch_by_name(name)
            .with_context(|| format!("patch '{name}' not found in '{}'", input.display()))?,
        None => source
            .patches()
            .last()
            .with_context(|| format!("no patches in '{}'", input.display()))?,
    };

    let (result, log) = run.mutate(base)?;
    println!("{log}");

    let mut out = load_or_new(output)?;
    out.add_patch(result);
    out.store(output)
        .with_context(|| format!("failed to save '{}'", output.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    info!("patch-rando v{}", env!("CARGO_PKG_VERSION"));
    info!("Args: {:?}", args);

    let settings = Settings::load().context("failed to load settings")?;
    info!("{settings}");

    match args.command {
        Command::Rand {
            input,
            output,
            count,
            common,
        } => {
            let count = count.unwrap_or(settings.count);
            let mut run = Run::new(common, &settings)?;
            run_rand(&input, &output, count, &mut run)
        }
        Command::Mutate {
            input,
            output,
            patch,
            common,
        } => {
            let mut run = Run::new(common, &settings)?;
            run_mutate(&input, &output, patch.as_deref(), &mut run)
        }
    }
}
