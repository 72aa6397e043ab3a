use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use tilegen::world::{Generator, GeneratorConfig, Variant};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliVariant {
    #[value(name = "simple")]
    Simple,
    #[value(name = "multi-stage")]
    MultiStage,
}

impl From<CliVariant> for Variant {
    fn from(value: CliVariant) -> Self {
        match value {
            CliVariant::Simple => Variant::Simple,
            CliVariant::MultiStage => Variant::MultiStage,
        }
    }
}

/// Tilegen - staged procedural tile map generator
#[derive(Parser, Debug)]
#[command(name = "tilegen", version, about)]
struct Cli {
    /// Random seed for generation
    #[arg(long)]
    seed: Option<u64>,

    /// Grid width in tiles
    #[arg(long, default_value_t = tilegen::world::DEFAULT_WIDTH)]
    width: usize,

    /// Grid height in tiles
    #[arg(long, default_value_t = tilegen::world::DEFAULT_HEIGHT)]
    height: usize,

    /// Pipeline to run
    #[arg(long, value_enum, default_value_t = CliVariant::MultiStage)]
    variant: CliVariant,

    /// Work budget granted per step
    #[arg(long, default_value_t = tilegen::world::RUN_TO_COMPLETION_BUDGET)]
    budget: u32,

    /// Number of regions to carve (multi-stage only)
    #[arg(long)]
    regions: Option<usize>,

    /// Smoothing iterations (overrides the variant default)
    #[arg(long)]
    iterations: Option<u32>,

    /// Treat grid edges as hard borders instead of wrapping around
    #[arg(long)]
    no_wrap: bool,

    /// Print the map after every step
    #[arg(long)]
    show_steps: bool,

    /// Print per-type tile counts and region sizes when done
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn config(&self, seed: u64) -> GeneratorConfig {
        let mut config = GeneratorConfig::for_variant(self.variant.into())
            .with_size(self.width, self.height)
            .with_seed(seed)
            .with_wrap(!self.no_wrap);
        if let Some(regions) = self.regions {
            config = config.with_region_count(regions);
        }
        if let Some(iterations) = self.iterations {
            config = config.with_step_iterations(iterations);
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(rand::random);
    println!(
        "Generating {}x{} map: seed={}, variant={}, budget={}",
        cli.width,
        cli.height,
        seed,
        Variant::from(cli.variant),
        cli.budget
    );

    let mut generator = match Generator::new(cli.config(seed)) {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.show_steps {
        let mut steps = 0usize;
        generator.on_updated(move |event| {
            steps += 1;
            let stage = event.ran.map_or("-", |s| s.name());
            println!("\nstep {} [{}]\n{}", steps, stage, event.grid);
        });
    }

    let max_steps = tilegen::world::MAX_RUN_ITERATIONS;
    let steps = match generator.run_to_completion_with(cli.budget.max(1), max_steps) {
        Ok(steps) => steps,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !cli.show_steps {
        println!("{}", generator.grid());
    }
    println!("Generation complete in {} steps", steps);

    if cli.stats {
        print_stats(&generator);
    }

    ExitCode::SUCCESS
}

fn print_stats<R: rand::Rng>(generator: &Generator<R>) {
    let grid = generator.grid();
    println!("\nTile counts:");
    for (ty, count) in grid.type_counts() {
        let pct = count as f64 / grid.len() as f64 * 100.0;
        println!("  {:>8} ({}): {:>6} ({:.1}%)", ty, ty.glyph(), count, pct);
    }

    if !generator.regions().is_empty() {
        println!("\nRegions (size at carve time):");
        for (i, region) in generator.regions().iter().enumerate() {
            println!("  {}: type {} - {} tiles", i, region.ty(), region.len());
        }
    }
}
