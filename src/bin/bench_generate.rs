//! Benchmark full map generation at several grid sizes.
//!
//! Run with: cargo run --release --bin bench_generate
//!
//! Usage:
//!   bench_generate               Run default sizes (64, 256)
//!   bench_generate 128 1k        Square grids of the given side length
//!   bench_generate --budget 1    Drive the generator one unit at a time
//!   bench_generate --check       Also verify that chunked runs match
//!
//! Each size runs the multi-stage pipeline once with the requested budget and
//! reports per-stage timings.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use clap::Parser;
use tilegen::util::Timed;
use tilegen::world::{Generator, GeneratorConfig, StageKind, Variant};

fn parse_side(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = match s.strip_suffix('k') {
        Some(rest) => (rest, 1_000),
        None => (s.as_str(), 1),
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid side length '{}': {}", s, e))
}

#[derive(Parser)]
#[command(name = "bench_generate")]
#[command(about = "Benchmark staged tile map generation")]
struct Args {
    /// Grid side lengths to benchmark (e.g., 64, 256, 1k)
    #[arg(value_parser = parse_side)]
    sizes: Vec<usize>,

    /// Random seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Budget per step
    #[arg(short, long, default_value_t = 4096)]
    budget: u32,

    /// Run the simple two-stage pipeline instead
    #[arg(long)]
    simple: bool,

    /// Compare the result against a run with budget 1
    #[arg(long)]
    check: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let sizes = if args.sizes.is_empty() {
        vec![64, 256]
    } else {
        args.sizes.clone()
    };
    let variant = if args.simple {
        Variant::Simple
    } else {
        Variant::MultiStage
    };

    println!("bench_generate: variant={}, seed={}, budget={}", variant, args.seed, args.budget);

    for side in sizes {
        let config = GeneratorConfig::for_variant(variant)
            .with_size(side, side)
            .with_seed(args.seed);

        print!("{side}x{side}: ");
        let _ = io::stdout().flush();

        let mut generator = match Generator::new(config.clone()) {
            Ok(generator) => generator,
            Err(err) => {
                println!("skipped ({err})");
                continue;
            }
        };

        let mut per_stage: Vec<(StageKind, Duration, usize)> = Vec::new();
        let total = Timed::debug(format!("Generation {side}x{side}"));
        while !generator.is_complete() {
            let stage = generator.current_stage();
            let start = Instant::now();
            generator.step(args.budget.max(1));
            if let Some(stage) = stage {
                match per_stage.last_mut() {
                    Some((last, elapsed, calls)) if *last == stage => {
                        *elapsed += start.elapsed();
                        *calls += 1;
                    }
                    _ => per_stage.push((stage, start.elapsed(), 1)),
                }
            }
        }
        println!("{:.1}ms", total.elapsed().as_secs_f64() * 1000.0);

        for (stage, elapsed, calls) in &per_stage {
            println!(
                "  {:<20} {:>9.2}ms  ({} calls)",
                stage,
                elapsed.as_secs_f64() * 1000.0,
                calls
            );
        }
        println!("  regions: {}", generator.regions().len());

        if args.check {
            let mut reference = match Generator::new(config) {
                Ok(generator) => generator,
                Err(err) => {
                    println!("  check skipped ({err})");
                    continue;
                }
            };
            while !reference.is_complete() {
                reference.step(1);
            }
            let status = if reference.grid() == generator.grid() {
                "MATCH"
            } else {
                "MISMATCH"
            };
            println!("  chunked vs single-unit: [{status}]");
        }
    }
}
