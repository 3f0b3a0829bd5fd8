//! Harmony Search CLI - Optimize a benchmark function from a JSON run file.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use harmony_search::{
    compute::{Benchmark, HarmonySearch, best_of, multi_start},
    schema::{SearchConfig, SearchEvent, SearchResult},
};

/// Contents of a run file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunFile {
    benchmark: Benchmark,
    search: SearchConfig,
    /// Extra starting points; empty means `search.starting_point` only.
    #[serde(default)]
    starts: Vec<Vec<f64>>,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <run.json>", args[0]);
        eprintln!();
        eprintln!("Minimize a benchmark function with harmony search.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  run.json  Path to run file (benchmark, search config, starts)");
        eprintln!();
        eprintln!("Example run file is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_run();
        return;
    }

    let run_path = PathBuf::from(&args[1]);

    let run_str = fs::read_to_string(&run_path).unwrap_or_else(|e| {
        eprintln!("Error reading run file: {}", e);
        std::process::exit(1);
    });

    let run: RunFile = serde_json::from_str(&run_str).unwrap_or_else(|e| {
        eprintln!("Error parsing run file: {}", e);
        std::process::exit(1);
    });

    let benchmark = run.benchmark;
    let config = run.search;

    println!("Harmony Search");
    println!("==============");
    println!("Benchmark: {:?}", benchmark);
    println!("Dimensions: {}", config.dimensions);
    println!("Memory size: {}", config.memory_size);
    println!("Max iterations: {}", config.termination.max_iterations);
    println!("Direction: {:?}", config.direction);
    println!();

    if run.starts.len() > 1 {
        run_many(benchmark, &config, &run.starts);
    } else {
        let mut config = config;
        if let Some(start) = run.starts.into_iter().next() {
            config.starting_point = start;
        }
        run_single(benchmark, &config);
    }
}

fn run_single(benchmark: Benchmark, config: &SearchConfig) {
    let search = HarmonySearch::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    println!("Start: {:?}", config.starting_point);
    println!("Running search...");

    let outcome = search.run_with_callback(
        |x: &[f64]| benchmark.evaluate(x),
        |event| match event {
            SearchEvent::MemoryFilled {
                best_value,
                worst_value,
            } => println!(
                "  Memory filled: best={:.6e}, worst={:.6e}",
                best_value, worst_value
            ),
            SearchEvent::NewBest {
                value, iteration, ..
            } => println!("  Iteration {}: best={:.6e}", iteration, value),
        },
    );

    match outcome {
        Ok(result) => {
            println!();
            print_result(benchmark, &result);
        }
        Err(failure) => {
            eprintln!("{}", failure);
            print_result(benchmark, &failure.partial);
            std::process::exit(1);
        }
    }
}

fn run_many(benchmark: Benchmark, config: &SearchConfig, starts: &[Vec<f64>]) {
    println!("Running {} starts...", starts.len());

    let outcomes = multi_start(config, starts, |_| {
        move |x: &[f64]| benchmark.evaluate(x)
    })
    .unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    for (start, outcome) in starts.iter().zip(&outcomes) {
        match outcome {
            Ok(result) => println!(
                "  {:?}: best={:.6e} at {:?} ({:?})",
                start, result.best_value, result.best_point, result.termination
            ),
            Err(failure) => println!("  {:?}: {}", start, failure),
        }
    }

    match best_of(&outcomes, config.direction) {
        Some(best) => {
            println!();
            print_result(benchmark, best);
        }
        None => {
            eprintln!("Every start failed");
            std::process::exit(1);
        }
    }
}

fn print_result(benchmark: Benchmark, result: &SearchResult) {
    println!("Result:");
    println!("  Best point: {:?}", result.best_point);
    println!("  Best value: {:.6e}", result.best_value);
    println!(
        "  Known minimum: {:.6e} (distance {:.3e})",
        benchmark.minimum(),
        benchmark.distance_to_solution(&result.best_point)
    );
    println!("  Termination: {:?}", result.termination);
    println!(
        "  Iterations: {} ({} evaluations, {} accepted)",
        result.iterations, result.evaluations, result.accepted
    );
    println!("  Time: {:.2}s", result.elapsed_seconds);
}

fn print_example_run() {
    let benchmark = Benchmark::Levi13;
    let mut search = match benchmark.config(vec![10.0, 10.0]) {
        Ok(search) => search,
        Err(e) => {
            eprintln!("Error building example: {}", e);
            std::process::exit(1);
        }
    };
    search.random_seed = Some(42);

    let run = RunFile {
        benchmark,
        search,
        starts: vec![vec![10.0, 10.0], vec![9.0, 9.0], vec![2.0, 7.8]],
    };

    println!("Example run file (run.json):");
    println!("{}", serde_json::to_string_pretty(&run).unwrap());
}
