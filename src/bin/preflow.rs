use anyhow::{bail, Context};
use parallel_preflow::{input, ParallelPushRelabel, DEFAULT_WORKER_COUNT};
use std::io;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn worker_count() -> anyhow::Result<usize> {
    let arg = std::env::args().nth(1).or_else(|| std::env::var("PREFLOW_WORKERS").ok());
    match arg {
        Some(text) => {
            let workers = text.parse().with_context(|| format!("invalid worker count {text:?}"))?;
            if workers == 0 {
                bail!("worker count must be positive");
            }
            Ok(workers)
        }
        None => Ok(DEFAULT_WORKER_COUNT),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))).with_writer(io::stderr).init();

    let workers = worker_count()?;
    let mut problem = input::read::<i64, _>(io::stdin().lock()).context("failed to parse the flow network")?;

    let begin = Instant::now();
    let flow = ParallelPushRelabel::new(workers).solve(problem.source, problem.sink, &mut problem.graph)?;
    let elapsed = begin.elapsed();

    println!("f = {flow}");
    eprintln!("elapsed = {:.6}s", elapsed.as_secs_f64());
    Ok(())
}
