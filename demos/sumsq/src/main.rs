mod sumsq;

use std::{ops::ControlFlow, time::Duration};

use anyhow::Context;
use oev_core::{Cothread, Job, ParallelController, SequentialController};
use oev_exec::{Driver, DriverConfig};
use oev_observe::{LoggerConfig, logger_init};
use serde::Deserialize;
use tracing::info;

use crate::sumsq::{Sum, SumOfSquares};

const CONFIG_ENV: &str = "OEV_CONFIG";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DemoConfig {
    logger: LoggerConfig,
    driver: DriverConfig,
    sum: SumConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SumConfig {
    n: u64,
    /// Per-resume budget of each standalone task.
    budget_ms: u64,
    /// Number of tasks in the sequence and in the parallel set.
    copies: usize,
}

impl Default for SumConfig {
    fn default() -> Self {
        Self {
            n: 65_536 * 20,
            budget_ms: 20,
            copies: 3,
        }
    }
}

fn load_config() -> anyhow::Result<DemoConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return Ok(DemoConfig::default());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))
}

/// A logging call followed by `copies` tasks over shrinking ranges.
fn sequence(cfg: &SumConfig, budget: Duration) -> SequentialController<Sum> {
    let mut jobs: Vec<Job<Sum>> = vec![Job::call(|| {
        info!("sequence started");
        ControlFlow::Continue(0)
    })];
    jobs.extend((0..cfg.copies).map(|k| {
        let n = cfg.n / (k as u64 + 1);
        Job::task(SumOfSquares::new(n, budget))
    }));
    SequentialController::new(jobs).with_time_budget(budget)
}

fn task_sums(seq: &SequentialController<Sum>) -> Vec<Option<u64>> {
    seq.jobs()
        .iter()
        .filter_map(Job::as_task)
        .map(|t| t.output().copied().and_then(ControlFlow::continue_value))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config()?;
    logger_init(&cfg.logger)?;
    info!(n = cfg.sum.n, copies = cfg.sum.copies, "sumsq demo starting");

    let driver = Driver::new(cfg.driver.clone())?;
    let budget = Duration::from_millis(cfg.sum.budget_ms);

    // standalone
    let mut single = SumOfSquares::new(cfg.sum.n, budget);
    let report = driver.run(&mut single).await?;
    info!(ticks = report.ticks, sum = ?single.sum(), "standalone run done");

    // sequence: jobs run in order under one shared budget
    let mut seq = sequence(&cfg.sum, budget);
    let report = driver.run(&mut seq).await?;
    info!(
        ticks = report.ticks,
        tasks = seq.jobs().iter().filter(|j| j.is_task()).count(),
        sums = ?task_sums(&seq),
        "sequence done"
    );

    // parallel: the budget is shared fairly between jobs
    let tasks: Vec<SumOfSquares> = (0..cfg.sum.copies)
        .map(|_| SumOfSquares::new(cfg.sum.n, Duration::ZERO))
        .collect();
    let shared = budget * cfg.sum.copies.max(1) as u32;
    let mut set = ParallelController::new(tasks).with_time_budget(shared);
    let report = driver.run(&mut set).await?;
    let sums: Vec<Option<u64>> = set.jobs().iter().map(SumOfSquares::sum).collect();
    info!(ticks = report.ticks, ?sums, "parallel set done");

    Ok(())
}
