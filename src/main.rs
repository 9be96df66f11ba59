use std::process::ExitCode;

use average::Estimate;
use cpu_sched_sim::{
    Comparison, Job, Simulation, compare,
    config::{SimConfig, Workload},
};
use log::error;
use rand::prelude::*;

mod logger;

const USAGE: &str = "usage: cpu-sched-sim [workload.json] [--json]";

fn main() -> ExitCode {
    let mut workload_path = None;
    let mut as_json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => as_json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            _ => workload_path = Some(arg),
        }
    }

    let config = SimConfig::default().with_env_overrides();
    if logger::init(config.level_filter()).is_err() {
        eprintln!("logger already initialized");
    }

    let workload = match workload_path {
        Some(path) => match Workload::load(&path) {
            Ok(workload) => workload,
            Err(err) => {
                error!("{path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Workload::new(bernoulli_jobs(24, 0.3, 0.3, 2, 6, 0)),
    };

    let comparison = compare(config.runs(&workload));
    for (policy, err) in &comparison.failures {
        error!("{policy}: {err}");
    }
    if comparison.is_empty() {
        return ExitCode::FAILURE;
    }

    if as_json {
        match serde_json::to_string_pretty(&comparison) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("failed to serialize results: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_comparison(&comparison);
    }

    ExitCode::SUCCESS
}

fn print_comparison(comparison: &Comparison) {
    for (policy, sim) in &comparison.results {
        println!("== {} ({policy})", policy.label());
        print_simulation(sim);
        println!();
    }

    if let Some((policy, waiting)) = comparison.best_waiting() {
        println!("Lowest average waiting time: {policy} ({waiting:.2} ticks)");
    }
    if let Some((policy, turnaround)) = comparison.best_turnaround() {
        println!("Lowest average turnaround time: {policy} ({turnaround:.2} ticks)");
    }
    let utilization = avg(comparison.results.values().map(|sim| sim.cpu_utilization));
    println!("Mean CPU utilization across policies: {:.1}%", utilization * 100.0);
}

fn print_simulation(sim: &Simulation) {
    println!("id\tburst\tarr\tprio\tdone\twait\tturn\tresp");
    for m in &sim.results {
        let priority = m.priority.map_or_else(|| "-".to_string(), |p| p.to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            m.process_id,
            m.burst_time,
            m.arrival_time,
            priority,
            m.completion_time,
            m.waiting_time,
            m.turnaround_time,
            m.response_time
        );
    }

    let gantt: Vec<String> = sim
        .gantt
        .iter()
        .map(|s| format!("{}[{}-{}]", s.process_id, s.start_time, s.end_time))
        .collect();
    println!("Gantt: {}", gantt.join(" "));

    // Time to first run
    println!("Average response time: {:.2} ticks", sim.avg_response_time);
    println!("Average waiting time: {:.2} ticks", sim.avg_waiting_time);
    println!("Average turnaround time: {:.2} ticks", sim.avg_turnaround_time);
    let slowdown = avg(sim
        .results
        .iter()
        .map(|m| m.turnaround_time as f64 / m.burst_time as f64));
    println!("Average slowdown: {slowdown:.2}x");
}

fn bernoulli_jobs(
    ticks: u64,
    p_arrival: f64,
    p_short: f64,
    short_ticks: u64,
    long_ticks: u64,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let run_time = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            let priority = rng.random_range(1..=5);

            jobs.push(
                Job::new(format!("P{}", jobs.len() + 1), run_time)
                    .arriving_at(t)
                    .with_priority(priority),
            );
        }
    }

    jobs
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}
