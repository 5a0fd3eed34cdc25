// Demonstration: train the agent against a toy analytic line model, then
// play greedily from a fixed operating point and evaluate the result.
//
// Build/run from this repo root:
//   RUST_LOG=info cargo run --example train_demo -- --episodes 5 --steps 20 --seed 7

use std::env;

use railtune::agent::{AgentConfig, DqnAgent, FixedPolicy};
use railtune::control::{
    ControlEnvironment, ControlParameters, EnvConfig, MetricKind, MetricSummary, NamedMetrics,
    Parameter, State,
};
use railtune::simulator::{FnSimulator, RetryPolicy, RetryingSimulator, SimulatorError};
use railtune::training::{EvaluationMetrics, Trainer, TrainingConfig};

const LINE_LENGTH_M: f64 = 20_000.0;
const STATIONS: f64 = 20.0;
const ARRIVALS_PER_S: f64 = 0.4;
const PLATFORM_AREA_M2: f64 = 270.0;

/// Rough closed-form stand-in for the passenger-flow simulator.
fn toy_line(params: &ControlParameters) -> Result<NamedMetrics, SimulatorError> {
    let cycle = 2.0 * LINE_LENGTH_M / params.v_max + STATIONS * params.max_dwell;
    let h_out = cycle / params.nbr_trains as f64;
    let q = (ARRIVALS_PER_S * h_out / 2.0).min(params.density_max_opt * PLATFORM_AREA_M2);
    let a = ARRIVALS_PER_S;
    let mu = (q / params.max_dwell).min(a * 2.0);
    let p = (ARRIVALS_PER_S * h_out * STATIONS / 4.0).min(1200.0);
    let i = q + mu * params.max_dwell / 2.0;

    let state = State::default()
        .with_metric(MetricKind::HOut, MetricSummary::new(h_out, 0.1 * h_out))
        .with_metric(MetricKind::I, MetricSummary::new(i, 0.2 * i))
        .with_metric(MetricKind::A, MetricSummary::new(a, 0.05))
        .with_metric(MetricKind::Mu, MetricSummary::new(mu, 0.1 * mu))
        .with_metric(MetricKind::Q, MetricSummary::new(q, 0.2 * q))
        .with_metric(MetricKind::P, MetricSummary::new(p, 0.15 * p))
        .with_metric(MetricKind::Dwell, MetricSummary::new(params.max_dwell * 0.8, 2.0));
    Ok(state.to_named())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let episodes: usize = arg_value(&args, "--episodes")
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);
    let steps: usize = arg_value(&args, "--steps")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let seed: u64 = arg_value(&args, "--seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    let model_path = arg_value(&args, "--save").map(std::path::PathBuf::from);

    let simulator = RetryingSimulator::new(FnSimulator::new(toy_line), RetryPolicy::default());
    let env = ControlEnvironment::new(EnvConfig::default(), simulator);
    let agent = DqnAgent::with_mlp(AgentConfig {
        hidden_layers: vec![64, 64],
        seed: Some(seed),
        ..AgentConfig::default()
    });
    let mut trainer = Trainer::new(
        env,
        agent,
        TrainingConfig {
            episodes,
            steps,
            seed: Some(seed),
        },
    );

    let traces = match trainer.train() {
        Ok(traces) => traces,
        Err(e) => {
            eprintln!("training failed: {}", e);
            std::process::exit(1);
        }
    };
    for (n, trace) in traces.iter().enumerate() {
        let trains = trace.parameter_series(Parameter::NbrTrains);
        println!(
            "episode {:>3}: total reward {:>8.3}, trains {} -> {}",
            n,
            trace.total_reward(),
            trains.first().copied().unwrap_or_default(),
            trains.last().copied().unwrap_or_default()
        );
    }

    if let Some(path) = &model_path {
        if let Err(e) = trainer.save_model(path) {
            eprintln!("could not save model: {}", e);
        }
    }

    let start = ControlParameters::new(40, 12.0, 25.0, 3.0);
    match trainer.play(start, steps) {
        Ok(trace) => println!("greedy play from {}: total reward {:.3}", start, trace.total_reward()),
        Err(e) => eprintln!("play failed: {}", e),
    }

    let (mut env, _agent) = trainer.into_parts();
    let mut baseline = FixedPolicy::hold();
    match EvaluationMetrics::evaluate(&mut env, &mut baseline, &start, 1, steps) {
        Ok(metrics) => {
            println!("Baseline policy: hold");
            println!("{}", metrics);
        }
        Err(e) => eprintln!("evaluation failed: {}", e),
    }
}

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
