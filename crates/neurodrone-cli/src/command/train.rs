use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use neurodrone_evolution::{EvolutionConfig, EvolutionEngine, EvolutionSeed, environment};
use neurodrone_net::NetworkModel;
use neurodrone_stats::history::{GenerationRecord, TrainingHistory};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    command::TICK_SECONDS,
    corridor::{self, Corridor},
    schema::brain_model::BrainModel,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Generations to run
    #[arg(long, default_value_t = 40)]
    generations: u32,
    /// Drones per generation
    #[arg(long, default_value_t = 30)]
    population: usize,
    /// Seconds of simulated time per trial
    #[arg(long, default_value_t = 30.0)]
    trial_seconds: f32,
    /// Fly a straight corridor instead of a randomly bent one
    #[arg(long)]
    straight: bool,
    /// 32-char hex seed for a reproducible run (random when omitted)
    #[arg(long)]
    seed: Option<EvolutionSeed>,
    /// Output file path for the best brain (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let config = EvolutionConfig {
        population_size: arg.population,
        trial_duration: arg.trial_seconds,
        ..EvolutionConfig::default()
    };
    anyhow::ensure!(
        config.layout[0] == corridor::SENSOR_COUNT,
        "controller layout expects {} sensors, corridor produces {}",
        config.layout[0],
        corridor::SENSOR_COUNT,
    );

    let mut engine = EvolutionEngine::new(config, seed)?;
    let mut env = if arg.straight {
        Corridor::straight(arg.population)
    } else {
        // Decorrelate the track stream from the engine's weight stream
        // while keeping the whole run a function of one seed.
        let mut track_rng = Pcg32::from_seed(seed.into_bytes().map(|b| b ^ 0x5A));
        Corridor::generate(arg.population, &mut track_rng)
    };

    eprintln!("Seed: {seed}");
    let mut history = TrainingHistory::new();
    while engine.generation() < arg.generations {
        let Some(summary) = environment::run_tick(&mut engine, &mut env, TICK_SECONDS) else {
            continue;
        };

        eprintln!(
            "Generation #{:<3} best {:8.3}  avg {:8.3}  ({} records, {} attempts)",
            summary.generation,
            summary.best_fitness,
            summary.average_fitness,
            summary.record_count,
            summary.total_attempts,
        );
        if let Some(stats) = &summary.fitness {
            eprintln!(
                "    median {:8.3}  worst {:8.3}  std dev {:7.3}",
                stats.median, stats.worst, stats.std_dev,
            );
        }

        history.push(GenerationRecord {
            generation: summary.generation,
            best: summary.best_fitness,
            average: summary.average_fitness,
            attempts: summary.total_attempts,
        });
    }

    let champion = engine
        .champion()
        .context("no agent ever reported fitness; nothing to export")?;
    if let Some(peak) = history.best_generation() {
        eprintln!("Peak: generation #{} with best {:.3}", peak.generation, peak.best);
    }

    let model = BrainModel {
        name: if arg.straight { "straight" } else { "corridor" }.to_owned(),
        trained_at: Utc::now(),
        seed,
        generations: engine.generation(),
        fitness: champion.fitness(),
        network: NetworkModel::from_network(champion.brain()),
    };
    util::save_json(&model, arg.output.as_ref())?;

    eprintln!();
    eprintln!("Model saved");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Fitness: {:.3}", model.fitness);
    eprintln!("  Topology: {:?}", model.network.layers);

    Ok(())
}
