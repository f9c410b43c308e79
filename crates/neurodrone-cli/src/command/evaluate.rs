use std::path::PathBuf;

use anyhow::Context as _;
use neurodrone_evolution::{Agent, Environment as _, EvolutionSeed, TrialEnd};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{command::TICK_SECONDS, corridor::Corridor, schema::brain_model::BrainModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Saved brain model to fly
    #[arg(long)]
    model: PathBuf,
    /// Seconds of simulated time for the trial
    #[arg(long, default_value_t = 30.0)]
    trial_seconds: f32,
    /// 32-char hex seed shaping the corridor (random when omitted)
    #[arg(long)]
    seed: Option<EvolutionSeed>,
    /// Fly a straight corridor instead of a randomly bent one
    #[arg(long)]
    straight: bool,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let model: BrainModel = util::load_json(&arg.model)?;
    let brain = model
        .network
        .to_network()
        .with_context(|| format!("model {} holds an unusable network", model.name))?;

    let mut env = if arg.straight {
        Corridor::straight(1)
    } else {
        let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
        eprintln!("Corridor seed: {seed}");
        let mut track_rng = Pcg32::from_seed(seed.into_bytes().map(|b| b ^ 0x5A));
        Corridor::generate(1, &mut track_rng)
    };
    anyhow::ensure!(
        brain.input_len() == env.sensor_len(),
        "model expects {} sensors, corridor produces {}",
        brain.input_len(),
        env.sensor_len(),
    );

    let mut agent = Agent::new(brain);
    let mut elapsed = 0.0;
    while elapsed < arg.trial_seconds && agent.is_active() {
        let sensors = env.sense(0);
        let actions = agent.step(&sensors).to_vec();
        env.apply(0, &actions, TICK_SECONDS);
        agent.report_progress(env.progress(0));
        if env.collided(0) {
            agent.terminate(TrialEnd::Collision);
        }
        elapsed += TICK_SECONDS;
    }
    if agent.is_active() {
        agent.terminate(TrialEnd::Timeout);
    }

    eprintln!(
        "Trial over: {}",
        if agent.has_collided() {
            "collision"
        } else {
            "timeout"
        }
    );
    eprintln!("  Progress: {:.3}", agent.max_progress());
    eprintln!("  Fitness:  {:.3}", agent.fitness());
    if agent.shape_faults() > 0 {
        eprintln!("  Warning: {} sensor-width faults", agent.shape_faults());
    }

    Ok(())
}
