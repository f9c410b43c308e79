use crate::{
    agent::TrialEnd,
    engine::{EvolutionEngine, GenerationSummary},
};

/// The world the agents fly in, seen from the engine's side.
///
/// The core treats everything physical (geometry, motion, raycasts) as
/// opaque. An environment only has to answer four questions per agent:
/// what does it sense, what happened when it acted, how far did it get,
/// and did it crash. It must also restart itself when a new generation
/// begins.
///
/// Sensor vectors must have the width the population's layout expects
/// (`layout[0]`); a drifted width is tolerated (agents answer with neutral
/// actions and count the fault) but invalidates the trial's scores.
pub trait Environment {
    /// Width of the sensor vectors this environment produces.
    fn sensor_len(&self) -> usize;

    /// Sensor vector for agent `index` at the current instant.
    fn sense(&self, index: usize) -> Vec<f32>;

    /// Applies agent `index`'s action vector over `delta` seconds.
    fn apply(&mut self, index: usize, actions: &[f32], delta: f32);

    /// Progress metric for agent `index` (higher is better, environment
    /// units; the agent only keeps the maximum).
    fn progress(&self, index: usize) -> f32;

    /// Whether agent `index` hit an obstacle this tick.
    fn collided(&self, index: usize) -> bool;

    /// Restarts the environment for a fresh generation of `population_size`
    /// agents.
    fn reset(&mut self, population_size: usize);
}

/// Wires one simulation frame: every active agent senses, acts, and reports,
/// then the trial clock advances.
///
/// This is the canonical per-tick data flow. Collisions terminate the agent
/// immediately (its fitness freezes with the penalties applied); everyone
/// else keeps flying until the clock ends the generation. When a generation
/// rolls, the environment is reset for the new population and the completed
/// generation's summary is returned.
pub fn run_tick<E>(
    engine: &mut EvolutionEngine,
    env: &mut E,
    delta: f32,
) -> Option<GenerationSummary>
where
    E: Environment + ?Sized,
{
    for index in 0..engine.population_size() {
        if !engine.agents()[index].is_active() {
            continue;
        }
        let sensors = env.sense(index);
        let actions = engine.step_agent(index, &sensors).to_vec();
        env.apply(index, &actions, delta);
        engine.report_progress(index, env.progress(index));
        if env.collided(index) {
            engine.terminate_agent(index, TrialEnd::Collision);
        }
    }

    let summary = engine.tick(delta);
    if summary.is_some() {
        env.reset(engine.population_size());
    }
    summary
}
