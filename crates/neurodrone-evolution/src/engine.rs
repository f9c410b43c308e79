use neurodrone_net::{InvalidTopologyError, NeuralNetwork};
use neurodrone_stats::descriptive::FitnessStats;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    agent::{Agent, TrialEnd},
    seed::EvolutionSeed,
};

/// Parameters of an evolution run.
///
/// The defaults reproduce the reference drone setup: a `[10, 16, 3]`
/// controller (nine obstacle sensors plus one alignment sensor in, sixteen
/// hidden, three action outputs), thirty drones per generation, thirty
/// seconds of trial time, two elites, and a light 0.1 mutation chance when
/// breeding.
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    /// Canonical topology every network in the population conforms to.
    pub layout: Vec<usize>,
    /// Number of agents per generation.
    pub population_size: usize,
    /// Trial length in seconds of simulated time.
    pub trial_duration: f32,
    /// Top performers carried into the next generation unmodified.
    pub elite_count: usize,
    /// Per-weight mutation chance applied to non-elite offspring.
    ///
    /// Deliberately lower than
    /// [`DEFAULT_MUTATION_CHANCE`](neurodrone_net::DEFAULT_MUTATION_CHANCE):
    /// breeding refines parents that already scored well.
    pub breed_mutation_chance: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            layout: vec![10, 16, 3],
            population_size: 30,
            trial_duration: 30.0,
            elite_count: 2,
            breed_mutation_chance: 0.1,
        }
    }
}

/// Immutable snapshot of one finished trial: the brain and its final score.
///
/// The brain is a deep clone, exclusively owned by the record, so the
/// genetic material survives the agent's discard at breeding time.
#[derive(Debug, Clone)]
pub struct FitnessRecord {
    brain: NeuralNetwork,
    fitness: f32,
}

impl FitnessRecord {
    #[must_use]
    pub fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Aggregate result of one completed generation.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// Zero-based index of the generation that just completed.
    pub generation: u32,
    /// Fitness of the top record, or 0 if no agent reported fitness.
    pub best_fitness: f32,
    /// Mean fitness across records, or 0 if no agent reported fitness.
    pub average_fitness: f32,
    /// Richer distribution stats; `None` when the record list was empty.
    pub fitness: Option<FitnessStats>,
    /// Records collected during the generation.
    pub record_count: usize,
    /// Agents evaluated so far across the whole run.
    pub total_attempts: u64,
}

/// Owns the population and drives the generational lifecycle.
///
/// The engine holds the only mutable handle to its agents: the environment
/// reports into it by agent index ([`Self::step_agent`],
/// [`Self::report_progress`], [`Self::terminate_agent`]), and structural
/// changes to the population happen exclusively inside breeding, between
/// ticks. Single-threaded by design; nothing here blocks or suspends.
///
/// # Tie-breaking
///
/// Records are ranked with a stable sort, so agents with equal fitness keep
/// registration order: an earlier-terminated agent outranks a later one
/// with the same score.
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    config: EvolutionConfig,
    rng: Pcg32,
    agents: Vec<Agent>,
    records: Vec<FitnessRecord>,
    champion: Option<FitnessRecord>,
    generation: u32,
    total_attempts: u64,
    elapsed: f32,
    last_best: f32,
    last_average: f32,
}

impl EvolutionEngine {
    /// Seeds the initial population: `population_size` fresh random
    /// networks of `config.layout`, one active agent each.
    ///
    /// # Errors
    ///
    /// [`InvalidTopologyError`] if the configured layout is unusable. The
    /// layout is validated here once; breeding relies on it afterwards.
    pub fn new(config: EvolutionConfig, seed: EvolutionSeed) -> Result<Self, InvalidTopologyError> {
        let mut rng = Pcg32::from_seed(seed.into_bytes());
        let agents = (0..config.population_size)
            .map(|_| Ok(Agent::new(NeuralNetwork::new(&config.layout, &mut rng)?)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            config,
            rng,
            agents,
            records: Vec::new(),
            champion: None,
            generation: 0,
            total_attempts: 0,
            elapsed: 0.0,
            last_best: 0.0,
            last_average: 0.0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.config.population_size
    }

    /// Completed generations so far; 0 during the first trial.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Agents evaluated across the whole run.
    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    /// Best fitness of the last completed generation (0 before the first).
    #[must_use]
    pub fn best_fitness(&self) -> f32 {
        self.last_best
    }

    /// Average fitness of the last completed generation (0 before the first).
    #[must_use]
    pub fn average_fitness(&self) -> f32 {
        self.last_average
    }

    /// Seconds elapsed in the current trial window.
    #[must_use]
    pub fn elapsed_in_trial(&self) -> f32 {
        self.elapsed
    }

    /// The currently active population, index-stable within a generation.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Best record seen across all generations, if any trial has finished.
    #[must_use]
    pub fn champion(&self) -> Option<&FitnessRecord> {
        self.champion.as_ref()
    }

    /// Steps one agent: sensors in, action vector out.
    ///
    /// The returned slice borrows the agent's brain scratch storage; copy it
    /// to retain it. Skip inactive agents in the driver loop; a finished
    /// agent's score is already frozen.
    pub fn step_agent(&mut self, index: usize, sensors: &[f32]) -> &[f32] {
        self.agents[index].step(sensors)
    }

    /// Forwards the environment's progress metric to one agent.
    pub fn report_progress(&mut self, index: usize, progress: f32) {
        self.agents[index].report_progress(progress);
    }

    /// Ends one agent's trial, freezing its fitness and registering the
    /// resulting [`FitnessRecord`].
    ///
    /// The agent is deactivated in the same step so it stops consuming
    /// ticks. No-op for an already-finished agent, so an early collision
    /// followed by the end-of-trial sweep registers exactly one record.
    pub fn terminate_agent(&mut self, index: usize, reason: TrialEnd) {
        let agent = &mut self.agents[index];
        if !agent.is_active() {
            return;
        }
        agent.terminate(reason);
        let record = FitnessRecord {
            brain: agent.brain().clone(),
            fitness: agent.fitness(),
        };
        self.records.push(record);
    }

    /// Advances the trial clock; rolls the generation when time is up.
    ///
    /// Once `elapsed` reaches the trial duration: every still-active agent
    /// is finalized with [`TrialEnd::Timeout`] (a normal termination; many
    /// agents simply never crash), the next generation is bred, the clock
    /// resets, and the generation counter increments. Returns the completed
    /// generation's summary when that happens.
    pub fn tick(&mut self, delta: f32) -> Option<GenerationSummary> {
        self.elapsed += delta;
        if self.elapsed < self.config.trial_duration {
            return None;
        }

        for index in 0..self.agents.len() {
            self.terminate_agent(index, TrialEnd::Timeout);
        }
        let summary = self.breed_next_generation();
        self.elapsed = 0.0;
        self.generation += 1;
        Some(summary)
    }

    /// Breeds the next generation from the collected records.
    ///
    /// 1. Rank records by fitness, descending (stable on ties).
    /// 2. Elitism: clone the top `elite_count` brains unmodified.
    /// 3. Fill to `population_size` with mutated clones of parents picked
    ///    uniformly from the top half of the ranking.
    /// 4. Replace the population with fresh agents, index-aligned with the
    ///    brain list (slot 0 holds the first elite).
    ///
    /// Every brain passes a topology guard: a network whose input width
    /// drifted from the configured layout is discarded and replaced with a
    /// fresh random one rather than propagated into a live trial. With an
    /// empty record list the whole next generation is fresh random networks,
    /// so the population never shrinks.
    fn breed_next_generation(&mut self) -> GenerationSummary {
        self.records
            .sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap());

        let layout = &self.config.layout;
        let mut brains: Vec<NeuralNetwork> = Vec::with_capacity(self.config.population_size);

        for record in self.records.iter().take(self.config.elite_count) {
            brains.push(conform_to_layout(record.brain.clone(), layout, &mut self.rng));
        }

        let parent_pool = self.records.len().min(self.config.population_size / 2);
        while brains.len() < self.config.population_size {
            if parent_pool == 0 {
                brains.push(fresh_network(layout, &mut self.rng));
                continue;
            }
            let pick = self.rng.random_range(0..parent_pool);
            let mut child = conform_to_layout(self.records[pick].brain.clone(), layout, &mut self.rng);
            child.mutate(self.config.breed_mutation_chance, &mut self.rng);
            brains.push(child);
        }

        let stats = FitnessStats::from_values(self.records.iter().map(FitnessRecord::fitness));
        self.last_best = self.records.first().map_or(0.0, FitnessRecord::fitness);
        self.last_average = stats.map_or(0.0, |s| s.mean);
        self.total_attempts += self.config.population_size as u64;

        if let Some(top) = self.records.first() {
            let improved = self
                .champion
                .as_ref()
                .is_none_or(|champion| top.fitness > champion.fitness);
            if improved {
                self.champion = Some(top.clone());
            }
        }

        let summary = GenerationSummary {
            generation: self.generation,
            best_fitness: self.last_best,
            average_fitness: self.last_average,
            fitness: stats,
            record_count: self.records.len(),
            total_attempts: self.total_attempts,
        };

        self.agents = brains.into_iter().map(Agent::new).collect();
        self.records.clear();
        summary
    }
}

/// Topology guard: replaces a brain whose input width disagrees with the
/// expected layout by a fresh random network of that layout.
fn conform_to_layout<R>(brain: NeuralNetwork, layout: &[usize], rng: &mut R) -> NeuralNetwork
where
    R: Rng + ?Sized,
{
    if brain.input_len() == layout[0] {
        brain
    } else {
        fresh_network(layout, rng)
    }
}

fn fresh_network<R>(layout: &[usize], rng: &mut R) -> NeuralNetwork
where
    R: Rng + ?Sized,
{
    NeuralNetwork::new(layout, rng).expect("layout was validated at engine construction")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(n: u8) -> EvolutionSeed {
        EvolutionSeed::from_bytes([n; 16])
    }

    fn config(population_size: usize) -> EvolutionConfig {
        EvolutionConfig {
            layout: vec![3, 4, 2],
            population_size,
            trial_duration: 10.0,
            ..EvolutionConfig::default()
        }
    }

    fn engine(population_size: usize) -> EvolutionEngine {
        EvolutionEngine::new(config(population_size), seed(1)).unwrap()
    }

    /// Every weight within the mutation perturbation bound of the parent's.
    fn is_offspring_of(child: &NeuralNetwork, parent_weights: &[f32]) -> bool {
        child.flat_weights().count() == parent_weights.len()
            && child
                .flat_weights()
                .zip(parent_weights)
                .all(|(c, p)| (c - p).abs() <= 0.5)
    }

    #[test]
    fn test_initial_population() {
        let engine = engine(6);
        assert_eq!(engine.agents().len(), 6);
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.total_attempts(), 0);
        assert!(engine.agents().iter().all(Agent::is_active));
        assert!(
            engine
                .agents()
                .iter()
                .all(|a| a.brain().layers() == [3, 4, 2])
        );
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let bad = EvolutionConfig {
            layout: vec![3],
            ..EvolutionConfig::default()
        };
        assert!(EvolutionEngine::new(bad, seed(1)).is_err());
    }

    #[test]
    fn test_tick_below_duration_does_nothing() {
        let mut engine = engine(4);
        assert!(engine.tick(9.9).is_none());
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn test_timeout_rolls_generation() {
        let mut engine = engine(4);
        for index in 0..4 {
            engine.report_progress(index, 1.0 + index as f32);
        }
        let summary = engine.tick(10.0).expect("trial time is up");

        assert_eq!(summary.generation, 0);
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.best_fitness, 4.0);
        assert_eq!(summary.average_fitness, 2.5);
        assert_eq!(summary.total_attempts, 4);

        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.best_fitness(), 4.0);
        assert_eq!(engine.agents().len(), 4);
        assert!(engine.agents().iter().all(Agent::is_active));
        // Fresh agents start from zero.
        assert!(engine.agents().iter().all(|a| a.fitness() == 0.0));
    }

    #[test]
    fn test_early_collision_registers_once() {
        let mut engine = engine(4);
        engine.report_progress(0, 8.0);
        engine.terminate_agent(0, TrialEnd::Collision);
        assert!(!engine.agents()[0].is_active());

        // End-of-trial sweep must not double-register agent 0.
        let summary = engine.tick(10.0).unwrap();
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.best_fitness, 8.0 - 6.0);
    }

    #[test]
    fn test_breeding_with_fewer_records_than_population() {
        // 3 records, population 4, elites 2: slots 0 and 1 are unmutated
        // clones of the top two records (descending), the remaining two are
        // mutated clones drawn from the top min(3, 4/2) = 2 records.
        let mut engine = engine(4);
        engine.report_progress(0, 3.0); // B
        engine.report_progress(1, 5.0); // A
        engine.report_progress(2, 1.0); // C
        for index in 0..3 {
            engine.terminate_agent(index, TrialEnd::Timeout);
        }
        let brain_a: Vec<f32> = engine.agents()[1].brain().flat_weights().collect();
        let brain_b: Vec<f32> = engine.agents()[0].brain().flat_weights().collect();

        let summary = engine.breed_next_generation();
        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.best_fitness, 5.0);
        assert_eq!(summary.average_fitness, 3.0);
        assert_eq!(engine.agents().len(), 4);

        assert!(engine.agents()[0].brain().flat_weights().eq(brain_a.iter().copied()));
        assert!(engine.agents()[1].brain().flat_weights().eq(brain_b.iter().copied()));
        for slot in 2..4 {
            let child = engine.agents()[slot].brain();
            assert_eq!(child.layers(), [3, 4, 2]);
            assert!(is_offspring_of(child, &brain_a) || is_offspring_of(child, &brain_b));
        }
    }

    #[test]
    fn test_empty_records_breed_fresh_population() {
        // Nothing ever reported fitness: elitism contributes nothing and
        // parent sampling has no candidates, yet the population must come
        // back at full strength.
        let mut engine = engine(5);
        let summary = engine.breed_next_generation();

        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.best_fitness, 0.0);
        assert_eq!(summary.average_fitness, 0.0);
        assert!(summary.fitness.is_none());
        assert_eq!(engine.agents().len(), 5);
        assert!(
            engine
                .agents()
                .iter()
                .all(|a| a.brain().layers() == [3, 4, 2])
        );
    }

    #[test]
    fn test_population_size_invariant_across_generations() {
        let mut engine = engine(6);
        for generation in 0..5_u32 {
            for index in 0..6 {
                engine.report_progress(index, index as f32);
            }
            let summary = engine.tick(10.0).unwrap();
            assert_eq!(summary.generation, generation);
            assert_eq!(engine.agents().len(), 6);
            assert!(
                engine
                    .agents()
                    .iter()
                    .all(|a| a.brain().layers() == [3, 4, 2])
            );
        }
        assert_eq!(engine.generation(), 5);
        assert_eq!(engine.total_attempts(), 30);
    }

    #[test]
    fn test_stable_tie_break_keeps_registration_order() {
        let mut engine = engine(4);
        // Agents 2 and 1 register equal fitness, in that order.
        engine.report_progress(2, 4.0);
        engine.report_progress(1, 4.0);
        engine.terminate_agent(2, TrialEnd::Timeout);
        engine.terminate_agent(1, TrialEnd::Timeout);
        let brain_first: Vec<f32> = engine.agents()[2].brain().flat_weights().collect();

        engine.tick(10.0).unwrap();
        // The earlier registration (agent 2) wins slot 0.
        assert!(
            engine.agents()[0]
                .brain()
                .flat_weights()
                .eq(brain_first.iter().copied())
        );
    }

    #[test]
    fn test_champion_tracks_best_across_generations() {
        let mut engine = engine(4);
        engine.report_progress(0, 9.0);
        engine.tick(10.0).unwrap();
        assert_eq!(engine.champion().unwrap().fitness(), 9.0);

        // A weaker generation must not displace the champion.
        engine.report_progress(0, 2.0);
        engine.tick(10.0).unwrap();
        assert_eq!(engine.champion().unwrap().fitness(), 9.0);

        engine.report_progress(0, 12.0);
        engine.tick(10.0).unwrap();
        assert_eq!(engine.champion().unwrap().fitness(), 12.0);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut a = engine(5);
        let mut b = engine(5);
        for _ in 0..3 {
            for index in 0..5 {
                a.report_progress(index, index as f32);
                b.report_progress(index, index as f32);
            }
            a.tick(10.0).unwrap();
            b.tick(10.0).unwrap();
        }
        for (agent_a, agent_b) in a.agents().iter().zip(b.agents()) {
            assert!(
                agent_a
                    .brain()
                    .flat_weights()
                    .eq(agent_b.brain().flat_weights())
            );
        }
    }

    #[test]
    fn test_elapsed_resets_between_generations() {
        let mut engine = engine(4);
        assert!(engine.tick(6.0).is_none());
        assert!(engine.tick(6.0).is_some());
        // Fresh window: another 6 seconds is not enough again.
        assert!(engine.tick(6.0).is_none());
        assert!(engine.tick(6.0).is_some());
    }
}
