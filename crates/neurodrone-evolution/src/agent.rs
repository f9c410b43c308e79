use neurodrone_net::NeuralNetwork;

/// Flat fitness penalty for a trial that ended in a collision.
pub const COLLISION_PENALTY: f32 = 5.0;

/// Immediate decrement applied to the accumulator at the moment of impact.
///
/// Kept as a separate term from [`COLLISION_PENALTY`]: the two adjustments
/// are independent in the fitness semantics (one is part of the per-tick
/// recomputation, one is a one-shot hit at termination). A collided trial
/// therefore scores `max_progress - 6.0` in total.
pub const COLLISION_IMPACT_PENALTY: f32 = 1.0;

/// Why a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TrialEnd {
    /// The agent hit an obstacle; penalties apply.
    Collision,
    /// The trial clock ran out; a normal, penalty-free termination.
    Timeout,
}

/// One controller under evaluation during one trial.
///
/// Wraps an exclusively-owned brain together with the trial-scoped fitness
/// state: the maximum progress reached (never decreasing), a collision flag,
/// and the fitness score derived from them. Fitness is recomputed from
/// `max_progress` on every report rather than accumulated incrementally, so
/// repeated reports cannot drift.
///
/// Agents are created at generation start and discarded at breeding; the
/// brain survives by being cloned into a
/// [`FitnessRecord`](crate::FitnessRecord) when the trial ends.
#[derive(Debug, Clone)]
pub struct Agent {
    brain: NeuralNetwork,
    fitness: f32,
    max_progress: f32,
    collided: bool,
    finished: bool,
    shape_faults: u32,
}

impl Agent {
    /// Wraps a brain with zeroed trial state.
    #[must_use]
    pub fn new(brain: NeuralNetwork) -> Self {
        Self {
            brain,
            fitness: 0.0,
            max_progress: 0.0,
            collided: false,
            finished: false,
            shape_faults: 0,
        }
    }

    #[must_use]
    pub fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    /// Current fitness: `max_progress` minus any collision penalties.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Maximum progress metric reached so far this trial.
    #[must_use]
    pub fn max_progress(&self) -> f32 {
        self.max_progress
    }

    /// Whether the agent is still consuming ticks (trial not yet ended).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.finished
    }

    #[must_use]
    pub fn has_collided(&self) -> bool {
        self.collided
    }

    /// Sensor-width mismatches observed this trial.
    ///
    /// Non-zero means the environment fed a vector of the wrong length and
    /// the agent answered with neutral (zero) actions; the driver should log
    /// it, since a drifted sensor rig invalidates the trial's score.
    #[must_use]
    pub fn shape_faults(&self) -> u32 {
        self.shape_faults
    }

    /// Feeds the sensor vector through the brain and returns the actions.
    ///
    /// On a sensor-width mismatch the returned slice is all zeros (a neutral
    /// action vector of the correct width) and the fault counter increments;
    /// the trial continues. The slice borrows the brain's scratch storage;
    /// copy it to retain it past the next step.
    pub fn step(&mut self, sensors: &[f32]) -> &[f32] {
        if self.brain.feed_forward(sensors).is_err() {
            self.shape_faults += 1;
        }
        self.brain.output()
    }

    /// Reports the environment's progress metric for the current tick.
    ///
    /// Progress only ever raises `max_progress`; fitness is then recomputed
    /// as `max_progress` minus the flat collision penalty if one applies.
    pub fn report_progress(&mut self, progress: f32) {
        if progress > self.max_progress {
            self.max_progress = progress;
        }
        self.fitness = self.max_progress - if self.collided { COLLISION_PENALTY } else { 0.0 };
    }

    /// Ends the trial and freezes fitness.
    ///
    /// A `Collision` applies both penalty terms: the flat
    /// [`COLLISION_PENALTY`] through the fitness recomputation plus the
    /// one-shot [`COLLISION_IMPACT_PENALTY`]. A `Timeout` freezes whatever
    /// the last recomputation produced. Idempotent: a finished agent
    /// ignores further terminations.
    pub fn terminate(&mut self, reason: TrialEnd) {
        if self.finished {
            return;
        }
        if reason.is_collision() {
            self.collided = true;
            self.fitness = self.max_progress - COLLISION_PENALTY - COLLISION_IMPACT_PENALTY;
        }
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use neurodrone_net::NeuralNetwork;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn agent() -> Agent {
        let mut rng = Pcg32::seed_from_u64(99);
        Agent::new(NeuralNetwork::new(&[3, 4, 2], &mut rng).unwrap())
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut a = agent();
        a.report_progress(4.0);
        a.report_progress(2.5);
        assert_eq!(a.max_progress(), 4.0);
        assert_eq!(a.fitness(), 4.0);
    }

    #[test]
    fn test_collision_applies_both_penalty_terms() {
        let mut a = agent();
        a.report_progress(10.0);
        a.terminate(TrialEnd::Collision);

        // Flat -5 plus the one-shot -1 impact decrement.
        assert_eq!(a.fitness(), 10.0 - 6.0);
        assert!(!a.is_active());
        assert!(a.has_collided());
    }

    #[test]
    fn test_timeout_applies_no_penalty() {
        let mut a = agent();
        a.report_progress(7.0);
        a.terminate(TrialEnd::Timeout);
        assert_eq!(a.fitness(), 7.0);
        assert!(!a.is_active());
        assert!(!a.has_collided());
    }

    #[test]
    fn test_terminate_is_idempotent() {
        let mut a = agent();
        a.report_progress(3.0);
        a.terminate(TrialEnd::Collision);
        let frozen = a.fitness();
        a.terminate(TrialEnd::Collision);
        a.terminate(TrialEnd::Timeout);
        assert_eq!(a.fitness(), frozen);
    }

    #[test]
    fn test_step_returns_action_vector() {
        let mut a = agent();
        let actions = a.step(&[0.1, 0.2, 0.3]);
        assert_eq!(actions.len(), 2);
        assert_eq!(a.shape_faults(), 0);
    }

    #[test]
    fn test_step_with_wrong_sensor_width_is_neutral_and_flagged() {
        let mut a = agent();
        let actions = a.step(&[0.1, 0.2]).to_vec();
        assert_eq!(actions, vec![0.0, 0.0]);
        assert_eq!(a.shape_faults(), 1);
        // The trial keeps going; the fault is recoverable.
        assert!(a.is_active());
    }
}
