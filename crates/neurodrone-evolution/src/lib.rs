//! Generational neuroevolution for drone controllers.
//!
//! A population of [`Agent`]s, each owning one
//! [`NeuralNetwork`](neurodrone_net::NeuralNetwork), is evaluated for a
//! fixed-duration trial, ranked by fitness, and bred into the next
//! generation with elitism plus light mutation. The [`EvolutionEngine`] owns
//! the whole lifecycle; the world the agents fly in stays behind the
//! [`Environment`] trait.
//!
//! # The generational cycle
//!
//! ```text
//! Environment ──sensors──▶ Agent ──▶ NeuralNetwork::feed_forward
//!      ▲                                     │
//!      └──────────────actions────────────────┘
//!
//! trial ends (collision / timeout)
//!      └─▶ FitnessRecord ─▶ EvolutionEngine::breed ─▶ next generation
//! ```
//!
//! # Driving
//!
//! The engine never schedules itself. A host loop calls
//! [`EvolutionEngine::tick`] once per simulation frame (or uses
//! [`environment::run_tick`] to wire a whole population to an
//! [`Environment`]); everything inside a tick completes synchronously.
//!
//! # Reproducibility
//!
//! All randomness (weight initialization, mutation trials, parent
//! selection) flows from one `Pcg32` seeded by an [`EvolutionSeed`], so a
//! recorded seed replays an identical run.

pub use self::{
    agent::{Agent, TrialEnd},
    engine::{EvolutionConfig, EvolutionEngine, FitnessRecord, GenerationSummary},
    environment::Environment,
    seed::EvolutionSeed,
};

pub mod agent;
pub mod engine;
pub mod environment;
pub mod seed;
