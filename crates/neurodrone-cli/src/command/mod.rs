use clap::{Parser, Subcommand};

use self::{evaluate::EvaluateArg, train::TrainArg};

mod evaluate;
mod train;

/// Simulation frame length: a 50 Hz physics step.
pub(crate) const TICK_SECONDS: f32 = 0.02;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train drone controllers with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Fly a saved brain through one corridor trial
    Evaluate(#[clap(flatten)] EvaluateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
