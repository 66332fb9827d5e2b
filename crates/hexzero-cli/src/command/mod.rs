use clap::{Parser, Subcommand};

use self::{compare::CompareArg, evaluate::EvaluateArg, generate_data::GenerateDataArg};

mod compare;
mod evaluate;
mod generate_data;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Paired evaluation of two policies with color-swapped seating
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Pairwise signed-chi-squared matrix across several policies
    Compare(#[clap(flatten)] CompareArg),
    /// Generate a self-play dataset for an external trainer
    GenerateData(#[clap(flatten)] GenerateDataArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Evaluate(arg) => evaluate::run(&arg),
        Mode::Compare(arg) => compare::run(&arg),
        Mode::GenerateData(arg) => generate_data::run(&arg),
    }
}
