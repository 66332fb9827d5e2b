use std::path::PathBuf;

use chrono::Utc;
use hexzero_evaluator::{EvaluatorConfig, PairedEvaluator};

use crate::{
    model::{EvaluationArtifact, PolicyKind},
    util::{Output, game_seed, opening_strategy},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Challenger policy
    #[arg(long, default_value = "lowest")]
    challenger: PolicyKind,
    /// Incumbent policy
    #[arg(long, default_value = "highest")]
    incumbent: PolicyKind,
    #[arg(long, default_value_t = 11)]
    board_size: usize,
    /// Games per seating pass
    #[arg(long, default_value_t = 32)]
    games: usize,
    #[arg(long, default_value_t = 32)]
    batch_size: usize,
    #[arg(long, default_value_t = 0.1)]
    temperature: f32,
    #[arg(long, default_value_t = 1.0)]
    temperature_decay: f32,
    /// Fixed-opening depth in plies; 0 plays from empty boards
    #[arg(long, default_value_t = 0)]
    opening_plies: usize,
    /// Fixed seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let mut config = EvaluatorConfig::new(arg.board_size, arg.games);
    config.batch_size = arg.batch_size;
    config.temperature = arg.temperature;
    config.temperature_decay = arg.temperature_decay;
    config.openings = opening_strategy(arg.opening_plies);

    let evaluator = match arg.seed {
        Some(seed) => PairedEvaluator::with_seed(config, game_seed(seed)),
        None => PairedEvaluator::new(config),
    };

    eprintln!(
        "Evaluating {} (challenger) vs {} (incumbent) on {size}x{size}...",
        arg.challenger.name(),
        arg.incumbent.name(),
        size = arg.board_size,
    );
    let challenger = arg.challenger.instantiate();
    let incumbent = arg.incumbent.instantiate();
    let report = evaluator.run(&challenger, &incumbent)?;

    let [[a, b], [c, d]] = report.table.counts();
    eprintln!("Wins (challenger : incumbent) over {} games per pass", report.games_per_pass);
    eprintln!("  challenger opening: {a} : {b}");
    eprintln!("  incumbent opening:  {d} : {c}");
    eprintln!("win_rate = {:.3}", report.challenger_win_rate());
    eprintln!("signed_chi_squared = {:.3}", report.signed_chi_squared());

    let artifact = EvaluationArtifact {
        generated_at: Utc::now(),
        board_size: arg.board_size,
        challenger: arg.challenger.name().to_owned(),
        incumbent: arg.incumbent.name().to_owned(),
        games_per_pass: report.games_per_pass,
        counts: report.table.counts(),
        challenger_win_rate: report.challenger_win_rate(),
        signed_chi_squared: report.signed_chi_squared(),
    };
    Output::save_json(&artifact, arg.output.clone())?;
    Ok(())
}
