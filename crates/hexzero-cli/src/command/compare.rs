use std::path::PathBuf;

use chrono::Utc;
use hexzero_evaluator::{EvaluatorConfig, PairedEvaluator};

use crate::{
    model::{ComparisonArtifact, PolicyKind},
    util::{Output, game_seed, opening_strategy},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CompareArg {
    /// Comma-separated policies to cross-compare
    #[arg(long, value_delimiter = ',', default_value = "uniform,lowest,highest")]
    policies: Vec<PolicyKind>,
    #[arg(long, default_value_t = 7)]
    board_size: usize,
    /// Games per seating pass of each pairing
    #[arg(long, default_value_t = 16)]
    games: usize,
    #[arg(long, default_value_t = 16)]
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
    /// Output file path for the JSON matrix
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let count = arg.policies.len();
    let mut matrix = vec![vec![0.0; count]; count];

    // Each unordered pairing is evaluated once; the transposed entry is the
    // negated statistic, and the diagonal stays zero.
    for row in 0..count {
        for column in row + 1..count {
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
                "Comparing {} vs {}...",
                arg.policies[row].name(),
                arg.policies[column].name()
            );
            let challenger = arg.policies[row].instantiate();
            let incumbent = arg.policies[column].instantiate();
            let report = evaluator.run(&challenger, &incumbent)?;

            matrix[row][column] = report.signed_chi_squared();
            matrix[column][row] = -report.signed_chi_squared();
        }
    }

    eprintln!("signed_chi_squared matrix:");
    for (kind, values) in arg.policies.iter().zip(&matrix) {
        let cells: Vec<String> = values.iter().map(|v| format!("{v:10.2}")).collect();
        eprintln!("  {:>8} {}", kind.name(), cells.join(" "));
    }

    let artifact = ComparisonArtifact {
        generated_at: Utc::now(),
        board_size: arg.board_size,
        policies: arg.policies.iter().map(|kind| kind.name().to_owned()).collect(),
        signed_chi_squared: matrix,
    };
    Output::save_json(&artifact, arg.output.clone())?;
    Ok(())
}
