use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use hexzero_engine::Board;
use hexzero_selfplay::{
    BatchedGameDriver, DriverConfig, GameBatch, GameSlot, NoiseSpec, PolicySeat, TemperatureState,
};
use rand::Rng as _;

use crate::{
    model::{DatasetArtifact, PolicyKind},
    util::{Output, game_seed},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateDataArg {
    /// Policy seated on both sides of every game
    #[arg(long, default_value = "uniform")]
    policy: PolicyKind,
    #[arg(long, default_value_t = 11)]
    board_size: usize,
    #[arg(long, default_value_t = 64)]
    games: usize,
    #[arg(long, default_value_t = 32)]
    batch_size: usize,
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,
    #[arg(long, default_value_t = 1.0)]
    temperature_decay: f32,
    /// Dirichlet concentration for exploration noise; 0 disables it
    #[arg(long, default_value_t = 0.0)]
    noise_alpha: f32,
    /// Fraction of noise mixed into the policy distribution
    #[arg(long, default_value_t = 0.25)]
    noise_weight: f32,
    /// Fixed seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the JSON dataset
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateDataArg) -> anyhow::Result<()> {
    let policy = arg.policy.instantiate();
    let mut driver_config =
        DriverConfig::new(arg.board_size * arg.board_size).with_traces();
    if arg.noise_alpha > 0.0 {
        driver_config = driver_config.with_noise(NoiseSpec {
            alpha: arg.noise_alpha,
            weight: arg.noise_weight,
        });
    }

    let seed = arg.seed.map_or_else(|| rand::rng().random(), game_seed);
    let mut driver = BatchedGameDriver::with_seed(driver_config, seed);

    let mut games = Vec::with_capacity(arg.games);
    let mut remaining = arg.games;
    while remaining > 0 {
        let chunk = arg.batch_size.clamp(1, remaining);
        let slots = (0..chunk)
            .map(|_| {
                GameSlot::new(
                    Board::new(arg.board_size),
                    PolicySeat::self_play(Arc::clone(&policy)),
                    TemperatureState::new(arg.temperature, arg.temperature_decay),
                )
            })
            .collect();
        let mut batch = GameBatch::new(slots);
        driver.play_to_completion(&mut batch)?;
        games.extend(batch.into_slots().into_iter().filter_map(GameSlot::into_trace));
        remaining -= chunk;
        eprintln!("Generated {}/{} games", arg.games - remaining, arg.games);
    }

    let artifact = DatasetArtifact {
        generated_at: Utc::now(),
        board_size: arg.board_size,
        policy: arg.policy.name().to_owned(),
        games,
    };
    Output::save_json(&artifact, arg.output.clone())?;
    Ok(())
}
