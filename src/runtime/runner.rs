//! Batch runner: raw games in, flattened game files out.

use std::path::Path;

use crate::config::Settings;
use crate::entity::Id;
use crate::error::PipelineError;
use crate::flatten::flatten;
use crate::runtime::extractor::GameExtractor;
use crate::serialization::save_flattened_game;

/// Flatten every game in `settings.games_raw_dir` into `settings.games_flatten_dir`.
///
/// Returns the ids of the games that produced rows, in processing order.
pub fn process_games(settings: &Settings) -> Result<Vec<Id>, PipelineError> {
    process_dir(&settings.games_raw_dir, &settings.games_flatten_dir)
}

/// Flatten every game in `raw_dir` into `flatten_dir`.
///
/// Games that flatten to no rows are left out of the result. A failed write
/// aborts the batch.
///
/// # Errors
/// [`PipelineError::NoInput`] when `raw_dir` holds no decodable game.
pub fn process_dir(raw_dir: &Path, flatten_dir: &Path) -> Result<Vec<Id>, PipelineError> {
    let mut games = GameExtractor::open(raw_dir)?;
    let mut parsed_games = Vec::new();

    for game in games.by_ref() {
        let rows = flatten(&game);
        let Some(first) = rows.first() else {
            continue;
        };

        let game_id = first.game_id.clone();
        save_flattened_game(flatten_dir, &game_id, &rows)?;
        parsed_games.push(game_id);
    }

    if games.documents_read() == 0 {
        return Err(PipelineError::NoInput {
            dir: raw_dir.to_path_buf(),
        });
    }

    tracing::debug!(
        "Read {} games from {}, {} flattened",
        games.documents_read(),
        games.dir().display(),
        parsed_games.len()
    );

    Ok(parsed_games)
}
