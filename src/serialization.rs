//! Persistence of flattened games.
//!
//! Each game is written as one pretty-printed JSON array named after the game
//! id, e.g. `games_flatten/game_1.json`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::entity::Id;
use crate::error::PipelineError;

/// Location of the flattened file for `game_id` inside `dir`
pub fn flattened_game_path(dir: &Path, game_id: &Id) -> PathBuf {
    dir.join(format!("{}.json", game_id))
}

/// Write the rows of one game, creating `dir` if it does not exist yet.
///
/// An existing file for the same game is replaced.
pub fn save_flattened_game<T: Serialize>(
    dir: &Path,
    game_id: &Id,
    rows: &[T],
) -> Result<PathBuf, PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

    let path = flattened_game_path(dir, game_id);
    let file = File::create(&path).map_err(|e| PipelineError::io(&path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, rows).map_err(|e| PipelineError::json(&path, e))?;
    writer.flush().map_err(|e| PipelineError::io(&path, e))?;

    tracing::info!("Game {} saved ({} records)", game_id, rows.len());
    Ok(path)
}

/// Read back a file written by [`save_flattened_game`]
pub fn load_flattened_game<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| PipelineError::json(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{GameRow, PlayerStats};
    use serde_json::{json, Value as JsonValue};

    fn row(round: i64) -> GameRow {
        GameRow {
            game_id: Id::Int(7001),
            begin_at: "2024-01-01T00:00:00+00:00".to_string(),
            map_id: Id::Int(100),
            league_id: Some(Id::Int(10)),
            serie_id: Some(Id::Int(20)),
            serie_tier: None,
            tournament_id: Some(Id::from("t-30")),
            team_id: Id::from("Natus Vincère"),
            team_opponent_id: Id::from("t2"),
            player_id: Id::from("p0"),
            player_opponent_id: Id::from("p5"),
            stats: PlayerStats::default(),
            round,
            is_ct: 1,
            outcome: Some(4),
            win: 0,
        }
    }

    #[test]
    fn test_save_flattened_game_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("games_flatten");

        let path = save_flattened_game(&dir, &Id::from("g1"), &[json!({"a": 1})]).unwrap();

        assert_eq!(path, dir.join("g1.json"));
        let output: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(output, json!([{"a": 1}]));
    }

    #[test]
    fn test_save_flattened_game_is_indented_utf8() {
        let tmp = tempfile::tempdir().unwrap();

        let path = save_flattened_game(tmp.path(), &Id::Int(7001), &[row(1)]).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(path.ends_with("7001.json"));
        assert!(text.starts_with("[\n  {\n    \"game_id\": 7001"));
        assert!(text.contains("Natus Vincère"));
    }

    #[test]
    fn test_flattened_game_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let rows = vec![row(1), row(2), row(3)];

        let path = save_flattened_game(tmp.path(), &Id::Int(7001), &rows).unwrap();
        let loaded: Vec<GameRow> = load_flattened_game(&path).unwrap();

        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_save_overwrites_previous_run() {
        let tmp = tempfile::tempdir().unwrap();

        save_flattened_game(tmp.path(), &Id::Int(7001), &[row(1), row(2)]).unwrap();
        let path = save_flattened_game(tmp.path(), &Id::Int(7001), &[row(9)]).unwrap();
        let loaded: Vec<GameRow> = load_flattened_game(&path).unwrap();

        assert_eq!(loaded, vec![row(9)]);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();

        let err = load_flattened_game::<GameRow>(&tmp.path().join("nope.json")).unwrap_err();

        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
