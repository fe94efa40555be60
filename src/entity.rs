//! Row and identifier types produced by the flattening engine.
//!
//! A [`GameRow`] is one (team, player, opponent player, round) observation.
//! Identifiers are kept exactly as the telemetry provider sent them, which
//! means either integers or strings.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// Identifier of a game, map, team, player, league, serie or tournament.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Int(i64),
    Text(String),
}

impl Id {
    /// Read an identifier from a JSON value.
    ///
    /// Empty strings and zero are treated the same as a missing id. Whole
    /// floats such as `100.0` are read as integers; fractional numbers,
    /// integers outside `i64` and booleans are not identifiers.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .filter(|i| *i != 0)
                .map(Id::Int),
            JsonValue::String(s) if !s.is_empty() => Some(Id::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(i) => write!(f, "{}", i),
            Id::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_string())
    }
}

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Id::Int(value)
    }
}

/// Rank of a serie tier code, `s` being the best and `d` the lowest.
///
/// Codes are matched case-sensitively.
pub fn serie_tier_rank(tier: &str) -> Option<u8> {
    match tier {
        "s" => Some(1),
        "a" => Some(2),
        "b" => Some(3),
        "c" => Some(4),
        "d" => Some(5),
        _ => None,
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Exploded,
    Defused,
    Eliminated,
    Timeout,
}

impl RoundOutcome {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "exploded" => Some(RoundOutcome::Exploded),
            "defused" => Some(RoundOutcome::Defused),
            "eliminated" => Some(RoundOutcome::Eliminated),
            "timeout" => Some(RoundOutcome::Timeout),
            _ => None,
        }
    }

    /// Integer code written to the `outcome` column.
    pub fn code(self) -> u8 {
        match self {
            RoundOutcome::Exploded => 1,
            RoundOutcome::Defused => 2,
            RoundOutcome::Eliminated => 3,
            RoundOutcome::Timeout => 4,
        }
    }
}

/// Per-game performance statistics of one player.
///
/// Values are copied as provided; a missing or non-numeric statistic is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub adr: Number,
    pub kast: Number,
    pub rating: Number,
    pub kills: Number,
    pub deaths: Number,
    pub assists: Number,
    pub headshots: Number,
    pub flash_assists: Number,
    pub first_kills_diff: Number,
    pub k_d_diff: Number,
}

impl PlayerStats {
    /// Read the statistics carried by a player participation entry.
    pub fn from_participation(participation: &JsonValue) -> Self {
        let stat = |key: &str| match participation.get(key) {
            Some(JsonValue::Number(n)) => n.clone(),
            _ => Number::from(0_i64),
        };

        Self {
            adr: stat("adr"),
            kast: stat("kast"),
            rating: stat("rating"),
            kills: stat("kills"),
            deaths: stat("deaths"),
            assists: stat("assists"),
            headshots: stat("headshots"),
            flash_assists: stat("flash_assists"),
            first_kills_diff: stat("first_kills_diff"),
            k_d_diff: stat("k_d_diff"),
        }
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self::from_participation(&JsonValue::Null)
    }
}

/// One flattened observation, ready for downstream analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub game_id: Id,
    /// ISO-8601 start of the game
    pub begin_at: String,
    pub map_id: Id,
    pub league_id: Option<Id>,
    pub serie_id: Option<Id>,
    pub serie_tier: Option<u8>,
    pub tournament_id: Option<Id>,
    pub team_id: Id,
    pub team_opponent_id: Id,
    pub player_id: Id,
    pub player_opponent_id: Id,
    #[serde(flatten)]
    pub stats: PlayerStats,
    pub round: i64,
    /// 1 when `team_id` played the CT side this round
    pub is_ct: u8,
    pub outcome: Option<u8>,
    /// 1 when `team_id` won the round
    pub win: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_from_json() {
        assert_eq!(Id::from_json(&json!("game_1")), Some(Id::from("game_1")));
        assert_eq!(Id::from_json(&json!(100)), Some(Id::Int(100)));
        assert_eq!(Id::from_json(&json!("")), None);
        assert_eq!(Id::from_json(&json!(0)), None);
        assert_eq!(Id::from_json(&json!(null)), None);
        assert_eq!(Id::from_json(&json!({"id": 1})), None);
    }

    #[test]
    fn test_id_from_json_numeric_edges() {
        assert_eq!(Id::from_json(&json!(100.0)), Some(Id::Int(100)));
        assert_eq!(Id::from_json(&json!(0.0)), None);
        assert_eq!(Id::from_json(&json!(100.5)), None);
        assert_eq!(Id::from_json(&json!(u64::MAX)), None);
        assert_eq!(Id::from_json(&json!(true)), None);
    }

    #[test]
    fn test_serie_tier_rank() {
        assert_eq!(serie_tier_rank("s"), Some(1));
        assert_eq!(serie_tier_rank("a"), Some(2));
        assert_eq!(serie_tier_rank("d"), Some(5));
        assert_eq!(serie_tier_rank("z"), None);
        assert_eq!(serie_tier_rank("A"), None);
    }

    #[test]
    fn test_round_outcome_codes() {
        assert_eq!(RoundOutcome::from_code("defused").map(RoundOutcome::code), Some(2));
        assert_eq!(RoundOutcome::from_code("timeout").map(RoundOutcome::code), Some(4));
        assert_eq!(RoundOutcome::from_code("slip-n-slide"), None);
    }

    #[test]
    fn test_player_stats_default_to_zero() {
        let stats = PlayerStats::from_participation(&json!({
            "adr": 81.5,
            "kills": 20,
            "deaths": null,
            "rating": "n/a"
        }));

        assert_eq!(stats.adr, Number::from_f64(81.5).unwrap());
        assert_eq!(stats.kills, Number::from(20_i64));
        assert_eq!(stats.deaths, Number::from(0_i64));
        assert_eq!(stats.rating, Number::from(0_i64));
        assert_eq!(stats.k_d_diff, Number::from(0_i64));
    }

    #[test]
    fn test_game_row_serializes_flat() {
        let row = GameRow {
            game_id: Id::from("game_1"),
            begin_at: "2024-01-01T00:00:00+00:00".to_string(),
            map_id: Id::Int(100),
            league_id: Some(Id::Int(10)),
            serie_id: None,
            serie_tier: Some(2),
            tournament_id: None,
            team_id: Id::from("t1"),
            team_opponent_id: Id::from("t2"),
            player_id: Id::from("p0"),
            player_opponent_id: Id::from("p5"),
            stats: PlayerStats::default(),
            round: 3,
            is_ct: 1,
            outcome: None,
            win: 0,
        };

        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(value["game_id"], json!("game_1"));
        assert_eq!(value["map_id"], json!(100));
        assert_eq!(value["serie_id"], json!(null));
        assert_eq!(value["kills"], json!(0));
        assert_eq!(value["outcome"], json!(null));
        assert!(value.get("stats").is_none());
    }
}
