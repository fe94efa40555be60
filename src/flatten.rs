//! Game flattening engine.
//!
//! Turns one raw game document into rows of (team, player, opponent player,
//! round) observations. Both teams take the "team" perspective in turn, so a
//! well-formed game with `R` valid rounds yields `5 * 5 * R * 2` rows.
//!
//! The transform never fails. A document that cannot be used produces no
//! rows and the reason is logged.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Timelike};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::entity::{serie_tier_rank, GameRow, Id, PlayerStats, RoundOutcome};
use crate::extraction::{Extractor, FieldPath};

/// Number of player participations a game must carry.
pub const PLAYERS_PER_GAME: usize = 10;

/// Number of distinct players each team must field.
pub const PLAYERS_PER_TEAM: usize = 5;

/// Fewest rounds a game may have.
pub const MIN_ROUNDS: usize = 16;

/// Why a game document produced no rows.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("game without id")]
    MissingId,

    #[error("game {game_id}: invalid begin_at {value:?}")]
    InvalidBeginAt { game_id: Id, value: Option<String> },

    #[error("game {game_id}: no map id")]
    MissingMap { game_id: Id },

    #[error("game {game_id}: expected 10 players, found {count}")]
    PlayerCount { game_id: Id, count: usize },

    #[error("game {game_id}: expected at least 16 rounds, found {count}")]
    TooFewRounds { game_id: Id, count: usize },

    #[error("game {game_id}: rounds do not start at round 1")]
    FirstRound { game_id: Id },
}

impl Rejection {
    fn report(&self) {
        match self {
            Rejection::InvalidBeginAt { .. } => tracing::warn!("Skipping {}", self),
            _ => tracing::debug!("Skipping {}", self),
        }
    }
}

/// Flatten a raw game document into rows.
///
/// Returns an empty vector when the game is unusable.
pub fn flatten(game: &JsonValue) -> Vec<GameRow> {
    match ValidGame::from_document(game) {
        Ok(valid) => valid.rows(),
        Err(rejection) => {
            rejection.report();
            Vec::new()
        }
    }
}

/// Game-level columns shared by every row of a game.
#[derive(Debug, Clone)]
struct GameHeader {
    game_id: Id,
    begin_at: String,
    map_id: Id,
    league_id: Option<Id>,
    serie_id: Option<Id>,
    serie_tier: Option<u8>,
    tournament_id: Option<Id>,
}

#[derive(Debug, Clone)]
struct Round {
    number: Option<i64>,
    ct: Option<Id>,
    terrorists: Option<Id>,
    winner: Option<Id>,
    outcome: Option<RoundOutcome>,
}

impl Round {
    fn from_document(round: &JsonValue) -> Self {
        let field = FieldPath::from_dotted;
        Self {
            number: round.extract_int(&field("round")).filter(|n| *n != 0),
            ct: round.extract_id(&field("ct")),
            terrorists: round.extract_id(&field("terrorists")),
            winner: round.extract_id(&field("winner_team")),
            outcome: round
                .extract_str(&field("outcome"))
                .and_then(RoundOutcome::from_code),
        }
    }

    /// The round was played between exactly these two teams and one of them won it.
    fn played_between(&self, team: &Id, opponent: &Id) -> bool {
        let (Some(ct), Some(terrorists), Some(winner)) = (&self.ct, &self.terrorists, &self.winner)
        else {
            return false;
        };

        let sides_match = (ct == team && terrorists == opponent)
            || (ct == opponent && terrorists == team);

        sides_match && self.number.is_some() && (winner == team || winner == opponent)
    }
}

/// A game that passed document-level validation.
#[derive(Debug)]
struct ValidGame {
    header: GameHeader,
    /// team -> distinct players, in order of first appearance
    rosters: IndexMap<Id, IndexSet<Id>>,
    /// team -> declared opponent team
    opponents: HashMap<Id, Id>,
    stats: HashMap<Id, PlayerStats>,
    rounds: Vec<Round>,
}

impl ValidGame {
    fn from_document(game: &JsonValue) -> Result<Self, Rejection> {
        let field = FieldPath::from_dotted;

        let game_id = game.extract_id(&field("id")).ok_or(Rejection::MissingId)?;

        let raw_begin_at = game.extract_str(&field("begin_at"));
        let begin_at = raw_begin_at
            .and_then(parse_begin_at)
            .ok_or_else(|| Rejection::InvalidBeginAt {
                game_id: game_id.clone(),
                value: raw_begin_at.map(str::to_string),
            })?;

        let map_id = game
            .extract_id(&field("map.id"))
            .ok_or_else(|| Rejection::MissingMap {
                game_id: game_id.clone(),
            })?;

        let header = GameHeader {
            league_id: game.extract_id(&field("match.league.id")),
            serie_id: game.extract_id(&field("match.serie.id")),
            serie_tier: game
                .extract_str(&field("match.serie.tier"))
                .and_then(serie_tier_rank),
            tournament_id: game.extract_id(&field("match.tournament.id")),
            game_id,
            begin_at,
            map_id,
        };

        let players = array_at(game, "players");
        if players.len() != PLAYERS_PER_GAME {
            return Err(Rejection::PlayerCount {
                game_id: header.game_id,
                count: players.len(),
            });
        }

        let mut rosters: IndexMap<Id, IndexSet<Id>> = IndexMap::new();
        let mut opponents = HashMap::new();
        let mut stats = HashMap::new();
        for participation in players {
            let (Some(player_id), Some(team_id), Some(opponent_id)) = (
                participation.extract_id(&field("player.id")),
                participation.extract_id(&field("team.id")),
                participation.extract_id(&field("opponent.id")),
            ) else {
                tracing::debug!(
                    "Game {}: ignoring participation without player, team or opponent id",
                    header.game_id
                );
                continue;
            };

            stats.insert(player_id.clone(), PlayerStats::from_participation(participation));
            rosters.entry(team_id.clone()).or_default().insert(player_id);
            opponents.insert(team_id, opponent_id);
        }

        let rounds = array_at(game, "rounds");
        if rounds.len() < MIN_ROUNDS {
            return Err(Rejection::TooFewRounds {
                game_id: header.game_id,
                count: rounds.len(),
            });
        }
        // Strictly the number 1; "1" as a string does not open a game
        let first_round = rounds[0].extract(&field("round")).and_then(JsonValue::as_f64);
        if first_round != Some(1.0) {
            return Err(Rejection::FirstRound {
                game_id: header.game_id,
            });
        }

        Ok(Self {
            header,
            rosters,
            opponents,
            stats,
            rounds: rounds.iter().map(Round::from_document).collect(),
        })
    }

    /// The opponent of `team`, if both sides field a full roster.
    fn opponent_of(&self, team: &Id) -> Option<(&Id, &IndexSet<Id>)> {
        if self.rosters.get(team)?.len() != PLAYERS_PER_TEAM {
            tracing::debug!(
                "Game {}: team {} does not have {} distinct players",
                self.header.game_id,
                team,
                PLAYERS_PER_TEAM
            );
            return None;
        }

        let Some((opponent, roster)) = self
            .opponents
            .get(team)
            .and_then(|opponent| self.rosters.get_key_value(opponent))
        else {
            tracing::debug!(
                "Game {}: opponent of team {} is not among the players",
                self.header.game_id,
                team
            );
            return None;
        };

        if roster.len() != PLAYERS_PER_TEAM {
            return None;
        }
        Some((opponent, roster))
    }

    fn rows(&self) -> Vec<GameRow> {
        let mut rows = Vec::new();

        for (team, players) in &self.rosters {
            let Some((opponent, opponent_players)) = self.opponent_of(team) else {
                continue;
            };

            let rounds: Vec<&Round> = self
                .rounds
                .iter()
                .filter(|round| round.played_between(team, opponent))
                .collect();

            for player in players {
                let stats = self.stats.get(player).cloned().unwrap_or_default();
                for opponent_player in opponent_players {
                    for round in &rounds {
                        rows.push(self.row(team, opponent, player, opponent_player, &stats, round));
                    }
                }
            }
        }

        rows
    }

    fn row(
        &self,
        team: &Id,
        opponent: &Id,
        player: &Id,
        opponent_player: &Id,
        stats: &PlayerStats,
        round: &Round,
    ) -> GameRow {
        let header = &self.header;
        GameRow {
            game_id: header.game_id.clone(),
            begin_at: header.begin_at.clone(),
            map_id: header.map_id.clone(),
            league_id: header.league_id.clone(),
            serie_id: header.serie_id.clone(),
            serie_tier: header.serie_tier,
            tournament_id: header.tournament_id.clone(),
            team_id: team.clone(),
            team_opponent_id: opponent.clone(),
            player_id: player.clone(),
            player_opponent_id: opponent_player.clone(),
            stats: stats.clone(),
            round: round.number.unwrap_or_default(),
            is_ct: u8::from(round.ct.as_ref() == Some(team)),
            outcome: round.outcome.map(RoundOutcome::code),
            win: u8::from(round.winner.as_ref() == Some(team)),
        }
    }
}

fn array_at<'a>(game: &'a JsonValue, key: &str) -> &'a [JsonValue] {
    game.get(key)
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a provider timestamp and render it as ISO-8601.
///
/// Offsets are preserved (`Z` renders as `+00:00`); timestamps without an
/// offset stay naive. Fractional seconds render with microsecond precision
/// and are omitted when zero.
pub fn parse_begin_at(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(render_offset(&ts));
    }

    let zulu = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .map(|rest| format!("{}+00:00", rest));
    let candidate = zulu.as_deref().unwrap_or(raw);
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(candidate, format) {
            return Some(render_offset(&ts));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(render_naive(&ts));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| render_naive(&ts))
}

fn render_offset(ts: &DateTime<FixedOffset>) -> String {
    if ts.nanosecond() == 0 {
        ts.to_rfc3339_opts(SecondsFormat::Secs, false)
    } else {
        ts.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

fn render_naive(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}
