use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::db::Row;

/// Team projection embedded in standings rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamLabel {
    pub name: String,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
}

/// Team projection embedded in player stats and match lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamBadge {
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamName {
    pub name: String,
}

/// Full team record, embedded in match details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub logo_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeagueName {
    pub name: String,
}

/// League table row, one per (league, team)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Standing {
    pub league_id: String,
    pub team_id: String,
    pub position: i32,
    pub points: Option<i32>,
    pub teams: Option<TeamLabel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerStat {
    pub league_id: String,
    pub team_id: Option<String>,
    pub player_name: String,
    pub goals: Option<i32>,
    pub assists: Option<i32>,
    pub teams: Option<TeamBadge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Match row with both sides embedded as `T`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match<T> {
    pub id: String,
    pub league_id: Option<String>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub minute: Option<i32>,
    pub status: Option<String>,
    pub start_time: Option<String>,
    pub updated_at: Option<String>,
    pub home_team: Option<T>,
    pub away_team: Option<T>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type MatchSummary = Match<TeamBadge>;

/// Match with full team records and its league. `leagues` is null, not
/// missing, when the league join finds nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchDetail {
    #[serde(flatten)]
    pub record: Match<Team>,
    pub leagues: Option<LeagueName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    pub match_id: String,
    pub minute: i32,
    pub event_type: String,
    pub player_name: String,
    pub team_id: Option<String>,
    pub description: Option<String>,
    pub teams: Option<TeamName>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchLineup {
    pub match_id: String,
    pub team_id: Option<String>,
    pub teams: Option<TeamName>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamingServer {
    pub match_id: String,
    pub priority: Option<i32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response for POST /league-details
#[derive(Debug, Serialize, Deserialize)]
pub struct LeagueDetails {
    pub standings: Vec<Standing>,
    pub top_scorers: Vec<PlayerStat>,
    pub top_assists: Vec<PlayerStat>,
    pub recent_matches: Vec<MatchSummary>,
}

/// Response for POST /match-details. `match` is null when no such match exists.
#[derive(Debug, Serialize, Deserialize)]
pub struct MatchDetails {
    #[serde(rename = "match")]
    pub record: Option<MatchDetail>,
    pub events: Vec<MatchEvent>,
    pub lineups: Vec<MatchLineup>,
    pub streams: Vec<StreamingServer>,
}

/// Response for a successful POST /live-match-update
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
}

impl UpdateResponse {
    pub fn updated() -> Self {
        Self {
            success: true,
            message: "Match updated".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeagueDetailsRequest {
    #[serde(default)]
    pub league_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct MatchDetailsRequest {
    #[serde(default)]
    pub match_id: Option<Value>,
}

/// Reads an identifier the way clients send it: a non-empty string or a
/// non-zero number. Anything else counts as missing.
pub fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// A field of a partial update. Distinguishes a key that was left out from
/// one explicitly sent as `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Set(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Patch::Set(value),
            None => Patch::Null,
        })
    }
}

impl<T: Serialize> Patch<T> {
    /// Writes this field into `row` unless it was absent.
    fn write_into(&self, row: &mut Row, column: &str) {
        match self {
            Patch::Absent => {}
            Patch::Null => {
                row.insert(column.to_string(), Value::Null);
            }
            Patch::Set(value) => {
                let value = serde_json::to_value(value).unwrap_or(Value::Null);
                row.insert(column.to_string(), value);
            }
        }
    }
}

/// Event appended alongside a live update
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewMatchEvent {
    pub minute: i32,
    pub event_type: String,
    pub player_name: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewMatchEvent {
    pub fn into_row(self, match_id: &str) -> Row {
        let mut row = Row::new();
        row.insert("match_id".into(), Value::from(match_id));
        row.insert("minute".into(), Value::from(self.minute));
        row.insert("event_type".into(), Value::from(self.event_type));
        row.insert("player_name".into(), Value::from(self.player_name));
        row.insert(
            "team_id".into(),
            self.team_id.map(Value::from).unwrap_or(Value::Null),
        );
        row.insert(
            "description".into(),
            Value::from(self.description.unwrap_or_default()),
        );
        row
    }
}

/// Body of POST /live-match-update
#[derive(Debug, Default, Deserialize)]
pub struct LiveMatchUpdate {
    #[serde(default)]
    pub match_id: Option<Value>,
    #[serde(default)]
    pub home_score: Patch<i32>,
    #[serde(default)]
    pub away_score: Patch<i32>,
    #[serde(default)]
    pub minute: Patch<i32>,
    #[serde(default)]
    pub status: Patch<String>,
    #[serde(default)]
    pub event: Option<NewMatchEvent>,
}

impl LiveMatchUpdate {
    /// Columns to write on the match row. `updated_at` is always set.
    pub fn changes(&self, now: DateTime<Utc>) -> Row {
        let mut row = Row::new();
        row.insert(
            "updated_at".into(),
            Value::from(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        self.home_score.write_into(&mut row, "home_score");
        self.away_score.write_into(&mut row, "away_score");
        self.minute.write_into(&mut row, "minute");
        self.status.write_into(&mut row, "status");
        row
    }
}
