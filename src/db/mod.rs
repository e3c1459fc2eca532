use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::*;

#[cfg(test)]
pub mod memory;
pub mod rest;
mod store;

pub use rest::RestStore;
pub use store::{
    Access, Connector, DataAccess, Direction, Filter, Join, Order, Projection, Row, Select,
    StoreError,
};

/// Page size for the scorer and assist leaderboards
pub const LEADERBOARD_LIMIT: usize = 20;
pub const RECENT_MATCHES_LIMIT: usize = 20;

fn decode<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Decode(e.to_string()))
}

fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(decode).collect()
}

// League queries
pub async fn get_standings<S: DataAccess>(
    store: &S,
    league_id: &str,
) -> Result<Vec<Standing>, StoreError> {
    let query = Select::from("standings")
        .join(Join::new("teams", "team_id").fields(&["name", "short_name", "logo_url"]))
        .eq("league_id", league_id)
        .order_by("position", Direction::Asc);

    decode_all(store.select(&query).await?)
}

pub async fn get_top_scorers<S: DataAccess>(
    store: &S,
    league_id: &str,
) -> Result<Vec<PlayerStat>, StoreError> {
    let query = player_stats_query(league_id, "goals");
    decode_all(store.select(&query).await?)
}

pub async fn get_top_assists<S: DataAccess>(
    store: &S,
    league_id: &str,
) -> Result<Vec<PlayerStat>, StoreError> {
    let query = player_stats_query(league_id, "assists");
    decode_all(store.select(&query).await?)
}

fn player_stats_query(league_id: &str, ranked_by: &'static str) -> Select {
    Select::from("player_stats")
        .join(Join::new("teams", "team_id").fields(&["name", "logo_url"]))
        .eq("league_id", league_id)
        .order_by(ranked_by, Direction::Desc)
        .limit(LEADERBOARD_LIMIT)
}

pub async fn get_recent_matches<S: DataAccess>(
    store: &S,
    league_id: &str,
) -> Result<Vec<MatchSummary>, StoreError> {
    let query = Select::from("matches")
        .join(
            Join::new("teams", "home_team_id")
                .as_key("home_team")
                .fields(&["name", "logo_url"]),
        )
        .join(
            Join::new("teams", "away_team_id")
                .as_key("away_team")
                .fields(&["name", "logo_url"]),
        )
        .eq("league_id", league_id)
        .order_by("start_time", Direction::Desc)
        .limit(RECENT_MATCHES_LIMIT);

    decode_all(store.select(&query).await?)
}

// Match queries
pub async fn get_match<S: DataAccess>(
    store: &S,
    match_id: &str,
) -> Result<Option<MatchDetail>, StoreError> {
    let query = Select::from("matches")
        .join(Join::new("teams", "home_team_id").as_key("home_team"))
        .join(Join::new("teams", "away_team_id").as_key("away_team"))
        .join(Join::new("leagues", "league_id").fields(&["name"]))
        .eq("id", match_id);

    store.select_one(&query).await?.map(decode).transpose()
}

pub async fn get_match_events<S: DataAccess>(
    store: &S,
    match_id: &str,
) -> Result<Vec<MatchEvent>, StoreError> {
    let query = Select::from("match_events")
        .join(Join::new("teams", "team_id").fields(&["name"]))
        .eq("match_id", match_id)
        .order_by("minute", Direction::Asc);

    decode_all(store.select(&query).await?)
}

pub async fn get_match_lineups<S: DataAccess>(
    store: &S,
    match_id: &str,
) -> Result<Vec<MatchLineup>, StoreError> {
    let query = Select::from("match_lineups")
        .join(Join::new("teams", "team_id").fields(&["name"]))
        .eq("match_id", match_id)
        .order_by("position", Direction::Asc);

    decode_all(store.select(&query).await?)
}

/// Stream sources, best first
pub async fn get_streaming_servers<S: DataAccess>(
    store: &S,
    match_id: &str,
) -> Result<Vec<StreamingServer>, StoreError> {
    let query = Select::from("streaming_servers")
        .eq("match_id", match_id)
        .order_by("priority", Direction::Asc);

    decode_all(store.select(&query).await?)
}

// Live match writes
pub async fn update_match<S: DataAccess>(
    store: &S,
    match_id: &str,
    changes: Row,
) -> Result<(), StoreError> {
    store
        .update("matches", &[Filter::eq("id", match_id)], changes)
        .await
}

pub async fn insert_match_event<S: DataAccess>(
    store: &S,
    match_id: &str,
    event: NewMatchEvent,
) -> Result<(), StoreError> {
    store.insert("match_events", event.into_row(match_id)).await
}
