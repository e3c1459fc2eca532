use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};

use super::{caller_access, parse_body, settle};
use crate::db::{self, Connector};
use crate::error::ApiError;
use crate::models::{identifier, LeagueDetails, LeagueDetailsRequest};

/// POST /league-details - Standings, leaderboards and recent matches for a league
///
/// The four reads run concurrently and are all awaited before responding.
pub async fn get_league_details<C: Connector>(
    State(store): State<C>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LeagueDetails>, ApiError> {
    let request: LeagueDetailsRequest = parse_body(&body)?;
    let league_id =
        identifier(request.league_id.as_ref()).ok_or(ApiError::MissingField("league_id"))?;

    let session = store.session(caller_access(&headers));
    let (standings, top_scorers, top_assists, recent_matches) = tokio::join!(
        db::get_standings(&session, &league_id),
        db::get_top_scorers(&session, &league_id),
        db::get_top_assists(&session, &league_id),
        db::get_recent_matches(&session, &league_id),
    );

    Ok(Json(LeagueDetails {
        standings: settle(standings, "standings")?,
        top_scorers: settle(top_scorers, "top_scorers")?,
        top_assists: settle(top_assists, "top_assists")?,
        recent_matches: settle(recent_matches, "recent_matches")?,
    }))
}
