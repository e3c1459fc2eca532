use axum::{body::Bytes, extract::State, http::HeaderMap, response::Json};

use super::{caller_access, parse_body, settle};
use crate::db::{self, Connector};
use crate::error::ApiError;
use crate::models::{identifier, MatchDetails, MatchDetailsRequest};

/// POST /match-details - A match with its events, lineups and streams
///
/// An unknown match is not an error: the response carries `match: null`.
pub async fn get_match_details<C: Connector>(
    State(store): State<C>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MatchDetails>, ApiError> {
    let request: MatchDetailsRequest = parse_body(&body)?;
    let match_id =
        identifier(request.match_id.as_ref()).ok_or(ApiError::MissingField("match_id"))?;

    let session = store.session(caller_access(&headers));
    let (record, events, lineups, streams) = tokio::join!(
        db::get_match(&session, &match_id),
        db::get_match_events(&session, &match_id),
        db::get_match_lineups(&session, &match_id),
        db::get_streaming_servers(&session, &match_id),
    );

    Ok(Json(MatchDetails {
        record: settle(record, "match")?,
        events: settle(events, "events")?,
        lineups: settle(lineups, "lineups")?,
        streams: settle(streams, "streams")?,
    }))
}
