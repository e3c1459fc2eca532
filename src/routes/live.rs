use axum::{body::Bytes, extract::State, response::Json};
use chrono::Utc;

use super::parse_body;
use crate::db::{self, Access, Connector};
use crate::error::ApiError;
use crate::models::{identifier, LiveMatchUpdate, UpdateResponse};

/// POST /live-match-update - Push score/minute/status changes and an optional event
///
/// Runs with the privileged credential. The event is only inserted once the
/// match update succeeded; a failed insert does not undo that update, so a
/// 500 here means "re-read the match", not "nothing happened".
pub async fn update_live_match<C: Connector>(
    State(store): State<C>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, ApiError> {
    let update: LiveMatchUpdate = parse_body(&body)?;
    let match_id =
        identifier(update.match_id.as_ref()).ok_or(ApiError::MissingField("match_id"))?;

    let session = store.session(Access::Privileged);
    let changes = update.changes(Utc::now());
    let changed: Vec<String> = changes
        .keys()
        .filter(|column| *column != "updated_at")
        .cloned()
        .collect();

    db::update_match(&session, &match_id, changes).await?;
    tracing::info!("Updated match {} ({:?})", match_id, changed);

    if let Some(event) = update.event {
        let event_type = event.event_type.clone();
        db::insert_match_event(&session, &match_id, event)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    "Match {} updated but {} event insert failed: {}",
                    match_id,
                    event_type,
                    e
                )
            })?;
        tracing::info!("Recorded {} event for match {}", event_type, match_id);
    }

    Ok(Json(UpdateResponse::updated()))
}
