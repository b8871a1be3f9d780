use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use futures_util::StreamExt;
use futures_util::stream;
use std::convert::Infallible;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, instrument};

use crate::extraction::FieldExtractor;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::BatchVerifyRequest;
use crate::gateway::state::HandlerState;
use crate::intake::ImageStore;

/// Submits a batch and streams one SSE data frame per completed label, in
/// completion order, closing with an explicit `done` event.
///
/// The `done` marker is the only valid stream-closed signal; a dropped
/// connection is not a terminal state for consumers.
#[instrument(skip(state, request), fields(labels = request.labels.len()))]
pub async fn verify_batch_handler<E, S>(
    State(state): State<HandlerState<E, S>>,
    Json(request): Json<BatchVerifyRequest>,
) -> Result<Response, GatewayError>
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    let handle = state.pipeline.submit(request.labels)?;
    debug!(batch_id = %handle.batch_id, total = handle.total, "Batch stream opened");

    let events = ReceiverStream::new(handle.events).map(|event| {
        match serde_json::to_string(&event) {
            Ok(json) => Ok::<_, Infallible>(Event::default().data(json)),
            Err(e) => {
                error!("Failed to serialize batch event: {}", e);
                Ok(Event::default().comment("serialization-error"))
            }
        }
    });
    let done = stream::iter(vec![Ok::<_, Infallible>(
        Event::default().event("done").data("done"),
    )]);

    Ok(Sse::new(events.chain(done)).into_response())
}

/// Final snapshot for a terminated batch.
#[instrument(skip(state))]
pub async fn batch_snapshot_handler<E, S>(
    State(state): State<HandlerState<E, S>>,
    Path(batch_id): Path<String>,
) -> Result<Response, GatewayError>
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    let snapshot = state
        .pipeline
        .store()
        .snapshot(&batch_id)
        .ok_or_else(|| GatewayError::NotFound(format!("batch {batch_id}")))?;
    Ok(Json(snapshot).into_response())
}

/// Flattens a terminated batch into one CSV row per field result.
#[instrument(skip(state))]
pub async fn export_csv_handler<E, S>(
    State(state): State<HandlerState<E, S>>,
    Path(batch_id): Path<String>,
) -> Result<Response, GatewayError>
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    let snapshot = state
        .pipeline
        .store()
        .snapshot(&batch_id)
        .ok_or_else(|| GatewayError::NotFound(format!("batch {batch_id}")))?;

    let csv = crate::gateway::export::snapshot_to_csv(&snapshot);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    let disposition = format!("attachment; filename=\"batch-{batch_id}.csv\"");
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| GatewayError::InternalError(e.to_string()))?,
    );

    Ok((StatusCode::OK, headers, csv).into_response())
}
