//! HTTP handlers and their OpenAPI description.

use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use unicare_messaging::{Applied, ConversationOverview, MessagingError, Notification};
use unicare_types::Role;
use utoipa::{IntoParams, OpenApi, ToSchema};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub status: String,
    pub message: String,
}

/// What happened to a published payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishRes {
    /// `updated`, `duplicate` or `ignored` (not an emergency message).
    pub outcome: String,
    /// Unread count of the conversation afterwards, when it was updated.
    pub unread: Option<u32>,
    /// Sessions the payload was delivered to.
    pub subscribers: usize,
}

/// A conversation card as shown in the medical centre's inbox.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationCard {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: u32,
}

impl From<ConversationOverview> for ConversationCard {
    fn from(overview: ConversationOverview) -> Self {
        Self {
            name: overview.display_name(),
            id: overview.id,
            image: overview.image,
            last_message: overview.last_message.text,
            last_message_at: overview.last_message.created_at,
            unread: overview.unread_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadRes {
    pub id: String,
    pub total_unread: u32,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct StreamQuery {
    /// `student` or `medical-centre`; only payloads addressed to that role are streamed.
    pub role: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, publish, stream, conversations, mark_read),
    components(schemas(HealthRes, ErrorRes, PublishRes, ConversationCard, ReadRes))
)]
pub struct ApiDoc;

type Failure = (StatusCode, Json<ErrorRes>);

fn failure(code: StatusCode, message: impl Into<String>) -> Failure {
    (
        code,
        Json(ErrorRes {
            status: "error".into(),
            message: message.into(),
        }),
    )
}

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/notifications", post(publish))
        .route("/notifications/stream", get(stream))
        .route("/conversations", get(conversations))
        .route("/conversations/:id/read", post(mark_read))
        .route("/api-docs/openapi.json", get(openapi))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler(state = AppState)]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "UniCare relay is alive".into(),
    })
}

/// Accepts a bare payload or a full push message with the payload under `data`.
fn decode(body: &str) -> Result<Notification, MessagingError> {
    Notification::parse(body).or_else(|bare| Notification::parse_envelope(body).map_err(|_| bare))
}

#[utoipa::path(
    post,
    path = "/notifications",
    request_body(content = String, content_type = "application/json", description = "Notification payload"),
    responses(
        (status = 202, description = "Payload accepted", body = PublishRes),
        (status = 400, description = "Malformed payload", body = ErrorRes),
        (status = 401, description = "Missing or wrong x-api-key", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<PublishRes>), Failure> {
    let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if !state.accepts_key(key) {
        tracing::warn!("publish rejected: bad api key");
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid API key"));
    }

    let notification = decode(&body).map_err(|e| {
        tracing::warn!(error = %e, "publish rejected: bad payload");
        failure(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let applied = state.inbox.write().await.apply(&notification);
    let (outcome, unread, subscribers) = match applied {
        Applied::Duplicate => ("duplicate", None, 0),
        Applied::Ignored => ("ignored", None, state.relay.publish(notification)),
        Applied::Updated { unread } => ("updated", Some(unread), state.relay.publish(notification)),
    };
    tracing::info!(outcome, subscribers, "notification received");

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishRes {
            outcome: outcome.into(),
            unread,
            subscribers,
        }),
    ))
}

fn notification_event(notification: &Notification) -> Option<Event> {
    let data = notification.render().ok()?;
    Some(
        Event::default()
            .event("notification")
            .id(notification.event_id().to_string())
            .data(data),
    )
}

#[utoipa::path(
    get,
    path = "/notifications/stream",
    params(StreamQuery),
    responses(
        (status = 200, description = "Server-sent events; `notification` frames carry payloads, `lagged` frames the number of payloads skipped", content_type = "text/event-stream", body = String),
        (status = 400, description = "Unknown role", body = ErrorRes)
    )
)]
async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Failure> {
    let role = query
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(|e| failure(StatusCode::BAD_REQUEST, e.to_string()))?;

    let receiver = state.relay.subscribe().into_inner();
    tracing::debug!(role = ?role, "stream opened");

    let events = BroadcastStream::new(receiver).filter_map(move |item| {
        let event = match item {
            Ok(n) if role.is_none_or(|r| n.to == r) => notification_event(&n),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "stream subscriber lagged");
                Some(Event::default().event("lagged").data(missed.to_string()))
            }
        };
        event.map(Ok)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[utoipa::path(
    get,
    path = "/conversations",
    responses(
        (status = 200, description = "Inbox, newest message first", body = [ConversationCard])
    )
)]
#[axum::debug_handler]
async fn conversations(State(state): State<AppState>) -> Json<Vec<ConversationCard>> {
    let overviews = state.inbox.read().await.overviews();
    Json(overviews.into_iter().map(ConversationCard::from).collect())
}

#[utoipa::path(
    post,
    path = "/conversations/{id}/read",
    params(("id" = String, Path, description = "Conversation id (the student's id)")),
    responses(
        (status = 200, description = "Unread count reset", body = ReadRes),
        (status = 404, description = "Unknown conversation", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReadRes>, Failure> {
    let mut inbox = state.inbox.write().await;
    if !inbox.mark_read(&id) {
        return Err(failure(
            StatusCode::NOT_FOUND,
            format!("Unknown conversation: {id}"),
        ));
    }
    Ok(Json(ReadRes {
        id,
        total_unread: inbox.total_unread(),
    }))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
