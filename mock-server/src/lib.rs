use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_ROLE: &str = "Attendee";
pub const DEFAULT_VALIDITY_DAYS: i64 = 180;
pub const REPEATABILITY_REQUEST_ID: &str = "repeatability-request-id";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub created_date_time: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub room_open: bool,
    pub participants: BTreeMap<String, ParticipantEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub room_open: Option<bool>,
    pub participants: Option<Vec<ParticipantInput>>,
}

/// Merge-patch body: absent fields are left untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoom {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub room_open: Option<bool>,
    pub participants: Option<Vec<ParticipantInput>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInput {
    pub communication_identifier: IdentifierInput,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierInput {
    pub raw_id: Option<String>,
    pub communication_user: Option<CommunicationUserInput>,
    pub phone_number: Option<PhoneNumberInput>,
}

#[derive(Debug, Deserialize)]
pub struct CommunicationUserInput {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneNumberInput {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantsBody {
    pub participants: Vec<ParticipantInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    pub participants: BTreeMap<String, ParticipantEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// A failed request, rendered as `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub struct ServiceError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ServiceError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn room_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", format!("room {id} does not exist"))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BadRequest", message)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Default)]
pub struct Store {
    rooms: HashMap<String, Room>,
    /// repeatability-request-id → room id
    replays: HashMap<String, String>,
}

impl Store {
    /// Drops the room together with any replay entries pointing at it.
    fn remove_room(&mut self, id: &str) -> Option<Room> {
        let room = self.rooms.remove(id)?;
        self.replays.retain(|_, room_id| room_id != id);
        Some(room)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{id}", get(get_room).patch(update_room).delete(delete_room))
        .route("/rooms/{id}/participants", get(list_participants))
        .route("/rooms/{id}/participants:add", post(add_participants))
        .route("/rooms/{id}/participants:update", post(update_participants))
        .route("/rooms/{id}/participants:remove", post(remove_participants))
        .layer(middleware::from_fn(require_authorization))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_authorization(request: Request, next: Next) -> Response {
    if request.headers().contains_key(header::AUTHORIZATION) {
        return next.run(request).await;
    }
    warn!(uri = %request.uri(), "rejecting unauthenticated request");
    ServiceError::new(
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        "missing authorization header",
    )
    .into_response()
}

/// The key a participant is stored under: its raw id, or one derived from
/// the kind-specific field.
fn participant_key(identifier: &IdentifierInput) -> Option<String> {
    identifier
        .raw_id
        .clone()
        .or_else(|| identifier.communication_user.as_ref().map(|user| user.id.clone()))
        .or_else(|| identifier.phone_number.as_ref().map(|phone| format!("4:{}", phone.value)))
}

fn participant_entries(
    inputs: Vec<ParticipantInput>,
) -> Result<Vec<(String, ParticipantEntry)>, ServiceError> {
    inputs
        .into_iter()
        .map(|input| {
            let key = participant_key(&input.communication_identifier)
                .ok_or_else(|| ServiceError::bad_request("participant has no identifier"))?;
            let role = input.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
            Ok((key, ParticipantEntry { role }))
        })
        .collect()
}

fn check_window(valid_from: DateTime<Utc>, valid_until: DateTime<Utc>) -> Result<(), ServiceError> {
    if valid_from > valid_until {
        return Err(ServiceError::bad_request("validFrom must not be after validUntil"));
    }
    Ok(())
}

async fn create_room(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateRoom>,
) -> Result<(StatusCode, Json<Room>), ServiceError> {
    let request_id = headers
        .get(REPEATABILITY_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut store = db.write().await;
    if let Some(existing) = request_id
        .as_ref()
        .and_then(|rid| store.replays.get(rid))
        .and_then(|room_id| store.rooms.get(room_id))
    {
        info!(room_id = %existing.id, "replayed create request");
        return Ok((StatusCode::CREATED, Json(existing.clone())));
    }

    let now = Utc::now();
    let valid_from = input.valid_from.unwrap_or(now);
    let valid_until = input
        .valid_until
        .unwrap_or(valid_from + Duration::days(DEFAULT_VALIDITY_DAYS));
    check_window(valid_from, valid_until)?;

    let room = Room {
        id: Uuid::new_v4().simple().to_string(),
        created_date_time: now,
        valid_from,
        valid_until,
        room_open: input.room_open.unwrap_or(false),
        participants: participant_entries(input.participants.unwrap_or_default())?
            .into_iter()
            .collect(),
    };
    store.rooms.insert(room.id.clone(), room.clone());
    if let Some(rid) = request_id {
        store.replays.insert(rid, room.id.clone());
    }
    info!(room_id = %room.id, "room created");
    Ok((StatusCode::CREATED, Json(room)))
}

async fn get_room(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Room>, ServiceError> {
    let store = db.read().await;
    store
        .rooms
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ServiceError::room_not_found(&id))
}

async fn update_room(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateRoom>,
) -> Result<Json<Room>, ServiceError> {
    let mut store = db.write().await;
    let room = store
        .rooms
        .get_mut(&id)
        .ok_or_else(|| ServiceError::room_not_found(&id))?;

    let valid_from = input.valid_from.unwrap_or(room.valid_from);
    let valid_until = input.valid_until.unwrap_or(room.valid_until);
    check_window(valid_from, valid_until)?;
    let participants = input.participants.map(participant_entries).transpose()?;

    room.valid_from = valid_from;
    room.valid_until = valid_until;
    if let Some(open) = input.room_open {
        room.room_open = open;
    }
    if let Some(participants) = participants {
        room.participants = participants.into_iter().collect();
    }
    Ok(Json(room.clone()))
}

async fn delete_room(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let mut store = db.write().await;
    store
        .remove_room(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ServiceError::room_not_found(&id))
}

async fn list_participants(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<ParticipantsResponse>, ServiceError> {
    let store = db.read().await;
    let room = store.rooms.get(&id).ok_or_else(|| ServiceError::room_not_found(&id))?;
    Ok(Json(ParticipantsResponse {
        participants: room.participants.clone(),
    }))
}

async fn add_participants(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ParticipantsBody>,
) -> Result<Json<Room>, ServiceError> {
    let mut store = db.write().await;
    let room = store
        .rooms
        .get_mut(&id)
        .ok_or_else(|| ServiceError::room_not_found(&id))?;
    if input.participants.is_empty() {
        return Err(ServiceError::bad_request("participants must not be empty"));
    }
    room.participants.extend(participant_entries(input.participants)?);
    Ok(Json(room.clone()))
}

async fn update_participants(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ParticipantsBody>,
) -> Result<Json<Room>, ServiceError> {
    let mut store = db.write().await;
    let room = store
        .rooms
        .get_mut(&id)
        .ok_or_else(|| ServiceError::room_not_found(&id))?;
    let entries = participant_entries(input.participants)?;
    if let Some((missing, _)) = entries
        .iter()
        .find(|(key, _)| !room.participants.contains_key(key))
    {
        return Err(ServiceError::bad_request(format!(
            "{missing} is not a participant of room {id}"
        )));
    }
    room.participants.extend(entries);
    Ok(Json(room.clone()))
}

async fn remove_participants(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ParticipantsBody>,
) -> Result<Json<Room>, ServiceError> {
    let mut store = db.write().await;
    let room = store
        .rooms
        .get_mut(&id)
        .ok_or_else(|| ServiceError::room_not_found(&id))?;
    for (key, _) in participant_entries(input.participants)? {
        room.participants.remove(&key);
    }
    Ok(Json(room.clone()))
}
