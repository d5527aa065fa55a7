//! Stateless request builder and response parser for the rooms API.
//!
//! # Design
//! `RoomsCodec` holds only the endpoint and API version. Each operation is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`. Nothing here does I/O or
//! reads the clock: the idempotency token and first-sent time for create are
//! passed in, keeping every request reproducible.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::rfc1123;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::identifier::CommunicationIdentifier;
use crate::model::{CreateRoomOptions, Participant, Room, UpdateRoomOptions};
use url::Url;

use crate::translate::{
    identifier_fragment, participant_to_wire, participants_from_wire, room_from_wire,
};
use crate::wire::{
    CreateRoomRequest, ErrorResponse, ParticipantsRequest, ParticipantsWire, RoomWire,
    UpdateRoomRequest,
};

const JSON: &str = "application/json";
const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

pub const REPEATABILITY_REQUEST_ID: &str = "repeatability-request-id";
pub const REPEATABILITY_FIRST_SENT: &str = "repeatability-first-sent";

/// Builds and parses rooms API messages. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomsCodec {
    endpoint: String,
    api_version: String,
}

impl RoomsCodec {
    /// `endpoint` is used as given apart from trailing slashes; see
    /// `config::normalize_endpoint` for scheme coercion.
    pub fn new(endpoint: &str, api_version: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_create_room(
        &self,
        options: &CreateRoomOptions,
        request_id: Uuid,
        first_sent: DateTime<Utc>,
    ) -> Result<HttpRequest, ApiError> {
        let body = CreateRoomRequest {
            valid_from: options.valid_from,
            valid_until: options.valid_until,
            room_open: options.room_open,
            participants: options
                .participants
                .as_ref()
                .map(|list| list.iter().map(participant_to_wire).collect()),
        };
        let mut request = self.json_request(HttpMethod::Post, &self.url(&["rooms"])?, JSON, &body)?;
        request
            .headers
            .push((REPEATABILITY_REQUEST_ID.to_string(), request_id.to_string()));
        request
            .headers
            .push((REPEATABILITY_FIRST_SENT.to_string(), rfc1123(first_sent)));
        Ok(request)
    }

    pub fn build_get_room(&self, room_id: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.empty_request(HttpMethod::Get, &self.room_url(room_id, &[])?))
    }

    pub fn build_update_room(
        &self,
        room_id: &str,
        options: &UpdateRoomOptions,
    ) -> Result<HttpRequest, ApiError> {
        let body = UpdateRoomRequest {
            valid_from: options.valid_from,
            valid_until: options.valid_until,
            room_open: options.room_open,
            participants: options
                .participants
                .as_ref()
                .map(|list| list.iter().map(participant_to_wire).collect()),
        };
        let url = self.room_url(room_id, &[])?;
        self.json_request(HttpMethod::Patch, &url, MERGE_PATCH_JSON, &body)
    }

    pub fn build_delete_room(&self, room_id: &str) -> Result<HttpRequest, ApiError> {
        Ok(self.empty_request(HttpMethod::Delete, &self.room_url(room_id, &[])?))
    }

    pub fn build_list_participants(&self, room_id: &str) -> Result<HttpRequest, ApiError> {
        let url = self.room_url(room_id, &["participants"])?;
        Ok(self.empty_request(HttpMethod::Get, &url))
    }

    pub fn build_add_participants(
        &self,
        room_id: &str,
        participants: &[Participant],
    ) -> Result<HttpRequest, ApiError> {
        let body = ParticipantsRequest {
            participants: participants.iter().map(participant_to_wire).collect(),
        };
        let url = self.room_url(room_id, &["participants:add"])?;
        self.json_request(HttpMethod::Post, &url, JSON, &body)
    }

    pub fn build_update_participants(
        &self,
        room_id: &str,
        participants: &[Participant],
    ) -> Result<HttpRequest, ApiError> {
        let body = ParticipantsRequest {
            participants: participants.iter().map(participant_to_wire).collect(),
        };
        let url = self.room_url(room_id, &["participants:update"])?;
        self.json_request(HttpMethod::Post, &url, JSON, &body)
    }

    /// Each entry carries only the identifier, never a role.
    pub fn build_remove_participants(
        &self,
        room_id: &str,
        identifiers: &[CommunicationIdentifier],
    ) -> Result<HttpRequest, ApiError> {
        let body = ParticipantsRequest {
            participants: identifiers.iter().map(identifier_fragment).collect(),
        };
        let url = self.room_url(room_id, &["participants:remove"])?;
        self.json_request(HttpMethod::Post, &url, JSON, &body)
    }

    /// A PATCH whose participant list is present and empty.
    pub fn build_remove_all_participants(&self, room_id: &str) -> Result<HttpRequest, ApiError> {
        let options = UpdateRoomOptions {
            participants: Some(Vec::new()),
            ..Default::default()
        };
        self.build_update_room(room_id, &options)
    }

    /// Shared by every operation that answers with a room.
    pub fn parse_room(&self, response: HttpResponse) -> Result<Room, ApiError> {
        let wire: RoomWire = parse_json(response)?;
        Ok(room_from_wire(wire))
    }

    pub fn parse_delete_room(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_list_participants(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Participant>, ApiError> {
        let wire: ParticipantsWire = parse_json(response)?;
        Ok(participants_from_wire(wire.participants))
    }

    /// Appends each segment percent-encoded, so `/`, `?` and `#` inside a
    /// segment cannot change the resource or the query.
    fn url(&self, segments: &[&str]) -> Result<String, ApiError> {
        let invalid = || ApiError::InvalidEndpoint(self.endpoint.clone());
        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url.into())
    }

    /// Only a blank id is rejected; the id itself is sent untouched.
    fn room_url(&self, room_id: &str, rest: &[&str]) -> Result<String, ApiError> {
        if room_id.trim().is_empty() {
            return Err(ApiError::MissingRoomId);
        }
        let mut segments = vec!["rooms", room_id];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    fn empty_request(&self, method: HttpMethod, url: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        url: &str,
        content_type: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: Some(body),
        })
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map a non-2xx response to `ApiError::Http`, preferring the service's
/// `{"error": {...}}` message over the raw body.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let detail = serde_json::from_str::<ErrorResponse>(&response.body)
        .ok()
        .map(|parsed| parsed.error);
    let code = detail.as_ref().and_then(|d| d.code.clone());
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| response.body.clone());
    Err(ApiError::Http {
        status: response.status,
        code,
        message,
    })
}
