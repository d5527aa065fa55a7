//! The rooms facade.
//!
//! # Design
//! `RoomsClient` owns a `RoomsCodec`, an `AuthPolicy` and a `Transport`.
//! Every operation is one round-trip: build, sign, send, parse. Nothing is
//! cached between calls and no error is retried or swallowed here.

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::auth::AuthPolicy;
use crate::codec::RoomsCodec;
use crate::config::{normalize_endpoint, ClientOptions, ConnectionString, Credential};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::identifier::CommunicationIdentifier;
use crate::model::{CreateRoomOptions, Participant, Room, UpdateRoomOptions};
use crate::transport::{Transport, UreqTransport};

/// Client for the rooms resource of a communication service.
pub struct RoomsClient<T = UreqTransport> {
    codec: RoomsCodec,
    auth: AuthPolicy,
    transport: T,
}

impl<T: Transport> RoomsClient<T> {
    /// Fails before any I/O if the endpoint is blank or the credential is
    /// empty or malformed. An endpoint without a scheme gets `https://`.
    pub fn new(endpoint: &str, credential: Credential, transport: T) -> Result<Self, ApiError> {
        Self::with_options(endpoint, credential, transport, ClientOptions::default())
    }

    pub fn with_options(
        endpoint: &str,
        credential: Credential,
        transport: T,
        options: ClientOptions,
    ) -> Result<Self, ApiError> {
        let endpoint = normalize_endpoint(endpoint)?;
        let auth = AuthPolicy::new(&credential)?;
        Ok(Self {
            codec: RoomsCodec::new(&endpoint, &options.api_version),
            auth,
            transport,
        })
    }

    /// Build a client from `endpoint=<url>;accesskey=<key>`.
    pub fn from_connection_string(conn_str: &str, transport: T) -> Result<Self, ApiError> {
        let ConnectionString { endpoint, credential } = conn_str.parse()?;
        Self::new(&endpoint, credential, transport)
    }

    pub fn endpoint(&self) -> &str {
        self.codec.endpoint()
    }

    /// Each call carries a fresh idempotency token, so a transport-level
    /// retry of the same request cannot create a second room.
    #[instrument(level = "debug", skip(self, options), err)]
    pub fn create_room(&self, options: &CreateRoomOptions) -> Result<Room, ApiError> {
        let request = self.codec.build_create_room(options, Uuid::new_v4(), Utc::now())?;
        let room = self.codec.parse_room(self.execute(request)?)?;
        tracing::debug!(room_id = %room.id, "room created");
        Ok(room)
    }

    #[instrument(level = "debug", skip(self), err)]
    pub fn get_room(&self, room_id: &str) -> Result<Room, ApiError> {
        let request = self.codec.build_get_room(room_id)?;
        self.codec.parse_room(self.execute(request)?)
    }

    #[instrument(level = "debug", skip(self, options), err)]
    pub fn update_room(
        &self,
        room_id: &str,
        options: &UpdateRoomOptions,
    ) -> Result<Room, ApiError> {
        let request = self.codec.build_update_room(room_id, options)?;
        self.codec.parse_room(self.execute(request)?)
    }

    #[instrument(level = "debug", skip(self), err)]
    pub fn delete_room(&self, room_id: &str) -> Result<(), ApiError> {
        let request = self.codec.build_delete_room(room_id)?;
        self.codec.parse_delete_room(self.execute(request)?)
    }

    #[instrument(level = "debug", skip(self), err)]
    pub fn list_participants(&self, room_id: &str) -> Result<Vec<Participant>, ApiError> {
        let request = self.codec.build_list_participants(room_id)?;
        self.codec.parse_list_participants(self.execute(request)?)
    }

    #[instrument(
        level = "debug",
        skip(self, participants),
        fields(count = participants.len()),
        err
    )]
    pub fn add_participants(
        &self,
        room_id: &str,
        participants: &[Participant],
    ) -> Result<Room, ApiError> {
        let request = self.codec.build_add_participants(room_id, participants)?;
        self.codec.parse_room(self.execute(request)?)
    }

    #[instrument(
        level = "debug",
        skip(self, participants),
        fields(count = participants.len()),
        err
    )]
    pub fn update_participants(
        &self,
        room_id: &str,
        participants: &[Participant],
    ) -> Result<Room, ApiError> {
        let request = self.codec.build_update_participants(room_id, participants)?;
        self.codec.parse_room(self.execute(request)?)
    }

    #[instrument(level = "debug", skip(self, identifiers), fields(count = identifiers.len()), err)]
    pub fn remove_participants(
        &self,
        room_id: &str,
        identifiers: &[CommunicationIdentifier],
    ) -> Result<Room, ApiError> {
        let request = self.codec.build_remove_participants(room_id, identifiers)?;
        self.codec.parse_room(self.execute(request)?)
    }

    #[instrument(level = "debug", skip(self), err)]
    pub fn remove_all_participants(&self, room_id: &str) -> Result<Room, ApiError> {
        let request = self.codec.build_remove_all_participants(room_id)?;
        self.codec.parse_room(self.execute(request)?)
    }

    fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.auth.apply(&mut request)?;
        self.transport.send(request)
    }
}
