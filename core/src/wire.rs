//! JSON bodies exchanged with the rooms service.
//!
//! Field names are camelCase on the wire. Optional request fields are omitted
//! when `None` so that a partial update only carries what the caller set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifier::CommunicationCloudEnvironment;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomWire {
    #[serde(default)]
    pub id: String,
    pub created_date_time: Option<DateTime<Utc>>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub room_open: Option<bool>,
    /// Keyed by raw identifier.
    pub participants: Option<BTreeMap<String, ParticipantEntryWire>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ParticipantEntryWire {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ParticipantsWire {
    #[serde(default)]
    pub participants: BTreeMap<String, ParticipantEntryWire>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRoomRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ParticipantFragment>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateRoomRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_open: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ParticipantFragment>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ParticipantsRequest {
    pub participants: Vec<ParticipantFragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ParticipantFragment {
    pub communication_identifier: CommunicationIdentifierModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Union on the wire: `raw_id` plus at most one kind-specific field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommunicationIdentifierModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_user: Option<CommunicationUserModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumberModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microsoft_teams_user: Option<MicrosoftTeamsUserModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CommunicationUserModel {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PhoneNumberModel {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MicrosoftTeamsUserModel {
    pub user_id: String,
    pub is_anonymous: bool,
    pub cloud: CommunicationCloudEnvironment,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
}
