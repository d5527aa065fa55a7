//! Communication identifiers: who a participant is.
//!
//! Every identifier has a raw id, the canonical string the service uses as
//! the key of a room's participant map. `from_raw_id` recovers the typed
//! variant from that key.

use std::fmt;

use serde::{Deserialize, Serialize};

const PHONE_NUMBER_PREFIX: &str = "4:";
const TEAMS_ANONYMOUS_PREFIX: &str = "8:teamsvisitor:";
const TEAMS_PUBLIC_PREFIX: &str = "8:orgid:";
const TEAMS_DOD_PREFIX: &str = "8:dod:";
const TEAMS_GCCH_PREFIX: &str = "8:gcch:";
const USER_PREFIXES: [&str; 4] = ["8:acs:", "8:spool:", "8:dod-acs:", "8:gcch-acs:"];

/// Cloud a Teams identity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommunicationCloudEnvironment {
    #[default]
    Public,
    Dod,
    Gcch,
}

/// A participant identity. Exactly one kind per value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommunicationIdentifier {
    /// A user created through the identity service. `id` is its raw id.
    CommunicationUser { id: String },

    /// A phone number in E.164 format.
    PhoneNumber { value: String, raw_id: Option<String> },

    MicrosoftTeamsUser {
        user_id: String,
        is_anonymous: bool,
        cloud: CommunicationCloudEnvironment,
        raw_id: Option<String>,
    },

    /// Anything this client does not recognise; kept verbatim.
    Unknown { id: String },
}

impl CommunicationIdentifier {
    pub fn user(id: impl Into<String>) -> Self {
        CommunicationIdentifier::CommunicationUser { id: id.into() }
    }

    pub fn phone_number(value: impl Into<String>) -> Self {
        CommunicationIdentifier::PhoneNumber {
            value: value.into(),
            raw_id: None,
        }
    }

    pub fn teams_user(user_id: impl Into<String>, cloud: CommunicationCloudEnvironment) -> Self {
        CommunicationIdentifier::MicrosoftTeamsUser {
            user_id: user_id.into(),
            is_anonymous: false,
            cloud,
            raw_id: None,
        }
    }

    pub fn unknown(id: impl Into<String>) -> Self {
        CommunicationIdentifier::Unknown { id: id.into() }
    }

    /// The canonical string form, derived from the variant's fields when no
    /// explicit raw id was recorded.
    pub fn raw_id(&self) -> String {
        match self {
            CommunicationIdentifier::CommunicationUser { id } => id.clone(),
            CommunicationIdentifier::PhoneNumber { value, raw_id } => raw_id
                .clone()
                .unwrap_or_else(|| format!("{PHONE_NUMBER_PREFIX}{value}")),
            CommunicationIdentifier::MicrosoftTeamsUser {
                user_id,
                is_anonymous,
                cloud,
                raw_id,
            } => raw_id.clone().unwrap_or_else(|| {
                let prefix = if *is_anonymous {
                    TEAMS_ANONYMOUS_PREFIX
                } else {
                    match cloud {
                        CommunicationCloudEnvironment::Public => TEAMS_PUBLIC_PREFIX,
                        CommunicationCloudEnvironment::Dod => TEAMS_DOD_PREFIX,
                        CommunicationCloudEnvironment::Gcch => TEAMS_GCCH_PREFIX,
                    }
                };
                format!("{prefix}{user_id}")
            }),
            CommunicationIdentifier::Unknown { id } => id.clone(),
        }
    }

    /// Parse a raw id into its typed variant. Never fails; unrecognised
    /// prefixes become `Unknown`.
    pub fn from_raw_id(raw_id: &str) -> Self {
        if let Some(value) = raw_id.strip_prefix(PHONE_NUMBER_PREFIX) {
            return CommunicationIdentifier::PhoneNumber {
                value: value.to_string(),
                raw_id: Some(raw_id.to_string()),
            };
        }

        let teams = [
            (TEAMS_ANONYMOUS_PREFIX, true, CommunicationCloudEnvironment::Public),
            (TEAMS_PUBLIC_PREFIX, false, CommunicationCloudEnvironment::Public),
            (TEAMS_DOD_PREFIX, false, CommunicationCloudEnvironment::Dod),
            (TEAMS_GCCH_PREFIX, false, CommunicationCloudEnvironment::Gcch),
        ];
        for (prefix, is_anonymous, cloud) in teams {
            if let Some(user_id) = raw_id.strip_prefix(prefix) {
                return CommunicationIdentifier::MicrosoftTeamsUser {
                    user_id: user_id.to_string(),
                    is_anonymous,
                    cloud,
                    raw_id: Some(raw_id.to_string()),
                };
            }
        }

        if USER_PREFIXES.iter().any(|prefix| raw_id.starts_with(prefix)) {
            return CommunicationIdentifier::user(raw_id);
        }

        CommunicationIdentifier::unknown(raw_id)
    }
}

impl fmt::Display for CommunicationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_id())
    }
}
