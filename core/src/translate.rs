//! Conversion between the wire shapes and the domain model.

use std::collections::BTreeMap;

use crate::identifier::CommunicationIdentifier;
use crate::model::{Participant, Room};
use crate::wire::{
    CommunicationIdentifierModel, CommunicationUserModel, MicrosoftTeamsUserModel,
    ParticipantEntryWire, ParticipantFragment, PhoneNumberModel, RoomWire,
};

/// Keeps an absent participant map absent rather than collapsing it to an
/// empty list.
pub(crate) fn room_from_wire(wire: RoomWire) -> Room {
    Room {
        id: wire.id,
        created_at: wire.created_date_time,
        valid_from: wire.valid_from,
        valid_until: wire.valid_until,
        room_open: wire.room_open,
        participants: wire.participants.map(participants_from_wire),
    }
}

pub(crate) fn participants_from_wire(
    participants: BTreeMap<String, ParticipantEntryWire>,
) -> Vec<Participant> {
    participants
        .into_iter()
        .map(|(raw_id, entry)| Participant {
            identifier: CommunicationIdentifier::from_raw_id(&raw_id),
            role: entry.role,
        })
        .collect()
}

pub(crate) fn participant_to_wire(participant: &Participant) -> ParticipantFragment {
    ParticipantFragment {
        communication_identifier: identifier_to_wire(&participant.identifier),
        role: participant.role.clone(),
    }
}

/// A fragment naming only the identity, as used by removals.
pub(crate) fn identifier_fragment(identifier: &CommunicationIdentifier) -> ParticipantFragment {
    ParticipantFragment {
        communication_identifier: identifier_to_wire(identifier),
        role: None,
    }
}

pub(crate) fn identifier_to_wire(
    identifier: &CommunicationIdentifier,
) -> CommunicationIdentifierModel {
    let raw_id = Some(identifier.raw_id());
    match identifier {
        CommunicationIdentifier::CommunicationUser { id } => CommunicationIdentifierModel {
            raw_id,
            communication_user: Some(CommunicationUserModel { id: id.clone() }),
            ..Default::default()
        },
        CommunicationIdentifier::PhoneNumber { value, .. } => CommunicationIdentifierModel {
            raw_id,
            phone_number: Some(PhoneNumberModel {
                value: value.clone(),
            }),
            ..Default::default()
        },
        CommunicationIdentifier::MicrosoftTeamsUser {
            user_id,
            is_anonymous,
            cloud,
            ..
        } => CommunicationIdentifierModel {
            raw_id,
            microsoft_teams_user: Some(MicrosoftTeamsUserModel {
                user_id: user_id.clone(),
                is_anonymous: *is_anonymous,
                cloud: *cloud,
            }),
            ..Default::default()
        },
        CommunicationIdentifier::Unknown { .. } => CommunicationIdentifierModel {
            raw_id,
            ..Default::default()
        },
    }
}
