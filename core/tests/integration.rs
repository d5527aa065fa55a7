//! Full room lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every facade
//! operation over real HTTP through `UreqTransport`, so request building,
//! signing, transport and response translation are exercised end to end.

use chrono::{TimeZone, Utc};
use rooms_core::{
    ApiError, CommunicationIdentifier, CreateRoomOptions, Credential, Participant, RoomsClient,
    UpdateRoomOptions, UreqTransport,
};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn room_lifecycle() {
    let endpoint = start_server();
    let client = RoomsClient::new(
        &endpoint,
        Credential::Token("integration-token".to_string()),
        UreqTransport::new(),
    )
    .unwrap();

    let alice = CommunicationIdentifier::user("8:acs:alice");
    let bob = CommunicationIdentifier::user("8:acs:bob");
    let carol = CommunicationIdentifier::phone_number("+14255550123");

    // Step 1: create with a window and one participant without a role.
    let valid_from = Utc.with_ymd_and_hms(2030, 2, 25, 4, 34, 0).unwrap();
    let valid_until = Utc.with_ymd_and_hms(2030, 4, 25, 4, 34, 0).unwrap();
    let created = client
        .create_room(&CreateRoomOptions {
            valid_from: Some(valid_from),
            valid_until: Some(valid_until),
            room_open: None,
            participants: Some(vec![Participant::new(alice.clone())]),
        })
        .unwrap();
    assert!(!created.id.is_empty());
    let id = created.id.clone();

    // Step 2: get returns the same room, with the server's default role.
    let fetched = client.get_room(&id).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.valid_from, Some(valid_from));
    assert_eq!(fetched.valid_until, Some(valid_until));
    assert_eq!(
        fetched.participants,
        Some(vec![Participant::with_role(alice.clone(), Participant::ATTENDEE)])
    );

    // Step 3: partial update leaves other fields alone.
    let updated = client
        .update_room(
            &id,
            &UpdateRoomOptions {
                room_open: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.room_open, Some(true));
    assert_eq!(updated.valid_from, Some(valid_from));
    assert_eq!(updated.participants, fetched.participants);

    // Step 4: add two more participants.
    let added = client
        .add_participants(
            &id,
            &[
                Participant::with_role(bob.clone(), Participant::PRESENTER),
                Participant::with_role(carol.clone(), Participant::CONSUMER),
            ],
        )
        .unwrap();
    assert_eq!(added.participants.as_ref().map(Vec::len), Some(3));

    // Step 5: change a role.
    let changed = client
        .update_participants(&id, &[Participant::with_role(alice.clone(), Participant::PRESENTER)])
        .unwrap();
    let alice_entry = changed
        .participants
        .unwrap()
        .into_iter()
        .find(|p| p.identifier == alice)
        .unwrap();
    assert_eq!(alice_entry.role.as_deref(), Some(Participant::PRESENTER));

    // Step 6: remove by identifier; the phone number comes back typed.
    let removed = client.remove_participants(&id, &[bob.clone()]).unwrap();
    let remaining = removed.participants.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|p| p.identifier != bob));
    assert!(remaining
        .iter()
        .any(|p| p.identifier.raw_id() == carol.raw_id()));

    let listed = client.list_participants(&id).unwrap();
    assert_eq!(listed, remaining);

    // Step 7: remove everyone. The list is empty, not absent.
    let cleared = client.remove_all_participants(&id).unwrap();
    assert_eq!(cleared.participants, Some(Vec::new()));

    // Step 8: delete, then the room is gone.
    client.delete_room(&id).unwrap();
    let err = client.get_room(&id).unwrap_err();
    assert!(err.is_not_found());
    let err = client.delete_room(&id).unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 404, .. }));
}

#[test]
fn shared_key_client_is_accepted() {
    let endpoint = start_server();
    let conn_str = format!("endpoint={endpoint};accesskey=c2VjcmV0LWtleQ==");
    let client = RoomsClient::from_connection_string(&conn_str, UreqTransport::new()).unwrap();

    let room = client.create_room(&CreateRoomOptions::default()).unwrap();
    assert_eq!(room.participants, Some(Vec::new()));
    assert_eq!(room.room_open, Some(false));
}

#[test]
fn inverted_window_surfaces_as_http_400() {
    let endpoint = start_server();
    let client =
        RoomsClient::new(&endpoint, Credential::Token("t".to_string()), UreqTransport::new())
            .unwrap();

    let err = client
        .create_room(&CreateRoomOptions {
            valid_from: Some(Utc.with_ymd_and_hms(2030, 4, 25, 0, 0, 0).unwrap()),
            valid_until: Some(Utc.with_ymd_and_hms(2030, 2, 25, 0, 0, 0).unwrap()),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let client = RoomsClient::new(
        &format!("http://{addr}"),
        Credential::Token("t".to_string()),
        UreqTransport::new(),
    )
    .unwrap();

    let err = client.get_room("1").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
