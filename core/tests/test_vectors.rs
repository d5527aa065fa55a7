//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Request vectors pin method, path, content type and body for every
//! operation. Response vectors pin how status and body translate into a
//! `Room` or an `ApiError`. Bodies are compared as parsed JSON so field order
//! does not matter.

use chrono::{DateTime, Utc};
use rooms_core::{
    ApiError, CommunicationIdentifier, HttpMethod, HttpRequest, HttpResponse, Participant, Room,
    RoomsCodec, UpdateRoomOptions,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";
const API_VERSION: &str = "2023-03-31-preview";

fn codec() -> RoomsCodec {
    RoomsCodec::new(BASE_URL, API_VERSION)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn participants(input: &Value) -> Vec<Participant> {
    input["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| Participant {
            identifier: CommunicationIdentifier::from_raw_id(p["raw_id"].as_str().unwrap()),
            role: p["role"].as_str().map(str::to_string),
        })
        .collect()
}

fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().map(|s| s.parse().unwrap())
}

fn build(case: &Value) -> HttpRequest {
    let c = codec();
    let room_id = case["room_id"].as_str().unwrap();
    let input = &case["input"];
    let request = match case["operation"].as_str().unwrap() {
        "get_room" => c.build_get_room(room_id),
        "delete_room" => c.build_delete_room(room_id),
        "list_participants" => c.build_list_participants(room_id),
        "update_room" => {
            let options = UpdateRoomOptions {
                valid_from: timestamp(&input["valid_from"]),
                valid_until: timestamp(&input["valid_until"]),
                room_open: input["room_open"].as_bool(),
                participants: input.get("participants").map(|_| participants(input)),
            };
            c.build_update_room(room_id, &options)
        }
        "remove_all_participants" => c.build_remove_all_participants(room_id),
        "add_participants" => c.build_add_participants(room_id, &participants(input)),
        "update_participants" => c.build_update_participants(room_id, &participants(input)),
        "remove_participants" => {
            let ids: Vec<CommunicationIdentifier> =
                participants(input).into_iter().map(|p| p.identifier).collect();
            c.build_remove_participants(room_id, &ids)
        }
        other => panic!("unknown operation: {other}"),
    };
    request.unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(case);

        assert_eq!(
            req.method,
            parse_method(expected["method"].as_str().unwrap()),
            "{name}: method"
        );
        assert_eq!(
            req.url,
            format!("{BASE_URL}{}?api-version={API_VERSION}", expected["path"].as_str().unwrap()),
            "{name}: url"
        );
        assert_eq!(
            req.header("content-type"),
            expected["content_type"].as_str(),
            "{name}: content type"
        );

        let body: Option<Value> = req.body.as_deref().map(|b| serde_json::from_str(b).unwrap());
        match expected["body"] {
            Value::Null => assert!(body.is_none(), "{name}: expected no body"),
            ref expected_body => assert_eq!(body.as_ref(), Some(expected_body), "{name}: body"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn assert_room_matches(name: &str, room: &Room, expected: &Value) {
    assert_eq!(room.id, expected["id"].as_str().unwrap(), "{name}: id");
    assert_eq!(
        room.valid_from.map(|t| t.to_rfc3339()).as_deref(),
        expected["valid_from"].as_str(),
        "{name}: valid_from"
    );
    assert_eq!(
        room.valid_until.map(|t| t.to_rfc3339()).as_deref(),
        expected["valid_until"].as_str(),
        "{name}: valid_until"
    );
    assert_eq!(room.room_open, expected["room_open"].as_bool(), "{name}: room_open");

    match &expected["participants"] {
        Value::Null => {
            assert!(room.participants.is_none(), "{name}: participants should be absent")
        }
        Value::Array(entries) => {
            let actual = room.participants.as_ref().unwrap();
            assert_eq!(actual.len(), entries.len(), "{name}: participant count");
            for entry in entries {
                let raw_id = entry["raw_id"].as_str().unwrap();
                let found = actual
                    .iter()
                    .find(|p| p.identifier.raw_id() == raw_id)
                    .unwrap_or_else(|| panic!("{name}: missing {raw_id}"));
                assert_eq!(
                    found.role.as_deref(),
                    entry["role"].as_str(),
                    "{name}: role of {raw_id}"
                );
            }
        }
        other => panic!("{name}: bad expectation {other}"),
    }
}

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = codec();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: sim["body"].as_str().unwrap().to_string(),
        };

        match c.parse_room(response) {
            Ok(room) => assert_room_matches(name, &room, &case["expected_result"]),
            Err(ApiError::Http { status, code, message }) => {
                let expected = &case["expected_error"];
                assert_eq!(
                    u64::from(status),
                    expected["status"].as_u64().unwrap(),
                    "{name}: status"
                );
                assert_eq!(code.as_deref(), expected["code"].as_str(), "{name}: code");
                assert_eq!(message, expected["message"].as_str().unwrap(), "{name}: message");
            }
            Err(other) => panic!("{name}: unexpected error {other:?}"),
        }
    }
}
