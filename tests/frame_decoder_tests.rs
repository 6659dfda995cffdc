use buster_socket::frame::{
    DecodeOutcome, FrameDecodeError, InboundFrame, OutboundFrame, RemoteErrorCode, decode_frame,
    decode_frame_bytes,
};
use serde_json::json;

#[test]
fn malformed_json_yields_error_outcome() {
    for raw in ["", "{", "{\"route\": ", "not json", "[1, 2", "\u{0}"] {
        match decode_frame(raw) {
            DecodeOutcome::Error {
                error: FrameDecodeError::MalformedJson(_),
            } => {}
            other => panic!("expected malformed JSON error for {raw:?}, got {other:?}"),
        }
    }
}

#[test]
fn non_object_and_routeless_frames_are_rejected() {
    assert_eq!(
        decode_frame("[1, 2, 3]"),
        DecodeOutcome::Error {
            error: FrameDecodeError::NotAnObject
        }
    );
    assert_eq!(
        decode_frame(r#"{"payload": {}}"#),
        DecodeOutcome::Error {
            error: FrameDecodeError::MissingRoute
        }
    );
    assert_eq!(
        decode_frame(r#"{"route": 42}"#),
        DecodeOutcome::Error {
            error: FrameDecodeError::MissingRoute
        }
    );
    assert_eq!(
        decode_frame(r#"{"route": ""}"#),
        DecodeOutcome::Error {
            error: FrameDecodeError::MissingRoute
        }
    );
}

#[test]
fn parsed_outcome_keeps_original_text() {
    let raw = r#"{"route":"/threads/get","event":"fetchingData","payload":{"id":"t1"}}"#;

    match decode_frame(raw) {
        DecodeOutcome::Parsed { frame, raw: og } => {
            assert_eq!(og, raw);
            assert_eq!(frame.dispatch_key(), "/threads/get:fetchingData");
            assert_eq!(frame.payload, json!({"id": "t1"}));
            assert!(frame.error.is_none());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn backend_response_message_decodes_with_error_and_sender() {
    let raw = json!({
        "route": "/permissions/users/get",
        "event": "getUserPermissions",
        "payload": null,
        "sent_by": {"id": "9b1c", "name": "Ada"},
        "error": {"code": "UNAUTHORIZED", "message": "nope"},
        "send_method": "SenderOnly"
    })
    .to_string();

    let DecodeOutcome::Parsed { frame, .. } = decode_frame(&raw) else {
        panic!("expected parsed frame");
    };

    assert_eq!(frame.dispatch_key(), "/permissions/users/get:getUserPermissions");
    assert_eq!(frame.error.as_ref().map(|e| e.code), Some(RemoteErrorCode::Unauthorized));
    assert_eq!(frame.sent_by.map(|s| s.name), Some("Ada".to_string()));
}

#[test]
fn unknown_error_codes_are_tolerated() {
    let raw = r#"{"route":"/search","event":"search","error":{"code":"TEAPOT","message":"?"}}"#;
    let DecodeOutcome::Parsed { frame, .. } = decode_frame(raw) else {
        panic!("expected parsed frame");
    };
    assert_eq!(frame.error.map(|e| e.code), Some(RemoteErrorCode::Unknown));
}

#[test]
fn empty_event_falls_back_to_bare_route() {
    let frame = InboundFrame::new("/search:search", json!([])).with_event("");
    assert_eq!(frame.dispatch_key(), "/search:search");
}

#[test]
fn binary_frames_must_be_utf8() {
    assert!(decode_frame_bytes(br#"{"route":"/search:search","data":[]}"#).is_parsed());
    assert_eq!(
        decode_frame_bytes(&[0xff, 0xfe, 0x00]),
        DecodeOutcome::Error {
            error: FrameDecodeError::InvalidUtf8
        }
    );
}

#[test]
fn outbound_frame_wire_shape() {
    let frame = OutboundFrame::new("/data_sources/get", json!({"id": "abc"})).unwrap();
    let value: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
    assert_eq!(value, json!({"route": "/data_sources/get", "payload": {"id": "abc"}}));
}
