use buster_socket::SocketError;
use buster_socket::dispatch::{ErrorCallback, RouteCallback, RouteDispatcher, RouteListener};
use buster_socket::frame::{InboundFrame, OutboundFrame, RemoteError, RemoteErrorCode};
use futures::FutureExt;
use futures::executor::block_on;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

fn recording_dispatcher() -> (RouteDispatcher, Arc<Mutex<Vec<String>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = RouteDispatcher::new({
        let sent = sent.clone();
        move |text: String| {
            sent.lock().unwrap().push(text);
            Ok(())
        }
    });
    (dispatcher, sent)
}

fn recording_callback(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> RouteCallback {
    let log = log.clone();
    let tag = tag.to_string();
    RouteCallback::new(move |payload: &Value| {
        log.lock().unwrap().push(format!("{tag}:{payload}"));
    })
}

#[test]
fn dispatch_invokes_every_listener_once_in_registration_order() {
    let (dispatcher, _) = recording_dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));

    for tag in ["a", "b", "c"] {
        dispatcher.on(RouteListener::new(
            "/threads/list:getThreadsList",
            recording_callback(&log, tag),
        ));
    }

    let delivered = dispatcher.dispatch(&InboundFrame::new(
        "/threads/list:getThreadsList",
        json!([1]),
    ));

    assert_eq!(delivered, 3);
    assert_eq!(*log.lock().unwrap(), vec!["a:[1]", "b:[1]", "c:[1]"]);
}

#[test]
fn frames_for_other_routes_are_not_delivered() {
    let (dispatcher, _) = recording_dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));

    dispatcher.on(RouteListener::new("/search:search", recording_callback(&log, "a")));

    assert_eq!(
        dispatcher.dispatch(&InboundFrame::new("/threads/list:getThreadsList", json!(1))),
        0
    );
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn off_removes_only_the_exact_callback() {
    let (dispatcher, _) = recording_dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));

    let removed = recording_callback(&log, "removed");
    // Same closure body, different identity.
    let kept = recording_callback(&log, "removed");

    dispatcher.on(RouteListener::new("/search:search", removed.clone()));
    dispatcher.on(RouteListener::new("/search:search", kept));

    assert!(dispatcher.off("/search:search", &removed));
    assert!(!dispatcher.off("/search:search", &removed));
    assert_eq!(dispatcher.listener_count("/search:search"), 1);

    dispatcher.dispatch(&InboundFrame::new("/search:search", json!("x")));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn off_on_unknown_route_is_a_no_op() {
    let (dispatcher, _) = recording_dispatcher();
    let callback = RouteCallback::new(|_| {});
    assert!(!dispatcher.off("/nowhere", &callback));
}

#[test]
fn frame_event_is_joined_to_route_for_dispatch() {
    let (dispatcher, _) = recording_dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));

    dispatcher.on(RouteListener::new(
        "/threads/get:fetchingData",
        recording_callback(&log, "fetching"),
    ));

    let frame = InboundFrame::new("/threads/get", json!({"progress": "inProgress"}))
        .with_event("fetchingData");
    assert_eq!(dispatcher.dispatch(&frame), 1);
}

#[test]
fn search_scenario_delivers_result_array() {
    let (dispatcher, sent) = recording_dispatcher();
    let received = Arc::new(Mutex::new(Vec::<Value>::new()));

    dispatcher.on(RouteListener::from_fn("/search:search", {
        let received = received.clone();
        move |payload: &Value| received.lock().unwrap().push(payload.clone())
    }));

    dispatcher.emit("/search", json!({"query": "x"})).unwrap();

    let sent_frame: OutboundFrame = serde_json::from_str(&sent.lock().unwrap()[0]).unwrap();
    assert_eq!(sent_frame.route, "/search");
    assert_eq!(sent_frame.payload, json!({"query": "x"}));

    let results = json!([{
        "id": "1",
        "name": "Foo",
        "highlights": [],
        "updated_at": "",
        "type": "thread",
        "score": 0.9
    }]);
    let raw = json!({"route": "/search:search", "data": results}).to_string();
    let frame = match buster_socket::frame::decode_frame(&raw) {
        buster_socket::frame::DecodeOutcome::Parsed { frame, .. } => frame,
        other => panic!("unexpected decode outcome: {other:?}"),
    };

    dispatcher.dispatch(&frame);

    assert_eq!(*received.lock().unwrap(), vec![results]);
}

#[test]
fn emit_and_once_resolves_and_removes_listener() {
    let (dispatcher, sent) = recording_dispatcher();
    let seen = Arc::new(Mutex::new(0));

    let future = dispatcher
        .emit_and_once(
            OutboundFrame::new("/data_sources/get", json!({"id": "abc"})).unwrap(),
            RouteListener::from_fn("/data_sources/get:getDataSource", {
                let seen = seen.clone();
                move |_| *seen.lock().unwrap() += 1
            }),
        )
        .unwrap();

    assert_eq!(sent.lock().unwrap().len(), 1);
    assert_eq!(dispatcher.pending_count(), 1);

    let payload = json!({"id": "abc", "name": "warehouse"});
    let frame = InboundFrame::new("/data_sources/get:getDataSource", payload.clone());

    assert_eq!(dispatcher.dispatch(&frame), 1);
    assert_eq!(block_on(future), Ok(payload));

    // Second identical frame: nobody is listening any more.
    assert_eq!(dispatcher.dispatch(&frame), 0);
    assert_eq!(*seen.lock().unwrap(), 1);
    assert_eq!(dispatcher.listener_count("/data_sources/get:getDataSource"), 0);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn emit_and_once_settles_once_when_two_frames_arrive_before_polling() {
    let (dispatcher, _) = recording_dispatcher();

    let future = dispatcher
        .emit_and_once(
            OutboundFrame::new("/threads/list", json!({"page": 0})).unwrap(),
            RouteListener::from_fn("/threads/list:getThreadsList", |_| {}),
        )
        .unwrap();

    dispatcher.dispatch(&InboundFrame::new("/threads/list:getThreadsList", json!("first")));
    dispatcher.dispatch(&InboundFrame::new("/threads/list:getThreadsList", json!("second")));

    assert_eq!(block_on(future), Ok(json!("first")));
}

#[test]
fn persistent_listeners_survive_a_once_delivery() {
    let (dispatcher, _) = recording_dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));

    dispatcher.on(RouteListener::new("/search:search", recording_callback(&log, "on")));
    let future = dispatcher.once(RouteListener::from_fn("/search:search", |_| {}));

    assert_eq!(dispatcher.dispatch(&InboundFrame::new("/search:search", json!(1))), 2);
    assert_eq!(block_on(future), Ok(json!(1)));
    assert_eq!(dispatcher.dispatch(&InboundFrame::new("/search:search", json!(2))), 1);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[test]
fn remote_error_rejects_and_invokes_on_error() {
    let (dispatcher, _) = recording_dispatcher();
    let errors = Arc::new(Mutex::new(Vec::new()));

    let future = dispatcher
        .emit_and_once(
            OutboundFrame::new("/data_sources/get", json!({"id": "missing"})).unwrap(),
            RouteListener::from_fn("/data_sources/get:getDataSource", |_| {})
                .with_on_error_fn({
                    let errors = errors.clone();
                    move |e: &SocketError| errors.lock().unwrap().push(e.clone())
                }),
        )
        .unwrap();

    let remote = RemoteError {
        code: RemoteErrorCode::NotFound,
        message: "Data source not found".to_string(),
    };
    dispatcher.dispatch(
        &InboundFrame::new("/data_sources/get:getDataSource", Value::Null)
            .with_error(remote.clone()),
    );

    assert_eq!(block_on(future), Err(SocketError::Remote(remote.clone())));
    assert_eq!(*errors.lock().unwrap(), vec![SocketError::Remote(remote)]);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn remote_error_without_on_error_goes_to_fallback_handler() {
    let (dispatcher, _) = recording_dispatcher();
    let fallback = Arc::new(Mutex::new(Vec::new()));

    dispatcher.set_fallback_error_handler(ErrorCallback::new({
        let fallback = fallback.clone();
        move |e: &SocketError| fallback.lock().unwrap().push(e.clone())
    }));

    let delivered = Arc::new(Mutex::new(false));
    dispatcher.on(RouteListener::from_fn("/users/list:listUsers", {
        let delivered = delivered.clone();
        move |_| *delivered.lock().unwrap() = true
    }));

    let remote = RemoteError {
        code: RemoteErrorCode::Unauthorized,
        message: String::new(),
    };
    dispatcher
        .dispatch(&InboundFrame::new("/users/list:listUsers", Value::Null).with_error(remote));

    assert!(!*delivered.lock().unwrap());
    assert_eq!(fallback.lock().unwrap().len(), 1);
}

#[test]
fn dropping_response_future_unregisters_listener() {
    let (dispatcher, _) = recording_dispatcher();

    let future = dispatcher
        .emit_and_once(
            OutboundFrame::new("/search", json!({"query": "q"})).unwrap(),
            RouteListener::from_fn("/search:search", |_| panic!("cancelled listener invoked")),
        )
        .unwrap();

    assert_eq!(dispatcher.listener_count("/search:search"), 1);
    drop(future);

    assert_eq!(dispatcher.listener_count("/search:search"), 0);
    assert_eq!(dispatcher.pending_count(), 0);
    assert_eq!(dispatcher.dispatch(&InboundFrame::new("/search:search", json!([]))), 0);
}

#[test]
fn reject_all_pending_keeps_persistent_listeners() {
    let (dispatcher, _) = recording_dispatcher();

    dispatcher.on(RouteListener::from_fn("/threads/get:fetchingData", |_| {}));
    let first = dispatcher.once(RouteListener::from_fn("/search:search", |_| {}));
    let second = dispatcher
        .emit_and_once(
            OutboundFrame::new("/threads/list", json!({})).unwrap(),
            RouteListener::from_fn("/threads/list:getThreadsList", |_| {}),
        )
        .unwrap();

    assert_eq!(dispatcher.reject_all_pending(SocketError::Disconnected), 2);

    assert_eq!(block_on(first), Err(SocketError::Disconnected));
    assert_eq!(block_on(second), Err(SocketError::Disconnected));
    assert_eq!(dispatcher.listener_count("/threads/get:fetchingData"), 1);
    assert_eq!(dispatcher.listener_count("/search:search"), 0);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn failed_emit_leaves_no_pending_request() {
    let dispatcher =
        RouteDispatcher::new(|_| Err(SocketError::Transport("socket closed".to_string())));

    let result = dispatcher.emit_and_once(
        OutboundFrame::new("/search", json!({"query": "q"})).unwrap(),
        RouteListener::from_fn("/search:search", |_| {}),
    );

    assert!(matches!(result, Err(SocketError::Transport(_))));
    assert_eq!(dispatcher.pending_count(), 0);
    assert_eq!(dispatcher.listener_count("/search:search"), 0);
}

#[test]
fn panicking_listener_does_not_stop_later_listeners() {
    let (dispatcher, _) = recording_dispatcher();
    let log = Arc::new(Mutex::new(Vec::new()));
    let fallback = Arc::new(Mutex::new(Vec::new()));

    dispatcher.set_fallback_error_handler(ErrorCallback::new({
        let fallback = fallback.clone();
        move |e: &SocketError| fallback.lock().unwrap().push(e.clone())
    }));

    dispatcher.on(RouteListener::from_fn("/search:search", |_| panic!("boom")));
    dispatcher.on(RouteListener::new("/search:search", recording_callback(&log, "after")));

    assert_eq!(dispatcher.dispatch(&InboundFrame::new("/search:search", json!(1))), 2);
    assert_eq!(*log.lock().unwrap(), vec!["after:1"]);
    assert_eq!(
        *fallback.lock().unwrap(),
        vec![SocketError::CallbackPanicked {
            route: "/search:search".to_string()
        }]
    );
}

#[test]
fn decode_error_informs_outstanding_requests_without_settling() {
    let (dispatcher, _) = recording_dispatcher();
    let errors = Arc::new(Mutex::new(0));

    let future = dispatcher.once(
        RouteListener::from_fn("/search:search", |_| {}).with_on_error_fn({
            let errors = errors.clone();
            move |_| *errors.lock().unwrap() += 1
        }),
    );
    // Requests without their own error callback are skipped.
    let _silent = dispatcher.once(RouteListener::from_fn("/threads/list:getThreadsList", |_| {}));

    let invoked = dispatcher.handle_decode_error(
        &buster_socket::frame::FrameDecodeError::MalformedJson("eof".to_string()),
    );

    assert_eq!(invoked, 1);
    assert_eq!(*errors.lock().unwrap(), 1);
    assert_eq!(dispatcher.pending_count(), 2);

    let mut future = future;
    assert!((&mut future).now_or_never().is_none());

    dispatcher.dispatch(&InboundFrame::new("/search:search", json!("late")));
    assert_eq!(block_on(future), Ok(json!("late")));
}

#[test]
fn listener_may_remove_itself_while_handling_a_frame() {
    let (dispatcher, _) = recording_dispatcher();
    let dispatcher = Arc::new(dispatcher);
    let calls = Arc::new(Mutex::new(0));

    let slot: Arc<Mutex<Option<RouteCallback>>> = Arc::new(Mutex::new(None));
    let callback = RouteCallback::new({
        let dispatcher = Arc::downgrade(&dispatcher);
        let slot = slot.clone();
        let calls = calls.clone();
        move |_| {
            *calls.lock().unwrap() += 1;
            if let (Some(dispatcher), Some(me)) = (dispatcher.upgrade(), slot.lock().unwrap().clone()) {
                dispatcher.off("/search:search", &me);
            }
        }
    });
    *slot.lock().unwrap() = Some(callback.clone());

    dispatcher.on(RouteListener::new("/search:search", callback));

    dispatcher.dispatch(&InboundFrame::new("/search:search", json!(1)));
    dispatcher.dispatch(&InboundFrame::new("/search:search", json!(2)));

    assert_eq!(*calls.lock().unwrap(), 1);
}

#[test]
fn dropping_dispatcher_aborts_outstanding_requests() {
    let (dispatcher, _) = recording_dispatcher();
    let future = dispatcher.once(RouteListener::from_fn("/search:search", |_| {}));

    drop(dispatcher);

    assert_eq!(block_on(future), Err(SocketError::Aborted));
}
