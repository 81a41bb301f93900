//! Dispatch scenarios against an in-process transport.
//!
//! # Design
//! `MockTransport` records every request it receives and answers either
//! from a scripted reply or by echoing the request body back. This lets the
//! tests drive the whole pipeline (build, send, validate, decode) without a
//! socket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courier_core::{
    Bytes, CachePolicy, DecodeAs, Error, ErrorKind, ErrorStatus, FormCodec, HttpMethod, HttpRequest,
    HttpResponse, Session, SessionConfig, StatusClass, SuccessStatus, Transport, TransportError,
    TransportErrorKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NewItem {
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Item {
    id: u64,
    name: String,
}

enum Reply {
    Respond(HttpResponse),
    Echo,
    Fail(TransportError),
}

struct MockTransport {
    reply: Reply,
    seen: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn respond(status: u16, body: &'static str) -> Arc<Self> {
        Self::new(Reply::Respond(HttpResponse::new(status, body)))
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = request.body.clone().unwrap_or_default();
        self.seen.lock().unwrap().push(request);
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Echo => Ok(HttpResponse::new(200, body)),
            Reply::Fail(error) => Err(error.clone()),
        }
    }
}

fn session(transport: &Arc<MockTransport>) -> Session {
    Session::with_transport(transport.clone())
        .with_base_url("http://api.test/v1")
        .unwrap()
}

#[tokio::test]
async fn typed_post_created() {
    let transport = MockTransport::respond(201, r#"{"id":1,"name":"a"}"#);
    let envelope = session(&transport)
        .request_path("items")
        .unwrap()
        .body(&NewItem { name: "a".to_string() })
        .post_as(DecodeAs::<Item>::new())
        .await;

    assert!(envelope.is_success());
    assert_eq!(envelope.data(), Some(&Item { id: 1, name: "a".to_string() }));
    assert_eq!(envelope.status().map(StatusClass::code), Some(201));
    assert!(envelope.error().is_none());

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].url.as_str(), "http://api.test/v1/items");
    assert_eq!(sent[0].header("content-type"), Some("application/json"));
    assert_eq!(sent[0].body.as_deref(), Some(&br#"{"name":"a"}"#[..]));
}

#[tokio::test]
async fn not_found_with_empty_body() {
    let transport = MockTransport::respond(404, "");
    let envelope = session(&transport)
        .request_path("items/9")
        .unwrap()
        .get_as(DecodeAs::<Item>::new())
        .await;

    assert!(envelope.data().is_none());
    assert_eq!(envelope.status(), Some(StatusClass::Error(ErrorStatus::NotFound)));
    assert!(matches!(envelope.error(), Some(Error::Status(ErrorStatus::NotFound))));
    assert!(!envelope.is_success());
}

#[tokio::test]
async fn raw_form_keeps_body_on_error_status() {
    let transport = MockTransport::respond(500, "boom");
    let envelope = session(&transport).request_path("x").unwrap().get().await;

    assert_eq!(envelope.data().map(|b| &b[..]), Some(&b"boom"[..]));
    assert_eq!(envelope.status(), Some(StatusClass::Error(ErrorStatus::InternalServerError)));
    assert_eq!(envelope.error().map(Error::kind), Some(ErrorKind::Status));
}

#[tokio::test]
async fn raw_form_success() {
    let transport = MockTransport::respond(200, "hello");
    let envelope = session(&transport).request_path("x").unwrap().get().await;

    assert!(envelope.is_success());
    assert_eq!(envelope.into_result().unwrap(), Bytes::from_static(b"hello"));
}

#[tokio::test]
async fn empty_body_with_optional_target_is_none() {
    let transport = MockTransport::respond(200, "");
    let envelope = session(&transport)
        .request_path("maybe")
        .unwrap()
        .get_as(DecodeAs::<Option<Item>>::optional())
        .await;

    assert!(envelope.error().is_none());
    assert_eq!(envelope.data(), Some(&None));
    assert_eq!(envelope.status(), Some(StatusClass::Success(SuccessStatus::Ok)));
}

#[tokio::test]
async fn empty_body_with_required_target_is_decode_error() {
    let transport = MockTransport::respond(200, "");
    let envelope = session(&transport)
        .request_path("maybe")
        .unwrap()
        .get_as(DecodeAs::<Option<Item>>::new())
        .await;

    assert!(envelope.data().is_none());
    assert_eq!(envelope.status().map(StatusClass::code), Some(200));
    assert!(matches!(envelope.error(), Some(Error::Decode(_))));
}

#[tokio::test]
async fn missing_status_line() {
    let transport = MockTransport::new(Reply::Respond(HttpResponse {
        status: None,
        headers: Vec::new(),
        body: Bytes::from_static(b"garbage"),
    }));
    let envelope = session(&transport).request_path("x").unwrap().get().await;

    assert!(envelope.status().is_none());
    assert!(envelope.data().is_none());
    assert!(matches!(envelope.error(), Some(Error::MissingStatusCode)));
    assert_eq!(envelope.error().map(Error::kind), Some(ErrorKind::Protocol));
}

#[tokio::test]
async fn transport_failure_has_no_status() {
    let transport = MockTransport::new(Reply::Fail(TransportError::new(
        TransportErrorKind::Connect,
        "connection refused",
    )));
    let envelope = session(&transport)
        .request_path("x")
        .unwrap()
        .get_as(DecodeAs::<Item>::new())
        .await;

    assert!(envelope.status().is_none());
    assert!(envelope.data().is_none());
    match envelope.error() {
        Some(Error::Transport(e)) => assert_eq!(e.kind, TransportErrorKind::Connect),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_failure_after_status_line_keeps_status() {
    let transport = MockTransport::new(Reply::Fail(
        TransportError::new(TransportErrorKind::Io, "connection reset while reading body").with_status(200),
    ));
    let envelope = session(&transport)
        .request_path("x")
        .unwrap()
        .get_as(DecodeAs::<Item>::new())
        .await;

    assert!(envelope.data().is_none());
    assert_eq!(envelope.status(), Some(StatusClass::Success(SuccessStatus::Ok)));
    assert_eq!(envelope.error().map(Error::kind), Some(ErrorKind::Transport));
    assert!(!envelope.is_success());

    let raw = MockTransport::new(Reply::Fail(
        TransportError::new(TransportErrorKind::Other, "body too large").with_status(503),
    ));
    let envelope = session(&raw).request_path("x").unwrap().get().await;
    assert!(envelope.data().is_none());
    assert_eq!(envelope.status(), Some(StatusClass::Error(ErrorStatus::ServiceUnavailable)));
    assert!(matches!(envelope.error(), Some(Error::Transport(_))));
}

#[tokio::test]
async fn encoding_failure_never_reaches_transport() {
    let transport = MockTransport::new(Reply::Echo);
    let envelope = session(&transport)
        .request_path("x")
        .unwrap()
        .encoder(FormCodec)
        .body(&serde_json::json!(["not", "an", "object"]))
        .post()
        .await;

    assert!(envelope.status().is_none());
    assert_eq!(envelope.error().map(Error::kind), Some(ErrorKind::Encoding));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn decode_failure_keeps_status() {
    let transport = MockTransport::respond(200, "not json");
    let envelope = session(&transport)
        .request_path("x")
        .unwrap()
        .get_as(DecodeAs::<Item>::new())
        .await;

    assert_eq!(envelope.status().map(StatusClass::code), Some(200));
    assert_eq!(envelope.error().map(Error::kind), Some(ErrorKind::Decoding));
}

#[tokio::test]
async fn unrecognized_error_range_status() {
    let transport = MockTransport::respond(460, "");
    let envelope = session(&transport).request_path("x").unwrap().get().await;

    assert!(envelope.status().is_none());
    assert!(matches!(envelope.error(), Some(Error::UnrecognizedStatus { code: 460 })));
    assert_eq!(envelope.error().map(Error::kind), Some(ErrorKind::Protocol));
}

// Unlisted success-range codes are treated as 200 OK rather than rejected.
#[tokio::test]
async fn unlisted_success_code_falls_back_to_ok() {
    let transport = MockTransport::respond(299, r#"{"id":2,"name":"b"}"#);
    let envelope = session(&transport)
        .request_path("x")
        .unwrap()
        .get_as(DecodeAs::<Item>::new())
        .await;

    assert!(envelope.is_success());
    assert_eq!(envelope.status(), Some(StatusClass::Success(SuccessStatus::Ok)));
}

#[tokio::test]
async fn structured_body_round_trips_through_echo() {
    let transport = MockTransport::new(Reply::Echo);
    let item = Item { id: 7, name: "échoé".to_string() };
    let envelope = session(&transport)
        .request_path("echo")
        .unwrap()
        .body(&item)
        .put_as(DecodeAs::<Item>::new())
        .await;

    assert_eq!(envelope.into_result().unwrap(), item);
}

#[tokio::test]
async fn form_codec_round_trips_through_echo() {
    let transport = MockTransport::new(Reply::Echo);
    let envelope = session(&transport)
        .request_path("echo")
        .unwrap()
        .encoder(FormCodec)
        .decoder(FormCodec)
        .body(&NewItem { name: "a b".to_string() })
        .post_as(DecodeAs::<NewItem>::new())
        .await;

    assert_eq!(envelope.into_result().unwrap(), NewItem { name: "a b".to_string() });
    assert_eq!(
        transport.requests()[0].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
}

#[tokio::test]
async fn every_verb_sends_its_method() {
    let transport = MockTransport::respond(204, "");
    let s = session(&transport);

    s.request_path("r").unwrap().get().await;
    s.request_path("r").unwrap().post().await;
    s.request_path("r").unwrap().put().await;
    s.request_path("r").unwrap().delete().await;
    s.request_path("r").unwrap().patch().await;
    s.request_path("r").unwrap().head().await;
    s.request_path("r").unwrap().options().await;
    s.request_path("r").unwrap().trace().await;

    let methods: Vec<_> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, HttpMethod::ALL.to_vec());
}

#[tokio::test]
async fn typed_delete_with_optional_unit() {
    let transport = MockTransport::respond(204, "");
    let envelope = session(&transport)
        .request_path("items/1")
        .unwrap()
        .delete_as(DecodeAs::<Option<()>>::optional())
        .await;

    assert!(envelope.is_success());
    assert_eq!(envelope.status(), Some(StatusClass::Success(SuccessStatus::NoContent)));
}

#[tokio::test]
async fn repeated_setters_leave_one_entry() {
    let transport = MockTransport::respond(200, "");
    session(&transport)
        .request_path("search")
        .unwrap()
        .header("X", "1")
        .header("X", "2")
        .query_param("q", "first")
        .query_param("q", "second")
        .get()
        .await;

    let sent = &transport.requests()[0];
    let xs: Vec<_> = sent.headers.iter().filter(|(k, _)| k == "X").collect();
    assert_eq!(xs, vec![&("X".to_string(), "2".to_string())]);
    assert_eq!(sent.url.query(), Some("q=second"));
}

#[tokio::test]
async fn relative_path_without_base_fails_before_transport() {
    let transport = MockTransport::new(Reply::Echo);
    let session = Session::with_transport(transport.clone());

    let err = session.request_path("items").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn response_headers_are_exposed() {
    let mut response = HttpResponse::new(200, "{}");
    response
        .headers
        .push(("ETag".to_string(), "\"v1\"".to_string()));
    let transport = MockTransport::new(Reply::Respond(response));
    let envelope = session(&transport).request_path("x").unwrap().get().await;

    assert_eq!(envelope.header("etag"), Some("\"v1\""));
}

#[tokio::test]
async fn concurrent_dispatches_from_one_session() {
    let transport = MockTransport::new(Reply::Echo);
    let s = session(&transport);

    let handles: Vec<_> = (0..16u64)
        .map(|id| {
            let builder = s
                .request_path("echo")
                .unwrap()
                .body(&Item { id, name: format!("item-{id}") });
            tokio::spawn(async move { builder.post_as(DecodeAs::<Item>::new()).await })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        let item = handle.await.unwrap().into_result().unwrap();
        assert_eq!(item.id, id as u64);
    }
    assert_eq!(transport.requests().len(), 16);
}

fn configured_session(transport: &Arc<MockTransport>) -> Session {
    let config = SessionConfig {
        base_url: Some("http://api.test/v1".to_string()),
        timeout_secs: Some(7),
        headers: vec![("Accept".to_string(), "application/json".to_string())],
        cache_policy: Some(CachePolicy::ReloadIgnoringCache),
    };
    Session::from_config(transport.clone(), &config).unwrap()
}

#[tokio::test]
async fn session_defaults_reach_the_transport() {
    let transport = MockTransport::respond(200, "");
    configured_session(&transport).request_path("x").unwrap().get().await;

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].header("accept"), Some("application/json"));
    assert_eq!(sent[0].timeout, Some(Duration::from_secs(7)));
    assert_eq!(sent[0].cache_policy, Some(CachePolicy::ReloadIgnoringCache));
}

#[tokio::test]
async fn builder_setters_override_session_defaults() {
    let transport = MockTransport::respond(200, "");
    configured_session(&transport)
        .request_path("x")
        .unwrap()
        .timeout(Duration::from_millis(250))
        .header("accept", "text/plain")
        .cache_policy(CachePolicy::ReturnCacheDataElseLoad)
        .get()
        .await;

    let sent = transport.requests();
    assert_eq!(sent[0].timeout, Some(Duration::from_millis(250)));
    assert_eq!(sent[0].cache_policy, Some(CachePolicy::ReturnCacheDataElseLoad));
    let accept: Vec<_> = sent[0]
        .headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("accept"))
        .collect();
    assert_eq!(accept, [&("accept".to_string(), "text/plain".to_string())]);
}
