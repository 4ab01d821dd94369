mod common;

use std::time::Duration;

use common::{client_with, Events, ScriptedTransport};
use rxios::{
    Client, Error, ErrorKind, Method, RequestBody, RequestConfig, Response, ResponseData, StatusCode,
    TransportError, TransportResponse,
};
use serde_json::json;

fn marker_request(events: &Events, name: &'static str) -> impl Fn(RequestConfig) -> futures::future::Ready<rxios::Result<RequestConfig>> {
    let events = events.clone();
    move |config| {
        events.push(name);
        futures::future::ready(Ok(config))
    }
}

fn marker_response(events: &Events, name: &'static str) -> impl Fn(Response) -> futures::future::Ready<rxios::Result<Response>> {
    let events = events.clone();
    move |response| {
        events.push(name);
        futures::future::ready(Ok(response))
    }
}

#[tokio::test]
async fn interceptors_run_in_pipeline_order() {
    let events = Events::new();
    let (client, _) = client_with(ScriptedTransport::status(200, "ok").events(&events));

    client.interceptors().request.add_fn(marker_request(&events, "R1"));
    client.interceptors().request.add_fn(marker_request(&events, "R2"));
    client.interceptors().response.add_fn(marker_response(&events, "S1"));
    client.interceptors().response.add_fn(marker_response(&events, "S2"));

    client.get("/order", None).await.unwrap();
    assert_eq!(events.take(), vec!["R2", "R1", "dispatch", "S1", "S2"]);

    // a fresh chain per call: nothing accumulates
    client.get("/order", None).await.unwrap();
    assert_eq!(events.take(), vec!["R2", "R1", "dispatch", "S1", "S2"]);
}

#[tokio::test]
async fn request_interceptors_transform_the_config() {
    let (client, sent) = client_with(ScriptedTransport::status(200, ""));

    client.interceptors().request.add_fn(|config: RequestConfig| async move {
        config.header("X-Step", "first")
    });
    // registered later, so it runs earlier and the header above wins
    client.interceptors().request.add_fn(|config: RequestConfig| async move {
        Ok(config.header("X-Step", "second")?.param("token", "abc"))
    });

    client.get("/users", None).await.unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].headers.get("x-step").unwrap(), "first");
    assert_eq!(sent[0].url, "http://test.local/users?token=abc");
}

#[tokio::test]
async fn response_interceptors_transform_the_response() {
    let (client, _) = client_with(ScriptedTransport::status(200, r#"{"count": 1}"#));

    client.interceptors().response.add_fn(|mut response: Response| async move {
        if let ResponseData::Json(json) = response.data_mut() {
            json["count"] = json!(2);
        }
        Ok(response)
    });

    let response = client.get("/count", None).await.unwrap();
    assert_eq!(response.data(), &ResponseData::Json(json!({"count": 2})));
}

#[tokio::test]
async fn not_modified_resolves_and_not_found_rejects() {
    let (client, _) = client_with(ScriptedTransport::status(304, ""));
    let response = client.get("/cached", None).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

    let (client, _) = client_with(ScriptedTransport::status(404, "missing"));
    let err = client.get("/missing", None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
    let response = err.response().unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.data().as_text(), Some("missing"));
    assert_eq!(response.config().url.as_deref(), Some("/missing"));
}

#[tokio::test]
async fn response_rejection_handler_can_recover() {
    let events = Events::new();
    let (client, _) = client_with(ScriptedTransport::status(404, "missing"));

    client.interceptors().response.add_fn_with_rejection(
        marker_response(&events, "S1 fulfilled"),
        |error: Error| async move {
            match error.into_response() {
                Some(response) => Ok(response),
                None => Err(Error::handler("unrecoverable")),
            }
        },
    );
    client.interceptors().response.add_fn(marker_response(&events, "S2 fulfilled"));

    let response = client.get("/missing", None).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    // S1's fulfillment handler is skipped; S2 sees the recovered value
    assert_eq!(events.take(), vec!["S2 fulfilled"]);
}

#[tokio::test]
async fn request_stage_failure_skips_dispatch() {
    let events = Events::new();
    let (client, sent) = client_with(ScriptedTransport::status(200, "").events(&events));

    client.interceptors().request.add_fn(marker_request(&events, "R1"));
    client.interceptors().request.add_fn(|_config: RequestConfig| async move {
        Err::<RequestConfig, _>(Error::handler("rejected by R2"))
    });
    client.interceptors().response.add_fn_with_rejection(
        marker_response(&events, "S1"),
        {
            let events = events.clone();
            move |error: Error| {
                events.push(&format!("S1 saw {:?}", error.kind()));
                async move { Err(error) }
            }
        },
    );

    let err = client.get("/never", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Handler error: rejected by R2");
    assert_eq!(events.take(), vec!["S1 saw Handler"]);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn request_rejection_handler_can_recover() {
    let (client, sent) = client_with(ScriptedTransport::status(200, ""));

    // runs second: recovers from the failure of the step before it
    client.interceptors().request.add_fn_with_rejection(
        |config: RequestConfig| async move { Ok(config) },
        |_error: Error| async move { Ok(RequestConfig::new().url("/fallback").method(Method::Get)) },
    );
    // runs first
    client.interceptors().request.add_fn(|_config: RequestConfig| async move {
        Err::<RequestConfig, Error>("boom".into())
    });

    client.get("/original", None).await.unwrap();
    // the recovered config replaces the merged one entirely, base URL included
    assert_eq!(sent.lock().unwrap()[0].url, "/fallback");
}

#[tokio::test]
async fn eject_does_not_affect_a_chain_already_built() {
    let events = Events::new();
    let (client, _) = client_with(ScriptedTransport::status(200, ""));

    let id = client.interceptors().response.add_fn(marker_response(&events, "S1"));

    let in_flight = client.get("/a", None);
    assert!(client.interceptors().response.eject(id));
    in_flight.await.unwrap();
    assert_eq!(events.take(), vec!["S1"]);

    client.get("/b", None).await.unwrap();
    assert!(events.take().is_empty());
}

#[tokio::test]
async fn eject_from_inside_a_running_chain() {
    let events = Events::new();
    let (client, _) = client_with(ScriptedTransport::status(200, ""));

    let response_registry = client.interceptors().response.clone();
    let id = response_registry.add_fn(marker_response(&events, "S1"));
    client.interceptors().request.add_fn(move |config: RequestConfig| {
        response_registry.eject(id);
        async move { Ok(config) }
    });

    client.get("/a", None).await.unwrap();
    assert_eq!(events.take(), vec!["S1"]);
    client.get("/b", None).await.unwrap();
    assert!(events.take().is_empty());
}

#[tokio::test]
async fn post_keeps_caller_headers() {
    let (client, sent) = client_with(ScriptedTransport::status(201, ""));

    let config = RequestConfig::new().header("X-Caller", "kept").unwrap();
    let response = client
        .post("/items", Some(RequestBody::Json(json!({"name": "x"}))), Some(config))
        .await
        .unwrap();

    let effective = response.config();
    assert_eq!(effective.method, Some(Method::Post));
    assert_eq!(effective.method.unwrap().as_str(), "post");
    assert_eq!(effective.url.as_deref(), Some("/items"));
    assert_eq!(effective.data, Some(RequestBody::Json(json!({"name": "x"}))));

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].headers.get("x-caller").unwrap(), "kept");
    assert_eq!(sent[0].headers.get("accept").unwrap(), "application/json, text/plain, */*");
    assert_eq!(sent[0].body.as_deref(), Some(br#"{"name":"x"}"#.as_slice()));
}

#[tokio::test]
async fn verb_helpers_set_method() {
    let (client, sent) = client_with(ScriptedTransport::status(200, ""));

    client.delete("/a", None).await.unwrap();
    client.head("/a", None).await.unwrap();
    client.options("/a", None).await.unwrap();
    client.put("/a", Some("text".into()), None).await.unwrap();
    client.patch("/a", None, None).await.unwrap();

    let methods: Vec<_> = sent.lock().unwrap().iter().map(|r| r.method).collect();
    assert_eq!(
        methods,
        vec![Method::Delete, Method::Head, Method::Options, Method::Put, Method::Patch]
    );
}

#[tokio::test]
async fn request_accepts_url_or_config() {
    let (client, sent) = client_with(ScriptedTransport::status(200, ""));

    client.request("/plain").await.unwrap();
    client
        .request(("/with-config", RequestConfig::new().method_str("POST").unwrap()))
        .await
        .unwrap();
    client
        .request(RequestConfig::new().url("/config-only").method(Method::Put))
        .await
        .unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].url, "http://test.local/plain");
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[1].url, "http://test.local/with-config");
    assert_eq!(sent[1].method, Method::Post);
    assert_eq!(sent[2].url, "http://test.local/config-only");
    assert_eq!(sent[2].method, Method::Put);
}

#[tokio::test]
async fn default_changes_apply_to_later_requests() {
    let (client, sent) = client_with(ScriptedTransport::status(200, ""));

    client.get("/a", None).await.unwrap();
    client.update_defaults(|defaults| {
        defaults
            .headers
            .insert("x-tenant", rxios::HeaderValue::from_static("acme"));
    });
    client.get("/b", None).await.unwrap();

    let sent = sent.lock().unwrap();
    assert!(sent[0].headers.get("x-tenant").is_none());
    assert_eq!(sent[1].headers.get("x-tenant").unwrap(), "acme");
}

#[tokio::test]
async fn transport_failures_reach_the_caller() {
    let (client, _) = client_with(ScriptedTransport::new(|_| {
        Err(TransportError::Network("connection reset".into()))
    }));
    let err = client.get("/a", None).await.unwrap_err();
    assert!(err.is_network());
    assert!(err.response().is_none());

    let (client, _) = client_with(ScriptedTransport::new(|request| {
        Err(TransportError::Timeout(request.timeout.unwrap_or_default()))
    }));
    let err = client
        .get("/slow", Some(RequestConfig::new().timeout(Duration::from_millis(25))))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.code(), Some("ECONNABORTED"));
    assert!(err.response().is_none());
}

#[tokio::test]
async fn concurrent_requests_do_not_share_state() {
    let transport = ScriptedTransport::new(|request| {
        Ok(TransportResponse::new(200).body(request.url.clone()))
    })
    .delay(Duration::from_millis(10));
    let (client, _) = client_with(transport);

    client.interceptors().request.add_fn(|config: RequestConfig| async move {
        let id = config.url.clone().unwrap_or_default();
        config.header("X-Request", &id.replace('/', ""))
    });

    let (a, b) = tokio::join!(client.get("/one", None), client.get("/two", None));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.data().as_text(), Some("http://test.local/one"));
    assert_eq!(b.data().as_text(), Some("http://test.local/two"));
    assert_eq!(a.config().headers.get("x-request").unwrap(), "one");
    assert_eq!(b.config().headers.get("x-request").unwrap(), "two");
}

#[tokio::test]
async fn clients_have_independent_registries() {
    let (first, _) = client_with(ScriptedTransport::status(200, ""));
    let second = Client::builder()
        .transport(ScriptedTransport::status(200, ""))
        .build();

    first.interceptors().request.add_fn(|config: RequestConfig| async move { Ok(config) });
    assert_eq!(first.interceptors().request.len(), 1);
    assert!(second.interceptors().request.is_empty());
}

#[tokio::test]
async fn get_uri_uses_defaults_without_dispatching() {
    let (client, sent) = client_with(ScriptedTransport::status(200, ""));

    let uri = client
        .get_uri(Some(RequestConfig::new().url("/search#top").param("q", "a b")))
        .unwrap();
    assert_eq!(uri, "http://test.local/search?q=a+b");
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_url_fails_before_any_interceptor_runs() {
    let events = Events::new();
    let (client, sent) = client_with(ScriptedTransport::status(200, "").events(&events));
    client.interceptors().request.add_fn(marker_request(&events, "R1"));
    client.interceptors().response.add_fn_with_rejection(
        marker_response(&events, "S1"),
        {
            let events = events.clone();
            move |error: Error| {
                events.push("S1 rejected");
                async move { Err(error) }
            }
        },
    );

    let err = client.request(RequestConfig::new()).await.unwrap_err();
    assert!(err.is_config());
    assert!(events.take().is_empty());
    assert!(sent.lock().unwrap().is_empty());
}
