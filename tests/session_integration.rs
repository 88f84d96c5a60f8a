//! Integration tests for the cookie-carrying session client.

use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use commenter_core::session::{
    ClientConfig, Cookie, CookieJar, FileStore, FormPart, KeyValueStore, LoadSource, MemoryStore,
    SessionClient, SessionError,
};
mod support;
use support::socket_guard::start_mock_server_or_skip;

fn client_for(base_url: &str, store: Arc<dyn KeyValueStore>) -> SessionClient {
    let jar = Arc::new(CookieJar::load(store).unwrap());
    SessionClient::new(ClientConfig::new(base_url).unwrap(), jar).unwrap()
}

fn user_body(code: u16) -> serde_json::Value {
    json!({
        "message": "OK",
        "code": code,
        "payload": {
            "uid": "u1",
            "displayName": "Ada",
            "email": "ada@example.com",
            "pic": "",
            "status": "",
            "disabled": false
        }
    })
}

#[tokio::test]
async fn test_login_response_cookie_is_stored_for_api_host() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=abc123; Path=/; HttpOnly")
                .set_body_json(user_body(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Arc::new(MemoryStore::new()));
    let response = client
        .request(
            "login",
            Method::POST,
            Some(&json!({"email": "ada@example.com", "password": "pw"})),
        )
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let cookies = client.jar().get(client.api_host());
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "session");
    assert_eq!(cookies[0].value(), "abc123");
    assert!(cookies[0].http_only);
}

#[tokio::test]
async fn test_stored_cookie_is_sent_on_next_request() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/re-auth"))
        .and(header("cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Arc::new(MemoryStore::new()));
    client
        .jar()
        .add(Cookie::new("session", "abc123", ""), client.api_host())
        .unwrap();

    let response = client
        .request_without_body("re-auth", Method::GET)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_cookie_survives_restart_with_file_store() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=persisted; Path=/")
                .set_body_json(user_body(200)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/re-auth"))
        .and(header("cookie", "session=persisted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    {
        let client = client_for(&mock_server.uri(), Arc::new(FileStore::new(temp_dir.path())));
        client
            .request_without_body("login", Method::POST)
            .await
            .unwrap();
    }

    let restarted = client_for(&mock_server.uri(), Arc::new(FileStore::new(temp_dir.path())));
    assert_eq!(restarted.jar().load_source(), LoadSource::Restored(1));
    let response = restarted
        .request_without_body("re-auth", Method::GET)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_replacement_cookie_overwrites_previous_value() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/rotate"))
        .respond_with(ResponseTemplate::new(204).insert_header("set-cookie", "session=new"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Arc::new(MemoryStore::new()));
    client
        .jar()
        .add(Cookie::new("session", "old", ""), client.api_host())
        .unwrap();

    client
        .request_without_body("rotate", Method::GET)
        .await
        .unwrap();

    let cookies = client.jar().get(client.api_host());
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), "new");
}

#[tokio::test]
async fn test_multipart_request_carries_json_and_file_parts() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("POST"))
        .and(path("/update-profile"))
        .and(body_string_contains("name=\"info\""))
        .and(body_string_contains("\"hasPicFile\":true"))
        .and(body_string_contains("filename=\"profile-pic.png\""))
        .and(body_string_contains("Content-Type: image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Arc::new(MemoryStore::new()));
    let parts = vec![
        FormPart::json("info", &json!({"uid": "u1", "hasPicFile": true})).unwrap(),
        FormPart::binary("file", b"PNG-BYTES".to_vec(), "profile-pic.png", "image/png"),
    ];
    let response = client
        .request_multipart("update-profile", parts)
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_multipart_rejects_invalid_content_type() {
    let client = client_for("http://127.0.0.1:9/", Arc::new(MemoryStore::new()));
    let parts = vec![FormPart::binary("file", vec![1, 2, 3], "x.bin", "not a mime type")];
    let result = client.request_multipart("update-profile", parts).await;
    assert!(matches!(result, Err(SessionError::InvalidPart { .. })));
}

#[tokio::test]
async fn test_probe_image_url_checks_content_type() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("HEAD"))
        .and(path("/avatar.png"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri(), Arc::new(MemoryStore::new()));
    let base = mock_server.uri();

    assert!(client.probe_image_url(&format!("{base}/avatar.png")).await);
    assert!(!client.probe_image_url(&format!("{base}/page")).await);
    assert!(!client.probe_image_url(&format!("{base}/missing")).await);
    assert!(!client.probe_image_url("not a url").await);
}

#[tokio::test]
async fn test_connection_failure_maps_to_network_error() {
    // Port 9 (discard) is not expected to be listening on localhost.
    let client = client_for("http://127.0.0.1:9/", Arc::new(MemoryStore::new()));
    let result = client.request_without_body("re-auth", Method::GET).await;
    assert!(
        matches!(result, Err(SessionError::Network { .. } | SessionError::Timeout { .. })),
        "got {result:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_responses_store_every_cookie() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    const N: usize = 16;

    for i in 0..N {
        Mock::given(method("GET"))
            .and(path(format!("/set/{i}")))
            .respond_with(
                ResponseTemplate::new(200).insert_header("set-cookie", format!("c{i}=v{i}").as_str()),
            )
            .mount(&mock_server)
            .await;
    }

    let store = Arc::new(MemoryStore::new());
    let client = client_for(&mock_server.uri(), store.clone());

    let requests = (0..N).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            client
                .request_without_body(&format!("set/{i}"), Method::GET)
                .await
        })
    });
    for result in join_all(requests).await {
        assert!(result.unwrap().is_ok());
    }

    assert_eq!(client.jar().len(), N);
    let reloaded = CookieJar::load(store).unwrap();
    assert_eq!(reloaded.len(), N, "persisted jar must hold every cookie");
}

#[test]
fn test_concurrent_adds_from_threads_keep_every_entry() {
    const N: usize = 64;
    let store = Arc::new(MemoryStore::new());
    let jar = CookieJar::load(store.clone()).unwrap();
    let start = std::sync::Barrier::new(N);

    std::thread::scope(|scope| {
        for i in 0..N {
            let jar = &jar;
            let start = &start;
            scope.spawn(move || {
                start.wait();
                jar.add(Cookie::new(format!("c{i}"), "v", ""), "api.example.com")
                    .unwrap();
            });
        }
    });

    assert_eq!(jar.len(), N);
    assert_eq!(CookieJar::load(store).unwrap().len(), N);
}
