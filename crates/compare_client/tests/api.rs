use std::time::Duration;

use compare_client::{
    ApiError, ApiLayout, ClientSettings, Credentials, ReqwestSearchApi, SearchApi,
};
use compare_core::{ProductEntry, ResultSet, SavePayload, ServerAck, StartReply};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer, layout: ApiLayout) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        layout,
        ..ClientSettings::default()
    }
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn flat_start_posts_lists_and_reads_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/start_search"))
        .and(body_json(json!({"list1": ["shoe"], "list2": ["sock", "hat"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": ["queued"]})))
        .expect(1)
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    let reply = api
        .start(&names(&["shoe"]), &names(&["sock", "hat"]))
        .await
        .unwrap();

    assert_eq!(
        reply,
        StartReply::Accepted {
            messages: names(&["queued"])
        }
    );
}

#[tokio::test]
async fn session_start_reads_redirect_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/start"))
        .and(body_json(json!({"names_list1": ["a"], "names_list2": ["b"]})))
        .respond_with(ResponseTemplate::new(303).insert_header("Location", "/search/abc-123"))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();
    let reply = api.start(&names(&["a"]), &names(&["b"])).await.unwrap();

    assert_eq!(
        reply,
        StartReply::Redirected {
            session_id: "abc-123".to_string()
        }
    );
}

#[tokio::test]
async fn redirect_elsewhere_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/users/login"))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();
    let err = api.start(&names(&["a"]), &names(&["b"])).await.unwrap_err();

    assert_eq!(err, ApiError::BadRedirect("/users/login".to_string()));
}

#[tokio::test]
async fn session_start_error_flag_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": true, "messages": "Too many searches running"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();
    let reply = api.start(&names(&["a"]), &names(&["b"])).await.unwrap();

    assert_eq!(
        reply,
        StartReply::Rejected {
            message: "Too many searches running".to_string()
        }
    );
}

#[tokio::test]
async fn status_uses_session_path_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/abc/messages"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": ["page 1 done"],
            "results": {"store.example.com": {"p1": {
                "title": "Shoe", "link": "http://x", "currency": "$", "sale_price": 10
            }}},
            "search_finished": true
        })))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&ClientSettings {
        bearer_token: Some("secret".to_string()),
        ..settings(&server, ApiLayout::SessionScoped)
    })
    .unwrap();
    let status = api.status(Some("abc")).await.unwrap();

    assert_eq!(status.messages, names(&["page 1 done"]));
    assert!(status.finished);
    let results = status.results.unwrap();
    assert_eq!(
        results
            .store("store.example.com")
            .and_then(|products| products.get("p1"))
            .and_then(|product| product.sale_price.as_deref()),
        Some("10")
    );
}

#[tokio::test]
async fn status_without_session_id_fails_before_sending() {
    let server = MockServer::start().await;
    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();

    let err = api.status(None).await.unwrap_err();

    assert_eq!(err, ApiError::MissingSession);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    let err = api.status(None).await.unwrap_err();

    assert_eq!(err, ApiError::HttpStatus(500));
}

#[tokio::test]
async fn malformed_status_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    let err = api.status(None).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn slow_status_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..settings(&server, ApiLayout::Flat)
    })
    .unwrap();
    let err = api.status(None).await.unwrap_err();

    assert_eq!(err, ApiError::Timeout);
}

#[tokio::test]
async fn stop_sends_flag_and_relays_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/abc/stop"))
        .and(body_json(json!({"stop_search": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"messages": "Search stopped by user"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();
    let ack = api.stop(Some("abc")).await.unwrap();

    assert_eq!(
        ack,
        ServerAck::Accepted {
            message: Some("Search stopped by user".to_string())
        }
    );
}

#[tokio::test]
async fn flat_stop_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/stop_search"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    let ack = api.stop(None).await.unwrap();

    assert_eq!(ack, ServerAck::Accepted { message: None });
}

#[tokio::test]
async fn save_posts_lists_messages_and_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/abc/save"))
        .and(body_json(json!({
            "names_list1": ["shoe"],
            "names_list2": ["sock"],
            "messages": ["done"],
            "results": {"s.example.com": {"p1": {"title": "Shoe", "link": "http://x"}}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": "Saved successfully"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut results = ResultSet::new();
    results.insert_product(
        "s.example.com",
        "p1",
        ProductEntry {
            title: Some("Shoe".into()),
            link: Some("http://x".into()),
            ..ProductEntry::default()
        },
    );
    let payload = SavePayload {
        list1: names(&["shoe"]),
        list2: names(&["sock"]),
        messages: names(&["done"]),
        results,
    };

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();
    let ack = api.save(Some("abc"), &payload).await.unwrap();

    assert_eq!(
        ack,
        ServerAck::Accepted {
            message: Some("Saved successfully".to_string())
        }
    );
}

#[tokio::test]
async fn save_error_flag_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/save_search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": true, "messages": "Names Lists are empty"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    let payload = SavePayload {
        list1: Vec::new(),
        list2: Vec::new(),
        messages: Vec::new(),
        results: ResultSet::new(),
    };
    let ack = api.save(None, &payload).await.unwrap();

    assert_eq!(
        ack,
        ServerAck::Rejected {
            message: "Names Lists are empty".to_string()
        }
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReqwestSearchApi::new(&ClientSettings {
        base_url: "not a url".to_string(),
        ..ClientSettings::default()
    })
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}

fn alice() -> Credentials {
    Credentials {
        username: "alice".to_string(),
        password: "s3cret pw".to_string(),
    }
}

#[tokio::test]
async fn login_reads_access_token_cookie_from_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=s3cret+pw"))
        .respond_with(
            ResponseTemplate::new(303)
                .insert_header("Location", "/search")
                .append_header("Set-Cookie", "refresh_token=r1; HttpOnly; Path=/")
                .append_header("Set-Cookie", "access_token=tok-1; HttpOnly; Max-Age=1800"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::SessionScoped)).unwrap();
    assert_eq!(api.login(&alice()).await, Ok("tok-1".to_string()));
}

#[tokio::test]
async fn login_accepts_token_in_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-2", "token_type": "bearer"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    assert_eq!(api.login(&alice()).await, Ok("tok-2".to_string()));
}

#[tokio::test]
async fn login_with_bad_password_relays_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"detail": "Incorrect username or password"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    assert_eq!(
        api.login(&alice()).await,
        Err(ApiError::LoginRejected(
            "Incorrect username or password".to_string()
        ))
    );
}

#[tokio::test]
async fn login_redirect_without_cookie_has_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(303).insert_header("Location", "/search"))
        .mount(&server)
        .await;

    let api = ReqwestSearchApi::new(&settings(&server, ApiLayout::Flat)).unwrap();
    assert_eq!(api.login(&alice()).await, Err(ApiError::MissingToken));
}
