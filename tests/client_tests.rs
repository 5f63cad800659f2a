//! Integration tests for the authenticated request client against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use minimarket::client::{
    ApiClient, ApiError, HeadlessNavigator, REFRESH_FAILED, SESSION_EXPIRED,
};
use minimarket::models::{ListQuery, NewCategoria};
use reqwest::cookie::Jar;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const RESOURCE: &str = "/api/v1/productos";
const REFRESH: &str = "/api/v1/auth/refresh";

/// Matches requests whose `Cookie` header carries `name=value`.
struct HasCookie(&'static str);

impl Match for HasCookie {
    fn matches(&self, request: &Request) -> bool {
        request
            .headers
            .get_all("cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .any(|pair| pair.trim() == self.0)
    }
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn failure(status: u16, message: &str, code: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "success": false,
        "errorMessage": message,
        "errorCode": code,
    }))
}

fn expired() -> ResponseTemplate {
    failure(401, "Invalid or expired token", "TOKEN_EXPIRED")
}

fn refreshed() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("set-cookie", "access_token=fresh; Path=/; HttpOnly")
        .set_body_json(json!({ "success": true, "message": "Token refreshed" }))
}

fn client_at(server: &MockServer, location: &str) -> (ApiClient, Arc<HeadlessNavigator>) {
    let navigator = Arc::new(HeadlessNavigator::at(location));
    let jar = Arc::new(Jar::default());
    let origin = server.uri().parse().unwrap();
    jar.add_cookie_str("access_token=stale; Path=/", &origin);

    let client = ApiClient::builder()
        .base_url(server.uri())
        .navigator(navigator.clone())
        .cookie_jar(jar)
        .build()
        .unwrap();
    (client, navigator)
}

/// Resource answers with data once the fresh access cookie is presented.
async fn mount_resource(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .and(HasCookie("access_token=fresh"))
        .respond_with(ok(json!(["leche", "pan"])))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(expired())
        .mount(server)
        .await;
}

#[tokio::test]
async fn valid_token_returns_data_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .and(header("content-type", "application/json"))
        .respond_with(ok(json!(["leche"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed())
        .expect(0)
        .mount(&server)
        .await;

    let (client, navigator) = client_at(&server, "/productos");
    let data: Vec<String> = client.get("/productos").await.unwrap();

    assert_eq!(data, vec!["leche"]);
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_retried() {
    let server = MockServer::start().await;
    mount_resource(&server).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed())
        .expect(1)
        .mount(&server)
        .await;

    let (client, navigator) = client_at(&server, "/productos");
    let data: Vec<String> = client.get("/productos").await.unwrap();

    assert_eq!(data, vec!["leche", "pan"]);
    assert!(navigator.visits().is_empty());
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn concurrent_expiries_share_one_refresh() {
    let server = MockServer::start().await;
    mount_resource(&server).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed().set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _navigator) = client_at(&server, "/productos");

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get::<Vec<String>>("/productos").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), vec!["leche", "pan"]);
    }
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn failed_refresh_redirects_to_login_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(expired())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(
            failure(401, "Refresh token expired", "REFRESH_TOKEN_EXPIRED")
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, navigator) = client_at(&server, "/productos");

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get::<Value>("/productos").await })
        })
        .collect();

    let mut messages = Vec::new();
    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err.status, 401);
        messages.push(err.message);
    }

    assert_eq!(messages.iter().filter(|m| *m == REFRESH_FAILED).count(), 1);
    assert_eq!(messages.iter().filter(|m| *m == SESSION_EXPIRED).count(), 2);
    assert_eq!(navigator.visits(), vec!["/login?redirect=%2Fproductos"]);
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn missing_token_redirects_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(failure(401, "Authentication token missing", "TOKEN_MISSING"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed())
        .expect(0)
        .mount(&server)
        .await;

    let (client, navigator) = client_at(&server, "/ventas");
    let err = client.get::<Value>("/productos").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.has_code("TOKEN_MISSING"));
    assert_eq!(navigator.visits(), vec!["/login?redirect=%2Fventas"]);
}

#[tokio::test]
async fn no_redirect_when_already_on_login_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(expired())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(failure(401, "Refresh token missing", "REFRESH_TOKEN_MISSING"))
        .mount(&server)
        .await;

    let (client, navigator) = client_at(&server, "/login");
    let err = client.get::<Value>("/productos").await.unwrap_err();

    assert_eq!(err.message, REFRESH_FAILED);
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn second_expiry_after_retry_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(expired())
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed())
        .expect(1)
        .mount(&server)
        .await;

    let (client, navigator) = client_at(&server, "/productos");
    let err = client.get::<Value>("/productos").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::new(401, "Invalid or expired token", Some("TOKEN_EXPIRED".into()))
    );
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn backend_failure_keeps_status_message_and_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/productos/99"))
        .respond_with(failure(404, "producto not found.", "NOT_FOUND"))
        .mount(&server)
        .await;

    let (client, _navigator) = client_at(&server, "/productos");
    let err = client.get_producto(99).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.message, "producto not found.");
    assert!(err.has_code("NOT_FOUND"));
}

#[tokio::test]
async fn non_json_body_is_a_generic_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RESOURCE))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let (client, _navigator) = client_at(&server, "/productos");
    let err = client.get::<Value>("/productos").await.unwrap_err();

    assert_eq!(err, ApiError::transport());
}

#[tokio::test]
async fn list_helpers_send_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auditoria"))
        .and(query_param("limit", "5"))
        .and(query_param("offset", "10"))
        .and(query_param("search", "leche"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _navigator) = client_at(&server, "/auditoria");
    let rows = client
        .list_auditoria(&ListQuery::page(5, 10).with_search("leche"))
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn retried_post_resends_the_same_body() {
    let server = MockServer::start().await;
    let sent = json!({ "nombre": "Lacteos", "descripcion": "Leche y derivados", "activo": true });
    Mock::given(method("POST"))
        .and(path("/api/v1/categorias"))
        .and(body_json(&sent))
        .and(HasCookie("access_token=fresh"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "message": "Category created",
            "data": {
                "id": 7,
                "nombre": "Lacteos",
                "descripcion": "Leche y derivados",
                "activo": true,
                "created_at": "2026-10-19T12:00:00Z",
                "updated_at": "2026-10-19T12:00:00Z"
            }
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/categorias"))
        .and(body_json(&sent))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed())
        .expect(1)
        .mount(&server)
        .await;

    let (client, _navigator) = client_at(&server, "/categorias");
    let mut nueva = NewCategoria::new("Lacteos");
    nueva.descripcion = Some("Leche y derivados".into());
    let categoria = client.create_categoria(&nueva).await.unwrap();

    assert_eq!(categoria.id, 7);
    assert_eq!(categoria.nombre, "Lacteos");
}

#[tokio::test]
async fn retried_put_resends_the_same_body() {
    let server = MockServer::start().await;
    let sent = json!({ "stock_actual": 40, "stock_reservado": 2 });
    Mock::given(method("PUT"))
        .and(path("/api/v1/inventario/3"))
        .and(body_json(&sent))
        .and(HasCookie("access_token=fresh"))
        .respond_with(ok(json!({ "id": 3 })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/inventario/3"))
        .respond_with(expired())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(refreshed())
        .mount(&server)
        .await;

    let (client, _navigator) = client_at(&server, "/inventario");
    let data: Value = client.put("/inventario/3", &sent).await.unwrap();

    assert_eq!(data["id"], 3);
}
