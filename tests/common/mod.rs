#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use gatelog::store::EntryStore;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        gatelog::db::migrate(&pool)
            .await
            .expect("Failed to run migrations");

        let router = gatelog::build_app(EntryStore::new(pool.clone()));

        Self { router, db: pool }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a request with a JSON body.
    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    /// Insert an entry directly with a fixed timestamp and return its id.
    pub async fn insert_entry(&self, license_plate: &str, house_number: &str, timestamp: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO visitor_entries (license_plate, house_number, timestamp) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(license_plate)
        .bind(house_number)
        .bind(timestamp)
        .fetch_one(&self.db)
        .await
        .expect("Failed to insert test entry");
        id
    }

    pub async fn count_entries(&self) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visitor_entries")
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let body = body_string(resp).await;
    serde_json::from_str(&body).unwrap_or_else(|_| panic!("Expected JSON body, got {body}"))
}

/// Assert the status and that the body is a JSON error with a message.
pub async fn assert_error(resp: Response, expected: StatusCode) -> String {
    assert_eq!(resp.status(), expected);
    let json = body_json(resp).await;
    json["error"]
        .as_str()
        .expect("Error body should carry an error message")
        .to_string()
}
