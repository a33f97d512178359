//! In-process stand-in for the upstream test server.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Duration;

use crate::core::client::Client;
use crate::core::config::Credentials;

pub(crate) struct MockUpstream {
    users: Vec<(String, String)>,
    posts: HashMap<String, Vec<Value>>,
    comments: HashMap<i64, usize>,
    misspelled_comments: HashSet<i64>,
    failing_users: HashSet<String>,
    malformed_users: HashSet<String>,
    rejected_tokens: Mutex<HashSet<String>>,
    reject_all_tokens: bool,
    auth_status: StatusCode,
    auth_delay: Duration,
    expires_in: u64,
    exchanges: AtomicUsize,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    request_delay: Duration,
}

impl MockUpstream {
    pub(crate) fn new() -> Self {
        Self {
            users: Vec::new(),
            posts: HashMap::new(),
            comments: HashMap::new(),
            misspelled_comments: HashSet::new(),
            failing_users: HashSet::new(),
            malformed_users: HashSet::new(),
            rejected_tokens: Mutex::new(HashSet::new()),
            reject_all_tokens: false,
            auth_status: StatusCode::OK,
            auth_delay: Duration::ZERO,
            expires_in: 3600,
            exchanges: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            request_delay: Duration::ZERO,
        }
    }

    /// Adds a user whose posts have the given ids, in the given order.
    pub(crate) fn user(mut self, id: &str, name: &str, post_ids: &[i64]) -> Self {
        self.users.push((id.to_owned(), name.to_owned()));
        self.posts.insert(
            id.to_owned(),
            post_ids
                .iter()
                .map(|post_id| {
                    json!({
                        "id": post_id,
                        "userid": id,
                        "content": format!("post {post_id}"),
                    })
                })
                .collect(),
        );
        self
    }

    pub(crate) fn comments(mut self, post_id: i64, count: usize) -> Self {
        self.comments.insert(post_id, count);
        self
    }

    /// Serves the comments of `post_id` under the misspelled `coments` key.
    pub(crate) fn misspelled_comments(mut self, post_id: i64, count: usize) -> Self {
        self.comments.insert(post_id, count);
        self.misspelled_comments.insert(post_id);
        self
    }

    pub(crate) fn failing_posts_for(mut self, user_id: &str) -> Self {
        self.failing_users.insert(user_id.to_owned());
        self
    }

    pub(crate) fn malformed_posts_for(mut self, user_id: &str) -> Self {
        self.malformed_users.insert(user_id.to_owned());
        self
    }

    pub(crate) fn reject_token(self, token: &str) -> Self {
        self.rejected_tokens
            .lock()
            .unwrap()
            .insert(token.to_owned());
        self
    }

    pub(crate) fn reject_all_tokens(mut self) -> Self {
        self.reject_all_tokens = true;
        self
    }

    pub(crate) fn auth_status(mut self, status: StatusCode) -> Self {
        self.auth_status = status;
        self
    }

    pub(crate) fn auth_delay(mut self, delay: Duration) -> Self {
        self.auth_delay = delay;
        self
    }

    pub(crate) fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub(crate) fn expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = seconds;
        self
    }

    pub(crate) fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Serves the mock on an ephemeral port and returns it with its base url.
    pub(crate) async fn start(self) -> (Arc<Self>, String) {
        let mock = Arc::new(self);

        let app = Router::new()
            .route("/test/auth", post(auth))
            .route("/test/users", get(users))
            .route("/test/users/{id}/posts", get(user_posts))
            .route("/test/posts/{id}/comments", get(post_comments))
            .with_state(mock.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (mock, format!("http://{addr}/test"))
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .unwrap_or_default();

        let issued = token
            .strip_prefix("token-")
            .and_then(|n| n.parse::<usize>().ok())
            .is_some_and(|n| n >= 1 && n <= self.exchanges());

        if !issued
            || self.reject_all_tokens
            || self.rejected_tokens.lock().unwrap().contains(token)
        {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "invalid authorization token" })),
            )
                .into_response());
        }

        Ok(())
    }

    async fn enter(&self) -> InFlight<'_> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        InFlight(&self.in_flight)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn auth(State(mock): State<Arc<MockUpstream>>, Json(body): Json<Value>) -> Response {
    if !mock.auth_delay.is_zero() {
        tokio::time::sleep(mock.auth_delay).await;
    }

    if !mock.auth_status.is_success() {
        return (mock.auth_status, "auth unavailable").into_response();
    }

    if body.get("clientSecret").is_none() {
        return (StatusCode::BAD_REQUEST, "missing credentials").into_response();
    }

    let n = mock.exchanges.fetch_add(1, Ordering::SeqCst) + 1;

    Json(json!({
        "token_type": "Bearer",
        "access_token": format!("token-{n}"),
        "expires_in": mock.expires_in,
    }))
    .into_response()
}

async fn users(State(mock): State<Arc<MockUpstream>>, headers: HeaderMap) -> Response {
    let _guard = mock.enter().await;

    if let Err(rejection) = mock.authorize(&headers) {
        return rejection;
    }

    let users: Map<String, Value> = mock
        .users
        .iter()
        .map(|(id, name)| (id.clone(), Value::String(name.clone())))
        .collect();

    Json(json!({ "users": users })).into_response()
}

async fn user_posts(
    State(mock): State<Arc<MockUpstream>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let _guard = mock.enter().await;

    if let Err(rejection) = mock.authorize(&headers) {
        return rejection;
    }

    if mock.failing_users.contains(&id) {
        return (StatusCode::SERVICE_UNAVAILABLE, "posts unavailable").into_response();
    }

    if mock.malformed_users.contains(&id) {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }

    let posts = mock.posts.get(&id).cloned().unwrap_or_default();

    Json(json!({ "posts": posts })).into_response()
}

async fn post_comments(
    State(mock): State<Arc<MockUpstream>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let _guard = mock.enter().await;

    if let Err(rejection) = mock.authorize(&headers) {
        return rejection;
    }

    let count = mock.comments.get(&id).copied().unwrap_or(0);
    let comments: Vec<Value> = (0..count)
        .map(|n| json!({ "id": n, "postid": id, "content": "comment" }))
        .collect();

    if mock.misspelled_comments.contains(&id) {
        Json(json!({ "coments": comments })).into_response()
    } else {
        Json(json!({ "comments": comments })).into_response()
    }
}

pub(crate) fn credentials() -> Credentials {
    Credentials {
        company_name: "Test Company".into(),
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        owner_name: "Test Owner".into(),
        owner_email: "owner@example.com".into(),
        roll_no: "1".into(),
    }
}

pub(crate) fn client(url: &str) -> Client {
    Client::new("aggregator-tests", url, credentials()).unwrap()
}
