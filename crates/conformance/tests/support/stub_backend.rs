//! In-memory stand-in for the DataPulse API
//!
//! Implements the endpoint contract closely enough for the conformance
//! suite to pass against it, with switches that break specific rules.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct StubOptions {
    /// Admin-only endpoints accept any signed-in caller
    pub leaky_rbac: bool,
    /// Enrollment conflicts carry `code: ALREADY_ENROLLED`
    pub conflict_code: bool,
    /// Size of the public catalogue
    pub course_count: usize,
    /// `users/{id}` answers callers without a token
    pub anonymous_user_lookup: bool,
    /// Login reports every account as a plain user
    pub login_role_mismatch: bool,
    /// Signup never checks for a taken email
    pub duplicate_signups: bool,
    /// Enrolling twice succeeds again instead of conflicting
    pub duplicate_enrollments: bool,
}

impl Default for StubOptions {
    fn default() -> Self {
        Self {
            leaky_rbac: false,
            conflict_code: false,
            course_count: 5,
            anonymous_user_lookup: false,
            login_role_mismatch: false,
            duplicate_signups: false,
            duplicate_enrollments: false,
        }
    }
}

#[derive(Debug, Clone)]
struct User {
    id: String,
    email: String,
    name: String,
    password: String,
    role: &'static str,
}

impl User {
    fn public(&self) -> Value {
        json!({ "id": self.id, "email": self.email, "name": self.name, "role": self.role })
    }

    fn token(&self) -> String {
        format!("token-{}", self.id)
    }
}

struct StubState {
    options: StubOptions,
    seeded: bool,
    users: Vec<User>,
    courses: Vec<Value>,
    enrollments: Vec<(String, String)>,
    activities: Vec<Value>,
    queries: Vec<Value>,
}

type Shared = Arc<Mutex<StubState>>;

fn reply(status: StatusCode, body: Value) -> (StatusCode, Value) {
    (status, body)
}

fn unauthorized() -> (StatusCode, Value) {
    reply(StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" }))
}

impl StubState {
    fn new(options: StubOptions) -> Self {
        let user = |id: &str, email: &str, name: &str, role| User {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            password: "password123".to_string(),
            role,
        };
        let courses = (1..=options.course_count)
            .map(|i| json!({ "id": format!("course-{}", i), "title": format!("Course {}", i) }))
            .collect();

        Self {
            options,
            seeded: false,
            users: vec![
                user("u-admin", "admin@datapulse.com", "Admin User", "admin"),
                user("u-sarah", "sarah@example.com", "Sarah", "user"),
                user("u-john", "john@example.com", "John", "user"),
            ],
            courses,
            enrollments: Vec::new(),
            activities: Vec::new(),
            queries: Vec::new(),
        }
    }

    fn caller(&self, token: Option<&str>) -> Option<User> {
        let token = token?;
        self.users.iter().find(|u| u.token() == token).cloned()
    }

    fn admin(&self, token: Option<&str>) -> Option<User> {
        self.caller(token)
            .filter(|u| u.role == "admin" || self.options.leaky_rbac)
    }

    fn handle(
        &mut self,
        method: &Method,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        let segments: Vec<&str> = path.split('/').collect();
        match (method.as_str(), segments.as_slice()) {
            ("GET", ["setup", "check"]) => {
                reply(StatusCode::OK, json!({ "setup": true, "hasData": true }))
            }
            ("POST", ["setup", "seed"]) => {
                let message = if self.seeded {
                    "Seed data already exists"
                } else {
                    "Seed data created successfully"
                };
                self.seeded = true;
                reply(StatusCode::OK, json!({ "message": message, "seeded": true }))
            }
            ("POST", ["auth", "login"]) => self.login(body),
            ("POST", ["auth", "signup"]) => self.signup(body),
            ("GET", ["auth", "me"]) => match self.caller(token) {
                Some(user) => reply(StatusCode::OK, json!({ "user": user.public() })),
                None => unauthorized(),
            },
            ("GET", ["courses"]) => reply(StatusCode::OK, json!({ "courses": self.courses })),
            ("POST", ["courses", "enroll"]) => self.enroll(token, body),
            ("GET", ["courses", id]) => match self.courses.iter().find(|c| c["id"] == *id) {
                Some(course) => reply(StatusCode::OK, json!({ "course": course })),
                None => reply(StatusCode::NOT_FOUND, json!({ "error": "Course not found" })),
            },
            ("POST", ["activities"]) => {
                let Some(user) = self.caller(token) else {
                    return unauthorized();
                };
                let activity = json!({
                    "id": format!("a-{}", self.activities.len() + 1),
                    "user_id": user.id,
                    "action_type": body["action_type"],
                });
                self.activities.push(activity.clone());
                reply(StatusCode::OK, json!({ "activity": activity }))
            }
            ("GET", ["activities"]) => {
                let Some(user) = self.caller(token) else {
                    return unauthorized();
                };
                let visible: Vec<&Value> = self
                    .activities
                    .iter()
                    .filter(|a| user.role == "admin" || a["user_id"] == user.id.as_str())
                    .collect();
                reply(StatusCode::OK, json!({ "activities": visible }))
            }
            ("POST", ["chatbot"]) => {
                let Some(user) = self.caller(token) else {
                    return unauthorized();
                };
                let Some(query) = body["query"].as_str() else {
                    return reply(StatusCode::BAD_REQUEST, json!({ "error": "Query required" }));
                };
                let response = "No prior experience is needed for most beginner courses.";
                self.queries
                    .push(json!({ "user_id": user.id, "query": query, "response": response }));
                reply(
                    StatusCode::OK,
                    json!({ "response": response, "query_id": self.queries.len() }),
                )
            }
            ("GET", ["chatbot", "queries"]) => match self.admin(token) {
                Some(_) => reply(StatusCode::OK, json!({ "queries": self.queries })),
                None => unauthorized(),
            },
            ("GET", ["analytics"]) => match self.admin(token) {
                Some(_) => reply(
                    StatusCode::OK,
                    json!({
                        "totalUsers": self.users.len(),
                        "totalCourses": self.courses.len(),
                        "totalQueries": self.queries.len(),
                        "activeToday": 1,
                    }),
                ),
                None => unauthorized(),
            },
            ("GET", ["users"]) => match self.admin(token) {
                Some(_) => {
                    let users: Vec<Value> = self.users.iter().map(User::public).collect();
                    reply(StatusCode::OK, json!({ "users": users }))
                }
                None => unauthorized(),
            },
            ("GET", ["users", id]) => {
                let anonymous = token.is_none() && self.options.anonymous_user_lookup;
                if !anonymous && self.admin(token).is_none() {
                    return unauthorized();
                }
                match self.users.iter().find(|u| u.id == *id) {
                    Some(user) => reply(
                        StatusCode::OK,
                        json!({ "user": user.public(), "activities": [], "enrollments": [] }),
                    ),
                    None => reply(StatusCode::NOT_FOUND, json!({ "error": "User not found" })),
                }
            }
            ("GET", ["dashboard"]) => {
                let Some(user) = self.caller(token) else {
                    return unauthorized();
                };
                let enrollments: Vec<Value> = self
                    .enrollments
                    .iter()
                    .filter(|(user_id, _)| *user_id == user.id)
                    .map(|(_, course_id)| json!({ "course_id": course_id }))
                    .collect();
                let activities: Vec<&Value> = self
                    .activities
                    .iter()
                    .filter(|a| a["user_id"] == user.id.as_str())
                    .collect();
                reply(
                    StatusCode::OK,
                    json!({ "enrollments": enrollments, "activities": activities }),
                )
            }
            _ => reply(StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
        }
    }

    fn login(&self, body: &Value) -> (StatusCode, Value) {
        let email = body["email"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();
        let Some(user) = self
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
        else {
            return reply(StatusCode::UNAUTHORIZED, json!({ "error": "Invalid credentials" }));
        };

        let mut public = user.public();
        if self.options.login_role_mismatch {
            public["role"] = json!("user");
        }
        reply(StatusCode::OK, json!({ "token": user.token(), "user": public }))
    }

    fn signup(&mut self, body: &Value) -> (StatusCode, Value) {
        let (Some(name), Some(email), Some(password)) = (
            body["name"].as_str(),
            body["email"].as_str(),
            body["password"].as_str(),
        ) else {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({ "error": "Name, email and password required" }),
            );
        };
        if !self.options.duplicate_signups && self.users.iter().any(|u| u.email == email) {
            return reply(StatusCode::CONFLICT, json!({ "error": "Email already registered" }));
        }

        let user = User {
            id: format!("u-{}", self.users.len() + 1),
            email: email.to_string(),
            name: name.to_string(),
            password: password.to_string(),
            role: "user",
        };
        let response = json!({ "token": user.token(), "user": user.public() });
        self.users.push(user);
        reply(StatusCode::OK, response)
    }

    fn enroll(&mut self, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let Some(user) = self.caller(token) else {
            return unauthorized();
        };
        let Some(course_id) = body["course_id"].as_str() else {
            return reply(StatusCode::BAD_REQUEST, json!({ "error": "course_id required" }));
        };
        let enrolled = self
            .enrollments
            .iter()
            .any(|(u, c)| *u == user.id && c == course_id);
        if enrolled && !self.options.duplicate_enrollments {
            let mut conflict = json!({ "error": "Already enrolled" });
            if self.options.conflict_code {
                conflict["code"] = json!("ALREADY_ENROLLED");
                conflict["error"] = json!("Conflict");
            }
            return reply(StatusCode::CONFLICT, conflict);
        }

        self.enrollments.push((user.id.clone(), course_id.to_string()));
        reply(
            StatusCode::OK,
            json!({ "enrollment": { "user_id": user.id, "course_id": course_id } }),
        )
    }
}

async fn dispatch(
    State(state): State<Shared>,
    method: Method,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = path.trim_matches('/').to_string();
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    match path.as_str() {
        "text" => return (StatusCode::OK, "<html>not json</html>").into_response(),
        "empty" => return StatusCode::NO_CONTENT.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            return Json(json!({})).into_response();
        }
        "echo-headers" => {
            return Json(json!({
                "content_type": header_value(header::CONTENT_TYPE),
                "authorization": header_value(header::AUTHORIZATION),
            }))
            .into_response();
        }
        _ => {}
    }

    let token = header_value(header::AUTHORIZATION)
        .and_then(|v| v.strip_prefix("Bearer ").map(str::to_string));
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let (status, value) = state
        .lock()
        .handle(&method, &path, token.as_deref(), &body);
    (status, Json(value)).into_response()
}

/// Running stub; the server task stops when this is dropped
pub struct StubBackend {
    base_url: String,
    task: JoinHandle<()>,
}

impl StubBackend {
    pub async fn spawn(options: StubOptions) -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::new(options)));
        let app = Router::new()
            .route("/api/*path", any(dispatch))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            task,
        }
    }

    /// Origin without the `/api` prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}
