//! Test support: a scripted [`Backend`] and JSON fixtures
//!
//! ```ignore
//! let fake = FakeBackend::new();
//! fake.respond(Method::Get, "admin-shelter/laporan/tutor", json!({"success": true, ..}));
//! let ctx = test_context(&fake, InitPolicy::BestEffort);
//! tutor::fetch_list(&ctx, 1).await?;
//! assert_eq!(fake.last_request().unwrap().query.get("start_date"), Some("2024-01-01"));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::api::{ApiError, ApiRequest, Backend, Method};
use crate::config::InitPolicy;
use crate::context::AppContext;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16, Value),
    Transport(String),
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<(Method, String), VecDeque<Scripted>>,
    requests: Vec<ApiRequest>,
}

/// Backend answering from scripted replies per method and path.
///
/// Replies for a route are used in order; the last one repeats. Unknown
/// routes answer 404. Clones share the script and the request log.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply, delay: Option<Duration>) {
        self.lock()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted { reply, delay });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer with a 2xx JSON body
    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.push(method, path, Reply::Json(body), None);
    }

    /// Answer after `delay`; with paused tokio time this orders concurrent calls
    pub fn respond_after(&self, method: Method, path: &str, delay: Duration, body: Value) {
        self.push(method, path, Reply::Json(body), Some(delay));
    }

    /// Answer with an error status and an optional `message`
    pub fn respond_status(&self, method: Method, path: &str, status: u16, message: Option<&str>) {
        let body = match message {
            Some(message) => json!({"success": false, "message": message}),
            None => Value::Null,
        };
        self.push(method, path, Reply::Status(status, body), None);
    }

    /// Answer with an error status and a full JSON body
    pub fn respond_json_status(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(method, path, Reply::Status(status, body), None);
    }

    /// Fail without a response
    pub fn fail_transport(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Reply::Transport(message.to_string()), None);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    /// How many requests hit exactly this method and path
    pub fn requests_to(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn next_reply(&self, request: &ApiRequest) -> Option<Scripted> {
        let mut inner = self.lock();
        inner.requests.push(request.clone());
        let queue = inner
            .routes
            .get_mut(&(request.method, request.path.clone()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let Some(scripted) = self.next_reply(&request) else {
            return Err(ApiError::Status {
                status: 404,
                message: Some(format!("no route for {} {}", request.method, request.path)),
            });
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        match scripted.reply {
            Reply::Json(body) => Ok(body),
            Reply::Status(status, body) => {
                let raw = if body.is_null() {
                    String::new()
                } else {
                    body.to_string()
                };
                Err(ApiError::from_response(status, &raw))
            }
            Reply::Transport(message) => Err(ApiError::Transport(message)),
        }
    }
}

/// A context whose backend is `fake`
pub fn test_context(fake: &FakeBackend, policy: InitPolicy) -> AppContext {
    AppContext::new(Arc::new(fake.clone()), policy)
}

pub fn kurikulum_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "nama_kurikulum": format!("Kurikulum {id}"),
        "tahun_berlaku": 2024,
        "status": status,
        "deskripsi": null,
        "total_materi": 3
    })
}

pub fn child_report_json(id: u64, name: &str) -> Value {
    json!({
        "id_anak": id,
        "full_name": name,
        "nick_name": null,
        "shelter_name": "Shelter Melati",
        "total_activities": 12,
        "attended": 10,
        "attendance_percentage": 83.3,
        "monthly_data": {}
    })
}

pub fn tutor_report_json(id: u64, name: &str) -> Value {
    json!({
        "id_tutor": id,
        "nama": name,
        "maple": "Matematika",
        "total_activities": 8,
        "attended": 7,
        "attendance_percentage": 87.5
    })
}

pub fn raport_json(id: u64, child: &str, semester: &str) -> Value {
    json!({
        "id_raport": id,
        "id_anak": id * 10,
        "full_name": child,
        "semester": semester,
        "tahun_ajaran": "2023/2024",
        "nilai_rata_rata": 82.5,
        "ranking": 3,
        "status": "published"
    })
}

pub fn survey_json(id: u64, status: &str) -> Value {
    json!({
        "id_survey": id,
        "full_name": format!("Keluarga {id}"),
        "shelter_name": "Shelter Melati",
        "status_validasi": status,
        "catatan_validasi": null,
        "created_at": "2024-03-01T08:00:00Z"
    })
}
