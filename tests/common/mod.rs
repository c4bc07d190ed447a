#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use teacher_desk::models::{FilterCriteria, Teacher, TeacherStatistics};
use tokio::net::TcpListener;

pub const PDF_BYTES: &[u8] = b"%PDF-1.4 mock";
pub const EXCEL_BYTES: &[u8] = b"PK\x03\x04 mock";

/// In-memory stand-in for the teachers service.
#[derive(Clone, Default)]
pub struct MockState {
    pub teachers: Arc<Mutex<Vec<Teacher>>>,
    next_id: Arc<Mutex<i64>>,
    /// `METHOD path?query` of every request received.
    pub calls: Arc<Mutex<Vec<String>>>,
    /// When set, every request answers 500.
    pub fail: Arc<AtomicBool>,
}

impl MockState {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn insert(&self, mut teacher: Teacher) -> Teacher {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        teacher.id = Some(*next_id);
        teacher.age = age_of(teacher.date_of_birth);
        self.teachers.lock().unwrap().push(teacher.clone());
        teacher
    }
}

pub fn teacher(name: &str, born: &str, classes: u32) -> Teacher {
    Teacher::new(
        name,
        NaiveDate::parse_from_str(born, "%Y-%m-%d").unwrap(),
        classes,
    )
}

fn age_of(date_of_birth: NaiveDate) -> Option<u32> {
    Local::now().date_naive().years_since(date_of_birth)
}

/// Start the mock API on an ephemeral port, preloaded with `seed`. Returns the
/// base URL (scheme, host and port) and the shared state.
pub async fn spawn_server(seed: Vec<Teacher>) -> (String, MockState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let state = MockState::default();
    for teacher in seed {
        state.insert(teacher);
    }

    let app = Router::new()
        .route("/api/teachers", get(list).post(create))
        .route("/api/teachers/search", get(search))
        .route("/api/teachers/filter", post(filter))
        .route("/api/teachers/filter/age", get(filter_by_age))
        .route("/api/teachers/filter/classes", get(filter_by_classes))
        .route("/api/teachers/statistics", get(statistics))
        .route("/api/teachers/export/pdf", get(export_pdf))
        .route("/api/teachers/export/excel", get(export_excel))
        .route(
            "/api/teachers/:id",
            get(fetch).put(update).delete(remove),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), state)
}

async fn record(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let uri = request.uri();
    let line = match uri.query() {
        Some(query) => format!("{} {}?{}", request.method(), uri.path(), query),
        None => format!("{} {}", request.method(), uri.path()),
    };
    state.calls.lock().unwrap().push(line);
    if state.fail.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    next.run(request).await
}

async fn list(State(state): State<MockState>) -> Json<Vec<Teacher>> {
    Json(state.teachers.lock().unwrap().clone())
}

async fn fetch(State(state): State<MockState>, Path(id): Path<i64>) -> Response {
    let teachers = state.teachers.lock().unwrap();
    match teachers.iter().find(|t| t.id == Some(id)) {
        Some(teacher) => Json(teacher.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create(State(state): State<MockState>, Json(teacher): Json<Teacher>) -> Response {
    let created = state.insert(teacher);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update(
    State(state): State<MockState>,
    Path(id): Path<i64>,
    Json(mut teacher): Json<Teacher>,
) -> Response {
    let mut teachers = state.teachers.lock().unwrap();
    match teachers.iter_mut().find(|t| t.id == Some(id)) {
        Some(slot) => {
            teacher.id = Some(id);
            teacher.age = age_of(teacher.date_of_birth);
            *slot = teacher.clone();
            Json(teacher).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn remove(State(state): State<MockState>, Path(id): Path<i64>) -> StatusCode {
    let mut teachers = state.teachers.lock().unwrap();
    let before = teachers.len();
    teachers.retain(|t| t.id != Some(id));
    if teachers.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn search(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Teacher>> {
    let query = params.get("query").cloned().unwrap_or_default().to_lowercase();
    let teachers = state.teachers.lock().unwrap();
    Json(
        teachers
            .iter()
            .filter(|t| t.full_name.to_lowercase().contains(&query))
            .cloned()
            .collect(),
    )
}

fn within(value: Option<u32>, min: Option<u32>, max: Option<u32>) -> bool {
    let value = value.unwrap_or(0);
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

async fn filter(
    State(state): State<MockState>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<Vec<Teacher>> {
    let term = criteria.search_term.clone().unwrap_or_default().to_lowercase();
    let teachers = state.teachers.lock().unwrap();
    Json(
        teachers
            .iter()
            .filter(|t| t.full_name.to_lowercase().contains(&term))
            .filter(|t| within(t.age, criteria.min_age, criteria.max_age))
            .filter(|t| {
                within(
                    Some(t.number_of_classes),
                    criteria.min_classes,
                    criteria.max_classes,
                )
            })
            .cloned()
            .collect(),
    )
}

async fn filter_by_age(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, u32>>,
) -> Json<Vec<Teacher>> {
    let teachers = state.teachers.lock().unwrap();
    Json(
        teachers
            .iter()
            .filter(|t| within(t.age, params.get("minAge").copied(), params.get("maxAge").copied()))
            .cloned()
            .collect(),
    )
}

async fn filter_by_classes(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, u32>>,
) -> Json<Vec<Teacher>> {
    let teachers = state.teachers.lock().unwrap();
    Json(
        teachers
            .iter()
            .filter(|t| {
                within(
                    Some(t.number_of_classes),
                    params.get("minClasses").copied(),
                    params.get("maxClasses").copied(),
                )
            })
            .cloned()
            .collect(),
    )
}

async fn statistics(State(state): State<MockState>) -> Json<TeacherStatistics> {
    let teachers = state.teachers.lock().unwrap();
    let total = teachers.len();
    let average = if total == 0 {
        0.0
    } else {
        teachers.iter().map(|t| t.number_of_classes as f64).sum::<f64>() / total as f64
    };
    Json(TeacherStatistics {
        total_teachers: total as u64,
        average_classes: average,
    })
}

async fn export_pdf() -> Vec<u8> {
    PDF_BYTES.to_vec()
}

async fn export_excel() -> Vec<u8> {
    EXCEL_BYTES.to_vec()
}
