#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex, mpsc};
use std::{fs, io::Write, thread};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;

/// State behind the fake ticket service.
#[derive(Default)]
pub struct ServerState {
    pub tickets: Vec<Value>,
    pub next_id: u64,
    /// When false, `GET /tickets/{id}` answers 405 like a list-only backend
    pub item_route: bool,
    /// Number of upcoming `GET /tickets` calls that fail with 503
    pub failing_lists: u32,
    /// Error returned by the next PATCH or DELETE
    pub next_mutation_error: Option<(u16, String)>,
    pub posted: Vec<Value>,
    pub patched: Vec<(u64, Value)>,
    pub list_calls: u32,
}

type Shared = Arc<Mutex<ServerState>>;

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn take_mutation_error(state: &mut ServerState) -> Option<Response> {
    state.next_mutation_error.take().map(|(code, message)| {
        detail(
            StatusCode::from_u16(code).expect("valid status code"),
            &message,
        )
    })
}

fn ticket_id(ticket: &Value) -> Option<u64> {
    ticket.get("id").and_then(Value::as_u64)
}

async fn list_tickets(State(state): State<Shared>) -> Response {
    let mut state = state.lock().unwrap();
    state.list_calls += 1;
    if state.failing_lists > 0 {
        state.failing_lists -= 1;
        return detail(StatusCode::SERVICE_UNAVAILABLE, "warming up");
    }
    Json(Value::Array(state.tickets.clone())).into_response()
}

async fn create_ticket(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.posted.push(body.clone());

    let mut ticket = body;
    ticket["id"] = json!(state.next_id);
    state.next_id += 1;
    state.tickets.push(ticket.clone());
    (StatusCode::CREATED, Json(ticket)).into_response()
}

async fn get_ticket(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let state = state.lock().unwrap();
    if !state.item_route {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    match state.tickets.iter().find(|t| ticket_id(t) == Some(id)) {
        Some(ticket) => Json(ticket.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Ticket not found"),
    }
}

async fn update_ticket(
    State(state): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(error) = take_mutation_error(&mut state) {
        return error;
    }
    state.patched.push((id, body.clone()));

    let Some(ticket) = state.tickets.iter_mut().find(|t| ticket_id(t) == Some(id)) else {
        return detail(StatusCode::NOT_FOUND, "Ticket not found");
    };
    if let (Some(target), Some(fields)) = (ticket.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(ticket.clone()).into_response()
}

async fn delete_ticket(State(state): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(error) = take_mutation_error(&mut state) {
        return error;
    }
    let before = state.tickets.len();
    state.tickets.retain(|t| ticket_id(t) != Some(id));
    if state.tickets.len() == before {
        return detail(StatusCode::NOT_FOUND, "Ticket not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

/// In-process ticket service on an ephemeral port.
pub struct FakeServer {
    pub url: String,
    pub state: Shared,
}

impl FakeServer {
    pub fn start(tickets: Vec<Value>) -> Self {
        let next_id = tickets.iter().filter_map(ticket_id).max().unwrap_or(0) + 1;
        let state = Arc::new(Mutex::new(ServerState {
            tickets,
            next_id,
            item_route: true,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/tickets", get(list_tickets).post(create_ticket))
            .route(
                "/tickets/:id",
                get(get_ticket).patch(update_ticket).delete(delete_ticket),
            )
            .with_state(state.clone());

        let (tx, rx) = mpsc::channel::<SocketAddr>();
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("Failed to build server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind fake backend");
                tx.send(listener.local_addr().expect("Failed to read address"))
                    .expect("Failed to report address");
                axum::serve(listener, app).await.expect("Fake backend stopped");
            });
        });

        let addr = rx.recv().expect("Fake backend did not start");
        FakeServer {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn tickets(&self) -> Vec<Value> {
        self.state.lock().unwrap().tickets.clone()
    }

    pub fn ticket(&self, id: u64) -> Option<Value> {
        self.tickets().into_iter().find(|t| ticket_id(t) == Some(id))
    }

    pub fn fail_next_mutation(&self, status: u16, message: &str) {
        self.state.lock().unwrap().next_mutation_error = Some((status, message.to_string()));
    }

    pub fn fail_lists(&self, count: u32) {
        self.state.lock().unwrap().failing_lists = count;
    }

    pub fn disable_item_route(&self) {
        self.state.lock().unwrap().item_route = false;
    }

    pub fn posted(&self) -> Vec<Value> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn patched(&self) -> Vec<(u64, Value)> {
        self.state.lock().unwrap().patched.clone()
    }

    pub fn list_calls(&self) -> u32 {
        self.state.lock().unwrap().list_calls
    }
}

/// The tickets most tests start from.
pub fn sample_tickets() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Printer", "description": "Paper jam on floor 2",
               "priority": "Low", "status": "Closed", "tags": ["hardware"]}),
        json!({"id": 2, "title": "VPN", "description": "Cannot connect from home",
               "priority": "High", "status": "Open", "tags": []}),
        json!({"id": 3, "title": "Laptop", "description": "Battery drains fast",
               "priority": "Medium", "status": "In progress", "tags": []}),
        json!({"id": 4, "title": "Éclair oven", "description": "Out of pastry",
               "priority": "Low", "status": "Open", "tags": []}),
    ]
}

/// Helper struct to run ticketdesk against a fake backend with an isolated config
pub struct DeskTest {
    pub temp_dir: TempDir,
    pub server: FakeServer,
}

impl DeskTest {
    pub fn new() -> Self {
        Self::with_tickets(sample_tickets())
    }

    pub fn with_tickets(tickets: Vec<Value>) -> Self {
        DeskTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            server: FakeServer::start(tickets),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_ticketdesk"));
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("TICKETDESK_CONFIG", self.config_path())
            .env("TICKETDESK_URL", &self.server.url)
            .env("NO_COLOR", "1")
            .env_remove("TICKETDESK_LOG");
        command
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute ticketdesk command")
    }

    /// Run with `input` piped to stdin, as for `browse`.
    pub fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn ticketdesk");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        child
            .wait_with_output()
            .expect("Failed to wait for ticketdesk")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        assert_eq!(output.status.code(), Some(1));
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let stdout = self.run_success(&full);
        serde_json::from_str(&stdout).expect("Output is not valid JSON")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> Option<String> {
        fs::read_to_string(self.config_path()).ok()
    }
}
