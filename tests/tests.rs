// ../tests/tests.rs
use techpal::*;

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use strum::IntoEnumIterator;
use techpal::app::Action;
use techpal::context::Context;
use techpal::logging::SimpleLogger;
use techpal::ui::{ChatScreen, Component, bubbles::message_lines, spinner::Spinner};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

// Records every prompt it sees and answers with a fixed result.
struct FakeClient {
    reply: Result<String, CompletionError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeClient {
    fn replying(reply: &str) -> Arc<Self> {
        Self::with_result(Ok(reply.to_string()))
    }

    fn failing(error: &str) -> Arc<Self> {
        Self::with_result(Err(CompletionError::Backend(error.to_string())))
    }

    fn with_result(reply: Result<String, CompletionError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl CompletionClient for FakeClient {
    fn model(&self) -> &str {
        "fake"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

// Never answers; only cancellation ends a request.
struct HangingClient;

impl CompletionClient for HangingClient {
    fn model(&self) -> &str {
        "hanging"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        std::future::pending().await
    }
}

// --- Roles

#[test]
fn test_role_lookup_accepts_every_catalog_role() {
    for role in Role::iter() {
        assert_eq!(Role::lookup(&role.to_string()), Ok(role));
    }
    assert_eq!(Role::lookup("Admin"), Ok(Role::Admin));
}

#[test]
fn test_role_lookup_rejects_unknown_role() {
    assert_eq!(
        Role::lookup("Manager"),
        Err(UnknownRole("Manager".to_string()))
    );
    assert!(Role::lookup("developer").is_err());
    assert_eq!(
        UnknownRole("Manager".to_string()).to_string(),
        "Unknown role: Manager"
    );
}

#[test]
fn test_role_definitions_are_distinct() {
    let definitions: Vec<RoleDefinition> = Role::iter().map(Role::definition).collect();
    assert_eq!(definitions.len(), 4);
    for (i, a) in definitions.iter().enumerate() {
        assert!(!a.instructions.is_empty());
        assert!(!a.greeting.is_empty());
        for b in definitions.iter().skip(i + 1) {
            assert_ne!(a.instructions, b.instructions);
        }
    }
    assert!(Role::Student.instructions().contains("quiz"));
}

#[test]
fn test_role_selection_falls_back_for_unknown_names() {
    assert_eq!(
        RoleSelection::parse(" Student "),
        RoleSelection::Catalog(Role::Student)
    );

    let selection = RoleSelection::parse("Astronaut");
    assert_eq!(selection.role(), None);
    let definition = selection.definition();
    assert_eq!(definition.name, "Astronaut");
    assert_eq!(definition.instructions, role::FALLBACK_INSTRUCTIONS);
}

// --- Prompt building

#[test]
fn test_prompt_contains_role_instructions_for_every_role() {
    let history = vec![Message::user("hi"), Message::assistant("hello")];
    for role in Role::iter() {
        let definition = role.definition();
        let rendered = build(&definition, &history, "How do I deploy?").render();

        assert!(rendered.starts_with(prompt::PREAMBLE));
        assert!(rendered.contains(definition.instructions));
        assert_eq!(rendered.matches(&format!("Role: {role}")).count(), 1);
        assert!(rendered.contains("user: hi\nassistant: hello"));
        assert!(rendered.ends_with("Query: How do I deploy?"));
    }
}

#[test]
fn test_prompt_with_empty_history() {
    let payload = build(&Role::User.definition(), &[], "What is Wi-Fi?");
    assert_eq!(payload.history, "");
    assert_eq!(payload.input, "What is Wi-Fi?");

    let rendered = payload.render();
    assert!(rendered.contains(prompt::PREAMBLE));
    assert!(rendered.contains("Role: User"));
    assert!(rendered.contains(Role::User.instructions()));
    assert!(rendered.ends_with("Query: What is Wi-Fi?"));
}

// --- Transcript form

#[test]
fn test_transcript_round_trip() {
    let history = vec![
        Message::user("How do I list files?"),
        Message::assistant("Use `ls`.\nAdd `-la` to see hidden files."),
        Message::user("Thanks"),
    ];

    let transcript = serialize_history(&history);
    assert_eq!(
        transcript.lines().next(),
        Some("user: How do I list files?")
    );
    assert_eq!(parse_history(&transcript), history);
}

#[test]
fn test_transcript_of_empty_history_is_empty() {
    assert_eq!(serialize_history(&[]), "");
    assert!(parse_history("").is_empty());
    assert!(parse_history("no speaker here").is_empty());
}

// --- Conversation memory

#[test]
fn test_memory_snapshot_keeps_order_and_is_unaffected_by_later_changes() {
    let mut memory = ConversationMemory::new();
    memory.append(Message::user("first"));
    memory.append(Message::assistant("second"));

    let snapshot = memory.snapshot();
    memory.append(Message::user("third"));

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].content, "first");
    assert_eq!(snapshot[1].content, "second");
    assert_eq!(memory.len(), 3);

    memory.reset();
    assert_eq!(snapshot.len(), 2);
}

#[test]
fn test_memory_reset_starts_new_conversation() {
    let mut memory = ConversationMemory::new();
    let before = memory.id();
    memory.append(Message::user("hello"));

    let after = memory.reset();
    assert!(memory.is_empty());
    assert_ne!(before, after);
    assert_eq!(memory.id(), after);
    assert_eq!(after.short().len(), 8);
}

#[test]
fn test_memory_limit_drops_oldest() {
    let mut memory = ConversationMemory::with_limit(Some(MemoryLimit::drop_oldest(3)));
    for i in 0..5 {
        memory.append(Message::user(format!("message {i}")));
    }

    let contents: Vec<&str> = memory.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
}

// --- Session controller

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let client = FakeClient::replying("unused");
    let mut controller = SessionController::new(client.clone(), None);

    assert!(controller.submit("").await.unwrap().is_none());
    assert!(controller.submit("   \n\t").await.unwrap().is_none());

    assert!(controller.messages().is_empty());
    assert_eq!(client.calls(), 0);
    assert_eq!(controller.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_student_turn_appends_exactly_two_messages() {
    let client = FakeClient::replying("Assistant: A variable is a named box for a value.");
    let mut controller = SessionController::new(client.clone(), None);
    controller.select_role(Role::Student);

    let reply = controller.submit("What is a variable?").await.unwrap().cloned();

    assert_eq!(
        reply,
        Some(Message::assistant("A variable is a named box for a value."))
    );
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(controller.messages()[0], Message::user("What is a variable?"));
    assert_eq!(controller.state(), TurnState::Idle);

    let prompt = client.last_prompt();
    assert!(prompt.contains(Role::Student.instructions()));
    assert!(prompt.ends_with("Query: What is a variable?"));
    // The latest input is not repeated inside the history section.
    assert!(!prompt.contains("user: What is a variable?"));
}

#[tokio::test]
async fn test_history_carries_into_next_turn() {
    let client = FakeClient::replying("Sure.");
    let mut controller = SessionController::new(client.clone(), None);

    controller.submit("first question").await.unwrap();
    controller.select_role(Role::Admin);
    controller.submit("second question").await.unwrap();

    let prompt = client.last_prompt();
    assert!(prompt.contains("user: first question\nassistant: Sure."));
    assert!(prompt.contains("Role: Admin"));
    assert_eq!(controller.messages().len(), 4);
}

#[tokio::test]
async fn test_backend_failure_yields_fallback_and_diagnostic() {
    let client = FakeClient::failing("request timed out: model 'llama2' not found");
    let mut controller = SessionController::new(client.clone(), None);
    controller.select_role(Role::Admin);

    let reply = controller.submit("How do I harden SSH?").await.unwrap().cloned();

    assert_eq!(reply, Some(Message::assistant(FALLBACK_REPLY)));
    assert_eq!(controller.messages().len(), 2);
    assert_eq!(controller.state(), TurnState::Idle);

    let diagnostics = controller.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].detail.contains("model 'llama2' not found"));
    assert_eq!(diagnostics[0].conversation, controller.conversation_id());
    assert!(!controller.messages()[1].content.contains("llama2"));
}

#[test]
fn test_second_turn_and_reset_refused_while_busy() {
    let client = FakeClient::replying("ok");
    let mut controller = SessionController::new(client, None);

    let pending = controller.begin_turn("first").unwrap().unwrap();
    assert!(controller.is_busy());
    assert!(matches!(
        controller.begin_turn("second"),
        Err(SessionError::TurnInFlight)
    ));
    assert_eq!(controller.reset(), Err(SessionError::TurnInFlight));
    assert_eq!(controller.messages().len(), 1);

    let conversation = controller.conversation_id();
    let reply = controller.finish_turn(pending, Ok("done".to_string())).cloned();
    assert_eq!(reply, Some(Message::assistant("done")));
    assert_eq!(controller.conversation_id(), conversation);
    assert_eq!(controller.messages().len(), 2);
    assert!(!controller.is_busy());
    assert!(controller.reset().is_ok());
    assert!(controller.messages().is_empty());
}

#[test]
fn test_pending_turn_history_excludes_latest_input() {
    let client = FakeClient::replying("ok");
    let mut controller = SessionController::new(client, None);

    let pending = controller.begin_turn("  padded question  ").unwrap().unwrap();
    assert!(pending.history.is_empty());
    assert_eq!(pending.payload.input, "padded question");
    assert_eq!(controller.messages()[0].content, "padded question");
    assert_eq!(pending.prompt, pending.payload.render());
}

#[tokio::test]
async fn test_cancelled_request_records_fallback() {
    let client = Arc::new(HangingClient);
    let mut controller = SessionController::new(client.clone(), None);
    let pending = controller.begin_turn("slow question").unwrap().unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let result = complete_cancellable(client.as_ref(), &pending.prompt, &token).await;
    assert_eq!(result, Err(CompletionError::Cancelled));

    controller.finish_turn(pending, result);
    assert_eq!(controller.messages()[1].content, FALLBACK_REPLY);
    assert_eq!(controller.diagnostics()[0].detail, "Completion cancelled");
}

#[test]
fn test_clean_completion() {
    assert_eq!(clean_completion("  Hello there \n"), "Hello there");
    assert_eq!(clean_completion("TechPal: Use git."), "Use git.");
    assert_eq!(clean_completion("Assistant:\nLine one"), "Line one");
    assert_eq!(clean_completion("AI: AI: twice"), "AI: twice");
}

// --- Settings

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::from_lookup(lookup(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.model, "llama2");
    assert_eq!(settings.ollama_host, "http://localhost:11434");
    assert_eq!(settings.memory_limit(), None);
}

#[test]
fn test_settings_overrides() {
    let settings = Settings::from_lookup(lookup(&[
        ("OLLAMA_MODEL", "mistral"),
        ("OLLAMA_HOST", "127.0.0.1:9999"),
        ("TECHPAL_MAX_MESSAGES", "20"),
        ("TECHPAL_DEBUG", "true"),
    ]));
    assert_eq!(settings.model, "mistral");
    assert_eq!(settings.ollama_host, "http://127.0.0.1:9999");
    assert_eq!(settings.memory_limit(), Some(MemoryLimit::drop_oldest(20)));
    assert!(settings.debug_mode);
}

#[test]
fn test_settings_ignore_blank_and_invalid_values() {
    let settings = Settings::from_lookup(lookup(&[
        ("OLLAMA_MODEL", "   "),
        ("TECHPAL_MAX_MESSAGES", "0"),
        ("TECHPAL_DEBUG", "nope"),
    ]));
    assert_eq!(settings.model, "llama2");
    assert_eq!(settings.max_messages, None);
    assert!(!settings.debug_mode);

    let settings = Settings::from_lookup(lookup(&[("TECHPAL_MAX_MESSAGES", "many")]));
    assert_eq!(settings.max_messages, None);
}

// --- Ollama client

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data).into_owned();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

// Answers a single HTTP request and hands back what it received.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}/"), handle)
}

#[tokio::test]
async fn test_ollama_client_generates_completion() {
    let (host, server) = serve_once("200 OK", r#"{"model":"llama2","response":"Use `docker ps`.","done":true}"#).await;
    let client = OllamaClient::new(&host, "llama2");
    assert!(!client.host().ends_with('/'));

    let reply = client.complete("Query: list containers").await;
    assert_eq!(reply, Ok("Use `docker ps`.".to_string()));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/generate"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["model"], "llama2");
    assert_eq!(json["prompt"], "Query: list containers");
    assert_eq!(json["stream"], false);
}

#[tokio::test]
async fn test_ollama_client_reports_error_status() {
    let (host, _server) = serve_once("404 Not Found", r#"{"error":"model 'nope' not found"}"#).await;
    let client = OllamaClient::new(&host, "nope");

    match client.complete("hello").await {
        Err(CompletionError::Backend(detail)) => {
            assert!(detail.contains("404"));
            assert!(detail.contains("model 'nope' not found"));
        }
        other => panic!("Expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ollama_client_reports_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OllamaClient::new(&format!("http://{addr}"), "llama2");
    match client.complete("hello").await {
        Err(CompletionError::Backend(detail)) => {
            assert!(detail.starts_with("could not reach the model server"));
        }
        other => panic!("Expected backend error, got {other:?}"),
    }
}

// --- Logging

#[test]
fn test_simple_logger_writes_to_file() {
    use log::{Level, LevelFilter, Log, Record};

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let logger = SimpleLogger::new(dir.path(), LevelFilter::Info);

    logger.log(
        &Record::builder()
            .args(format_args!("conversation started"))
            .level(Level::Info)
            .build(),
    );
    logger.log(
        &Record::builder()
            .args(format_args!("too chatty"))
            .level(Level::Debug)
            .build(),
    );

    let contents = fs::read_to_string(logger.log_path()).expect("Failed to read log file");
    assert!(contents.contains("INFO - conversation started"));
    assert!(!contents.contains("too chatty"));
}

// --- UI

fn text_of(line: &ratatui::text::Line) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

#[test]
fn test_message_bubbles_alignment() {
    let messages = vec![Message::user("hi"), Message::assistant("hello")];
    let lines = message_lines(&messages, 100);

    // header, body, spacer per message
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0].alignment, Some(Alignment::Right));
    assert_eq!(text_of(&lines[0]).trim(), "You");
    assert_eq!(lines[3].alignment, Some(Alignment::Left));
    assert!(text_of(&lines[3]).contains("TechPal"));
    assert!(text_of(&lines[4]).contains("hello"));
}

#[test]
fn test_message_bubbles_do_not_depend_on_current_role() {
    let messages = vec![Message::user("How do I deploy?"), Message::assistant("Like this.")];
    let lines = message_lines(&messages, 100);
    let text: String = lines.iter().map(text_of).collect();

    for role in Role::iter() {
        assert!(!text.contains(&role.to_string()));
        assert!(!text.contains(role.icon()));
    }
}

fn buffer_text(buffer: &Buffer) -> String {
    buffer.content.iter().map(|cell| cell.symbol()).collect()
}

#[test]
fn test_long_conversation_keeps_newest_message_in_view() {
    let spinner = Spinner::new();
    let role = RoleSelection::default();
    let mut messages: Vec<Message> = (0..22_000).map(|i| Message::user(format!("m{i}"))).collect();
    messages.push(Message::assistant("NEWEST_REPLY"));
    let context = Context {
        messages: &messages,
        role: &role,
        conversation: ConversationId::new(),
        model: "llama2",
        busy: false,
        spinner: &spinner,
    };
    let area = Rect::new(0, 0, 120, 40);
    let mut screen = ChatScreen::new();

    let mut buffer = Buffer::empty(area);
    screen.render(area, &mut buffer, &context);
    let text = buffer_text(&buffer);
    assert!(text.contains("NEWEST_REPLY"));
    assert!(text.contains("m21999"));

    screen.on_key(key(KeyCode::PageUp, KeyModifiers::NONE), &context);
    let mut buffer = Buffer::empty(area);
    screen.render(area, &mut buffer, &context);
    assert!(!buffer_text(&buffer).contains("NEWEST_REPLY"));

    screen.on_key(key(KeyCode::PageDown, KeyModifiers::NONE), &context);
    let mut buffer = Buffer::empty(area);
    screen.render(area, &mut buffer, &context);
    assert!(buffer_text(&buffer).contains("NEWEST_REPLY"));
}

fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

#[test]
fn test_chat_screen_keys() {
    let spinner = Spinner::new();
    let role = RoleSelection::default();
    let messages: Vec<Message> = Vec::new();
    let idle = Context {
        messages: &messages,
        role: &role,
        conversation: ConversationId::new(),
        model: "llama2",
        busy: false,
        spinner: &spinner,
    };
    let mut screen = ChatScreen::new();

    assert!(screen.on_key(key(KeyCode::Enter, KeyModifiers::NONE), &idle).is_none());
    for c in "hi".chars() {
        screen.on_key(key(KeyCode::Char(c), KeyModifiers::NONE), &idle);
    }
    match screen.on_key(key(KeyCode::Enter, KeyModifiers::NONE), &idle) {
        Some(Action::Submit(text)) => assert_eq!(text, "hi"),
        _ => panic!("Expected submit"),
    }
    assert_eq!(screen.input_text(), "");

    assert!(matches!(
        screen.on_key(key(KeyCode::F(2), KeyModifiers::NONE), &idle),
        Some(Action::SelectRole(Role::Admin))
    ));
    assert!(matches!(
        screen.on_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL), &idle),
        Some(Action::Reset)
    ));

    let busy = Context { busy: true, ..idle };
    screen.on_key(key(KeyCode::Enter, KeyModifiers::ALT), &busy);
    screen.on_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &busy);
    assert_eq!(screen.input_text(), "");
    assert!(screen.on_key(key(KeyCode::Enter, KeyModifiers::NONE), &busy).is_none());
    assert!(screen.on_key(key(KeyCode::Char('r'), KeyModifiers::CONTROL), &busy).is_none());
    assert!(matches!(
        screen.on_key(key(KeyCode::Esc, KeyModifiers::NONE), &busy),
        Some(Action::Stop)
    ));
    assert!(matches!(
        screen.on_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL), &busy),
        Some(Action::Quit)
    ));
}
