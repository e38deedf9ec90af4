// src/session.rs
use std::sync::Arc;

use crate::{
    completion::{CompletionClient, clean_completion},
    error::{CompletionError, SessionError},
    memory::{ConversationId, ConversationMemory, MemoryLimit},
    message::Message,
    prompt::{self, PromptPayload},
    role::RoleSelection,
};

/// Shown to the user in place of any backend failure.
pub const FALLBACK_REPLY: &str = "Something went wrong, please try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingCompletion,
}

/// Raw failure detail kept out of the conversation for troubleshooting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub conversation: ConversationId,
    pub detail: String,
}

/// State owned by one user session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub memory: ConversationMemory,
    pub role: RoleSelection,
    pub state: TurnState,
    pub diagnostics: Vec<Diagnostic>,
}

/// A turn whose user message is recorded and whose prompt is ready to send.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub conversation: ConversationId,
    pub payload: PromptPayload,
    pub prompt: String,
    // History as it was when the prompt was built.
    pub history: Arc<Vec<Message>>,
}

/// Drives request/response turns for a single session.
#[derive(Debug)]
pub struct SessionController<C> {
    session: Session,
    client: Arc<C>,
}

impl<C: CompletionClient> SessionController<C> {
    pub fn new(client: Arc<C>, limit: Option<MemoryLimit>) -> Self {
        Self {
            session: Session {
                memory: ConversationMemory::with_limit(limit),
                ..Session::default()
            },
            client,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    pub fn state(&self) -> TurnState {
        self.session.state
    }

    pub fn is_busy(&self) -> bool {
        self.session.state == TurnState::AwaitingCompletion
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.session.memory.id()
    }

    pub fn messages(&self) -> &[Message] {
        self.session.memory.messages()
    }

    pub fn role(&self) -> &RoleSelection {
        &self.session.role
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.session.diagnostics
    }

    // Applies from the next turn on; a turn already in flight keeps its prompt.
    pub fn select_role(&mut self, role: impl Into<RoleSelection>) {
        let role = role.into();
        log::info!("Role selected: {}", role.definition().name);
        self.session.role = role;
    }

    /// Record the user's input and build the prompt for it.
    ///
    /// Blank input is ignored and returns `Ok(None)`.
    pub fn begin_turn(&mut self, input: &str) -> Result<Option<PendingTurn>, SessionError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        if self.is_busy() {
            return Err(SessionError::TurnInFlight);
        }

        let history = self.session.memory.snapshot();
        self.session.memory.append(Message::user(input));

        let role = self.session.role.definition();
        let payload = prompt::build(&role, &history, input);
        let prompt = payload.render();

        self.session.state = TurnState::AwaitingCompletion;
        log::debug!(
            "Turn started in {} as {} ({} prior messages)",
            self.conversation_id(),
            role.name,
            history.len()
        );

        Ok(Some(PendingTurn {
            conversation: self.conversation_id(),
            payload,
            prompt,
            history,
        }))
    }

    /// Record the outcome of a pending turn and return to `Idle`.
    ///
    /// Returns the newest message afterwards, which is the recorded reply.
    pub fn finish_turn(
        &mut self,
        pending: PendingTurn,
        result: Result<String, CompletionError>,
    ) -> Option<&Message> {
        self.session.state = TurnState::Idle;

        let reply = match result {
            Ok(text) => clean_completion(&text),
            Err(error) => {
                log::error!("Completion failed in {}: {error}", pending.conversation);
                self.session.diagnostics.push(Diagnostic {
                    conversation: pending.conversation,
                    detail: error.to_string(),
                });
                FALLBACK_REPLY.to_string()
            }
        };

        self.session.memory.append(Message::assistant(reply));
        self.session.memory.messages().last()
    }

    /// Run a whole turn: record input, call the backend, record the reply.
    pub async fn submit(&mut self, input: &str) -> Result<Option<&Message>, SessionError> {
        let Some(pending) = self.begin_turn(input)? else {
            return Ok(None);
        };

        let client = Arc::clone(&self.client);
        let result = client.complete(&pending.prompt).await;
        Ok(self.finish_turn(pending, result))
    }

    /// Clear the conversation and start a new one. Only allowed while idle.
    pub fn reset(&mut self) -> Result<ConversationId, SessionError> {
        if self.is_busy() {
            return Err(SessionError::TurnInFlight);
        }
        Ok(self.session.memory.reset())
    }
}
