pub mod app;
pub mod completion;
pub mod context;
pub mod error;
pub mod logging;
pub mod memory;
pub mod message;
pub mod prompt;
pub mod role;
pub mod session;
pub mod settings;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use completion::{CompletionClient, OllamaClient, clean_completion, complete_cancellable};
pub use error::{AppError, CompletionError, SessionError, UnknownRole};
pub use memory::{ConversationId, ConversationMemory, MemoryLimit, Overflow};
pub use message::{Message, Speaker, parse_history, serialize_history};
pub use prompt::{PromptPayload, build};
pub use role::{Role, RoleDefinition, RoleSelection};
pub use session::{Diagnostic, FALLBACK_REPLY, PendingTurn, Session, SessionController, TurnState};
pub use settings::Settings;
