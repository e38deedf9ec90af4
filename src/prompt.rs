// src/prompt.rs
use crate::{
    message::{Message, serialize_history},
    role::RoleDefinition,
};

pub const PREAMBLE: &str = "You are TechPal, an AI assistant for tech users. \
Help with coding, deployment, databases, and any other tech challenge. \
Tailor every answer to the role below and always remember it.";

pub const ROLE_PREFIX: &str = "Role: ";
pub const HISTORY_HEADER: &str = "Conversation so far:";
pub const QUERY_PREFIX: &str = "Query: ";

/// Everything sent to the model for a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub history: String,
    pub input: String,
}

impl PromptPayload {
    /// Flatten into the single prompt string the completion backend expects.
    pub fn render(&self) -> String {
        format!(
            "{}\n{HISTORY_HEADER}\n{}\n{QUERY_PREFIX}{}",
            self.system, self.history, self.input
        )
    }
}

/// System instructions for a role: preamble, role line, then the role's block verbatim.
pub fn system_instructions(role: &RoleDefinition) -> String {
    format!(
        "{PREAMBLE}\n{ROLE_PREFIX}{}\n{}",
        role.name, role.instructions
    )
}

/// Assemble the prompt for one turn.
///
/// `history` is everything said before `latest_input`. The role is resolved by
/// the caller on every turn, since it may change between turns.
pub fn build(role: &RoleDefinition, history: &[Message], latest_input: &str) -> PromptPayload {
    PromptPayload {
        system: system_instructions(role),
        history: serialize_history(history),
        input: latest_input.to_string(),
    }
}
