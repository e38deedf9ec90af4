// src/role.rs
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::error::UnknownRole;

/// The closed set of audiences TechPal can tailor its answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, EnumString)]
pub enum Role {
    #[default]
    Developer,
    Admin,
    Student,
    User,
}

/// Everything the prompt builder and the UI need to know about a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    pub name: String,
    pub greeting: &'static str,
    pub icon: &'static str,
    pub instructions: &'static str,
}

const DEVELOPER_INSTRUCTIONS: &str = "Give code-focused answers.
- Lead with a working snippet in the relevant language, then explain the key lines.
- Include debugging tips: likely causes, how to reproduce, and how to verify the fix.
- Mention edge cases and performance pitfalls when they matter.";

const ADMIN_INSTRUCTIONS: &str = "Give practical, safe best practices for deployment, security, and server management.
- Prefer reversible steps and call out anything destructive before it is run.
- Show exact commands or configuration, and say which system they apply to.
- Flag security implications such as permissions, exposed ports, and secrets.";

const STUDENT_INSTRUCTIONS: &str = "Give clear explanations with step-by-step guidance for learning.
- Start from the core idea, then build up with small examples.
- Define any new term the first time it appears.
- Finish with a short mini quiz of two or three questions to check understanding.";

const USER_INSTRUCTIONS: &str = "Give simple, non-technical explanations in plain language.
- Use everyday analogies instead of jargon.
- Keep answers short and focused on what the person can do next.
- Never assume prior technical knowledge.";

/// Instructions used for a role value that arrived from outside the catalog.
pub const FALLBACK_INSTRUCTIONS: &str =
    "Give clear, helpful, accurate answers adapted to the user's needs.";

impl Role {
    /// Resolve a role identifier against the catalog.
    pub fn lookup(role_id: &str) -> Result<Self, UnknownRole> {
        Role::from_str(role_id).map_err(|_| UnknownRole(role_id.to_string()))
    }

    pub fn greeting(self) -> &'static str {
        match self {
            Role::Developer => "Hey developer! Paste your code or describe the bug and let's dig in.",
            Role::Admin => "Hello admin! Ask me about deployments, security, or keeping your servers healthy.",
            Role::Student => "Hi there, learner! Ask me anything and we'll work through it step by step.",
            Role::User => "Hello! Ask me any tech question and I'll explain it in plain words.",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Role::Developer => "💻",
            Role::Admin => "🛠",
            Role::Student => "🎓",
            Role::User => "🙂",
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Role::Developer => DEVELOPER_INSTRUCTIONS,
            Role::Admin => ADMIN_INSTRUCTIONS,
            Role::Student => STUDENT_INSTRUCTIONS,
            Role::User => USER_INSTRUCTIONS,
        }
    }

    pub fn definition(self) -> RoleDefinition {
        RoleDefinition {
            name: self.to_string(),
            greeting: self.greeting(),
            icon: self.icon(),
            instructions: self.instructions(),
        }
    }
}

/// The role currently in effect for a session.
///
/// Values chosen through the UI are always `Catalog`. `Fallback` exists for role
/// names that come from anywhere else, so they degrade to generic instructions
/// instead of failing the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSelection {
    Catalog(Role),
    Fallback { name: String },
}

impl Default for RoleSelection {
    fn default() -> Self {
        RoleSelection::Catalog(Role::default())
    }
}

impl From<Role> for RoleSelection {
    fn from(role: Role) -> Self {
        RoleSelection::Catalog(role)
    }
}

impl RoleSelection {
    pub fn parse(raw: &str) -> Self {
        match Role::lookup(raw.trim()) {
            Ok(role) => RoleSelection::Catalog(role),
            Err(UnknownRole(name)) => {
                log::warn!("Role {name:?} is not in the catalog, using fallback instructions");
                RoleSelection::Fallback { name }
            }
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            RoleSelection::Catalog(role) => Some(*role),
            RoleSelection::Fallback { .. } => None,
        }
    }

    pub fn definition(&self) -> RoleDefinition {
        match self {
            RoleSelection::Catalog(role) => role.definition(),
            RoleSelection::Fallback { name } => RoleDefinition {
                name: name.clone(),
                greeting: "Hello! Ask me any tech question.",
                icon: "🤖",
                instructions: FALLBACK_INSTRUCTIONS,
            },
        }
    }
}
