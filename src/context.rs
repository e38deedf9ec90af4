use crate::{memory::ConversationId, message::Message, role::RoleSelection, ui::spinner::Spinner};

// Read-only view of the session handed to components for rendering and key handling.
#[derive(Debug)]
pub struct Context<'a> {
    pub messages: &'a [Message],
    pub role: &'a RoleSelection,
    pub conversation: ConversationId,
    pub model: &'a str,
    pub busy: bool,
    pub spinner: &'a Spinner,
}
