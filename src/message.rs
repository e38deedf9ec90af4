use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub content: String,
}

impl Message {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Speaker::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, content)
    }

    /// Render as a single transcript entry: `"<speaker>: <content>"`.
    pub fn to_transcript_line(&self) -> String {
        format!("{}: {}", self.speaker, self.content)
    }
}

/// Serialize a history into the transcript form used inside prompts.
///
/// Messages are joined by newlines in chronological order; an empty history
/// yields an empty string.
pub fn serialize_history(history: &[Message]) -> String {
    history
        .iter()
        .map(Message::to_transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a transcript produced by [`serialize_history`] back into messages.
///
/// A line that starts with a speaker tag opens a new message. Any other line
/// continues the content of the previous one, so multi-line replies survive.
pub fn parse_history(transcript: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::new();

    for line in transcript.lines() {
        match split_speaker(line) {
            Some((speaker, content)) => messages.push(Message::new(speaker, content)),
            None => match messages.last_mut() {
                Some(last) => {
                    last.content.push('\n');
                    last.content.push_str(line);
                }
                None => log::warn!("Dropping transcript line without a speaker: {line:?}"),
            },
        }
    }

    messages
}

fn split_speaker(line: &str) -> Option<(Speaker, &str)> {
    let (tag, content) = line.split_once(": ")?;
    let speaker = tag.parse::<Speaker>().ok()?;
    Some((speaker, content))
}
