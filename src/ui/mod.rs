// ui/mod.rs

pub mod bubbles;
pub mod chat;
mod constants;
mod sidebar;
pub mod spinner;
mod utils;

pub use chat::ChatScreen;

use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect};
use std::fmt::Debug;

use crate::{app::Action, context::Context};

pub trait Component: Debug {
    fn on_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action>;
    fn render(&mut self, area: Rect, buffer: &mut Buffer, context: &Context);
}
