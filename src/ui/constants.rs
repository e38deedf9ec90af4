// ui/constants.rs

pub const TITLE: &str = r#" _____         _     ____       _
|_   _|__  ___| |__ |  _ \ __ _| |
  | |/ _ \/ __| '_ \| |_) / _` | |
  | |  __/ (__| | | |  __/ (_| | |
  |_|\___|\___|_| |_|_|   \__,_|_|
"#;

pub const TAGLINE: &str = "AI assistance for every tech challenge";

pub const INPUT_HINTS: &str =
    "Enter: send | Alt+Enter: new line | Tab: roles | Ctrl+R: new chat | Esc: stop | Ctrl+Q: quit";
pub const SIDEBAR_HINTS: &str = "↑↓ or jk: choose role | F1-F4: jump | Tab: back to input";
pub const BUSY_HINTS: &str = "Waiting for the model… Esc: stop | Ctrl+Q: quit";

pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 20;
