pub mod attachment;
pub mod client;
pub mod config;
pub mod controller;
pub mod fence;
pub mod frame;
pub mod preferences;
pub mod scroll;
pub mod state;
pub mod theme;
pub mod transcript;

// Re-export main types for convenience
pub use attachment::{FileMessage, FileMode, MAX_FILE_CHARS};
pub use client::{ChatClient, ReplyEvent};
pub use config::Config;
pub use controller::{ChatController, InputBox, ERROR_MESSAGE};
pub use fence::{segments, Segment};
pub use frame::FrameDecoder;
pub use preferences::PreferenceStore;
pub use scroll::ScrollView;
pub use state::{ChatMessage, ChatRole};
pub use theme::{Rgb, Theme, ThemePalette};
pub use transcript::Transcript;
