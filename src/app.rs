use std::path::Path;
use std::time::{Duration, Instant};
use ferret_core::{
    ChatClient, ChatController, Config, FileMessage, FileMode, PreferenceStore, ReplyEvent,
    Theme, Transcript, MAX_FILE_CHARS,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use crate::commands::{Command, FILE_USAGE, HELP};
use crate::tui::AppEvent;

/// How long a code block's label reads "Copied!" after a copy
pub const COPIED_FEEDBACK: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Messages,
}

pub struct App {
    pub should_quit: bool,
    pub focus: FocusPane,
    pub chat: ChatController,
    pub client: ChatClient,
    pub preferences: PreferenceStore,
    pub transcript: Option<Transcript>,

    // Code block picked for copying (0-based) and the last copy for feedback
    pub selected_block: Option<usize>,
    pub copied: Option<(usize, Instant)>,

    /// One-line status shown in the footer until the next key press
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing dots

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    clipboard: Option<arboard::Clipboard>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        config: &Config,
        preferences: PreferenceStore,
        transcript: Option<Transcript>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let theme = preferences.theme();
        let client = ChatClient::new(&config.endpoint)
            .with_typing_delay(Duration::from_millis(config.typing_delay_ms));

        Self {
            should_quit: false,
            focus: FocusPane::Input,
            chat: ChatController::new(theme, config.scroll_threshold, config.max_input_rows),
            client,
            preferences,
            transcript,
            selected_block: None,
            copied: None,
            notice: None,
            animation_frame: 0,
            chat_area: None,
            clipboard: None,
            events,
        }
    }

    pub fn set_focus(&mut self, pane: FocusPane) {
        self.focus = pane;
        self.chat.input.focused = pane == FocusPane::Input;
    }

    pub fn theme(&self) -> Theme {
        self.chat.theme()
    }

    /// Enter pressed in the input box: run a command or send a message
    pub fn submit_input(&mut self) {
        if let Some(command) = Command::parse(self.chat.input.text()) {
            self.chat.input.clear();
            self.run_command(command);
            return;
        }

        if let Some(text) = self.chat.submit() {
            self.send(text);
        }
    }

    /// Post `text` on a background task; the reply comes back as `AppEvent::Reply`
    fn send(&mut self, text: String) {
        tracing::info!(chars = text.chars().count(), "Sending message");
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            client
                .send_events(&text, |event| {
                    let _ = tx.send(AppEvent::Reply(event));
                })
                .await;
        });
    }

    pub fn run_command(&mut self, command: Command) {
        match command {
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Clear => {
                if self.chat.clear() {
                    self.selected_block = None;
                    self.copied = None;
                    self.notice = Some("Conversation cleared".to_string());
                } else {
                    self.notice = Some("Wait for the reply to finish first".to_string());
                }
            }
            Command::Copy(Some(number)) => {
                if number >= 1 && number <= self.chat.code_blocks().len() {
                    self.copy_block(number - 1);
                } else {
                    self.notice = Some(format!("No code block {}", number));
                }
            }
            Command::Copy(None) => self.notice = Some("Usage: /copy <number>".to_string()),
            Command::File { path: None, .. } => self.notice = Some(FILE_USAGE.to_string()),
            Command::File { mode: None, .. } => {
                self.notice =
                    Some("Unknown mode. Use --summary, --explain or --refactor".to_string());
            }
            Command::File {
                mode: Some(mode),
                path: Some(path),
            } => self.send_file(mode, Path::new(&path)),
            Command::Theme => self.toggle_theme(),
            Command::Exit => self.should_quit = true,
        }
    }

    /// Read `path` and send it wrapped for `mode`, like a typed message
    fn send_file(&mut self, mode: FileMode, path: &Path) {
        let file = match FileMessage::load(path, mode) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Could not attach file: {e:#}");
                self.notice = Some(format!("{e:#}"));
                return;
            }
        };

        let Some(text) = self.chat.submit_text(&file.text) else {
            self.notice = Some("Wait for the reply to finish first".to_string());
            return;
        };

        let mut notice = format!(
            "Loaded file: {} ({} chars) | Mode: {}",
            file.file_name,
            file.chars,
            mode.as_str()
        );
        if file.truncated {
            notice.push_str(&format!(" | truncated to {} chars", MAX_FILE_CHARS));
        }
        self.notice = Some(notice);
        self.send(text);
    }

    pub fn apply_reply(&mut self, event: ReplyEvent) {
        let exchange = match event {
            ReplyEvent::Fragment(fragment) => {
                self.chat.push_fragment(&fragment);
                return;
            }
            ReplyEvent::Done => self.chat.finish(),
            ReplyEvent::Failed(_) => self.chat.fail(),
        };
        self.set_focus(FocusPane::Input);

        if let (Some(exchange), Some(transcript)) = (exchange, &self.transcript) {
            if let Err(e) = transcript.record(&exchange) {
                tracing::warn!("Failed to write transcript: {e:#}");
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.chat.toggle_theme(&mut self.preferences);
        tracing::debug!(theme = theme.as_str(), "Theme toggled");
    }

    /// Copy code block `index` (0-based) and flag it as copied
    pub fn copy_block(&mut self, index: usize) {
        let Some(code) = self.chat.code_blocks().into_iter().nth(index) else {
            return;
        };
        self.write_clipboard(code);
        self.selected_block = Some(index);
        self.copied = Some((index, Instant::now()));
    }

    fn write_clipboard(&mut self, text: String) {
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    tracing::debug!(error = %e, "Clipboard unavailable");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            if let Err(e) = clipboard.set_text(text) {
                tracing::debug!(error = %e, "Clipboard copy failed");
            }
        }
    }

    pub fn is_copied(&self, index: usize) -> bool {
        matches!(self.copied, Some((i, at)) if i == index && at.elapsed() < COPIED_FEEDBACK)
    }

    pub fn select_next_block(&mut self) {
        let count = self.chat.code_blocks().len();
        if count == 0 {
            return;
        }
        self.selected_block = Some(match self.selected_block {
            Some(i) => (i + 1).min(count - 1),
            None => count - 1,
        });
    }

    pub fn select_prev_block(&mut self) {
        let count = self.chat.code_blocks().len();
        if count == 0 {
            return;
        }
        self.selected_block = Some(match self.selected_block {
            Some(i) => i.saturating_sub(1).min(count - 1),
            None => count - 1,
        });
    }

    /// Tick animation frame and expire the copy feedback (called by Tick event)
    pub fn tick(&mut self) {
        if self.chat.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some((_, at)) = self.copied {
            if at.elapsed() >= COPIED_FEEDBACK {
                self.copied = None;
            }
        }
    }
}
