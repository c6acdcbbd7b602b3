//! The chat widget controller.
//!
//! Owns everything one chat session needs: the message list, the input box,
//! the loading flag, the stream buffer of the reply in flight, the theme and
//! the scroll state. Front ends drive it; it never does I/O besides the
//! theme preference write.

use crate::fence;
use crate::preferences::PreferenceStore;
use crate::scroll::ScrollView;
use crate::state::{ChatMessage, ChatRole};
use crate::theme::Theme;

/// Shown in place of the reply when the request or the stream fails
pub const ERROR_MESSAGE: &str = "Error connecting to backend.";

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Multi-line text box with a character cursor
#[derive(Debug, Clone)]
pub struct InputBox {
    text: String,
    cursor: usize,
    pub disabled: bool,
    pub focused: bool,
    max_rows: u16,
}

impl InputBox {
    pub fn new(max_rows: u16) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            disabled: false,
            focused: true,
            max_rows: max_rows.max(1),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    /// Height the box wants: one row per line, bounded by `max_rows`
    pub fn rows(&self) -> u16 {
        let lines = self.text.split('\n').count().min(u16::MAX as usize) as u16;
        lines.clamp(1, self.max_rows)
    }

    /// Cursor as (line, column) in characters
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let column = before
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0);
        (line, column)
    }

    pub fn insert(&mut self, c: char) {
        if self.disabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert('\n');
    }

    pub fn backspace(&mut self) {
        if self.disabled || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if self.disabled {
            return;
        }
        let char_count = self.text.chars().count();
        if self.cursor < char_count {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Empty the box and collapse it back to a single row
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// One finished round trip, as handed to the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub reply: String,
    pub failed: bool,
}

pub struct ChatController {
    messages: Vec<ChatMessage>,
    pub input: InputBox,
    loading: bool,
    /// Text of the reply in flight; `Some` exactly while loading
    pending: Option<String>,
    in_flight: Option<String>,
    theme: Theme,
    pub scroll: ScrollView,
}

impl ChatController {
    pub fn new(theme: Theme, scroll_threshold: u16, max_input_rows: u16) -> Self {
        Self {
            messages: Vec::new(),
            input: InputBox::new(max_input_rows),
            loading: false,
            pending: None,
            in_flight: None,
            theme,
            scroll: ScrollView::new(scroll_threshold),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Accept the input box contents as a new user turn.
    ///
    /// Returns the text to send, or `None` when the input is blank or a reply
    /// is still in flight (the attempt is dropped, not queued).
    pub fn submit(&mut self) -> Option<String> {
        let text = self.input.text().to_string();
        self.submit_text(&text)
    }

    /// `submit` for text that did not come from the input box, such as a
    /// file loaded by a command. Same gating, same state changes.
    pub fn submit_text(&mut self, text: &str) -> Option<String> {
        if self.loading {
            return None;
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(text.clone()));
        self.input.clear();
        self.input.disabled = true;
        self.loading = true;
        self.pending = Some(String::new());
        self.in_flight = Some(text.clone());

        Some(text)
    }

    /// Append a decoded fragment to the reply in flight
    pub fn push_fragment(&mut self, fragment: &str) {
        if let Some(pending) = self.pending.as_mut() {
            pending.push_str(fragment);
        }
    }

    /// The reply stream ended; the accumulated text becomes the AI message
    pub fn finish(&mut self) -> Option<Exchange> {
        if !self.loading {
            return None;
        }
        let reply = self.pending.take().unwrap_or_default();
        self.messages.push(ChatMessage::assistant(reply.clone()));
        Some(self.settle(reply, false))
    }

    /// The request or the stream failed; show the fixed error text instead
    pub fn fail(&mut self) -> Option<Exchange> {
        if !self.loading {
            return None;
        }
        self.pending = None;
        self.messages.push(ChatMessage::failure(ERROR_MESSAGE));
        Some(self.settle(ERROR_MESSAGE.to_string(), true))
    }

    fn settle(&mut self, reply: String, failed: bool) -> Exchange {
        self.loading = false;
        self.input.disabled = false;
        self.input.focused = true;
        Exchange {
            user: self.in_flight.take().unwrap_or_default(),
            reply,
            failed,
        }
    }

    /// Flip the theme and persist it. A failed write only costs persistence.
    pub fn toggle_theme(&mut self, store: &mut PreferenceStore) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = store.set_theme(self.theme) {
            tracing::warn!(error = %e, "Failed to persist theme");
        }
        self.theme
    }

    /// Drop the visible conversation. Refused while a reply is in flight.
    pub fn clear(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.messages.clear();
        self.scroll.offset = 0;
        self.scroll.content_height = 0;
        true
    }

    /// Code contents of every AI message, numbered in order of appearance
    pub fn code_blocks(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.role == ChatRole::Assistant)
            .flat_map(|m| fence::code_blocks(&m.content))
            .collect()
    }

    /// 1-based lookup into `code_blocks`
    pub fn code_block(&self, number: usize) -> Option<String> {
        number
            .checked_sub(1)
            .and_then(|i| self.code_blocks().into_iter().nth(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameDecoder;
    use tempfile::tempdir;

    fn controller() -> ChatController {
        ChatController::new(Theme::Dark, 2, 6)
    }

    fn type_text(c: &mut ChatController, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                c.input.insert_newline();
            } else {
                c.input.insert(ch);
            }
        }
    }

    #[test]
    fn test_submit_appends_trimmed_user_message() {
        let mut c = controller();
        type_text(&mut c, "  hello there \n");

        let sent = c.submit();
        assert_eq!(sent.as_deref(), Some("hello there"));
        assert_eq!(c.messages(), &[ChatMessage::user("hello there")]);
        assert!(c.is_loading());
        assert!(c.input.disabled);
        assert_eq!(c.input.text(), "");
        assert_eq!(c.input.rows(), 1);
        assert_eq!(c.pending(), Some(""));
    }

    #[test]
    fn test_submit_text_bypasses_the_input_box() {
        let mut c = controller();
        c.input.set_text("/file notes.txt");

        let sent = c.submit_text("File name: `notes.txt`\n\n```\nhi\n```");
        assert_eq!(sent.as_deref(), Some("File name: `notes.txt`\n\n```\nhi\n```"));
        assert_eq!(c.input.text(), "");
        assert!(c.is_loading());
        assert_eq!(c.submit_text("again"), None);
        assert_eq!(c.messages().len(), 1);
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut c = controller();
        type_text(&mut c, " \n\t ");
        assert_eq!(c.submit(), None);
        assert!(c.messages().is_empty());
        assert!(!c.is_loading());
    }

    #[test]
    fn test_submit_while_loading_is_dropped() {
        let mut c = controller();
        type_text(&mut c, "first");
        assert!(c.submit().is_some());

        c.input.disabled = false;
        type_text(&mut c, "second");
        assert_eq!(c.submit(), None);
        assert_eq!(c.messages().len(), 1);
    }

    #[test]
    fn test_disabled_input_ignores_edits() {
        let mut c = controller();
        type_text(&mut c, "go");
        c.submit();
        type_text(&mut c, "abc");
        c.input.backspace();
        assert_eq!(c.input.text(), "");
    }

    #[test]
    fn test_streamed_reply_is_accumulated() {
        let mut c = controller();
        type_text(&mut c, "hi");
        c.submit();

        let mut decoder = FrameDecoder::new();
        for chunk in [&b"data: {\"content\":\"Hel\"}\n"[..], &b"data: {\"content\":\"lo\"}\n"[..]] {
            for fragment in decoder.push(chunk) {
                c.push_fragment(&fragment);
            }
        }
        assert_eq!(c.pending(), Some("Hello"));

        let exchange = c.finish().unwrap();
        assert_eq!(exchange.user, "hi");
        assert_eq!(exchange.reply, "Hello");
        assert!(!exchange.failed);
        assert_eq!(c.messages()[1], ChatMessage::assistant("Hello"));
        assert!(!c.is_loading());
        assert!(!c.input.disabled);
        assert!(c.input.focused);
        assert_eq!(c.pending(), None);
    }

    #[test]
    fn test_empty_stream_still_settles() {
        let mut c = controller();
        type_text(&mut c, "hi");
        c.submit();
        c.finish();
        assert_eq!(c.messages()[1], ChatMessage::assistant(""));
        assert!(!c.is_loading());
        assert!(!c.input.disabled);
    }

    #[test]
    fn test_failure_shows_error_and_reenables_input() {
        let mut c = controller();
        type_text(&mut c, "hi");
        c.submit();
        c.push_fragment("partial");

        let exchange = c.fail().unwrap();
        assert!(exchange.failed);
        assert_eq!(c.messages()[1], ChatMessage::failure(ERROR_MESSAGE));
        assert!(!c.is_loading());
        assert!(!c.input.disabled);
        assert_eq!(c.pending(), None);

        // nothing in flight any more
        assert_eq!(c.fail(), None);
        assert_eq!(c.finish(), None);
    }

    #[test]
    fn test_fragments_without_request_are_ignored() {
        let mut c = controller();
        c.push_fragment("stray");
        assert_eq!(c.pending(), None);
        assert!(c.messages().is_empty());
    }

    #[test]
    fn test_toggle_theme_twice_restores_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut store = PreferenceStore::open(&path).unwrap();
        let mut c = controller();
        let before = *c.theme().palette();

        assert_eq!(c.toggle_theme(&mut store), Theme::Light);
        assert_eq!(PreferenceStore::open(&path).unwrap().theme(), Theme::Light);

        assert_eq!(c.toggle_theme(&mut store), Theme::Dark);
        assert_eq!(*c.theme().palette(), before);
        assert_eq!(store.get("theme"), Some("dark"));
    }

    #[test]
    fn test_input_rows_follow_content() {
        let mut input = InputBox::new(3);
        assert_eq!(input.rows(), 1);
        input.set_text("a\nb");
        assert_eq!(input.rows(), 2);
        input.set_text("a\nb\nc\nd\ne");
        assert_eq!(input.rows(), 3);
        assert_eq!(input.cursor_position(), (4, 1));
        input.move_home();
        assert_eq!(input.cursor_position(), (0, 0));
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let mut input = InputBox::new(3);
        input.set_text("héllo");
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "hélo");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "élo");
        input.move_end();
        input.insert('!');
        assert_eq!(input.text(), "élo!");
    }

    #[test]
    fn test_code_blocks_are_numbered_across_messages() {
        let mut c = controller();
        for reply in ["```sh\nls\n```", "text only", "```a\none\n```\n```b\ntwo\n```"] {
            c.input.set_text("q");
            c.submit();
            c.push_fragment(reply);
            c.finish();
        }
        assert_eq!(c.code_blocks(), vec!["ls", "one", "two"]);
        assert_eq!(c.code_block(3).as_deref(), Some("two"));
        assert_eq!(c.code_block(0), None);
        assert_eq!(c.code_block(4), None);
    }

    #[test]
    fn test_clear_refused_while_loading() {
        let mut c = controller();
        c.input.set_text("q");
        c.submit();
        assert!(!c.clear());
        c.finish();
        assert!(c.clear());
        assert!(c.messages().is_empty());
    }
}
