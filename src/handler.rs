use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Reply(reply) => app.apply_reply(reply),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    app.notice = None;

    // Global keys that work in any pane
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('t') => {
                app.toggle_theme();
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::PageUp => {
            let page = app.chat.scroll.page();
            app.chat.scroll.scroll_up(page);
            return;
        }
        KeyCode::PageDown => {
            let page = app.chat.scroll.page();
            app.chat.scroll.scroll_down(page);
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Input => handle_input_key(app, key),
        FocusPane::Messages => handle_messages_key(app, key),
    }
}

fn is_newline_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT),
        KeyCode::Char('j') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    if is_newline_key(&key) {
        app.chat.input.insert_newline();
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit_input(),
        KeyCode::Esc | KeyCode::Tab => app.set_focus(FocusPane::Messages),
        KeyCode::Backspace => app.chat.input.backspace(),
        KeyCode::Delete => app.chat.input.delete(),
        KeyCode::Left => app.chat.input.move_left(),
        KeyCode::Right => app.chat.input.move_right(),
        KeyCode::Home => app.chat.input.move_home(),
        KeyCode::End => app.chat.input.move_end(),
        KeyCode::Up => app.chat.scroll.scroll_up(1),
        KeyCode::Down => app.chat.scroll.scroll_down(1),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat.input.insert(c)
        }
        _ => {}
    }
}

fn handle_messages_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the input box
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('i') => app.set_focus(FocusPane::Input),

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.chat.scroll.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat.scroll.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.chat.scroll.viewport_height / 2;
            app.chat.scroll.scroll_down(half);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.chat.scroll.viewport_height / 2;
            app.chat.scroll.scroll_up(half);
        }
        KeyCode::Char('g') | KeyCode::Home => app.chat.scroll.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.chat.scroll.scroll_to_bottom(),

        // Code blocks
        KeyCode::Char('n') | KeyCode::Char(']') => app.select_next_block(),
        KeyCode::Char('p') | KeyCode::Char('[') => app.select_prev_block(),
        KeyCode::Char('c') | KeyCode::Enter => {
            if let Some(index) = app.selected_block {
                app.copy_block(index);
            }
        }

        KeyCode::Char('t') => app.toggle_theme(),

        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.focus != FocusPane::Input {
        return;
    }
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' => app.chat.input.insert_newline(),
            c => app.chat.input.insert(c),
        }
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.chat.scroll.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.chat.scroll.scroll_up(3),
        MouseEventKind::Down(_) => {
            app.set_focus(if in_chat {
                FocusPane::Messages
            } else {
                FocusPane::Input
            });
        }
        _ => {}
    }
}
