use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use ferret_core::{segments, ChatRole, Rgb, Segment, ThemePalette};
use crate::app::{App, FocusPane};

const TYPING_FRAMES: [&str; 3] = ["●∙∙", "∙●∙", "∙∙●"];

fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut current_text), base));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(bold_text, base.add_modifier(Modifier::BOLD)));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, base));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme().palette();

    let base = Style::default()
        .bg(rgb(palette.background))
        .fg(rgb(palette.foreground));
    frame.render_widget(Block::default().style(base), area);

    let input_height = app.chat.input.rows() + 2;
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(input_height),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, palette, frame, header_area);
    render_chat(app, palette, frame, chat_area);
    render_input(app, palette, frame, input_area);
    render_footer(app, palette, frame, footer_area);
}

fn render_header(app: &App, palette: &ThemePalette, frame: &mut Frame, area: Rect) {
    let [title_area, toggle_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(12)]).areas(area);

    let title = Line::from(vec![
        Span::styled(" Ferret ", Style::default().fg(rgb(palette.accent)).bold()),
        Span::styled(
            app.client.endpoint().to_string(),
            Style::default().fg(rgb(palette.muted)),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(rgb(palette.muted)),
        ),
    ]);
    let header = Paragraph::new(title).style(Style::default().bg(rgb(palette.surface)));
    frame.render_widget(header, title_area);

    let toggle = Line::from(vec![
        Span::styled(
            format!(" {} ", app.theme().icon()),
            Style::default().fg(rgb(palette.accent)),
        ),
        Span::styled("Ctrl+T ", Style::default().fg(rgb(palette.muted))),
    ])
    .right_aligned();
    frame.render_widget(
        Paragraph::new(toggle).style(Style::default().bg(rgb(palette.surface))),
        toggle_area,
    );
}

/// Lines of the message list, code blocks numbered across the conversation
fn chat_lines(app: &App, palette: &ThemePalette) -> Vec<Line<'static>> {
    let text_style = Style::default().fg(rgb(palette.foreground));
    let muted = Style::default().fg(rgb(palette.muted));
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut block_index = 0usize;

    for msg in app.chat.messages() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    msg.role.label(),
                    Style::default().fg(rgb(palette.user)).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.split('\n') {
                    lines.push(Line::from(Span::styled(line.to_string(), text_style)));
                }
            }
            ChatRole::Assistant if msg.failed => {
                lines.push(Line::from(Span::styled(
                    msg.role.label(),
                    Style::default().fg(rgb(palette.assistant)).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    msg.content.clone(),
                    Style::default().fg(rgb(palette.error)),
                )));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    msg.role.label(),
                    Style::default().fg(rgb(palette.assistant)).add_modifier(Modifier::BOLD),
                )));
                let parts = segments(&msg.content);
                let last = parts.len().saturating_sub(1);
                for (i, part) in parts.iter().enumerate() {
                    match part {
                        Segment::Plain(text) => {
                            let mut text = text.as_str();
                            // newlines hugging a fence belong to the fence
                            if i > 0 && parts[i - 1].is_code() {
                                text = text.strip_prefix('\n').unwrap_or(text);
                            }
                            if i < last && parts[i + 1].is_code() {
                                text = text.strip_suffix('\n').unwrap_or(text);
                            }
                            for line in text.split('\n') {
                                lines.push(parse_markdown_line(line, text_style));
                            }
                        }
                        Segment::Code { language, code } => {
                            let language = language.as_deref();
                            push_code_block(app, palette, &mut lines, block_index, language, code);
                            block_index += 1;
                        }
                    }
                }
            }
        }
        lines.push(Line::default());
    }

    if let Some(pending) = app.chat.pending() {
        lines.push(Line::from(Span::styled(
            ChatRole::Assistant.label(),
            Style::default().fg(rgb(palette.assistant)).add_modifier(Modifier::BOLD),
        )));
        if pending.is_empty() {
            let dots = TYPING_FRAMES[app.animation_frame as usize % TYPING_FRAMES.len()];
            lines.push(Line::from(Span::styled(dots, muted)));
        } else {
            // Raw text while streaming; fences are formatted once the reply is complete
            let mut pending_lines: Vec<Line<'static>> = pending
                .split('\n')
                .map(|l| Line::from(Span::styled(l.to_string(), text_style)))
                .collect();
            if let Some(last) = pending_lines.last_mut() {
                last.push_span(Span::styled("▌", Style::default().fg(rgb(palette.accent))));
            }
            lines.extend(pending_lines);
        }
    }

    lines
}

fn push_code_block(
    app: &App,
    palette: &ThemePalette,
    lines: &mut Vec<Line<'static>>,
    index: usize,
    language: Option<&str>,
    code: &str,
) {
    let muted = Style::default().fg(rgb(palette.muted));
    let label = if app.is_copied(index) { "[ Copied! ]" } else { "[ Copy ]" };
    let mut label_style = Style::default().fg(rgb(palette.accent)).add_modifier(Modifier::BOLD);
    if app.selected_block == Some(index) {
        label_style = label_style.add_modifier(Modifier::REVERSED);
    }

    let mut header = vec![
        Span::styled("╭─ ", muted),
        Span::styled(label, label_style),
        Span::styled(format!(" #{}", index + 1), muted),
    ];
    if let Some(language) = language {
        header.push(Span::styled(format!(" {}", language), muted));
    }
    lines.push(Line::from(header));

    let code_style = Style::default()
        .fg(rgb(palette.code_foreground))
        .bg(rgb(palette.code_background));
    for line in code.split('\n') {
        lines.push(Line::from(vec![
            Span::styled("│ ", muted),
            Span::styled(line.to_string(), code_style),
        ]));
    }
    lines.push(Line::from(Span::styled("╰─", muted)));
}

fn render_chat(app: &mut App, palette: &ThemePalette, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let focused = app.focus == FocusPane::Messages;
    let border_color = if focused { palette.accent } else { palette.muted };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb(border_color)))
        .title(" Chat ");
    let inner = block.inner(area);

    let text = if app.chat.messages().is_empty() && app.chat.pending().is_none() {
        Text::from(Span::styled(
            "Ask me anything...",
            Style::default().fg(rgb(palette.muted)),
        ))
    } else {
        Text::from(chat_lines(app, palette))
    };

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner.width).min(u16::MAX as usize) as u16;

    // Measure against the previous frame, then pin or keep the offset
    app.chat.scroll.resize(inner.height);
    app.chat.scroll.update(rows);
    let offset = app.chat.scroll.offset;

    frame.render_widget(paragraph.block(block).scroll((offset, 0)), area);

    let max_offset = app.chat.scroll.max_offset();
    if max_offset > 0 {
        let mut state = ScrollbarState::new(max_offset as usize).position(offset as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(rgb(palette.muted))),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut state,
        );
    }
}

fn render_input(app: &App, palette: &ThemePalette, frame: &mut Frame, area: Rect) {
    let input = &app.chat.input;
    let focused = app.focus == FocusPane::Input && input.focused && !input.disabled;
    let border_color = if input.disabled {
        palette.muted
    } else if focused {
        palette.accent
    } else {
        palette.foreground
    };
    let title = if input.disabled {
        " Waiting for reply... "
    } else {
        " Message (Enter to send, Shift+Enter for newline) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(rgb(border_color)))
        .title(title);
    let inner = block.inner(area);

    // Keep the cursor inside the box by scrolling both ways
    let (line, column) = input.cursor_position();
    let scroll_y = line.saturating_sub(inner.height.saturating_sub(1) as usize) as u16;
    let scroll_x = column.saturating_sub(inner.width.saturating_sub(1) as usize) as u16;

    let paragraph = if input.text().is_empty() {
        let placeholder = if input.disabled { "" } else { "Type a message or /help" };
        Paragraph::new(Span::styled(placeholder, Style::default().fg(rgb(palette.muted))))
    } else {
        Paragraph::new(input.text().to_string())
            .style(Style::default().fg(rgb(palette.user)))
            .scroll((scroll_y, scroll_x))
    };
    frame.render_widget(paragraph.block(block), area);

    if focused {
        frame.set_cursor_position((
            inner.x + (column as u16).saturating_sub(scroll_x),
            inner.y + (line as u16).saturating_sub(scroll_y),
        ));
    }
}

fn render_footer(app: &App, palette: &ThemePalette, frame: &mut Frame, area: Rect) {
    let surface = Style::default().bg(rgb(palette.surface));

    let (mode, mode_color) = if app.chat.is_loading() {
        (" WAITING ", palette.muted)
    } else if app.focus == FocusPane::Input {
        (" INPUT ", palette.accent)
    } else {
        (" CHAT ", palette.assistant)
    };
    let mut spans = vec![
        Span::styled(mode, Style::default().bg(rgb(mode_color)).fg(rgb(palette.background)).bold()),
        Span::raw(" "),
    ];

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(notice.clone(), Style::default().fg(rgb(palette.foreground))));
    } else {
        let key_style = Style::default().fg(rgb(palette.accent)).bold();
        let label_style = Style::default().fg(rgb(palette.muted));
        let hints: &[(&str, &str)] = match app.focus {
            FocusPane::Input => &[
                ("Enter", "send"),
                ("S-Enter", "newline"),
                ("Tab", "chat"),
                ("^T", "theme"),
                ("^C", "quit"),
            ],
            FocusPane::Messages => &[
                ("j/k", "scroll"),
                ("n/p", "code block"),
                ("c", "copy"),
                ("i", "input"),
                ("q", "quit"),
            ],
        };
        for (key, label) in hints {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::styled(format!(" {}  ", label), label_style));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(surface), area);
}
