use crate::api::{Article, ContentSource};
use crate::app::{App, MAX_SCROLL};
use crate::browser::ReaderStatus;
use crate::navigation::Pane;
use crate::util::{display_width, format_relative_time, strip_control_chars};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use textwrap::{wrap, Options as WrapOptions};

/// Render the reader pane: the selected article or the info screen.
pub fn render<S: ContentSource>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    app.reader_area = area;
    if area.width < 3 || area.height < 3 {
        return;
    }

    let (title, lines) = if app.show_info {
        (" Info ".to_string(), info_lines(app))
    } else {
        match app.browser.reader_status() {
            ReaderStatus::Empty => (String::new(), vec![Line::from("Empty content.")]),
            ReaderStatus::Loading => (String::new(), vec![Line::from("Loading...")]),
            ReaderStatus::Failed(error) => (
                String::new(),
                vec![Line::from(Span::styled(
                    format!("Failed to load article: {error}"),
                    Style::default().fg(Color::Red),
                ))],
            ),
            ReaderStatus::Ready(article) => {
                // Comment counts only come with the listing
                let comments = app.browser.selected_summary().map(|s| s.children_deep_count);
                (
                    format!(" {} ", strip_control_chars(&article.owner_username)),
                    article_lines(article, comments),
                )
            }
        }
    };

    // Wrap up front so the scroll bound counts exactly the rows drawn
    let inner_width = area.width.saturating_sub(2) as usize;
    let lines = wrap_lines(lines, inner_width);
    app.reader_visible_lines = area.height.saturating_sub(2) as usize;
    app.reader_line_count = lines.len();
    app.clamp_reader_scroll();

    let border_style = if app.browser.state().pane() == Pane::Reader {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .scroll((app.reader_scroll.min(MAX_SCROLL) as u16, 0));

    f.render_widget(paragraph, area);
}

fn article_lines(article: &Article, comments: Option<u32>) -> Vec<Line<'static>> {
    let mut meta = vec![format!("{} tabcoins", article.tabcoins)];
    if let Some(n) = comments {
        meta.push(format!("{n} comments"));
    }
    let age = format_relative_time(article.published_at, Utc::now());
    if !age.is_empty() {
        meta.insert(0, age);
    }
    if let Some(source) = &article.source_url {
        meta.push(strip_control_chars(source).into_owned());
    }

    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&article.title).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(meta.join(" · "), Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ];
    let body = strip_control_chars(&article.body);
    lines.extend(body.lines().map(|l| Line::from(l.to_string())));
    lines
}

fn info_lines<S: ContentSource>(app: &App<S>) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = crate::version_text()
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Yellow))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from("Terminal client for TabNews."));
    lines.push(Line::from(""));

    let rows = app.keybindings.describe_all();
    let key_width = rows.iter().map(|(k, _)| display_width(k)).max().unwrap_or(0);
    for (keys, description) in rows {
        let pad = " ".repeat(key_width - display_width(&keys) + 2);
        lines.push(Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(format!("{pad}{description}")),
        ]));
    }
    lines
}

/// Word-wrap every line to `width` columns.
///
/// Lines that already fit keep their spans. Longer ones are re-flowed as
/// plain text, keeping the span style of single-span lines.
fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    let mut wrapped = Vec::with_capacity(lines.len());
    for line in lines {
        if width == 0 || line.width() <= width {
            wrapped.push(line);
            continue;
        }
        let style = match line.spans.as_slice() {
            [only] => only.style,
            _ => line.style,
        };
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        wrapped.extend(
            wrap(&text, WrapOptions::new(width))
                .into_iter()
                .map(|row| Line::from(Span::styled(row.into_owned(), style))),
        );
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ContentSummary, Strategy};
    use crate::app::tests::test_app;
    use crate::browser::Browser;
    use crate::keybindings::KeybindingRegistry;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_wrap_lines_breaks_at_words() {
        let lines = vec![
            Line::from(""),
            Line::from("abcdef abcdef"),
            Line::from(Span::styled("abc", Style::default().fg(Color::Red))),
        ];
        let wrapped = wrap_lines(lines, 10);
        let rows: Vec<String> = wrapped.iter().map(|l| l.to_string()).collect();
        assert_eq!(rows, vec!["", "abcdef", "abcdef", "abc"]);
        assert_eq!(wrapped[3].spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_wrap_lines_splits_overlong_words() {
        let wrapped = wrap_lines(vec![Line::from("abcdefghij")], 4);
        let rows: Vec<String> = wrapped.iter().map(|l| l.to_string()).collect();
        assert_eq!(rows, vec!["abcd", "efgh", "ij"]);
    }

    /// Serves one article of short words that word-wrap worse than a
    /// character count suggests.
    struct ProseSource;

    impl ContentSource for ProseSource {
        async fn list_content(
            &self,
            _page: u32,
            _strategy: Strategy,
            _page_size: u32,
        ) -> Result<Vec<ContentSummary>, ApiError> {
            Ok(vec![ContentSummary {
                id: "essay".to_string(),
                slug: "essay".to_string(),
                title: "Essay".to_string(),
                owner_username: "ada".to_string(),
                tabcoins: 3,
                published_at: None,
                children_deep_count: 1,
            }])
        }

        async fn get_article(&self, owner: &str, slug: &str) -> Result<Article, ApiError> {
            let mut body = "abcdef abcdef abcdef\n".repeat(30);
            body.push_str("THE END");
            Ok(Article {
                id: slug.to_string(),
                slug: slug.to_string(),
                title: slug.to_string(),
                body,
                owner_username: owner.to_string(),
                tabcoins: 3,
                published_at: None,
                source_url: None,
            })
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_end_of_wrapped_prose_is_reachable() {
        let mut browser = Browser::new(ProseSource, 40);
        browser.start().await;
        let mut app = App::new(
            browser,
            KeybindingRegistry::new(),
            "https://www.tabnews.com.br".to_string(),
        );
        app.sync_with_browser();
        app.reader_scroll = 10_000;

        // 12 columns inside the border fit one "abcdef" per row
        let mut terminal = Terminal::new(TestBackend::new(14, 12)).unwrap();
        terminal.draw(|f| render(f, &mut app, f.area())).unwrap();

        assert!(app.reader_line_count >= 90, "{}", app.reader_line_count);
        assert_eq!(
            app.reader_scroll,
            app.reader_line_count - app.reader_visible_lines
        );
        assert!(buffer_text(&terminal).contains("THE END"));
    }

    #[tokio::test]
    async fn test_render_sets_scroll_bounds() {
        let mut app = test_app(1).await;
        app.reader_scroll = 10_000;

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|f| render(f, &mut app, f.area())).unwrap();

        // Title, meta, blank and 100 body lines in 10 visible rows
        assert_eq!(app.reader_visible_lines, 10);
        assert_eq!(app.reader_line_count, 103);
        assert_eq!(app.reader_scroll, 93);
    }

    #[tokio::test]
    async fn test_info_screen_lists_keys() {
        let mut app = test_app(1).await;
        app.show_info = true;
        let lines = info_lines(&app);
        let text: String = lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("TabNews CLI"));
        assert!(text.contains("Refresh (clears cache)"));
    }
}
