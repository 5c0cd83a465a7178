use crate::api::ContentSource;
use crate::app::App;
use crate::browser::ListStatus;
use crate::keybindings::Action as KbAction;
use crate::navigation::Pane;
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Render the listing pane
pub fn render<S: ContentSource>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    // Borders alone take two cells each way
    if area.width < 3 || area.height < 3 {
        app.list_rows_area = Rect::default();
        return;
    }

    let state = app.browser.state();
    let (page, strategy) = (state.page(), state.strategy());
    let is_focused = state.pane() == Pane::List;
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} · page {} ", strategy.label(), page));

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Failed loads keep the previous rows below an error banner
    let rows_area = match app.browser.list_status() {
        ListStatus::Loading => {
            app.list_rows_area = Rect::default();
            f.render_widget(Paragraph::new("Loading..."), inner);
            return;
        }
        ListStatus::Failed(error) => {
            let retry = app
                .keybindings
                .key_hint(KbAction::Reload)
                .map(|k| format!(" [{k}] retry"))
                .unwrap_or_default();
            let banner = Paragraph::new(Line::from(vec![
                Span::styled(format!("Error: {error}"), Style::default().fg(Color::Red)),
                Span::styled(retry, Style::default().fg(Color::DarkGray)),
            ]));
            let banner_height = inner.height.min(1);
            f.render_widget(banner, Rect { height: banner_height, ..inner });
            Rect {
                y: inner.y + banner_height,
                height: inner.height - banner_height,
                ..inner
            }
        }
        ListStatus::Ready => inner,
    };

    if app.browser.items().is_empty() {
        app.list_rows_area = Rect::default();
        f.render_widget(Paragraph::new("Empty content."), rows_area);
        return;
    }

    // Rows are numbered across pages
    let first_number = (page as usize - 1) * app.browser.page_size() as usize + 1;
    let width = rows_area.width as usize;
    let items: Vec<ListItem> = app
        .browser
        .titles()
        .enumerate()
        .map(|(i, title)| {
            let text = format!("{}. {}", first_number + i, strip_control_chars(title));
            ListItem::new(truncate_to_width(&text, width).into_owned())
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::Green).fg(Color::Black));

    app.list_rows_area = rows_area;
    f.render_stateful_widget(list, rows_area, &mut app.list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crate::navigation::Action;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[tokio::test]
    async fn test_rows_are_numbered_by_page() {
        let mut app = test_app(3).await;
        app.browser.dispatch(Action::NextPage).await;
        app.sync_with_browser();

        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|f| render(f, &mut app, f.area())).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("41. Post 0"), "{text}");
        assert!(text.contains("Relevant · page 2"), "{text}");
        assert_eq!(app.list_rows_area, Rect::new(1, 1, 38, 6));
    }

    #[tokio::test]
    async fn test_empty_page_message() {
        let mut app = test_app(0).await;
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        terminal.draw(|f| render(f, &mut app, f.area())).unwrap();

        assert!(screen(&terminal).contains("Empty content."));
        assert_eq!(app.list_rows_area, Rect::default());
    }
}
