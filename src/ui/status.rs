use crate::api::ContentSource;
use crate::app::App;
use crate::keybindings::Action as KbAction;
use crate::navigation::Pane;
use crate::VERSION;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar: hints or a status message, version on the right.
pub fn render<S: ContentSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let version = format!("v{VERSION} ");
    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(version.len() as u16)])
            .areas(area);

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        Cow::Owned(hints(app))
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(format!(" {text}")).style(style), left);
    f.render_widget(
        Paragraph::new(version).style(style.fg(Color::Yellow)),
        right,
    );
}

/// Key hints for the focused pane, built from the active bindings.
fn hints<S: ContentSource>(app: &App<S>) -> String {
    let actions: &[(KbAction, &str)] = match app.browser.state().pane() {
        Pane::List => &[
            (KbAction::NavDown, "move"),
            (KbAction::NextPage, "next page"),
            (KbAction::PreviousPage, "prev page"),
            (KbAction::StrategyRelevant, "relevant"),
            (KbAction::StrategyRecent, "recent"),
            (KbAction::SwitchPane, "reader"),
            (KbAction::Refresh, "refresh"),
            (KbAction::ShowInfo, "info"),
            (KbAction::Quit, "quit"),
        ],
        Pane::Reader => &[
            (KbAction::ScrollDown, "scroll"),
            (KbAction::PageDown, "page"),
            (KbAction::OpenInBrowser, "open"),
            (KbAction::SwitchPane, "list"),
            (KbAction::ShowInfo, "info"),
            (KbAction::Quit, "quit"),
        ],
    };

    actions
        .iter()
        .filter_map(|&(action, label)| {
            app.keybindings
                .key_hint(action)
                .map(|key| format!("[{key}] {label}"))
        })
        .collect::<Vec<_>>()
        .join("  ")
}
