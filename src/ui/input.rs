//! Input handling for the TUI.
//!
//! Keys and mouse events are translated into navigation actions for the
//! browser. Purely visual commands (reader scrolling, the info screen,
//! opening a link) are applied to the app directly and yield `None`.

use crate::api::{ContentSource, Strategy};
use crate::app::App;
use crate::keybindings::Action as KbAction;
use crate::navigation::{Action, Pane};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

/// Lines moved per mouse wheel notch.
const WHEEL_LINES: usize = 3;

/// Map a key press to a navigation action, handling UI-only keys in place.
pub(super) fn handle_key<S: ContentSource>(
    app: &mut App<S>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<Action> {
    let action = app.keybindings.action_for_key(code, modifiers, app.context())?;
    app.needs_redraw = true;

    match action {
        KbAction::Quit => Some(Action::Quit),
        KbAction::Reload => Some(Action::Reload),
        KbAction::Refresh => Some(Action::Refresh),
        KbAction::SwitchPane => Some(Action::SwitchPane),
        KbAction::NavUp => Some(Action::MoveSelection(-1)),
        KbAction::NavDown => Some(Action::MoveSelection(1)),
        KbAction::PreviousPage => Some(Action::PreviousPage),
        KbAction::NextPage => Some(Action::NextPage),
        KbAction::StrategyRelevant => Some(Action::SetStrategy(Strategy::Relevant)),
        KbAction::StrategyRecent => Some(Action::SetStrategy(Strategy::Recent)),
        KbAction::ShowInfo => {
            app.show_info = !app.show_info;
            app.reader_scroll = 0;
            None
        }
        KbAction::OpenInBrowser => {
            app.open_selected_in_browser();
            None
        }
        KbAction::ScrollUp => {
            app.scroll_up(1);
            None
        }
        KbAction::ScrollDown => {
            app.scroll_down(1);
            None
        }
        KbAction::PageUp => {
            app.page_up();
            None
        }
        KbAction::PageDown => {
            app.page_down();
            None
        }
    }
}

/// Map a mouse event to navigation actions.
///
/// A left click on a list row focuses the list and selects the row; a click
/// in the reader focuses the reader. The wheel scrolls the reader when the
/// pointer is over it and moves the selection when over the list.
pub(super) fn handle_mouse<S: ContentSource>(
    app: &mut App<S>,
    event: MouseEvent,
) -> Vec<Action> {
    let pos = Position::new(event.column, event.row);
    let in_list = app.list_rows_area.contains(pos);
    let in_reader = app.reader_area.contains(pos);
    let pane = app.browser.state().pane();

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) if in_list => {
            let row = usize::from(pos.y - app.list_rows_area.y) + app.list_state.offset();
            if row >= app.browser.items().len() {
                return Vec::new();
            }
            let mut actions = Vec::with_capacity(2);
            if pane != Pane::List {
                actions.push(Action::FocusPane(Pane::List));
            }
            actions.push(Action::SelectIndex(row));
            actions
        }
        MouseEventKind::Down(MouseButton::Left) if in_reader && pane != Pane::Reader => {
            vec![Action::FocusPane(Pane::Reader)]
        }
        MouseEventKind::ScrollUp if in_reader => {
            app.scroll_up(WHEEL_LINES);
            app.needs_redraw = true;
            Vec::new()
        }
        MouseEventKind::ScrollDown if in_reader => {
            app.scroll_down(WHEEL_LINES);
            app.needs_redraw = true;
            Vec::new()
        }
        MouseEventKind::ScrollUp if in_list => vec![Action::MoveSelection(-1)],
        MouseEventKind::ScrollDown if in_list => vec![Action::MoveSelection(1)],
        _ => Vec::new(),
    }
}
