//! Render functions for the TUI.
//!
//! Lays out the listing pane, the reader pane and the status bar, and guards
//! against terminals too small to show them.

use crate::api::ContentSource;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{list, reader, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Main render function.
pub(super) fn render<S: ContentSource>(f: &mut Frame, app: &mut App<S>) {
    let area = f.area();

    // At truly minimal dimensions, we can't render anything meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let [main, bar] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let [left, right] =
        Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)]).areas(main);

    list::render(f, app, left);
    reader::render(f, app, right);
    status::render(f, app, bar);
}
