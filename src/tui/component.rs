use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Props arrive as struct fields and persistent state as `&mut` fields, so a
/// component can be rebuilt every frame from `App` without owning any of it.
/// `render` takes `&mut self` because layout caches and scroll offsets are
/// refreshed while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Component state that consumes terminal events.
///
/// Handlers keep local changes (cursor, selection, scroll) to themselves and
/// surface only what the event loop must turn into a core `Action`.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
