// minifb only reports the current mouse state each frame; the editor wants
// press / move / release events. PointerTracker diffs consecutive polls.

use crate::editor::PointerEvent;
use crate::geometry::Point;

#[derive(Debug, Default)]
pub struct PointerTracker {
    last_pos: Option<Point>,
    was_down: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one poll: pointer position in window pixels (`None` when outside
    /// the window) and whether the left button is held.
    ///
    /// Positions are truncated to whole pixels. A release that happens outside
    /// the window is reported at the last known position.
    pub fn poll(&mut self, pos: Option<(f32, f32)>, down: bool) -> Option<PointerEvent> {
        let pos = pos
            .map(|(x, y)| Point::new(x.trunc() as f64, y.trunc() as f64))
            .or(self.last_pos);
        let was_down = std::mem::replace(&mut self.was_down, down);

        let p = pos?;
        let moved = self.last_pos != Some(p);
        self.last_pos = Some(p);

        // a press and release both between two polls are not seen
        match (was_down, down) {
            (false, true) => Some(PointerEvent::Down(p)),
            (true, false) => Some(PointerEvent::Up(p)),
            _ if moved => Some(PointerEvent::Move(p)),
            _ => None,
        }
    }
}
