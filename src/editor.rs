// Interactive quadrilateral editing.
//
// The four corners of the overlay can be grabbed with the mouse and dragged.
// All state lives in an `EditorSession` value that `handle` consumes and
// returns, so nothing here knows about windows.

use crate::geometry::{Point, Quad, signed_distance};

/// A press closer than this (Euclidean, strictly) grabs a corner.
pub const PICK_RADIUS: f64 = 30.0;
/// Dragged corners stay this far inside the background edges.
pub const EDGE_MARGIN: f64 = 2.0;
/// The pointer counts as inside up to this distance outside the quad.
pub const INSIDE_TOLERANCE: f64 = 5.0;
/// Corner handles are squares of ±this size.
pub const HANDLE_HALF_SIZE: i32 = 10;

pub const COLOR_INSIDE: u32 = 0x00_FF_00_00;
pub const COLOR_OUTSIDE: u32 = 0x00_FF_FF_FF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down(p) | PointerEvent::Move(p) | PointerEvent::Up(p) => p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Dragging(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorSession {
    quad: Quad,
    active: Option<usize>,
    drag_completed: bool,
    inside: bool,
    width: usize,
    height: usize,
}

impl EditorSession {
    /// Start idle with `quad`, clamping drags to a `width` x `height` background.
    pub fn new(quad: Quad, width: usize, height: usize) -> Self {
        Self {
            quad,
            active: None,
            drag_completed: false,
            inside: false,
            width,
            height,
        }
    }

    pub fn quad(&self) -> &Quad {
        &self.quad
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn state(&self) -> EditorState {
        match self.active {
            Some(i) => EditorState::Dragging(i),
            None => EditorState::Idle,
        }
    }

    /// Returns whether a drag finished since the last call, and clears it.
    pub fn take_drag_completed(&mut self) -> bool {
        std::mem::take(&mut self.drag_completed)
    }

    fn clamp(&self, p: Point) -> Point {
        let max_x = (self.width as f64 - EDGE_MARGIN).max(EDGE_MARGIN);
        let max_y = (self.height as f64 - EDGE_MARGIN).max(EDGE_MARGIN);
        Point::new(p.x.clamp(EDGE_MARGIN, max_x), p.y.clamp(EDGE_MARGIN, max_y))
    }

    /// Scan corners 0..4; every one in range overwrites the previous pick.
    fn pick_corner(&self, p: Point) -> Option<usize> {
        let mut picked = None;
        for (i, corner) in self.quad.corners().iter().enumerate() {
            if corner.distance(p) < PICK_RADIUS {
                picked = Some(i);
            }
        }
        picked
    }
}

/// Apply one pointer event.
///
/// A press selects the corner in range (or none). While a corner is selected
/// every event, including that press and the final release, moves it to the
/// clamped pointer position. A release then ends the drag.
pub fn handle(mut session: EditorSession, event: PointerEvent) -> EditorSession {
    let pos = event.position();

    if let PointerEvent::Down(p) = event {
        session.active = session.pick_corner(p);
        if let Some(i) = session.active {
            log::debug!("grabbed corner {i} at ({}, {})", p.x, p.y);
        }
    }

    if let Some(i) = session.active {
        session.quad.0[i] = session.clamp(pos);
    }

    if let PointerEvent::Up(_) = event {
        if let Some(i) = session.active.take() {
            log::debug!("released corner {i} at {:?}", session.quad.0[i]);
            session.drag_completed = true;
        }
    }

    session.inside = signed_distance(session.quad.corners(), pos) >= -INSIDE_TOLERANCE;
    session
}

/// Decides when the loop has to recomposite, and which outline to draw.
#[derive(Debug, Default)]
pub struct Redraw {
    shown_inside: bool,
}

/// What to draw on top of the composited frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    Hidden,
    Visible(u32),
}

impl Redraw {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first frame is always drawn with a white outline.
    pub fn initial(&self) -> Outline {
        Outline::Visible(COLOR_OUTSIDE)
    }

    /// `Some(outline)` when a redraw is needed: a corner is being dragged, a
    /// drag just finished, or the pointer crossed the quad boundary.
    pub fn poll(&mut self, session: &mut EditorSession) -> Option<Outline> {
        let mut needed = session.active().is_some();
        if session.take_drag_completed() {
            needed = true;
        }
        if self.shown_inside != session.is_inside() {
            self.shown_inside = session.is_inside();
            needed = true;
        }

        needed.then(|| {
            if self.shown_inside {
                Outline::Visible(COLOR_INSIDE)
            } else {
                Outline::Hidden
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        COLOR_INSIDE, EditorSession, EditorState, Outline, PointerEvent, Redraw, handle,
    };
    use crate::geometry::{Point, Quad};

    fn square_session() -> EditorSession {
        EditorSession::new(Quad::rect(10.0, 10.0, 80.0, 80.0), 640, 480)
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down(Point::new(x, y))
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move(Point::new(x, y))
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up(Point::new(x, y))
    }

    #[test]
    fn starts_idle() {
        let s = square_session();
        assert_eq!(s.state(), EditorState::Idle);
        assert!(!s.is_inside());
    }

    #[test]
    fn press_near_corner_selects_it() {
        let s = handle(square_session(), down(12.0, 11.0));
        assert_eq!(s.state(), EditorState::Dragging(0));
        // the press itself snaps the corner to the pointer
        assert_eq!(s.quad().corners()[0], Point::new(12.0, 11.0));
    }

    #[test]
    fn press_far_from_corners_selects_nothing() {
        let before = square_session();
        let s = handle(before.clone(), down(50.0, 50.0));
        assert_eq!(s.state(), EditorState::Idle);
        assert_eq!(s.quad(), before.quad());
        assert!(s.is_inside());
    }

    #[test]
    fn press_elsewhere_deselects() {
        let s = handle(square_session(), down(12.0, 11.0));
        let s = handle(s, down(300.0, 300.0));
        assert_eq!(s.active(), None);
    }

    #[test]
    fn last_corner_in_range_wins() {
        // corners 0 and 1 are 20 apart; the press is within 30 of both
        let quad = Quad::rect(100.0, 100.0, 20.0, 50.0);
        let s = handle(EditorSession::new(quad, 640, 480), down(108.0, 100.0));
        assert_eq!(s.active(), Some(1));
    }

    #[test]
    fn drag_is_clamped_to_margin() {
        let s = handle(square_session(), down(12.0, 11.0));
        let s = handle(s, mv(-5.0, 500.0));
        assert_eq!(s.quad().corners()[0], Point::new(2.0, 478.0));

        let s = handle(s, mv(1000.0, -20.0));
        assert_eq!(s.quad().corners()[0], Point::new(638.0, 2.0));
    }

    #[test]
    fn moves_without_selection_change_nothing() {
        let before = square_session();
        let s = handle(before.clone(), mv(10.0, 10.0));
        assert_eq!(s.quad(), before.quad());
    }

    #[test]
    fn release_completes_drag() {
        let s = handle(square_session(), down(88.0, 92.0));
        assert_eq!(s.active(), Some(2));
        let s = handle(s, mv(120.0, 130.0));
        let mut s = handle(s, up(125.0, 135.0));

        assert_eq!(s.state(), EditorState::Idle);
        assert_eq!(s.quad().corners()[2], Point::new(125.0, 135.0));
        assert!(s.take_drag_completed());
        assert!(!s.take_drag_completed());

        // later moves leave the corner alone
        let s = handle(s, mv(300.0, 300.0));
        assert_eq!(s.quad().corners()[2], Point::new(125.0, 135.0));
    }

    #[test]
    fn release_without_drag_is_not_a_completion() {
        let mut s = handle(square_session(), up(50.0, 50.0));
        assert!(!s.take_drag_completed());
    }

    #[test]
    fn inside_flag_has_tolerance() {
        let s = handle(square_session(), mv(50.0, 50.0));
        assert!(s.is_inside());
        let s = handle(s, mv(94.0, 50.0));
        assert!(s.is_inside());
        let s = handle(s, mv(95.0, 50.0));
        assert!(s.is_inside());
        let s = handle(s, mv(96.0, 50.0));
        assert!(!s.is_inside());
        let s = handle(s, mv(-1000.0, -1000.0));
        assert!(!s.is_inside());
    }

    #[test]
    fn redraw_on_highlight_change_only() {
        let mut redraw = Redraw::new();
        let mut s = square_session();
        assert_eq!(redraw.poll(&mut s), None);

        s = handle(s, mv(50.0, 50.0));
        assert_eq!(redraw.poll(&mut s), Some(Outline::Visible(COLOR_INSIDE)));
        assert_eq!(redraw.poll(&mut s), None);

        s = handle(s, mv(51.0, 50.0));
        assert_eq!(redraw.poll(&mut s), None);

        s = handle(s, mv(300.0, 300.0));
        assert_eq!(redraw.poll(&mut s), Some(Outline::Hidden));
        assert_eq!(redraw.poll(&mut s), None);
    }

    #[test]
    fn redraw_while_dragging_and_after_release() {
        let mut redraw = Redraw::new();
        let mut s = handle(square_session(), down(12.0, 11.0));
        assert!(redraw.poll(&mut s).is_some());
        assert!(redraw.poll(&mut s).is_some());

        s = handle(s, up(20.0, 20.0));
        assert!(redraw.poll(&mut s).is_some());
        assert_eq!(redraw.poll(&mut s), None);
    }
}
