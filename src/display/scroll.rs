pub const SCROLL_STEP: f64 = 30.0;
pub const SCROLL_DELAY_MS: u64 = 700;
pub const SCROLL_PAUSE_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollAction {
    Hold,
    ScrollTo(f64),
    JumpTo(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Top,
    Scrolling,
    Bottom,
}

/// Auto-scroll state for one kiosk column. The owner calls `tick` every
/// `SCROLL_DELAY_MS` with a monotonic millisecond clock and applies the
/// returned action to its view.
#[derive(Debug, Clone)]
pub struct ScrollCursor {
    offset: f64,
    content_height: f64,
    view_height: f64,
    phase: Phase,
    resume_at: Option<u64>,
}

impl Default for ScrollCursor {
    fn default() -> Self {
        ScrollCursor::new()
    }
}

impl ScrollCursor {
    pub fn new() -> ScrollCursor {
        ScrollCursor {
            offset: 0.0,
            content_height: 0.0,
            view_height: 0.0,
            phase: Phase::Top,
            resume_at: None,
        }
    }

    pub fn set_content_height(&mut self, height: f64) {
        self.content_height = height;
    }

    pub fn set_view_height(&mut self, height: f64) {
        self.view_height = height;
    }

    fn at_bottom(&self) -> bool {
        self.offset + self.view_height >= self.content_height - SCROLL_STEP
    }

    pub fn tick(&mut self, now_ms: u64) -> ScrollAction {
        // nothing to scroll when everything fits
        if self.content_height <= self.view_height {
            return ScrollAction::Hold
        }
        if let Some(resume) = self.resume_at {
            if now_ms < resume {
                return ScrollAction::Hold
            }
        }
        match self.phase {
            Phase::Top => {
                if self.resume_at.is_none() {
                    self.resume_at = Some(now_ms + SCROLL_PAUSE_MS);
                    return ScrollAction::Hold
                }
                self.resume_at = None;
                self.phase = Phase::Scrolling;
                self.step(now_ms)
            },
            Phase::Scrolling => self.step(now_ms),
            Phase::Bottom => {
                self.offset = 0.0;
                self.phase = Phase::Top;
                self.resume_at = Some(now_ms + SCROLL_PAUSE_MS);
                ScrollAction::JumpTo(0.0)
            },
        }
    }

    fn step(&mut self, now_ms: u64) -> ScrollAction {
        if self.at_bottom() {
            self.phase = Phase::Bottom;
            self.resume_at = Some(now_ms + SCROLL_PAUSE_MS);
            return ScrollAction::Hold
        }
        self.offset += SCROLL_STEP;
        ScrollAction::ScrollTo(self.offset)
    }
}
