//! Scroll offsets for the chat history and the panel result views.

/// A scroll offset clamped to the range the last frame could show.
///
/// `max` is refreshed by the renderer each frame; key handlers only ever
/// move `offset` within `0..=max`, so scrolling back never has to undo
/// presses that went past the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
    max: usize,
}

impl ScrollState {
    #[must_use]
    pub fn offset(self) -> usize {
        self.offset
    }

    /// Record how far the rendered content can scroll.
    pub fn set_max(&mut self, max: usize) {
        self.max = max;
        self.offset = self.offset.min(max);
    }

    pub fn forward(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines).min(self.max);
    }

    pub fn back(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn to_start(&mut self) {
        self.offset = 0;
    }

    pub fn to_end(&mut self) {
        self.offset = self.max;
    }
}
