/// Vertical scroll state of the message list, measured in rows.
///
/// Content that grows while the view is within `threshold` rows of the
/// bottom keeps the view pinned to the bottom; otherwise the offset the user
/// scrolled to is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollView {
    pub offset: u16,
    pub content_height: u16,
    pub viewport_height: u16,
    pub threshold: u16,
}

impl ScrollView {
    pub fn new(threshold: u16) -> Self {
        Self {
            offset: 0,
            content_height: 0,
            viewport_height: 0,
            threshold,
        }
    }

    pub fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn distance_from_bottom(&self) -> u16 {
        self.max_offset().saturating_sub(self.offset)
    }

    pub fn is_near_bottom(&self) -> bool {
        self.distance_from_bottom() < self.threshold
    }

    /// Apply a content height change, measuring the distance before the change.
    /// An unchanged height is not a change: the offset the user picked stays.
    pub fn update(&mut self, content_height: u16) {
        if content_height == self.content_height {
            return;
        }
        let pinned = self.is_near_bottom();
        self.content_height = content_height;
        if pinned {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// The pane was resized; keep the bottom in view if it was in view
    pub fn resize(&mut self, viewport_height: u16) {
        if viewport_height == self.viewport_height {
            return;
        }
        let pinned = self.is_near_bottom();
        self.viewport_height = viewport_height;
        self.offset = if pinned {
            self.max_offset()
        } else {
            self.offset.min(self.max_offset())
        };
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.offset = self.offset.saturating_add(rows).min(self.max_offset());
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn page(&self) -> u16 {
        self.viewport_height.saturating_sub(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(offset: u16, content: u16, viewport: u16) -> ScrollView {
        ScrollView {
            offset,
            content_height: content,
            viewport_height: viewport,
            threshold: 2,
        }
    }

    #[test]
    fn test_pinned_when_at_bottom() {
        let mut v = view(80, 100, 20);
        v.update(130);
        assert_eq!(v.offset, 110);
        assert_eq!(v.offset, v.max_offset());
    }

    #[test]
    fn test_pinned_when_within_threshold() {
        let mut v = view(79, 100, 20);
        assert_eq!(v.distance_from_bottom(), 1);
        v.update(105);
        assert_eq!(v.offset, 85);
    }

    #[test]
    fn test_untouched_when_scrolled_away() {
        let mut v = view(40, 100, 20);
        v.update(140);
        assert_eq!(v.offset, 40);

        // exactly at the threshold is not "near"
        let mut v = view(78, 100, 20);
        v.update(120);
        assert_eq!(v.offset, 78);
    }

    #[test]
    fn test_content_shorter_than_viewport() {
        let mut v = view(0, 5, 20);
        v.update(12);
        assert_eq!(v.offset, 0);
        v.update(35);
        assert_eq!(v.offset, 15);
    }

    #[test]
    fn test_same_height_keeps_manual_offset() {
        let mut v = view(80, 100, 20);
        v.scroll_up(1);
        v.update(100);
        assert_eq!(v.offset, 79);

        // the next real growth still counts as near the bottom
        v.update(110);
        assert_eq!(v.offset, 90);
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let mut v = view(10, 100, 20);
        v.update(25);
        assert_eq!(v.offset, 5);
    }

    #[test]
    fn test_manual_scrolling_is_bounded() {
        let mut v = view(0, 50, 20);
        v.scroll_down(100);
        assert_eq!(v.offset, 30);
        v.scroll_up(7);
        assert_eq!(v.offset, 23);
        v.scroll_to_top();
        assert_eq!(v.offset, 0);
        v.resize(10);
        assert_eq!(v.offset, 0);
        v.scroll_to_bottom();
        v.resize(25);
        assert_eq!(v.offset, 25);
    }
}
