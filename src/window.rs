//! Windowed rendering: maps a long row list onto the slice worth materializing.
//!
//! Extents are measured in terminal rows. [`compute_window`] is a pure function
//! of its inputs; [`Virtualizer`] holds the inputs and recomputes the window
//! whenever one of them changes (scroll, resize, row count, row height).

use std::ops::Range;

/// Default number of extra rows materialized on each side of the viewport
pub const DEFAULT_OVERSCAN: usize = 10;

/// Inputs of a window computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowParams {
    /// Number of rows in the ordered view
    pub row_count: usize,
    /// Height of the scrollable viewport
    pub viewport_height: u64,
    /// Estimated height of a single row, at least 1
    pub row_height: u64,
    /// Rows rendered beyond the visible bounds in each direction
    pub overscan: usize,
    /// Requested scroll position, clamped to the scrollable range
    pub scroll_offset: u64,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            row_count: 0,
            viewport_height: 0,
            row_height: 1,
            overscan: DEFAULT_OVERSCAN,
            scroll_offset: 0,
        }
    }
}

/// The slice of rows to materialize
///
/// `leading + (end - start) * row_height + trailing == total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    /// First materialized index
    pub start: usize,
    /// One past the last materialized index
    pub end: usize,
    /// First index actually inside the viewport
    pub first_visible: usize,
    /// One past the last index inside the viewport
    pub last_visible: usize,
    /// Space before the first materialized row
    pub leading: u64,
    /// Space after the last materialized row
    pub trailing: u64,
    /// Total scrollable extent
    pub total: u64,
    /// Effective (clamped) scroll position
    pub scroll_offset: u64,
    /// Row height used for this computation
    pub row_height: u64,
}

impl Window {
    /// Materialized index range
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Index range inside the viewport, without overscan
    pub fn visible_range(&self) -> Range<usize> {
        self.first_visible..self.last_visible
    }

    /// Nothing to materialize: the caller shows a "no results" placeholder
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Combined height of the materialized rows
    pub fn materialized_extent(&self) -> u64 {
        (self.end - self.start) as u64 * self.row_height
    }

    /// Position of row `index` relative to the top of the viewport
    pub fn row_top(&self, index: usize) -> i64 {
        (index as u64 * self.row_height) as i64 - self.scroll_offset as i64
    }
}

/// Computes the window for the given inputs
///
/// Runs in constant time regardless of `row_count`.
pub fn compute_window(params: &WindowParams) -> Window {
    let row_height = params.row_height.max(1);
    let count = params.row_count;
    let total = count as u64 * row_height;
    if count == 0 {
        return Window {
            row_height,
            ..Window::default()
        };
    }

    let max_scroll = total.saturating_sub(params.viewport_height);
    let scroll_offset = params.scroll_offset.min(max_scroll);

    let first_visible = ((scroll_offset / row_height) as usize).min(count);
    let last_visible = ((scroll_offset + params.viewport_height).div_ceil(row_height) as usize)
        .min(count)
        .max(first_visible);

    let start = first_visible.saturating_sub(params.overscan);
    let end = last_visible.saturating_add(params.overscan).min(count);

    Window {
        start,
        end,
        first_visible,
        last_visible,
        leading: start as u64 * row_height,
        trailing: (count - end) as u64 * row_height,
        total,
        scroll_offset,
        row_height,
    }
}

/// Holds the window inputs and keeps the computed window up to date
#[derive(Debug, Clone, Default)]
pub struct Virtualizer {
    params: WindowParams,
    window: Window,
}

impl Virtualizer {
    /// Creates a virtualizer with the given row height estimate and overscan
    pub fn new(row_height: u64, overscan: usize) -> Self {
        let params = WindowParams {
            row_height: row_height.max(1),
            overscan,
            ..WindowParams::default()
        };
        Self {
            params,
            window: compute_window(&params),
        }
    }

    /// Current window
    pub fn window(&self) -> Window {
        self.window
    }

    /// Current inputs
    pub fn params(&self) -> WindowParams {
        self.params
    }

    fn recompute(&mut self) -> Window {
        self.window = compute_window(&self.params);
        // keep the stored offset within the scrollable range
        self.params.scroll_offset = self.window.scroll_offset;
        self.window
    }

    /// The ordered view changed length
    pub fn set_row_count(&mut self, row_count: usize) -> Window {
        if self.params.row_count != row_count {
            debug!("virtualizer: row count {} -> {}", self.params.row_count, row_count);
        }
        self.params.row_count = row_count;
        self.recompute()
    }

    /// The viewport was resized
    pub fn set_viewport_height(&mut self, height: u64) -> Window {
        self.params.viewport_height = height;
        self.recompute()
    }

    /// The row height estimate changed
    pub fn set_row_height(&mut self, row_height: u64) -> Window {
        self.params.row_height = row_height.max(1);
        self.recompute()
    }

    /// Absolute scroll
    pub fn scroll_to(&mut self, offset: u64) -> Window {
        self.params.scroll_offset = offset;
        self.recompute()
    }

    /// Relative scroll
    pub fn scroll_by(&mut self, delta: i64) -> Window {
        let offset = if delta < 0 {
            self.params.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.params.scroll_offset.saturating_add(delta as u64)
        };
        self.scroll_to(offset)
    }

    /// Scrolls the least amount needed for row `index` to be fully visible
    pub fn scroll_to_index(&mut self, index: usize) -> Window {
        let row_height = self.params.row_height;
        let top = index as u64 * row_height;
        let bottom = top + row_height;
        let offset = self.params.scroll_offset;
        if top < offset {
            self.scroll_to(top)
        } else if bottom > offset + self.params.viewport_height {
            self.scroll_to(bottom.saturating_sub(self.params.viewport_height))
        } else {
            self.recompute()
        }
    }

    /// Number of whole rows fitting in the viewport
    pub fn page_size(&self) -> usize {
        ((self.params.viewport_height / self.params.row_height) as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(row_count: usize, scroll_offset: u64) -> WindowParams {
        WindowParams {
            row_count,
            viewport_height: 12,
            row_height: 1,
            overscan: 3,
            scroll_offset,
        }
    }

    fn assert_invariant(w: &Window, row_count: usize) {
        assert!(w.start <= w.end);
        assert!(w.end <= row_count);
        assert_eq!(w.leading + w.materialized_extent() + w.trailing, w.total);
    }

    #[test]
    fn empty_list_is_an_empty_window() {
        let w = compute_window(&params(0, 40));
        assert!(w.is_empty());
        assert_eq!(w.total, 0);
        assert_eq!(w.range(), 0..0);
    }

    #[test]
    fn top_of_list() {
        let w = compute_window(&params(1000, 0));
        assert_eq!(w.range(), 0..15);
        assert_eq!(w.visible_range(), 0..12);
        assert_eq!(w.leading, 0);
        assert_eq!(w.trailing, 985);
        assert_invariant(&w, 1000);
    }

    #[test]
    fn middle_of_list_overscans_both_ways() {
        let w = compute_window(&params(1000, 500));
        assert_eq!(w.range(), 497..515);
        assert_eq!(w.visible_range(), 500..512);
        assert_invariant(&w, 1000);
    }

    #[test]
    fn scroll_past_end_is_clamped() {
        let w = compute_window(&params(100, 5000));
        assert_eq!(w.scroll_offset, 88);
        assert_eq!(w.visible_range(), 88..100);
        assert_eq!(w.range(), 85..100);
        assert_invariant(&w, 100);
    }

    #[test]
    fn taller_rows_partially_visible() {
        let p = WindowParams {
            row_count: 50,
            viewport_height: 10,
            row_height: 3,
            overscan: 0,
            scroll_offset: 4,
        };
        let w = compute_window(&p);
        // rows 1 (3..6) through 4 (12..15) intersect 4..14
        assert_eq!(w.visible_range(), 1..5);
        assert_eq!(w.leading, 3);
        assert_invariant(&w, 50);
    }

    #[test]
    fn invariant_holds_for_every_offset() {
        for count in [0, 1, 5, 12, 13, 200] {
            for offset in 0..250 {
                let w = compute_window(&params(count, offset));
                assert_invariant(&w, count);
            }
        }
    }

    #[test]
    fn shrinking_list_clamps_scroll() {
        let mut v = Virtualizer::new(1, 2);
        v.set_viewport_height(10);
        v.set_row_count(500);
        v.scroll_to(400);
        assert_eq!(v.window().first_visible, 400);

        let w = v.set_row_count(20);
        assert_eq!(w.scroll_offset, 10);
        assert_eq!(w.visible_range(), 10..20);
        assert!(w.end <= 20);

        let w = v.set_row_count(0);
        assert!(w.is_empty());
        assert_eq!(w.scroll_offset, 0);
    }

    #[test]
    fn scroll_to_index_keeps_row_visible() {
        let mut v = Virtualizer::new(1, 0);
        v.set_viewport_height(10);
        v.set_row_count(100);

        let w = v.scroll_to_index(25);
        assert_eq!(w.visible_range(), 16..26);
        let w = v.scroll_to_index(20);
        assert_eq!(w.scroll_offset, 16);
        let w = v.scroll_to_index(3);
        assert_eq!(w.visible_range(), 3..13);
    }

    #[test]
    fn scroll_by_saturates() {
        let mut v = Virtualizer::new(1, 0);
        v.set_viewport_height(10);
        v.set_row_count(30);
        assert_eq!(v.scroll_by(-5).scroll_offset, 0);
        assert_eq!(v.scroll_by(100).scroll_offset, 20);
        assert_eq!(v.page_size(), 10);
    }
}
