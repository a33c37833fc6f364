//! Geometry and interaction state for the program list overlay.
//!
//! Everything here is plain math over `egui` rectangles so it can be driven
//! from the frame loop and tested without a window.

use egui::{pos2, vec2, Color32, Pos2, Rect};
use std::ops::Range;

pub const PANEL_MARGIN: f32 = 40.0;
pub const ROW_HEIGHT: f32 = 50.0;
pub const ROW_PADDING: f32 = 10.0;
pub const SCROLLBAR_WIDTH: f32 = 12.0;
pub const MIN_THUMB_HEIGHT: f32 = 20.0;
pub const OVERLAY_ALPHA: u8 = 0xBB;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListLayout {
    pub viewport: Rect,
    pub row_height: f32,
    pub padding: f32,
    pub scrollbar_width: f32,
}

impl ListLayout {
    /// The list panel for a window of `screen` size.
    pub fn for_screen(screen: Rect) -> Self {
        Self {
            viewport: screen.shrink(PANEL_MARGIN),
            row_height: ROW_HEIGHT,
            padding: ROW_PADDING,
            scrollbar_width: SCROLLBAR_WIDTH,
        }
    }

    fn stride(&self) -> f32 {
        self.row_height + self.padding
    }

    pub fn content_height(&self, count: usize) -> f32 {
        self.padding + count as f32 * self.stride()
    }

    pub fn max_scroll(&self, count: usize) -> f32 {
        (self.content_height(count) - self.viewport.height()).max(0.0)
    }

    /// Rows leave a column free on the right for the scrollbar.
    pub fn row_rect(&self, index: usize, offset: f32) -> Rect {
        let width = self.viewport.width() - 3.0 * self.padding - self.scrollbar_width;
        let top = self.viewport.top() + self.padding + index as f32 * self.stride() - offset;
        Rect::from_min_size(
            pos2(self.viewport.left() + self.padding, top),
            vec2(width.max(0.0), self.row_height),
        )
    }

    /// Indices of the rows that overlap the viewport.
    pub fn visible_rows(&self, offset: f32, count: usize) -> Range<usize> {
        let first = ((offset - self.padding - self.row_height) / self.stride()).ceil().max(0.0) as usize;
        let last = ((offset + self.viewport.height() - self.padding) / self.stride()).ceil().max(0.0) as usize;
        first.min(count)..last.min(count)
    }

    /// The row under `pos`, if any. Points outside the viewport never hit,
    /// since rows are clipped to it.
    pub fn hit_test(&self, pos: Pos2, offset: f32, count: usize) -> Option<usize> {
        if !self.viewport.contains(pos) {
            return None;
        }
        let relative = pos.y - self.viewport.top() - self.padding + offset;
        if relative < 0.0 {
            return None;
        }
        let index = (relative / self.stride()) as usize;
        (index < count && self.row_rect(index, offset).contains(pos)).then_some(index)
    }

    pub fn track_rect(&self) -> Rect {
        Rect::from_min_max(
            pos2(
                self.viewport.right() - self.padding - self.scrollbar_width,
                self.viewport.top() + self.padding,
            ),
            pos2(
                self.viewport.right() - self.padding,
                self.viewport.bottom() - self.padding,
            ),
        )
    }

    fn thumb_height(&self, count: usize) -> f32 {
        let track_height = self.track_rect().height();
        let ratio = self.viewport.height() / self.content_height(count);
        (track_height * ratio).clamp(MIN_THUMB_HEIGHT.min(track_height), track_height)
    }

    /// The scrollbar thumb, or `None` when everything fits.
    pub fn thumb_rect(&self, offset: f32, count: usize) -> Option<Rect> {
        let max_scroll = self.max_scroll(count);
        if max_scroll <= 0.0 {
            return None;
        }
        let track = self.track_rect();
        let thumb_height = self.thumb_height(count);
        let t = (offset / max_scroll).clamp(0.0, 1.0);
        let top = track.top() + t * (track.height() - thumb_height);
        Some(Rect::from_min_size(
            pos2(track.left(), top),
            vec2(track.width(), thumb_height),
        ))
    }

    /// Scroll offset that puts the thumb's top edge at `thumb_top`.
    fn offset_for_thumb_top(&self, thumb_top: f32, count: usize) -> f32 {
        let track = self.track_rect();
        let travel = track.height() - self.thumb_height(count);
        if travel <= 0.0 {
            return 0.0;
        }
        ((thumb_top - track.top()) / travel).clamp(0.0, 1.0) * self.max_scroll(count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScrollbarDrag {
    #[default]
    Idle,
    /// `grab_offset` is the distance from the thumb's top edge to the pointer.
    Dragging { grab_offset: f32 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollState {
    offset: f32,
    drag: ScrollbarDrag,
}

impl ScrollState {
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, ScrollbarDrag::Dragging { .. })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn scroll_by(&mut self, delta: f32, layout: &ListLayout, count: usize) {
        self.offset = (self.offset + delta).clamp(0.0, layout.max_scroll(count));
    }

    /// Re-applies the bounds after the window or the list changed size.
    pub fn clamp(&mut self, layout: &ListLayout, count: usize) {
        self.scroll_by(0.0, layout, count);
    }

    /// Handles a primary press. Returns `true` when the scrollbar took it.
    pub fn press(&mut self, pos: Pos2, layout: &ListLayout, count: usize) -> bool {
        let Some(thumb) = layout.thumb_rect(self.offset, count) else {
            return false;
        };

        if thumb.contains(pos) {
            self.drag = ScrollbarDrag::Dragging { grab_offset: pos.y - thumb.top() };
            return true;
        }

        if layout.track_rect().contains(pos) {
            let grab_offset = thumb.height() / 2.0;
            self.offset = layout.offset_for_thumb_top(pos.y - grab_offset, count);
            self.drag = ScrollbarDrag::Dragging { grab_offset };
            return true;
        }

        false
    }

    pub fn drag_to(&mut self, pointer_y: f32, layout: &ListLayout, count: usize) {
        if let ScrollbarDrag::Dragging { grab_offset } = self.drag {
            self.offset = layout.offset_for_thumb_top(pointer_y - grab_offset, count);
        }
    }

    pub fn release(&mut self) {
        self.drag = ScrollbarDrag::Idle;
    }
}

// ==========================================
// COLORS
// ==========================================

/// `0xRRGGBB` plus alpha, as unmultiplied RGBA.
pub fn color_alpha(hex: u32, alpha: u8) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, alpha]
}

/// Moves each channel towards white (`factor > 0`) or black (`factor < 0`).
/// Alpha is untouched.
pub fn brighten(rgba: [u8; 4], factor: f32) -> [u8; 4] {
    let factor = factor.clamp(-1.0, 1.0);
    let channel = |c: u8| {
        let c = c as f32;
        let out = if factor < 0.0 {
            c * (1.0 + factor)
        } else {
            c + (255.0 - c) * factor
        };
        out as u8
    };
    [channel(rgba[0]), channel(rgba[1]), channel(rgba[2]), rgba[3]]
}

pub fn to_color32(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

pub fn row_color(hovered: bool, pressed: bool, selected: bool) -> [u8; 4] {
    let mut color = if selected {
        color_alpha(0x5a2626, OVERLAY_ALPHA)
    } else {
        color_alpha(0x331818, OVERLAY_ALPHA)
    };
    if hovered {
        color = brighten(color, 0.1);
        if pressed {
            color = brighten(color, 0.3);
        }
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ListLayout {
        ListLayout::for_screen(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)))
    }

    #[test]
    fn panel_is_inset_from_window() {
        let layout = layout();
        assert_eq!(layout.viewport, Rect::from_min_max(pos2(40.0, 40.0), pos2(760.0, 560.0)));
    }

    #[test]
    fn rows_stack_below_top_padding() {
        let layout = layout();
        let first = layout.row_rect(0, 0.0);
        assert_eq!(first.top(), 50.0);
        assert_eq!(first.left(), 50.0);
        assert_eq!(first.height(), 50.0);

        let third = layout.row_rect(2, 0.0);
        assert_eq!(third.top(), 50.0 + 2.0 * 60.0);

        let scrolled = layout.row_rect(2, 30.0);
        assert_eq!(scrolled.top(), third.top() - 30.0);
    }

    #[test]
    fn hit_test_finds_row_and_ignores_gaps() {
        let layout = layout();
        assert_eq!(layout.hit_test(pos2(100.0, 60.0), 0.0, 5), Some(0));
        assert_eq!(layout.hit_test(pos2(100.0, 115.0), 0.0, 5), Some(1));
        // Padding between row 0 and row 1.
        assert_eq!(layout.hit_test(pos2(100.0, 105.0), 0.0, 5), None);
        // Past the last row.
        assert_eq!(layout.hit_test(pos2(100.0, 400.0), 0.0, 2), None);
        // Scrollbar column.
        assert_eq!(layout.hit_test(pos2(745.0, 60.0), 0.0, 5), None);
    }

    #[test]
    fn hit_test_respects_clipping() {
        let layout = layout();
        // Row 0 scrolled above the panel still has a rect, but it is clipped.
        let offset = 45.0;
        assert!(layout.row_rect(0, offset).contains(pos2(100.0, 20.0)));
        assert_eq!(layout.hit_test(pos2(100.0, 20.0), offset, 20), None);
    }

    #[test]
    fn visible_rows_cover_viewport() {
        let layout = layout();
        assert_eq!(layout.visible_rows(0.0, 3), 0..3);

        let range = layout.visible_rows(0.0, 50);
        assert_eq!(range.start, 0);
        assert!(layout.row_rect(range.end - 1, 0.0).top() < layout.viewport.bottom());
        assert!(layout.row_rect(range.end, 0.0).top() >= layout.viewport.bottom());

        let range = layout.visible_rows(130.0, 50);
        assert_eq!(range.start, 2);
        assert!(layout.row_rect(1, 130.0).bottom() <= layout.viewport.top());
        assert!(layout.row_rect(2, 130.0).bottom() > layout.viewport.top());
    }

    #[test]
    fn scrolling_is_clamped() {
        let layout = layout();
        let mut scroll = ScrollState::default();

        scroll.scroll_by(-100.0, &layout, 20);
        assert_eq!(scroll.offset(), 0.0);

        scroll.scroll_by(1.0e6, &layout, 20);
        assert_eq!(scroll.offset(), layout.max_scroll(20));

        // Short list: nothing to scroll.
        scroll.clamp(&layout, 2);
        assert_eq!(scroll.offset(), 0.0);
    }

    #[test]
    fn no_scrollbar_when_content_fits() {
        let layout = layout();
        assert!(layout.thumb_rect(0.0, 8).is_none());
        assert!(layout.thumb_rect(0.0, 9).is_some());
    }

    #[test]
    fn thumb_size_follows_viewport_ratio() {
        let layout = layout();
        let track = layout.track_rect();
        let count = 20;
        let thumb = layout.thumb_rect(0.0, count).unwrap();
        let expected = track.height() * layout.viewport.height() / layout.content_height(count);
        assert!((thumb.height() - expected).abs() < 1e-3);
        assert_eq!(thumb.top(), track.top());

        let bottom = layout.thumb_rect(layout.max_scroll(count), count).unwrap();
        assert!((bottom.bottom() - track.bottom()).abs() < 1e-3);

        // Huge lists still get a grabbable thumb.
        let tiny = layout.thumb_rect(0.0, 10_000).unwrap();
        assert_eq!(tiny.height(), MIN_THUMB_HEIGHT);
    }

    #[test]
    fn dragging_thumb_moves_offset_proportionally() {
        let layout = layout();
        let count = 20;
        let mut scroll = ScrollState::default();
        let thumb = layout.thumb_rect(0.0, count).unwrap();
        let travel = layout.track_rect().height() - thumb.height();

        let grab = pos2(thumb.center().x, thumb.top() + 5.0);
        assert!(scroll.press(grab, &layout, count));
        assert!(scroll.is_dragging());

        scroll.drag_to(grab.y + travel / 2.0, &layout, count);
        assert!((scroll.offset() - layout.max_scroll(count) / 2.0).abs() < 1e-3);

        scroll.drag_to(grab.y + 10.0 * travel, &layout, count);
        assert_eq!(scroll.offset(), layout.max_scroll(count));

        scroll.release();
        assert!(!scroll.is_dragging());
        scroll.drag_to(grab.y, &layout, count);
        assert_eq!(scroll.offset(), layout.max_scroll(count));
    }

    #[test]
    fn track_press_centres_thumb_under_pointer() {
        let layout = layout();
        let count = 20;
        let mut scroll = ScrollState::default();
        let track = layout.track_rect();

        let pos = pos2(track.center().x, track.bottom() - 1.0);
        assert!(scroll.press(pos, &layout, count));
        assert!(scroll.is_dragging());

        let thumb = layout.thumb_rect(scroll.offset(), count).unwrap();
        assert!(thumb.contains(pos));
        assert!(scroll.offset() > 0.0);
    }

    #[test]
    fn press_outside_scrollbar_is_not_consumed() {
        let layout = layout();
        let mut scroll = ScrollState::default();
        assert!(!scroll.press(pos2(100.0, 60.0), &layout, 20));
        assert!(!scroll.is_dragging());

        // Nothing to drag when the list fits.
        let track = layout.track_rect();
        assert!(!scroll.press(track.center(), &layout, 2));
    }

    #[test]
    fn reset_returns_to_top() {
        let layout = layout();
        let mut scroll = ScrollState::default();
        scroll.scroll_by(200.0, &layout, 20);
        scroll.press(layout.thumb_rect(scroll.offset(), 20).unwrap().center(), &layout, 20);

        scroll.reset();
        assert_eq!(scroll.offset(), 0.0);
        assert!(!scroll.is_dragging());
    }

    #[test]
    fn brighten_moves_towards_white_or_black() {
        assert_eq!(brighten([0, 100, 255, 7], 0.5), [127, 177, 255, 7]);
        assert_eq!(brighten([100, 50, 0, 7], -0.5), [50, 25, 0, 7]);
        assert_eq!(brighten([10, 20, 30, 40], 0.0), [10, 20, 30, 40]);
    }

    #[test]
    fn hovered_and_pressed_rows_get_brighter() {
        let idle = row_color(false, false, false);
        let hovered = row_color(true, false, false);
        let pressed = row_color(true, true, false);
        assert_eq!(idle, color_alpha(0x331818, OVERLAY_ALPHA));
        assert!(hovered[0] > idle[0] && pressed[0] > hovered[0]);
        assert_eq!(pressed[3], OVERLAY_ALPHA);
        assert_ne!(row_color(false, false, true), idle);
    }
}
