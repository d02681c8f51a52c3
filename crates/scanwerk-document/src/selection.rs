// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region selection over one displayed page.
//
// Points are stored exactly as the pointer events reported them, i.e. in
// zoomed display space. `selection_rect` reports that space unchanged;
// `image_selection_rect` converts to unzoomed image pixels. Changing the zoom
// never rewrites stored points.

use std::sync::Arc;

use image::DynamicImage;
use scanwerk_core::error::{Result, ScannerError};
use scanwerk_core::listeners::{Listener, ListenerSet};
use scanwerk_core::types::{CoordinateSpace, ImageSize, Point, Rect};
use tracing::{debug, instrument, trace};

use crate::image::crop_region;

/// Drag-rectangle selection state for a single page image.
///
/// Mutated only from the interaction thread. Listeners run synchronously and
/// must not block.
pub struct SelectionModel {
    image: Arc<DynamicImage>,
    drag_start: Option<Point>,
    drag_end: Option<Point>,
    zoom_level: f32,
    preferred_size: ImageSize,
    selection_listeners: ListenerSet,
    repaint_listeners: ListenerSet,
}

impl SelectionModel {
    /// Create a selection model for `image` at zoom 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::ImageError`] if the image has no pixels.
    pub fn new(image: impl Into<Arc<DynamicImage>>) -> Result<Self> {
        let image = image.into();
        let size = ImageSize::new(image.width(), image.height());
        if size.width == 0 || size.height == 0 {
            return Err(ScannerError::ImageError(format!(
                "cannot select on an empty {size} image"
            )));
        }
        debug!(%size, "selection model created");

        Ok(Self {
            image,
            drag_start: None,
            drag_end: None,
            zoom_level: 1.0,
            preferred_size: size,
            selection_listeners: ListenerSet::new(),
            repaint_listeners: ListenerSet::new(),
        })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn image(&self) -> &Arc<DynamicImage> {
        &self.image
    }

    pub fn image_size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }

    pub fn drag_start(&self) -> Option<Point> {
        self.drag_start
    }

    pub fn drag_end(&self) -> Option<Point> {
        self.drag_end
    }

    pub fn zoom_level(&self) -> f32 {
        self.zoom_level
    }

    /// Size the page should be displayed at for the current zoom.
    pub fn preferred_size(&self) -> ImageSize {
        self.preferred_size
    }

    /// Whether both drag endpoints are set.
    pub fn is_active(&self) -> bool {
        self.drag_start.is_some() && self.drag_end.is_some()
    }

    // -- Pointer events -------------------------------------------------------

    /// Pointer pressed: start a new drag.
    pub fn press(&mut self, point: Point) {
        trace!(x = point.x, y = point.y, "press");
        self.drag_start = Some(point);
        self.selection_listeners.notify();
    }

    /// Pointer moved with the button held.
    pub fn drag(&mut self, point: Point) {
        trace!(x = point.x, y = point.y, "drag");
        self.drag_end = Some(point);
        self.repaint_listeners.notify();
        self.selection_listeners.notify();
    }

    /// Pointer released: fix the end of the drag.
    pub fn release(&mut self, point: Point) {
        trace!(x = point.x, y = point.y, "release");
        self.drag_end = Some(point);
        self.selection_listeners.notify();
    }

    /// A single click collapses any selection, in progress or complete.
    ///
    /// Only repaint listeners are told; selection listeners are not.
    pub fn click(&mut self) {
        trace!("click");
        self.drag_start = None;
        self.drag_end = None;
        self.repaint_listeners.notify();
    }

    /// Drop the current selection without a pointer event.
    pub fn unselect(&mut self) {
        self.click();
    }

    // -- Derived geometry -----------------------------------------------------

    /// Selected rectangle in display space, or `None` when either endpoint is missing.
    pub fn selection_rect(&self) -> Option<Rect> {
        match (self.drag_start, self.drag_end) {
            (Some(start), Some(end)) => Some(Rect::from_corners(start, end)),
            _ => None,
        }
    }

    /// Selected rectangle in the requested coordinate space.
    pub fn selection_rect_in(&self, space: CoordinateSpace) -> Option<Rect> {
        match space {
            CoordinateSpace::Display => self.selection_rect(),
            CoordinateSpace::Image => self.image_selection_rect(),
        }
    }

    /// Selected rectangle in unzoomed image pixels, clamped to the image.
    ///
    /// The origin is rounded down and the far edge rounded up, so every image
    /// pixel the display rectangle touches is included. The result can be
    /// empty when the selection lies outside the page.
    pub fn image_selection_rect(&self) -> Option<Rect> {
        let rect = self.selection_rect()?;
        let zoom = f64::from(self.zoom_level);
        let size = self.image_size();

        let to_image = |v: i64| v as f64 / zoom;
        let left = to_image(i64::from(rect.x)).floor();
        let top = to_image(i64::from(rect.y)).floor();
        let right = to_image(i64::from(rect.x) + i64::from(rect.width)).ceil();
        let bottom = to_image(i64::from(rect.y) + i64::from(rect.height)).ceil();

        let left = left.clamp(0.0, f64::from(size.width));
        let top = top.clamp(0.0, f64::from(size.height));
        let right = right.clamp(left, f64::from(size.width));
        let bottom = bottom.clamp(top, f64::from(size.height));

        Some(Rect::new(
            left as i32,
            top as i32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    /// The pixels a recognition run should see: the selected region, or the
    /// whole page when nothing (or nothing on the page) is selected.
    #[instrument(skip(self))]
    pub fn selected_image(&self) -> DynamicImage {
        match self.image_selection_rect() {
            Some(rect) if !rect.is_empty() => crop_region(&self.image, rect),
            _ => {
                debug!("no usable selection, using whole page");
                (*self.image).clone()
            }
        }
    }

    // -- Zoom -----------------------------------------------------------------

    /// Set the display zoom factor and recompute the preferred size.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::InvalidZoom`] unless `factor` is finite and
    /// greater than zero. The model is unchanged on error.
    pub fn set_zoom_level(&mut self, factor: f32) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ScannerError::InvalidZoom(factor));
        }
        self.zoom_level = factor;
        self.preferred_size = self.image_size().scaled(factor);
        debug!(factor, size = %self.preferred_size, "zoom changed");
        self.repaint_listeners.notify();
        Ok(())
    }

    // -- Observers ------------------------------------------------------------

    pub fn add_selection_listener(&mut self, listener: Listener) -> bool {
        self.selection_listeners.add(listener)
    }

    pub fn remove_selection_listener(&mut self, listener: &Listener) -> bool {
        self.selection_listeners.remove(listener)
    }

    pub fn add_repaint_listener(&mut self, listener: Listener) -> bool {
        self.repaint_listeners.add(listener)
    }

    pub fn remove_repaint_listener(&mut self, listener: &Listener) -> bool {
        self.repaint_listeners.remove(listener)
    }
}

impl std::fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionModel")
            .field("image_size", &self.image_size())
            .field("drag_start", &self.drag_start)
            .field("drag_end", &self.drag_end)
            .field("zoom_level", &self.zoom_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};
    use std::cell::Cell;
    use std::rc::Rc;

    fn page(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    fn model() -> SelectionModel {
        SelectionModel::new(page(800, 600)).expect("model")
    }

    fn counter() -> (Rc<Cell<u32>>, Listener) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Rc::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn press_drag_release_scenario() {
        let mut sel = model();
        sel.press(Point::new(10, 10));
        sel.drag(Point::new(200, 150));
        sel.release(Point::new(220, 160));
        assert_eq!(sel.selection_rect(), Some(Rect::new(10, 10, 210, 150)));
    }

    #[test]
    fn last_press_release_pair_wins_over_drags() {
        let mut sel = model();
        sel.press(Point::new(300, 300));
        for p in [(5, 5), (790, 590), (0, 0)] {
            sel.drag(p.into());
        }
        sel.release(Point::new(100, 400));
        assert_eq!(sel.selection_rect(), Some(Rect::new(100, 300, 200, 100)));
    }

    #[test]
    fn reverse_drag_is_normalized() {
        let mut sel = model();
        sel.press(Point::new(220, 160));
        sel.release(Point::new(10, 10));
        assert_eq!(sel.selection_rect(), Some(Rect::new(10, 10, 210, 150)));
    }

    #[test]
    fn degenerate_rect_is_preserved() {
        let mut sel = model();
        sel.press(Point::new(50, 60));
        sel.release(Point::new(50, 90));
        assert_eq!(sel.selection_rect(), Some(Rect::new(50, 60, 0, 30)));
    }

    #[test]
    fn press_alone_is_not_a_selection() {
        let mut sel = model();
        sel.press(Point::new(1, 1));
        assert!(!sel.is_active());
        assert_eq!(sel.selection_rect(), None);
    }

    #[test]
    fn click_clears_selection() {
        let mut sel = model();
        sel.press(Point::new(1, 1));
        sel.release(Point::new(9, 9));
        sel.click();
        assert_eq!(sel.selection_rect(), None);
        assert_eq!(sel.drag_start(), None);
        assert_eq!(sel.drag_end(), None);
    }

    #[test]
    fn click_without_selection_is_harmless() {
        let mut sel = model();
        sel.click();
        assert_eq!(sel.selection_rect(), None);
    }

    #[test]
    fn unselect_clears_both_endpoints() {
        let mut sel = model();
        sel.press(Point::new(1, 1));
        sel.release(Point::new(9, 9));
        sel.unselect();
        assert!(!sel.is_active());
        assert_eq!(sel.drag_start(), None);
    }

    #[test]
    fn listeners_fire_at_documented_points() {
        let mut sel = model();
        let (changed, on_change) = counter();
        let (repainted, on_repaint) = counter();
        sel.add_selection_listener(on_change);
        sel.add_repaint_listener(on_repaint);

        sel.press(Point::new(0, 0));
        assert_eq!((changed.get(), repainted.get()), (1, 0));
        sel.drag(Point::new(5, 5));
        assert_eq!((changed.get(), repainted.get()), (2, 1));
        sel.release(Point::new(6, 6));
        assert_eq!((changed.get(), repainted.get()), (3, 1));
        sel.click();
        assert_eq!((changed.get(), repainted.get()), (3, 2));
    }

    #[test]
    fn removed_listener_stops_firing() {
        let mut sel = model();
        let (changed, on_change) = counter();
        sel.add_selection_listener(Rc::clone(&on_change));
        assert!(sel.remove_selection_listener(&on_change));
        sel.press(Point::new(0, 0));
        assert_eq!(changed.get(), 0);
    }

    #[test]
    fn non_positive_zoom_is_rejected() {
        let mut sel = model();
        for bad in [0.0, -1.5, f32::NAN, f32::INFINITY] {
            let err = sel.set_zoom_level(bad).unwrap_err();
            assert!(matches!(err, ScannerError::InvalidZoom(_)));
        }
        assert_eq!(sel.zoom_level(), 1.0);
        assert_eq!(sel.preferred_size(), ImageSize::new(800, 600));
    }

    #[test]
    fn zoom_rescales_display_size_but_not_points() {
        let mut sel = model();
        sel.press(Point::new(10, 10));
        sel.release(Point::new(220, 160));
        sel.set_zoom_level(2.0).expect("zoom");
        assert_eq!(sel.preferred_size(), ImageSize::new(1600, 1200));
        assert_eq!(sel.drag_start(), Some(Point::new(10, 10)));
        assert_eq!(sel.drag_end(), Some(Point::new(220, 160)));
        assert_eq!(sel.selection_rect(), Some(Rect::new(10, 10, 210, 150)));
    }

    #[test]
    fn fractional_zoom_truncates_preferred_size() {
        let mut sel = model();
        sel.set_zoom_level(0.333).expect("zoom");
        assert_eq!(sel.preferred_size(), ImageSize::new(266, 199));
    }

    #[test]
    fn image_rect_matches_display_rect_at_unit_zoom() {
        let mut sel = model();
        sel.press(Point::new(10, 10));
        sel.release(Point::new(220, 160));
        assert_eq!(sel.image_selection_rect(), sel.selection_rect());
    }

    #[test]
    fn image_rect_divides_by_zoom() {
        let mut sel = model();
        sel.set_zoom_level(2.0).expect("zoom");
        sel.press(Point::new(20, 40));
        sel.release(Point::new(421, 241));
        assert_eq!(sel.image_selection_rect(), Some(Rect::new(10, 20, 201, 101)));
        assert_eq!(
            sel.selection_rect_in(CoordinateSpace::Display),
            Some(Rect::new(20, 40, 401, 201))
        );
    }

    #[test]
    fn image_rect_is_clamped_to_page() {
        let mut sel = model();
        sel.press(Point::new(-50, 500));
        sel.release(Point::new(100, 900));
        assert_eq!(sel.image_selection_rect(), Some(Rect::new(0, 500, 100, 100)));
    }

    #[test]
    fn selected_image_crops_to_selection() {
        let mut sel = model();
        sel.press(Point::new(10, 10));
        sel.release(Point::new(220, 160));
        assert_eq!(sel.selected_image().dimensions(), (210, 150));
    }

    #[test]
    fn selected_image_falls_back_to_whole_page() {
        let mut sel = model();
        assert_eq!(sel.selected_image().dimensions(), (800, 600));
        sel.press(Point::new(5, 5));
        sel.release(Point::new(5, 50));
        assert_eq!(sel.selected_image().dimensions(), (800, 600));
    }

    #[test]
    fn empty_image_is_rejected() {
        let result = SelectionModel::new(page(0, 10));
        assert!(matches!(result, Err(ScannerError::ImageError(_))));
    }
}
