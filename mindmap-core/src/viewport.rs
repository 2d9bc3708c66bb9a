//! Viewport controller: pan offset and zoom scale over laid-out content.
//!
//! Screen = content * scale + offset (translate then scale, origin top-left).
//! Nothing here draws; the presentation layer applies [`ViewTransform`].

use serde::{Deserialize, Serialize};

use crate::layout::{PointF, SizeF};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Fitting never zooms in beyond this.
    pub fit_max_scale: f64,
    /// Total padding (both sides) left around fitted content.
    pub fit_padding: f64,
    /// Scale change per wheel delta unit.
    pub wheel_sensitivity: f64,
    pub initial_scale: f64,
    /// Delay between a load completing and the automatic fit.
    pub fit_delay_ms: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.2,
            max_scale: 2.0,
            fit_max_scale: 1.5,
            fit_padding: 80.0,
            wheel_sensitivity: 0.001,
            initial_scale: 0.7,
            fit_delay_ms: 100.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl ViewTransform {
    pub fn screen_to_content(&self, p: PointF) -> PointF {
        PointF {
            x: (p.x - self.offset_x) / self.scale,
            y: (p.y - self.offset_y) / self.scale,
        }
    }

    pub fn content_to_screen(&self, p: PointF) -> PointF {
        PointF {
            x: p.x * self.scale + self.offset_x,
            y: p.y * self.scale + self.offset_y,
        }
    }

    /// CSS transform for a container with `transform-origin: top left`.
    pub fn css_transform(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.offset_x, self.offset_y, self.scale)
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    cfg: ViewportConfig,
    transform: ViewTransform,
    /// Pointer position minus offset at grab time, while dragging.
    grab: Option<PointF>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl ViewportController {
    pub fn new(cfg: ViewportConfig) -> Self {
        let scale = cfg.initial_scale.clamp(cfg.min_scale, cfg.max_scale);
        Self {
            cfg,
            transform: ViewTransform { offset_x: 0.0, offset_y: 0.0, scale },
            grab: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.cfg
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Move the content. Unbounded: content may leave the screen entirely.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.offset_x += dx;
        self.transform.offset_y += dy;
    }

    /// Change scale by `delta`, keeping the content under the pointer fixed.
    pub fn zoom_at(&mut self, pointer_x: f64, pointer_y: f64, delta: f64) {
        let t = &mut self.transform;
        let new_scale = (t.scale + delta).clamp(self.cfg.min_scale, self.cfg.max_scale);
        if !new_scale.is_finite() || new_scale == t.scale {
            return;
        }
        let ratio = 1.0 - new_scale / t.scale;
        t.offset_x += (pointer_x - t.offset_x) * ratio;
        t.offset_y += (pointer_y - t.offset_y) * ratio;
        t.scale = new_scale;
    }

    /// Wheel zoom: scrolling up (negative delta) zooms in.
    pub fn zoom_wheel(&mut self, pointer_x: f64, pointer_y: f64, delta_y: f64) {
        self.zoom_at(pointer_x, pointer_y, -delta_y * self.cfg.wheel_sensitivity);
    }

    /// Scale content into the viewport and center it.
    ///
    /// Only `fit_max_scale` caps the result. There is no `min_scale` floor, so
    /// a very large map can be fitted below it. The next wheel or zoom step
    /// clamps back into `[min_scale, max_scale]`.
    ///
    /// Returns `false` (and changes nothing) when there is nothing to fit or no
    /// room to fit it in.
    pub fn fit_to_content(
        &mut self,
        viewport_width: f64,
        viewport_height: f64,
        content_width: f64,
        content_height: f64,
        padding: f64,
    ) -> bool {
        if content_width <= 0.0 || content_height <= 0.0 {
            return false;
        }
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return false;
        }

        let scale_x = (viewport_width - padding) / content_width;
        let scale_y = (viewport_height - padding) / content_height;
        let scale = scale_x.min(scale_y).min(self.cfg.fit_max_scale);
        // viewport narrower than the padding
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }

        self.transform = ViewTransform {
            offset_x: (viewport_width - content_width * scale) / 2.0,
            offset_y: (viewport_height - content_height * scale) / 2.0,
            scale,
        };
        true
    }

    /// Fit using the configured padding.
    pub fn fit(&mut self, viewport: SizeF, content: SizeF) -> bool {
        self.fit_to_content(viewport.w, viewport.h, content.w, content.h, self.cfg.fit_padding)
    }

    pub fn begin_drag(&mut self, pointer_x: f64, pointer_y: f64) {
        self.grab = Some(PointF {
            x: pointer_x - self.transform.offset_x,
            y: pointer_y - self.transform.offset_y,
        });
    }

    /// Follow the pointer. Ignored when no drag is in progress.
    pub fn drag_to(&mut self, pointer_x: f64, pointer_y: f64) {
        if let Some(grab) = self.grab {
            self.transform.offset_x = pointer_x - grab.x;
            self.transform.offset_y = pointer_y - grab.y;
        }
    }

    pub fn end_drag(&mut self) {
        self.grab = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_initial_transform() {
        let vp = ViewportController::default();
        assert_eq!(vp.transform(), ViewTransform { offset_x: 0.0, offset_y: 0.0, scale: 0.7 });
    }

    #[test]
    fn test_pan_is_unbounded() {
        let mut vp = ViewportController::default();
        vp.pan(-10_000.0, 25.0);
        vp.pan(5.0, 5.0);
        let t = vp.transform();
        assert_eq!((t.offset_x, t.offset_y), (-9_995.0, 30.0));
    }

    #[test]
    fn test_zoom_keeps_focal_point() {
        let mut vp = ViewportController::default();
        vp.pan(37.0, -12.0);
        let pointer = PointF { x: 420.0, y: 310.0 };
        let before = vp.transform().screen_to_content(pointer);
        vp.zoom_at(pointer.x, pointer.y, 0.45);
        let after = vp.transform().screen_to_content(pointer);
        assert!((before.x - after.x).abs() < EPS);
        assert!((before.y - after.y).abs() < EPS);
        assert!((vp.transform().scale - 1.15).abs() < EPS);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = ViewportController::default();
        vp.zoom_at(0.0, 0.0, 10.0);
        assert_eq!(vp.transform().scale, 2.0);
        vp.zoom_at(0.0, 0.0, -10.0);
        assert_eq!(vp.transform().scale, 0.2);
    }

    #[test]
    fn test_wheel_direction() {
        let mut vp = ViewportController::default();
        vp.zoom_wheel(0.0, 0.0, -100.0);
        assert!((vp.transform().scale - 0.8).abs() < EPS);
        vp.zoom_wheel(0.0, 0.0, 200.0);
        assert!((vp.transform().scale - 0.6).abs() < EPS);
    }

    #[test]
    fn test_fit_caps_scale() {
        let mut vp = ViewportController::default();
        assert!(vp.fit_to_content(800.0, 600.0, 400.0, 300.0, 80.0));
        let t = vp.transform();
        assert_eq!(t.scale, 1.5);
        assert_eq!(t.offset_x, (800.0 - 400.0 * 1.5) / 2.0);
        assert_eq!(t.offset_y, (600.0 - 300.0 * 1.5) / 2.0);
    }

    #[test]
    fn test_fit_shrinks_large_content() {
        let mut vp = ViewportController::default();
        assert!(vp.fit_to_content(800.0, 600.0, 3_600.0, 520.0, 80.0));
        let t = vp.transform();
        assert!((t.scale - 0.2).abs() < EPS);
        assert!((t.offset_x - 40.0).abs() < EPS);
    }

    #[test]
    fn test_fit_ignores_min_scale_until_next_zoom() {
        let mut vp = ViewportController::default();
        assert!(vp.fit_to_content(800.0, 600.0, 7_200.0, 520.0, 80.0));
        assert!((vp.transform().scale - 0.1).abs() < EPS);

        // zooming out further still lands on the floor
        vp.zoom_wheel(400.0, 300.0, 10.0);
        assert_eq!(vp.transform().scale, 0.2);
    }

    #[test]
    fn test_fit_noops() {
        let mut vp = ViewportController::default();
        let before = vp.transform();
        assert!(!vp.fit_to_content(800.0, 600.0, 0.0, 300.0, 80.0));
        assert!(!vp.fit_to_content(0.0, 0.0, 400.0, 300.0, 80.0));
        assert!(!vp.fit_to_content(60.0, 600.0, 400.0, 300.0, 80.0));
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn test_drag_follows_pointer() {
        let mut vp = ViewportController::default();
        vp.pan(100.0, 50.0);
        vp.drag_to(0.0, 0.0);
        assert_eq!(vp.transform().offset_x, 100.0);

        vp.begin_drag(300.0, 200.0);
        vp.drag_to(350.0, 180.0);
        let t = vp.transform();
        assert_eq!((t.offset_x, t.offset_y), (150.0, 30.0));
        vp.end_drag();
        assert!(!vp.is_dragging());
        vp.drag_to(0.0, 0.0);
        assert_eq!(vp.transform().offset_x, 150.0);
    }

    #[test]
    fn test_css_transform() {
        let t = ViewTransform { offset_x: 12.5, offset_y: -4.0, scale: 1.5 };
        assert_eq!(t.css_transform(), "translate(12.5px, -4px) scale(1.5)");
    }

    #[test]
    fn test_round_trip_points() {
        let t = ViewTransform { offset_x: 30.0, offset_y: 40.0, scale: 0.5 };
        let p = PointF { x: 200.0, y: 100.0 };
        let s = t.content_to_screen(p);
        assert_eq!(s, PointF { x: 130.0, y: 90.0 });
        assert_eq!(t.screen_to_content(s), p);
    }
}
