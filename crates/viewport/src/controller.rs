//! Viewport controller: clamped zoom steps and a one-shot recenter.
//!
//! The controller owns the camera pose and publishes a fresh
//! `CameraDirective` on every accepted change. Requests at a zoom bound are
//! rejected outright so the rendering surface sees no redundant directives.

use foundation::{LngLat, ZoomRange};
use tracing::debug;

use crate::camera::{CameraAnimation, CameraDirective};

/// Transition length for a zoom step.
const ZOOM_EASE_MS: u32 = 250;

/// Transition length for the one-shot recenter; longer than a zoom step.
const RECENTER_EASE_MS: u32 = 1200;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportConfig {
    pub zoom_step: f64,
    pub zoom_range: ZoomRange,
    pub start_center: LngLat,
    pub start_zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_step: 0.5,
            zoom_range: ZoomRange::default(),
            start_center: LngLat::new(0.0, 0.0),
            start_zoom: 4.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    center: LngLat,
    zoom: f64,
    recentered: bool,
    directive: CameraDirective,
    revision: u64,
}

impl ViewportController {
    /// The start zoom is clamped into the configured range up front.
    pub fn new(config: ViewportConfig) -> Self {
        let center = config.start_center;
        let zoom = config.zoom_range.clamp(config.start_zoom);
        Self {
            config,
            center,
            zoom,
            recentered: false,
            directive: CameraDirective {
                center,
                zoom,
                animation: CameraAnimation::jump(),
            },
            revision: 0,
        }
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Last published directive, read by the rendering surface every tick.
    pub fn directive(&self) -> &CameraDirective {
        &self.directive
    }

    /// Bumped on every published directive; the render loop republishes the
    /// camera when this moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Step the zoom in; a call at the upper bound is a no-op.
    ///
    /// Returns whether a new directive was published.
    pub fn zoom_in(&mut self) -> bool {
        if self.config.zoom_range.at_max(self.zoom) {
            return false;
        }
        let zoom = self.config.zoom_range.clamp(self.zoom + self.config.zoom_step);
        self.apply_zoom(zoom);
        true
    }

    /// Step the zoom out; a call at the lower bound is a no-op.
    ///
    /// Bound-checked against the lower bound independently of `zoom_in`.
    pub fn zoom_out(&mut self) -> bool {
        if self.config.zoom_range.at_min(self.zoom) {
            return false;
        }
        let zoom = self.config.zoom_range.clamp(self.zoom - self.config.zoom_step);
        self.apply_zoom(zoom);
        true
    }

    /// Recenter on the first arrived data; idempotent after the first call.
    ///
    /// Duplicate notifications are swallowed so the camera keeps the first
    /// coordinates it was pointed at.
    pub fn on_first_data(&mut self, center: LngLat) -> bool {
        if self.recentered {
            return false;
        }
        self.recentered = true;
        self.center = center;
        self.publish(CameraAnimation::ease(RECENTER_EASE_MS));
        debug!("recentered on first data at {center}");
        true
    }

    /// Restore the construction pose and publish a fresh jump directive.
    pub fn reset(&mut self) {
        self.center = self.config.start_center;
        self.zoom = self.config.zoom_range.clamp(self.config.start_zoom);
        self.recentered = false;
        self.directive = CameraDirective {
            center: self.center,
            zoom: self.zoom,
            animation: CameraAnimation::jump(),
        };
        self.revision += 1;
    }

    fn apply_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.publish(CameraAnimation::ease(ZOOM_EASE_MS));
    }

    fn publish(&mut self, animation: CameraAnimation) {
        self.directive = CameraDirective {
            center: self.center,
            zoom: self.zoom,
            animation,
        };
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use foundation::{LngLat, ZoomRange};
    use pretty_assertions::assert_eq;

    use super::{ViewportConfig, ViewportController};
    use crate::camera::AnimationMode;

    fn controller(start_zoom: f64) -> ViewportController {
        ViewportController::new(ViewportConfig {
            zoom_step: 0.5,
            zoom_range: ZoomRange::new(0.0, 9.0),
            start_center: LngLat::new(0.0, 0.0),
            start_zoom,
        })
    }

    #[test]
    fn construction_publishes_a_jump_directive() {
        let ctrl = controller(4.0);
        assert_eq!(ctrl.directive().animation.mode, AnimationMode::Jump);
        assert_eq!(ctrl.directive().zoom, 4.0);
        assert_eq!(ctrl.revision(), 0);
    }

    #[test]
    fn zoom_steps_clamp_at_the_bound_without_churn() {
        let mut ctrl = controller(5.0);

        for _ in 0..5 {
            assert!(ctrl.zoom_in());
        }
        assert_eq!(ctrl.zoom(), 7.5);

        // Nine more: three reach the bound, the rest are no-ops.
        let published: usize = (0..9).map(|_| ctrl.zoom_in() as usize).sum();
        assert_eq!(ctrl.zoom(), 9.0);
        assert_eq!(published, 3);

        let at_bound = ctrl.revision();
        assert!(!ctrl.zoom_in());
        assert_eq!(ctrl.revision(), at_bound);
        assert_eq!(ctrl.directive().zoom, 9.0);
    }

    #[test]
    fn zoom_out_is_bound_checked_independently() {
        let mut ctrl = controller(0.5);

        assert!(ctrl.zoom_out());
        assert_eq!(ctrl.zoom(), 0.0);

        let at_bound = ctrl.revision();
        assert!(!ctrl.zoom_out());
        assert_eq!(ctrl.revision(), at_bound);

        // The upper-bound check does not leak into zoom-out.
        assert!(ctrl.zoom_in());
        assert_eq!(ctrl.zoom(), 0.5);
    }

    #[test]
    fn overshooting_step_lands_on_the_bound() {
        let mut ctrl = controller(8.8);
        assert!(ctrl.zoom_in());
        assert_eq!(ctrl.zoom(), 9.0);
        assert!(!ctrl.zoom_in());
    }

    #[test]
    fn zoom_keeps_the_current_center() {
        let mut ctrl = controller(4.0);
        ctrl.on_first_data(LngLat::new(100.5, 13.7));
        ctrl.zoom_in();
        assert_eq!(ctrl.directive().center, LngLat::new(100.5, 13.7));
        assert_eq!(ctrl.directive().animation.mode, AnimationMode::Ease);
    }

    #[test]
    fn recenter_applies_only_the_first_coordinates() {
        let mut ctrl = controller(4.0);

        assert!(ctrl.on_first_data(LngLat::new(100.5, 13.7)));
        let first = ctrl.directive().animation;
        assert_eq!(first.mode, AnimationMode::Ease);

        assert!(!ctrl.on_first_data(LngLat::new(-70.0, 40.0)));
        assert_eq!(ctrl.center(), LngLat::new(100.5, 13.7));
        assert_eq!(ctrl.directive().center, LngLat::new(100.5, 13.7));
    }

    #[test]
    fn recenter_eases_longer_than_a_zoom_step() {
        let mut ctrl = controller(4.0);
        ctrl.zoom_in();
        let zoom_ms = ctrl.directive().animation.duration_ms;
        ctrl.on_first_data(LngLat::new(1.0, 2.0));
        assert!(ctrl.directive().animation.duration_ms > zoom_ms);
    }

    #[test]
    fn reset_restores_the_start_pose_and_rearms_the_latch() {
        let mut ctrl = controller(4.0);
        ctrl.on_first_data(LngLat::new(100.5, 13.7));
        ctrl.zoom_in();

        ctrl.reset();
        assert_eq!(ctrl.center(), LngLat::new(0.0, 0.0));
        assert_eq!(ctrl.zoom(), 4.0);
        assert_eq!(ctrl.directive().animation.mode, AnimationMode::Jump);
        assert!(ctrl.on_first_data(LngLat::new(5.0, 5.0)));
    }

    #[test]
    fn start_zoom_is_clamped_into_range() {
        let ctrl = controller(42.0);
        assert_eq!(ctrl.zoom(), 9.0);
    }
}
