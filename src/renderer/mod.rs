//! 2D rendering
//!
//! Draws a [`GameSession`] onto any [`Surface`]. The browser build uses the
//! Canvas 2D implementation in [`canvas`]; tests use a recording surface.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use shapes::TargetShape;

use glam::Vec2;

use crate::palette_color;
use crate::settings::Settings;
use crate::sim::GameSession;

/// RGBA, each channel 0-1
pub type Color = [f32; 4];

/// One color stop of a radial gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// 0 at the inner radius, 1 at the outer radius
    pub offset: f32,
    pub color: Color,
}

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const COUNTDOWN_RING: Color = [1.0, 1.0, 1.0, 1.0];
    pub const FLASH: Color = [1.0, 1.0, 1.0, 1.0];
    /// Peak opacity of the hit flash overlay
    pub const FLASH_MAX_ALPHA: f32 = 0.3;
}

/// Drawing primitives, in pixel coordinates matching pointer coordinates
pub trait Surface {
    /// Drawable size in pixels
    fn size(&self) -> Vec2;
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Arc outline from `start` to `end` radians (clockwise in screen space)
    fn stroke_arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        width: f32,
        color: Color,
    );
    /// Disc out to `outer` filled with a radial gradient starting at `inner`
    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
}

/// Draw the current frame: targets, then particles, then the hit flash
pub fn render(session: &GameSession, surface: &mut impl Surface, settings: &Settings) {
    surface.clear();

    for target in &session.targets {
        let glow = if settings.reduced_motion { 0.5 } else { target.glow };
        let shape = TargetShape::for_target(target, glow);

        if settings.glow {
            surface.fill_radial_gradient(
                shape.center,
                shape.body_radius,
                shape.glow_radius,
                &shapes::glow_stops(target.color_id),
            );
        }
        surface.fill_circle(shape.center, shape.body_radius, palette_color(target.color_id, 1.0));
        if shape.ring_sweep() > 0.0 {
            surface.stroke_arc(
                shape.center,
                shape.ring_radius,
                shape.ring_start,
                shape.ring_end,
                shapes::RING_WIDTH,
                colors::COUNTDOWN_RING,
            );
        }
    }

    if settings.particles {
        for particle in &session.particles {
            surface.fill_circle(particle.pos, particle.size, shapes::particle_color(particle));
        }
    }

    if settings.effective_screen_flash() && session.flash > 0.0 {
        let [r, g, b, _] = colors::FLASH;
        let alpha = session.flash * colors::FLASH_MAX_ALPHA;
        surface.fill_rect(Vec2::ZERO, surface.size(), [r, g, b, alpha]);
    }
}
