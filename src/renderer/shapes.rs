//! Geometry for target and particle visuals

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::{Color, GradientStop};
use crate::palette_color;
use crate::sim::{Particle, Target};

/// Body radius at expiry, as a fraction of the base radius
pub const MIN_BODY_SCALE: f32 = 0.7;
/// Glow halo reaches this far past the body, plus the pulse
pub const GLOW_EXTENT: f32 = 20.0;
pub const GLOW_PULSE_EXTENT: f32 = 10.0;
/// Countdown ring sits this far outside the body
pub const RING_GAP: f32 = 5.0;
pub const RING_WIDTH: f32 = 3.0;

/// Resolved geometry for drawing one target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetShape {
    pub center: Vec2,
    /// Shrinks linearly to 70% of the base radius over the lifetime
    pub body_radius: f32,
    pub glow_radius: f32,
    pub ring_radius: f32,
    /// Countdown arc, clockwise from 12 o'clock
    pub ring_start: f32,
    pub ring_end: f32,
}

impl TargetShape {
    pub fn for_target(target: &Target, glow: f32) -> Self {
        let remaining = target.remaining_fraction();
        let elapsed = 1.0 - remaining;
        let body_radius = target.radius * (1.0 - elapsed * (1.0 - MIN_BODY_SCALE));
        let ring_start = -FRAC_PI_2;
        Self {
            center: target.pos,
            body_radius,
            glow_radius: body_radius + GLOW_EXTENT + glow * GLOW_PULSE_EXTENT,
            ring_radius: body_radius + RING_GAP,
            ring_start,
            ring_end: ring_start + remaining * TAU,
        }
    }

    /// Angle covered by the countdown ring
    pub fn ring_sweep(&self) -> f32 {
        self.ring_end - self.ring_start
    }
}

/// Halo gradient: half-opaque at the body edge, fading to transparent
pub fn glow_stops(color_id: usize) -> [GradientStop; 3] {
    [
        GradientStop { offset: 0.0, color: palette_color(color_id, 0x80 as f32 / 255.0) },
        GradientStop { offset: 0.7, color: palette_color(color_id, 0x30 as f32 / 255.0) },
        GradientStop { offset: 1.0, color: palette_color(color_id, 0.0) },
    ]
}

/// Particle color, faded by its remaining life
pub fn particle_color(particle: &Particle) -> Color {
    palette_color(particle.color_id, particle.life.clamp(0.0, 1.0))
}

/// CSS `rgba()` string for a 0-1 color
pub fn css_rgba(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({},{},{},{:.3})",
        (r.clamp(0.0, 1.0) * 255.0).round() as u8,
        (g.clamp(0.0, 1.0) * 255.0).round() as u8,
        (b.clamp(0.0, 1.0) * 255.0).round() as u8,
        a.clamp(0.0, 1.0)
    )
}
