//! Collision detection for curved geometry
//!
//! The player is a small circle orbiting in polar space; hazards are thick arc
//! bands and tokens are circles. Nothing here reflects or resolves - a contact
//! either kills the player or collects a token, so overlap tests are enough.

use glam::Vec2;

use crate::{cartesian_to_polar, normalize_angle, polar_to_cartesian};

/// A thickened arc segment in polar space
#[derive(Debug, Clone)]
pub struct ArcSegment {
    /// Centerline radius from the orbit center
    pub radius: f32,
    /// Radial thickness (extends radius ± thickness/2)
    pub thickness: f32,
    /// Start angle (radians, normalized to [-π, π))
    pub theta_start: f32,
    /// End angle (radians, normalized to [-π, π))
    pub theta_end: f32,
}

impl ArcSegment {
    pub fn new(radius: f32, thickness: f32, theta_start: f32, theta_end: f32) -> Self {
        Self {
            radius,
            thickness,
            theta_start: normalize_angle(theta_start),
            theta_end: normalize_angle(theta_end),
        }
    }

    /// Inner radius of the arc band
    #[inline]
    pub fn inner_radius(&self) -> f32 {
        self.radius - self.thickness / 2.0
    }

    /// Outer radius of the arc band
    #[inline]
    pub fn outer_radius(&self) -> f32 {
        self.radius + self.thickness / 2.0
    }

    /// Angular span of the arc (handles wraparound)
    pub fn angular_span(&self) -> f32 {
        let mut span = self.theta_end - self.theta_start;
        if span < 0.0 {
            span += std::f32::consts::TAU;
        }
        span
    }

    /// Check if an angle is within the arc's angular extent
    pub fn contains_angle(&self, theta: f32) -> bool {
        let theta = normalize_angle(theta);
        let start = self.theta_start;
        let end = self.theta_end;

        if start <= end {
            theta >= start && theta <= end
        } else {
            // Wraparound case (e.g., start=170°, end=-170°)
            theta >= start || theta <= end
        }
    }

    /// Return a copy rotated by `delta` radians around the center
    pub fn rotated(&self, delta: f32) -> Self {
        Self {
            radius: self.radius,
            thickness: self.thickness,
            theta_start: normalize_angle(self.theta_start + delta),
            theta_end: normalize_angle(self.theta_end + delta),
        }
    }
}

/// What the player ran into this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionSubject {
    /// Index into the hazard list
    Hazard(usize),
    /// Token id
    Token(u32),
}

/// Check overlap between a circle and an arc band
///
/// Returns the contact point if the circle touches the band. The band is the
/// region between inner_radius and outer_radius across the angular span; the
/// angular end caps are treated as radial line segments.
pub fn circle_arc_overlap(pos: Vec2, radius: f32, arc: &ArcSegment) -> Option<Vec2> {
    let (r, theta) = cartesian_to_polar(pos);
    let theta = normalize_angle(theta);

    if arc.contains_angle(theta) {
        // Within the angular span: pure radial test against the band
        let nearest_r = r.clamp(arc.inner_radius(), arc.outer_radius());
        if (r - nearest_r).abs() < radius {
            return Some(polar_to_cartesian(nearest_r, theta));
        }
        return None;
    }

    // Outside the span: the nearest surface is one of the end caps
    cap_overlap(pos, radius, arc, arc.theta_start)
        .or_else(|| cap_overlap(pos, radius, arc, arc.theta_end))
}

/// Check overlap with an arc end cap (radial segment at `theta`)
fn cap_overlap(pos: Vec2, radius: f32, arc: &ArcSegment, theta: f32) -> Option<Vec2> {
    let inner = polar_to_cartesian(arc.inner_radius(), theta);
    let outer = polar_to_cartesian(arc.outer_radius(), theta);

    let seg = outer - inner;
    let len_sq = seg.length_squared();
    if len_sq < 1e-6 {
        return None; // Degenerate cap
    }

    let t = ((pos - inner).dot(seg) / len_sq).clamp(0.0, 1.0);
    let closest = inner + seg * t;
    if (pos - closest).length() < radius {
        Some(closest)
    } else {
        None
    }
}

/// Check overlap between two circles
#[inline]
pub fn circle_circle_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    (a_pos - b_pos).length_squared() < (a_radius + b_radius) * (a_radius + b_radius)
}
