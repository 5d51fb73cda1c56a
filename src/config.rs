use nalgebra_glm as na;

use crate::{color::ColorScheme, layout::LayoutParams};

/// Tuning constants for shaping structural links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStyle {
    /// Draw one curve per path walking an edge.
    pub draw_paths: bool,
    pub loop_radii: na::Vec2,
    /// Degrees.
    pub loop_rotation: f32,
    /// Maximum slope difference between an edge and the chain it leaves
    /// or enters for the two to count as parallel.
    pub slope_threshold: f32,
    pub max_jitter: f32,
    pub base_offset: f32,
    pub lane_step: f32,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            draw_paths: true,
            loop_radii: na::vec2(25.0, 20.0),
            loop_rotation: -45.0,
            slope_threshold: 0.2,
            max_jitter: 40.0,
            base_offset: 20.0,
            lane_step: 30.0,
        }
    }
}

impl EdgeStyle {
    pub fn lane_offset(&self, lane: usize) -> f32 {
        self.base_offset + lane as f32 * self.lane_step
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub chunk_size: usize,
    pub link_steps: usize,
    pub strength: f32,
    pub theta: f32,
    pub iterations: usize,
    pub sequence_thickness: f32,
    pub link_thickness: f32,
    pub color_scheme: ColorScheme,
    /// Points per sampled curve when writing geometry.
    pub curve_samples: usize,
    pub edge: EdgeStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            link_steps: 3,
            strength: -50.0,
            theta: 0.9,
            iterations: 300,
            sequence_thickness: 10.0,
            link_thickness: 2.0,
            color_scheme: ColorScheme::default(),
            curve_samples: 16,
            edge: EdgeStyle::default(),
        }
    }
}

impl Settings {
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            strength: self.strength,
            link_steps: self.link_steps,
            theta: self.theta,
            iterations: self.iterations,
        }
    }
}
