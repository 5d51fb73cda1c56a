use std::f32::consts::PI;

use nalgebra_glm as na;

/// Extends the direction `from -> to` by `distance` past `to`.
///
/// Returns `None` when the two points coincide or any input isn't finite,
/// since there is no direction to follow.
pub fn project_forward(
    from: na::Vec2,
    to: na::Vec2,
    distance: f32,
) -> Option<na::Vec2> {
    let delta = to - from;
    let len = delta.norm();

    if !(len.is_finite() && len > 0.0 && distance.is_finite()) {
        return None;
    }

    Some(to + delta * (distance / len))
}

/// Rotates `v` counter-clockwise by `angle` radians.
pub fn rotate(v: na::Vec2, angle: f32) -> na::Vec2 {
    let (sin, cos) = angle.sin_cos();
    na::vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

fn vec_angle(u: na::Vec2, v: na::Vec2) -> f32 {
    let cross = u.x * v.y - u.y * v.x;
    cross.atan2(u.dot(&v))
}

fn finite(v: na::Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line {
        from: na::Vec2,
        to: na::Vec2,
    },
    /// SVG-style elliptical arc; `x_rotation` is in degrees.
    Arc {
        from: na::Vec2,
        to: na::Vec2,
        radii: na::Vec2,
        x_rotation: f32,
        large_arc: bool,
        sweep: bool,
    },
    Cubic {
        from: na::Vec2,
        c1: na::Vec2,
        c2: na::Vec2,
        to: na::Vec2,
    },
}

impl Curve {
    pub fn from(&self) -> na::Vec2 {
        match self {
            Curve::Line { from, .. }
            | Curve::Arc { from, .. }
            | Curve::Cubic { from, .. } => *from,
        }
    }

    pub fn to(&self) -> na::Vec2 {
        match self {
            Curve::Line { to, .. }
            | Curve::Arc { to, .. }
            | Curve::Cubic { to, .. } => *to,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Curve::Line { from, to } => finite(*from) && finite(*to),
            Curve::Arc {
                from,
                to,
                radii,
                x_rotation,
                ..
            } => {
                finite(*from)
                    && finite(*to)
                    && finite(*radii)
                    && x_rotation.is_finite()
            }
            Curve::Cubic { from, c1, c2, to } => {
                finite(*from) && finite(*c1) && finite(*c2) && finite(*to)
            }
        }
    }

    /// Path data in SVG syntax.
    pub fn svg_path(&self) -> String {
        match self {
            Curve::Line { from, to } => {
                format!("M{},{}L{},{}", from.x, from.y, to.x, to.y)
            }
            Curve::Arc {
                from,
                to,
                radii,
                x_rotation,
                large_arc,
                sweep,
            } => format!(
                "M{},{}A{},{},{},{},{} {},{}",
                from.x,
                from.y,
                radii.x,
                radii.y,
                x_rotation,
                *large_arc as u8,
                *sweep as u8,
                to.x,
                to.y
            ),
            Curve::Cubic { from, c1, c2, to } => format!(
                "M {} {} C {} {}, {} {}, {} {}",
                from.x, from.y, c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
        }
    }

    pub fn point_at(&self, t: f32) -> na::Vec2 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Curve::Line { from, to } => from + (to - from) * t,
            Curve::Cubic { from, c1, c2, to } => {
                let s = 1.0 - t;
                from * (s * s * s)
                    + c1 * (3.0 * s * s * t)
                    + c2 * (3.0 * s * t * t)
                    + to * (t * t * t)
            }
            Curve::Arc {
                from,
                to,
                radii,
                x_rotation,
                large_arc,
                sweep,
            } => {
                let arc = ArcCenter::new(
                    from, to, radii, x_rotation, large_arc, sweep,
                );
                match arc {
                    Some(arc) => arc.point_at(t),
                    None => from + (to - from) * t,
                }
            }
        }
    }

    /// Approximates the curve with `n` evenly spaced (in `t`) points.
    /// Lines only ever need their endpoints.
    pub fn sample(&self, n: usize) -> Vec<na::Vec2> {
        if let Curve::Line { from, to } = self {
            return vec![*from, *to];
        }

        let n = n.max(2);
        (0..n)
            .map(|i| self.point_at(i as f32 / (n - 1) as f32))
            .collect()
    }
}

/// Center parameterization of an SVG arc.
struct ArcCenter {
    center: na::Vec2,
    radii: na::Vec2,
    phi: f32,
    theta: f32,
    delta: f32,
}

impl ArcCenter {
    fn new(
        from: na::Vec2,
        to: na::Vec2,
        radii: na::Vec2,
        x_rotation: f32,
        large_arc: bool,
        sweep: bool,
    ) -> Option<Self> {
        let mut rx = radii.x.abs();
        let mut ry = radii.y.abs();

        if rx == 0.0 || ry == 0.0 || from == to {
            return None;
        }

        let phi = x_rotation.to_radians();
        let p = rotate((from - to) * 0.5, -phi);

        let lambda = (p.x * p.x) / (rx * rx) + (p.y * p.y) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let num = rx * rx * ry * ry - rx * rx * p.y * p.y - ry * ry * p.x * p.x;
        let den = rx * rx * p.y * p.y + ry * ry * p.x * p.x;

        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        let coef = sign * (num / den).max(0.0).sqrt();

        let c = na::vec2(coef * rx * p.y / ry, -coef * ry * p.x / rx);
        let center = rotate(c, phi) + (from + to) * 0.5;

        let u = na::vec2((p.x - c.x) / rx, (p.y - c.y) / ry);
        let v = na::vec2((-p.x - c.x) / rx, (-p.y - c.y) / ry);

        let theta = vec_angle(na::vec2(1.0, 0.0), u);
        let mut delta = vec_angle(u, v);

        if !sweep && delta > 0.0 {
            delta -= 2.0 * PI;
        } else if sweep && delta < 0.0 {
            delta += 2.0 * PI;
        }

        Some(Self {
            center,
            radii: na::vec2(rx, ry),
            phi,
            theta,
            delta,
        })
    }

    fn point_at(&self, t: f32) -> na::Vec2 {
        let angle = self.theta + self.delta * t;
        let local =
            na::vec2(self.radii.x * angle.cos(), self.radii.y * angle.sin());
        self.center + rotate(local, self.phi)
    }
}
