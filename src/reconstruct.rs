//! Turns laid-out sub-nodes back into drawable shapes: one polyline per
//! segment, and curves for the structural links between them.

use std::f32::consts::FRAC_PI_4;

use nalgebra_glm as na;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::{
    chunk::{ChainLink, RenderGraph, StructuralLink, SubNodeKind},
    color::PathPalette,
    config::EdgeStyle,
    curve::{project_forward, rotate, Curve},
    gfa::Graph,
    layout::Positions,
};

/// Source of the random radius jitter applied to near-parallel edges.
/// Values are in `[0, 1)`.
pub trait Jitter {
    fn next_unit(&mut self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedJitter(pub f32);

impl Jitter for FixedJitter {
    fn next_unit(&mut self) -> f32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Jitter for RandomJitter {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Index of the segment in `Graph::nodes`.
    pub node: usize,
    pub id: String,
    pub points: Vec<na::Vec2>,
}

pub fn build_polylines(
    render: &RenderGraph,
    positions: &Positions,
) -> Vec<Polyline> {
    let mut order = Vec::new();
    let mut groups: FxHashMap<usize, Vec<&ChainLink>> = FxHashMap::default();

    for link in render.chain_links() {
        groups
            .entry(link.link_num)
            .or_insert_with(|| {
                order.push(link.link_num);
                Vec::new()
            })
            .push(link);
    }

    let mut skipped = 0;

    let polylines = order
        .into_iter()
        .filter_map(|link_num| {
            let links = groups.get(&link_num)?;
            let first = links.first()?;

            let points = std::iter::once(first.source.as_str())
                .chain(links.iter().map(|link| link.target.as_str()))
                .map(|id| positions.get(id))
                .collect::<Option<Vec<_>>>();

            match points {
                Some(points) => Some(Polyline {
                    node: link_num,
                    id: first.id.clone(),
                    points,
                }),
                None => {
                    skipped += 1;
                    None
                }
            }
        })
        .collect();

    if skipped > 0 {
        log::warn!(
            "{} segments have sub-nodes without a position and were not drawn",
            skipped
        );
    }

    polylines
}

/// For each chain endpoint sub-node, the position of its neighbor inside
/// the chain and its own position. The pair gives the direction the chain
/// is pointing in at that end.
#[derive(Debug, Default, Clone)]
pub struct ChainEnds {
    ends: FxHashMap<String, (na::Vec2, na::Vec2)>,
}

impl ChainEnds {
    pub fn from_polylines(polylines: &[Polyline]) -> Self {
        let mut ends = FxHashMap::default();

        for polyline in polylines {
            let points = &polyline.points;
            let n = points.len();
            if n < 2 {
                continue;
            }

            ends.insert(
                SubNodeKind::Start.id(&polyline.id),
                (points[1], points[0]),
            );
            ends.insert(
                SubNodeKind::End.id(&polyline.id),
                (points[n - 2], points[n - 1]),
            );
        }

        Self { ends }
    }

    pub fn get(&self, sub_node: &str) -> Option<(na::Vec2, na::Vec2)> {
        self.ends.get(sub_node).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurve {
    /// Index of the originating link in `Graph::links`.
    pub link: usize,
    pub path: Option<String>,
    pub lane: Option<usize>,
    pub curve: Curve,
}

/// Difference in slope between two directions. When both are steeper
/// than 45 degrees the slopes are taken against the y axis instead, so
/// vertical directions compare as finite values.
fn slope_difference(u: na::Vec2, v: na::Vec2) -> f32 {
    let steep = |d: na::Vec2| d.y.abs() > d.x.abs();

    if steep(u) && steep(v) {
        (u.x / u.y - v.x / v.y).abs()
    } else {
        (u.y / u.x - v.y / v.x).abs()
    }
}

struct EdgeShaper<'a, J: Jitter + ?Sized> {
    style: &'a EdgeStyle,
    jitter: &'a mut J,
}

/// Endpoints of one structural link, with the chain direction at each
/// side if known.
#[derive(Clone, Copy)]
struct Ends {
    from: na::Vec2,
    to: na::Vec2,
    source: Option<(na::Vec2, na::Vec2)>,
    target: Option<(na::Vec2, na::Vec2)>,
}

impl Ends {
    fn near_parallel(&self, threshold: f32) -> bool {
        let dir = self.to - self.from;
        [self.source, self.target]
            .iter()
            .flatten()
            .any(|&(prev, pt)| slope_difference(dir, pt - prev) < threshold)
    }
}

impl<'a, J: Jitter + ?Sized> EdgeShaper<'a, J> {
    fn jittered_arc(&mut self, ends: &Ends, sweep: bool) -> Curve {
        let r = (ends.to - ends.from).norm()
            + self.jitter.next_unit() * self.style.max_jitter;

        Curve::Arc {
            from: ends.from,
            to: ends.to,
            radii: na::vec2(r, r),
            x_rotation: 0.0,
            large_arc: false,
            sweep,
        }
    }

    fn projected(&self, ends: &Ends, offset: f32) -> Option<Curve> {
        match (ends.source, ends.target) {
            (Some((s_prev, s_pt)), Some((t_prev, t_pt))) => {
                let c1 = project_forward(s_prev, s_pt, offset)?;
                let c2 = project_forward(t_prev, t_pt, offset)?;
                Some(Curve::Cubic {
                    from: ends.from,
                    c1,
                    c2,
                    to: ends.to,
                })
            }
            _ => Some(Curve::Line {
                from: ends.from,
                to: ends.to,
            }),
        }
    }

    fn lane(
        &mut self,
        link: &StructuralLink,
        ends: &Ends,
        lane: usize,
    ) -> Option<Curve> {
        // projecting both controls from one chain end collapses the curve
        if link.is_loop && ends.from == ends.to {
            let size = self.loop_size() + self.style.lane_offset(lane);
            return Some(self.teardrop(ends, size));
        }

        if ends.near_parallel(self.style.slope_threshold) {
            return Some(self.jittered_arc(ends, lane % 2 == 1));
        }
        self.projected(ends, self.style.lane_offset(lane))
    }

    fn self_loop(&self, ends: &Ends) -> Option<Curve> {
        if ends.from == ends.to {
            return Some(self.teardrop(ends, self.loop_size()));
        }

        let folds_back = match ends.source {
            Some((prev, pt)) => (pt - prev).dot(&(pt - ends.to)) > 0.0,
            None => true,
        };

        folds_back.then(|| Curve::Arc {
            from: ends.from,
            to: ends.to,
            radii: self.style.loop_radii,
            x_rotation: self.style.loop_rotation,
            large_arc: true,
            sweep: false,
        })
    }

    fn loop_size(&self) -> f32 {
        2.0 * self.style.loop_radii.x.max(self.style.loop_radii.y)
    }

    /// A loop leaving and entering the same point, pointing away from
    /// the chain. `size` is the distance of both control points.
    fn teardrop(&self, ends: &Ends, size: f32) -> Curve {
        let dir = ends
            .source
            .map(|(prev, pt)| pt - prev)
            .filter(|d| d.norm() > 0.0)
            .map(|d| d.normalize())
            .unwrap_or_else(|| na::vec2(0.0, -1.0));

        Curve::Cubic {
            from: ends.from,
            c1: ends.from + rotate(dir, FRAC_PI_4) * size,
            c2: ends.to + rotate(dir, -FRAC_PI_4) * size,
            to: ends.to,
        }
    }

    fn plain(&mut self, link: &StructuralLink, ends: &Ends) -> Option<Curve> {
        if link.is_loop {
            if let Some(curve) = self.self_loop(ends) {
                return Some(curve);
            }
        }

        if ends.near_parallel(self.style.slope_threshold) {
            return Some(self.jittered_arc(ends, false));
        }

        self.projected(ends, self.style.lane_offset(0))
    }
}

/// Builds the curves for every structural link of `render`.
///
/// Links with an endpoint that has no usable position, and curves whose
/// construction degenerates, are left out; both are counted and reported
/// once per call.
pub fn shape_edges<J: Jitter + ?Sized>(
    graph: &Graph,
    render: &RenderGraph,
    positions: &Positions,
    chain_ends: &ChainEnds,
    style: &EdgeStyle,
    jitter: &mut J,
) -> Vec<EdgeCurve> {
    let lanes = PathPalette::from_paths(&graph.paths);

    let mut shaper = EdgeShaper { style, jitter };

    let mut curves = Vec::new();
    let mut dangling = 0;
    let mut degenerate = 0;

    for link in render.structural_links() {
        let from = positions.get(&link.source);
        let to = positions.get(&link.target);

        let ends = match (from, to) {
            (Some(from), Some(to)) => Ends {
                from,
                to,
                source: chain_ends.get(&link.source),
                target: chain_ends.get(&link.target),
            },
            _ => {
                dangling += 1;
                continue;
            }
        };

        let mut push = |curve: Option<Curve>, path: Option<&String>, lane| {
            match curve.filter(Curve::is_finite) {
                Some(curve) => curves.push(EdgeCurve {
                    link: link.link,
                    path: path.cloned(),
                    lane,
                    curve,
                }),
                None => degenerate += 1,
            }
        };

        match link.paths.as_ref().filter(|_| style.draw_paths) {
            Some(paths) => {
                for name in paths {
                    let lane = lanes.lane(name).unwrap_or(0);
                    let curve = shaper.lane(link, &ends, lane);
                    push(curve, Some(name), Some(lane));
                }
            }
            None => push(shaper.plain(link, &ends), None, None),
        }
    }

    if dangling > 0 {
        log::warn!(
            "{} links have an endpoint without a position and were skipped",
            dangling
        );
    }

    if degenerate > 0 {
        log::warn!("{} link curves were degenerate and skipped", degenerate);
    }

    curves
}
