use std::f32::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use nalgebra_glm as na;
use rustc_hash::FxHashMap;

use crate::chunk::RenderGraph;

/// Final 2D coordinates of the sub-nodes of a [`RenderGraph`], keyed by
/// sub-node id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Positions {
    coords: FxHashMap<String, na::Vec2>,
}

impl Positions {
    pub fn insert(&mut self, id: impl Into<String>, pos: na::Vec2) {
        self.coords.insert(id.into(), pos);
    }

    /// Returns `None` both for unknown ids and for coordinates that
    /// aren't finite.
    pub fn get(&self, id: &str) -> Option<na::Vec2> {
        let pos = self.coords.get(id)?;
        if pos.x.is_finite() && pos.y.is_finite() {
            Some(*pos)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, na::Vec2)> for Positions {
    fn from_iter<T: IntoIterator<Item = (S, na::Vec2)>>(iter: T) -> Self {
        let coords = iter
            .into_iter()
            .map(|(id, pos)| (id.into(), pos))
            .collect();
        Self { coords }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Many-body strength; negative values repel.
    pub strength: f32,
    /// Link rigidity, as a number of constraint passes per tick.
    pub link_steps: usize,
    /// Barnes-Hut approximation quality.
    pub theta: f32,
    pub iterations: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            strength: -50.0,
            link_steps: 3,
            theta: 0.9,
            iterations: 300,
        }
    }
}

/// Assigns a position to every node of a [`RenderGraph`].
pub trait LayoutEngine {
    fn layout(&mut self, graph: &RenderGraph, params: &LayoutParams)
        -> Positions;
}

/// Hands out a precomputed set of positions.
#[derive(Debug, Default, Clone)]
pub struct FixedLayout {
    positions: Positions,
}

impl FixedLayout {
    pub fn new(positions: Positions) -> Self {
        Self { positions }
    }
}

impl LayoutEngine for FixedLayout {
    fn layout(
        &mut self,
        _graph: &RenderGraph,
        _params: &LayoutParams,
    ) -> Positions {
        self.positions.clone()
    }
}

const CHARGE_SCALE: f32 = 3.0;
const SPRING: f32 = 0.05;
const TICK: f32 = 0.035;

/// Layout backed by the `force_graph` spring simulation.
///
/// The simulation computes exact pairwise forces, so `theta` has no
/// effect on this backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForceLayout;

impl ForceLayout {
    fn parameters(params: &LayoutParams) -> SimulationParameters {
        SimulationParameters {
            force_charge: (-params.strength).max(0.0) * CHARGE_SCALE,
            force_spring: SPRING * params.link_steps.max(1) as f32,
            force_max: 100.0,
            node_speed: 3000.0,
            damping_factor: 0.9,
        }
    }
}

impl LayoutEngine for ForceLayout {
    fn layout(
        &mut self,
        graph: &RenderGraph,
        params: &LayoutParams,
    ) -> Positions {
        let mut sim: ForceGraph<usize, ()> =
            ForceGraph::new(Self::parameters(params));

        let n = graph.nodes.len();
        let radius = 10.0 * (n as f32).sqrt().max(1.0);

        let mut indices = FxHashMap::default();

        for (i, node) in graph.nodes.iter().enumerate() {
            let angle = (i as f32) * 2.0 * PI / n as f32;
            let idx = sim.add_node(NodeData {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
                mass: 10.0,
                is_anchor: false,
                user_data: i,
            });
            indices.insert(node.id.as_str(), idx);
        }

        let mut dangling = 0;
        for link in graph.links.iter() {
            match (indices.get(link.source()), indices.get(link.target())) {
                // a self loop exerts no spring force
                (Some(&s), Some(&t)) if s == t => {}
                (Some(&s), Some(&t)) => {
                    sim.add_edge(s, t, EdgeData::default());
                }
                _ => dangling += 1,
            }
        }

        if dangling > 0 {
            log::warn!(
                "{} links reference unknown nodes and were left out of \
                 the layout",
                dangling
            );
        }

        for _ in 0..params.iterations {
            sim.update(TICK);
        }

        let mut positions = Positions::default();
        sim.visit_nodes(|node| {
            let id = graph.nodes[node.data.user_data].id.clone();
            positions.insert(id, na::vec2(node.x(), node.y()));
        });

        log::debug!(
            "laid out {} nodes in {} iterations",
            positions.len(),
            params.iterations
        );

        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chunk::expand, gfa::decode};

    #[test]
    fn non_finite_positions_are_hidden() {
        let positions = vec![
            ("a", na::vec2(1.0, 2.0)),
            ("b", na::vec2(f32::NAN, 0.0)),
            ("c", na::vec2(0.0, f32::INFINITY)),
        ]
        .into_iter()
        .collect::<Positions>();

        assert_eq!(positions.len(), 3);
        assert_eq!(positions.get("a"), Some(na::vec2(1.0, 2.0)));
        assert_eq!(positions.get("b"), None);
        assert_eq!(positions.get("c"), None);
        assert_eq!(positions.get("d"), None);
    }

    #[test]
    fn force_layout_places_every_node() {
        let graph = decode(
            "S\tA\t5000\t*\nS\tB\t3000\t*\nL\tA\t+\tB\t+\t*\n\
             L\tA\t+\tC\t+\t*\n",
        );
        let render = expand(&graph, 1000).unwrap();

        let params = LayoutParams {
            iterations: 20,
            ..LayoutParams::default()
        };
        let positions = ForceLayout.layout(&render, &params);

        assert_eq!(positions.len(), render.nodes.len());
        for node in render.nodes.iter() {
            assert!(positions.get(&node.id).is_some(), "{}", node.id);
        }
    }

    #[test]
    fn fixed_layout_returns_its_positions() {
        let positions =
            vec![("A-start", na::vec2(0.0, 0.0))].into_iter().collect();
        let mut engine = FixedLayout::new(positions);

        let out =
            engine.layout(&RenderGraph::default(), &LayoutParams::default());
        assert_eq!(out.get("A-start"), Some(na::vec2(0.0, 0.0)));
    }
}
