use std::io::Write;

use anyhow::Result;
use nalgebra_glm as na;
use rgb::RGB8;

use crate::{
    chunk::RenderGraph,
    color::{PathPalette, LINK_GREY},
    config::Settings,
    gfa::Graph,
    layout::Positions,
    reconstruct::{build_polylines, shape_edges, ChainEnds, EdgeCurve, Jitter},
};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    /// Index into `Graph::nodes`.
    pub node: usize,
    pub color: RGB8,
    pub thickness: f32,
    pub points: Vec<na::Vec2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeShape {
    pub edge: EdgeCurve,
    pub color: RGB8,
    pub thickness: f32,
}

/// Everything a rendering surface needs to draw one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeShape>,
    pub edges: Vec<EdgeShape>,
}

impl Scene {
    pub fn build<J: Jitter + ?Sized>(
        graph: &Graph,
        render: &RenderGraph,
        positions: &Positions,
        settings: &Settings,
        jitter: &mut J,
    ) -> Self {
        let polylines = build_polylines(render, positions);
        let chain_ends = ChainEnds::from_polylines(&polylines);

        let edges = shape_edges(
            graph,
            render,
            positions,
            &chain_ends,
            &settings.edge,
            jitter,
        );

        let count = polylines.len();
        let nodes = polylines
            .into_iter()
            .enumerate()
            .map(|(ix, polyline)| NodeShape {
                node: polyline.node,
                color: settings.color_scheme.node_color(ix, count),
                thickness: settings.sequence_thickness,
                points: polyline.points,
            })
            .collect();

        let palette = PathPalette::from_paths(&graph.paths);
        let edges = edges
            .into_iter()
            .map(|edge| {
                let color = edge
                    .path
                    .as_deref()
                    .map(|name| palette.color(name))
                    .unwrap_or(LINK_GREY);
                EdgeShape {
                    edge,
                    color,
                    thickness: settings.link_thickness,
                }
            })
            .collect();

        Self { nodes, edges }
    }

    /// Writes every shape as an OBJ polyline, curves sampled at
    /// `samples` points each.
    pub fn write_obj<W: Write>(
        &self,
        mut out: W,
        samples: usize,
    ) -> Result<()> {
        let mut lines: Vec<std::ops::Range<usize>> = Vec::new();
        let mut vertex_count = 0;

        let shapes = self
            .nodes
            .iter()
            .map(|node| node.points.clone())
            .chain(self.edges.iter().map(|e| e.edge.curve.sample(samples)));

        for points in shapes {
            for v in points.iter() {
                writeln!(out, "v {} {} 0", v.x, v.y)?;
            }
            // .obj uses 1-based indices
            let start = vertex_count + 1;
            vertex_count += points.len();
            lines.push(start..vertex_count + 1);
        }

        for line in lines {
            write!(out, "l")?;
            for ix in line {
                write!(out, " {}", ix)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}
