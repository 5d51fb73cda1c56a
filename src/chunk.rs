//! Expands a decoded [`Graph`] into the node/link lists handed to the
//! layout engine.
//!
//! Every segment becomes a chain of sub-nodes, one per `chunk_size` bases,
//! so that a spring layout draws long segments as long flexible strands.
//! The links of the chain carry the segment's index (`link_num`) so the
//! strand can be regrouped into a single polyline after layout.

use anyhow::{ensure, Result};
use rustc_hash::FxHashMap;

use crate::gfa::{Graph, Link, Orientation, Path, Sequence};

/// Maps each consecutive pair of path steps to the names of the paths
/// walking it, in path declaration order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathSupport {
    edges: FxHashMap<String, Vec<String>>,
}

impl PathSupport {
    pub fn from_paths(paths: &[Path]) -> Self {
        let edges = paths
            .iter()
            .flat_map(|path| {
                path.step_pairs().map(move |(from, to)| {
                    (Self::step_key(from, to), path.name.as_str())
                })
            })
            .fold(
                FxHashMap::default(),
                |mut edges: FxHashMap<String, Vec<String>>, (key, name)| {
                    edges.entry(key).or_default().push(name.to_string());
                    edges
                },
            );

        Self { edges }
    }

    pub fn step_key(from: &str, to: &str) -> String {
        format!("{}_{}", from, to)
    }

    pub fn link_key(link: &Link) -> String {
        let strand = |o: Option<Orientation>| {
            o.map(|o| o.as_char().to_string()).unwrap_or_default()
        };

        format!(
            "{}{}_{}{}",
            link.source,
            strand(link.strand1),
            link.target,
            strand(link.strand2)
        )
    }

    pub fn paths_for(&self, key: &str) -> Option<&[String]> {
        self.edges.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubNodeKind {
    Start,
    Offset(usize),
    End,
}

impl SubNodeKind {
    pub fn id(&self, node_id: &str) -> String {
        match self {
            SubNodeKind::Start => format!("{}-start", node_id),
            SubNodeKind::Offset(offset) => format!("{}-{}", node_id, offset),
            SubNodeKind::End => format!("{}-end", node_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub id: String,
    /// Index of the originating segment in `Graph::nodes`.
    pub node: usize,
    pub kind: SubNodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Id of the segment this link is part of.
    pub id: String,
    pub link_num: usize,
    pub source: String,
    pub target: String,
    pub length: Option<usize>,
    pub sequence: Option<Sequence>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralLink {
    /// Index of the originating link in `Graph::links`.
    pub link: usize,
    pub source: String,
    pub target: String,
    pub strand1: Option<Orientation>,
    pub strand2: Option<Orientation>,
    pub cigar: Option<String>,
    pub is_loop: bool,
    /// `None` when no path walks this edge, never an empty list.
    pub paths: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderLink {
    Chain(ChainLink),
    Structural(StructuralLink),
}

impl RenderLink {
    pub fn source(&self) -> &str {
        match self {
            RenderLink::Chain(link) => &link.source,
            RenderLink::Structural(link) => &link.source,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            RenderLink::Chain(link) => &link.target,
            RenderLink::Structural(link) => &link.target,
        }
    }

    /// Only chain links carry an id.
    pub fn id(&self) -> Option<&str> {
        match self {
            RenderLink::Chain(link) => Some(&link.id),
            RenderLink::Structural(_) => None,
        }
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, RenderLink::Chain(_))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
}

impl RenderGraph {
    pub fn chain_links(&self) -> impl Iterator<Item = &ChainLink> + '_ {
        self.links.iter().filter_map(|link| match link {
            RenderLink::Chain(chain) => Some(chain),
            RenderLink::Structural(_) => None,
        })
    }

    pub fn structural_links(
        &self,
    ) -> impl Iterator<Item = &StructuralLink> + '_ {
        self.links.iter().filter_map(|link| match link {
            RenderLink::Structural(link) => Some(link),
            RenderLink::Chain(_) => None,
        })
    }
}

/// The sub-node kinds emitted for a segment of `length` bases: `start`,
/// one offset for each `k` in `1..=floor(length / chunk_size) - 2`, and
/// `end`.
pub fn chunk_kinds(
    length: usize,
    chunk_size: usize,
) -> impl Iterator<Item = SubNodeKind> {
    let interior_end = (length / chunk_size).saturating_sub(1);

    std::iter::once(SubNodeKind::Start)
        .chain(
            (1..interior_end).map(move |k| SubNodeKind::Offset(k * chunk_size)),
        )
        .chain(std::iter::once(SubNodeKind::End))
}

fn source_endpoint(id: &str, strand: Option<Orientation>) -> String {
    match strand {
        Some(Orientation::Forward) => SubNodeKind::End.id(id),
        _ => SubNodeKind::Start.id(id),
    }
}

fn target_endpoint(id: &str, strand: Option<Orientation>) -> String {
    match strand {
        Some(Orientation::Forward) => SubNodeKind::Start.id(id),
        _ => SubNodeKind::End.id(id),
    }
}

pub fn expand(graph: &Graph, chunk_size: usize) -> Result<RenderGraph> {
    ensure!(chunk_size > 0, "chunk size must be positive");

    let support = PathSupport::from_paths(&graph.paths);

    let mut nodes = Vec::new();
    let mut links = Vec::new();

    let mut skipped = 0;

    for (link_num, node) in graph.nodes.iter().enumerate() {
        let length = match node.length {
            Some(length) => length,
            None => {
                skipped += 1;
                continue;
            }
        };

        let chain = chunk_kinds(length, chunk_size)
            .map(|kind| RenderNode {
                id: kind.id(&node.id),
                node: link_num,
                kind,
            })
            .collect::<Vec<_>>();

        for pair in chain.windows(2) {
            links.push(RenderLink::Chain(ChainLink {
                id: node.id.clone(),
                link_num,
                source: pair[0].id.clone(),
                target: pair[1].id.clone(),
                length: node.length,
                sequence: node.sequence.clone(),
            }));
        }

        nodes.extend(chain);
    }

    if skipped > 0 {
        log::debug!("{} segments without a length were not expanded", skipped);
    }

    for (ix, link) in graph.links.iter().enumerate() {
        let paths = support
            .paths_for(&PathSupport::link_key(link))
            .filter(|paths| !paths.is_empty())
            .map(<[String]>::to_vec);

        links.push(RenderLink::Structural(StructuralLink {
            link: ix,
            source: source_endpoint(&link.source, link.strand1),
            target: target_endpoint(&link.target, link.strand2),
            strand1: link.strand1,
            strand2: link.strand2,
            cigar: link.cigar.clone(),
            is_loop: link.is_loop(),
            paths,
        }));
    }

    log::debug!(
        "expanded {} segments into {} sub-nodes and {} links",
        graph.nodes.len() - skipped,
        nodes.len(),
        links.len()
    );

    Ok(RenderGraph { nodes, links })
}
