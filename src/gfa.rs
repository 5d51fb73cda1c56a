//! Permissive decoder for GFA text.
//!
//! Both segment dialects are accepted: the tag-first one (`S name seq
//! tags...`, GFA1) and the length-prefixed one (`S name len seq
//! tags...`, GFA2). Lines that don't open with a supported record tag are
//! skipped, and short lines simply leave fields empty.

use std::sync::Arc;

use bstr::ByteSlice;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Int(i64),
    Str(String),
}

impl TagValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(v) => Some(*v),
            TagValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Int(_) => None,
            TagValue::Str(s) => Some(s),
        }
    }
}

pub type Tags = FxHashMap<String, TagValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Forward,
    Backward,
}

impl Orientation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Orientation::Forward),
            '-' => Some(Orientation::Backward),
            _ => None,
        }
    }

    pub fn parse(field: &str) -> Option<Self> {
        let mut chars = field.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Self::from_char(c)
    }

    pub fn as_char(&self) -> char {
        match self {
            Orientation::Forward => '+',
            Orientation::Backward => '-',
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A segment's sequence field. `*` means the sequence was left out of
/// the file, in which case the length can only come from a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sequence {
    Omitted,
    Bases(Arc<str>),
}

impl Sequence {
    fn parse(field: &str) -> Self {
        if field == "*" {
            Sequence::Omitted
        } else {
            Sequence::Bases(field.into())
        }
    }

    pub fn len(&self) -> Option<usize> {
        self.as_str().map(str::len)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Sequence::Omitted => None,
            Sequence::Bases(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub sequence: Option<Sequence>,
    pub length: Option<usize>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub strand1: Option<Orientation>,
    pub strand2: Option<Orientation>,
    pub cigar: Option<String>,
    pub tags: Tags,
}

impl Link {
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub name: String,
    /// Oriented segment references, verbatim (`"12+"`).
    pub steps: Vec<String>,
    pub rest: Vec<String>,
}

impl Path {
    pub fn step_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.steps
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub paths: Vec<Path>,
    pub header: Vec<Tags>,
}

impl Graph {
    pub fn with_record(mut self, record: Record) -> Self {
        match record {
            Record::Header(tags) => self.header.push(tags),
            Record::Segment(node) => self.nodes.push(node),
            Record::Edge(link) | Record::Link(link) => self.links.push(link),
            Record::Path(path) => self.paths.push(path),
        }
        self
    }
}

/// The record kinds the decoder understands. Fragments, groups and the
/// other GFA2 record types have no variant and are dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Header(Tags),
    Segment(Node),
    Edge(Link),
    Link(Link),
    Path(Path),
}

impl Record {
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut fields = line.split('\t');

        match fields.next()? {
            "H" => Some(Record::Header(parse_tags(fields))),
            "S" => parse_segment(fields).map(Record::Segment),
            "E" => Some(Record::Edge(parse_edge(fields))),
            "L" => Some(Record::Link(parse_link(fields))),
            "P" => parse_path(fields).map(Record::Path),
            _ => None,
        }
    }
}

/// Parses a single `name:type:value` field. Only the integer (`i`) and
/// string (`Z`) types are kept.
pub fn parse_tag(field: &str) -> Option<(String, TagValue)> {
    let mut parts = field.splitn(3, ':');

    let name = parts.next()?;
    let ty = parts.next()?;
    let value = parts.next()?;

    let value = match ty {
        "i" => TagValue::Int(value.parse().ok()?),
        "Z" => TagValue::Str(value.to_string()),
        _ => return None,
    };

    Some((name.to_string(), value))
}

fn parse_tags<'a>(fields: impl Iterator<Item = &'a str>) -> Tags {
    fields.filter_map(parse_tag).collect()
}

fn parse_length(field: &str) -> Option<usize> {
    field.parse::<usize>().ok().filter(|&len| len > 0)
}

fn parse_segment<'a>(
    mut fields: impl Iterator<Item = &'a str>,
) -> Option<Node> {
    let id = fields.next()?.to_string();

    let first = fields.next();

    let (sequence, length, tag_first) = match first.and_then(parse_length) {
        Some(len) => (fields.next().map(Sequence::parse), Some(len), false),
        None => {
            let sequence = first.map(Sequence::parse);
            let len = sequence.as_ref().and_then(Sequence::len);
            (sequence, len, true)
        }
    };

    let tags = parse_tags(fields);

    // LN is authoritative in the tag-first dialect
    let length = if tag_first {
        tags.get("LN")
            .and_then(TagValue::as_int)
            .and_then(|ln| usize::try_from(ln).ok())
            .or(length)
    } else {
        length
    };

    Some(Node {
        id,
        sequence,
        length,
        tags,
    })
}

fn split_oriented(field: &str) -> (String, Option<Orientation>) {
    match field.char_indices().next_back() {
        Some((ix, c)) => (field[..ix].to_string(), Orientation::from_char(c)),
        None => (String::new(), None),
    }
}

fn parse_edge<'a>(mut fields: impl Iterator<Item = &'a str>) -> Link {
    let _edge_id = fields.next();

    let (source, strand1) = split_oriented(fields.next().unwrap_or_default());
    let (target, strand2) = split_oriented(fields.next().unwrap_or_default());

    // skip the four alignment bounds
    let cigar = fields.nth(4).map(str::to_string);

    Link {
        source,
        target,
        strand1,
        strand2,
        cigar,
        tags: parse_tags(fields),
    }
}

fn parse_link<'a>(mut fields: impl Iterator<Item = &'a str>) -> Link {
    let source = fields.next().unwrap_or_default().to_string();
    let strand1 = fields.next().and_then(Orientation::parse);
    let target = fields.next().unwrap_or_default().to_string();
    let strand2 = fields.next().and_then(Orientation::parse);
    let cigar = fields.next().map(str::to_string);

    Link {
        source,
        target,
        strand1,
        strand2,
        cigar,
        tags: parse_tags(fields),
    }
}

fn parse_path<'a>(mut fields: impl Iterator<Item = &'a str>) -> Option<Path> {
    let name = fields.next()?.to_string();

    let steps = fields
        .next()
        .map(|list| {
            // empty steps are kept, they break the walk
            list.split(',').map(str::to_string).collect()
        })
        .unwrap_or_default();

    let rest = fields.map(str::to_string).collect();

    Some(Path { name, steps, rest })
}

pub fn decode(text: &str) -> Graph {
    let graph = text
        .split('\n')
        .filter_map(Record::parse_line)
        .fold(Graph::default(), Graph::with_record);

    log::debug!(
        "decoded {} segments, {} links, {} paths, {} header lines",
        graph.nodes.len(),
        graph.links.len(),
        graph.paths.len(),
        graph.header.len()
    );

    graph
}

pub fn decode_bytes(bytes: &[u8]) -> Graph {
    decode(&bytes.to_str_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefixed_segment() {
        let graph = decode("S\tA\t10\tACGTACGTAC\tRC:i:4\n");
        assert_eq!(graph.nodes.len(), 1);

        let node = &graph.nodes[0];
        assert_eq!(node.id, "A");
        assert_eq!(node.length, Some(10));
        assert_eq!(
            node.sequence.as_ref().and_then(Sequence::as_str),
            Some("ACGTACGTAC")
        );
        assert_eq!(node.tags.get("RC"), Some(&TagValue::Int(4)));
    }

    #[test]
    fn length_prefixed_ignores_ln() {
        let graph = decode("S\tA\t10\tACGTACGTAC\tLN:i:99\n");
        assert_eq!(graph.nodes[0].length, Some(10));
    }

    #[test]
    fn tag_first_segment_uses_sequence_length() {
        let graph = decode("S\t1\tACGTA\tXY:Z:hello\n");
        let node = &graph.nodes[0];
        assert_eq!(node.length, Some(5));
        assert_eq!(
            node.tags.get("XY"),
            Some(&TagValue::Str("hello".to_string()))
        );
    }

    #[test]
    fn tag_first_ln_overrides() {
        let graph = decode("S\t1\tACGTA\tLN:i:5000\n");
        assert_eq!(graph.nodes[0].length, Some(5000));

        let graph = decode("S\t1\t*\tLN:i:1234\n");
        let node = &graph.nodes[0];
        assert_eq!(node.sequence, Some(Sequence::Omitted));
        assert_eq!(node.length, Some(1234));
    }

    #[test]
    fn omitted_sequence_without_length() {
        let graph = decode("S\t1\t*\n");
        assert_eq!(graph.nodes[0].sequence, Some(Sequence::Omitted));
        assert_eq!(graph.nodes[0].length, None);
    }

    #[test]
    fn zero_is_not_a_length_prefix() {
        let graph = decode("S\tA\t0\n");
        let node = &graph.nodes[0];
        assert_eq!(
            node.sequence.as_ref().and_then(Sequence::as_str),
            Some("0")
        );
        assert_eq!(node.length, Some(1));
    }

    #[test]
    fn header_tags() {
        let graph = decode("H\tVN:Z:1.0\tXX:f:0.5\tNN:i:3\n");
        assert_eq!(graph.header.len(), 1);

        let header = &graph.header[0];
        assert_eq!(header.get("VN"), Some(&TagValue::Str("1.0".into())));
        assert_eq!(header.get("NN"), Some(&TagValue::Int(3)));
        // unknown tag types are dropped
        assert!(header.get("XX").is_none());
    }

    #[test]
    fn tag_parsing() {
        assert_eq!(
            parse_tag("UR:Z:http://x"),
            Some(("UR".to_string(), TagValue::Str("http://x".to_string())))
        );
        assert_eq!(parse_tag("LN:i:abc"), None);
        assert_eq!(parse_tag("LN"), None);
        assert_eq!(parse_tag("LN:B:1,2"), None);
    }

    #[test]
    fn classic_link() {
        let graph = decode("L\tA\t+\tB\t-\t4M\tRC:i:2\n");
        let link = &graph.links[0];
        assert_eq!(link.source, "A");
        assert_eq!(link.target, "B");
        assert_eq!(link.strand1, Some(Orientation::Forward));
        assert_eq!(link.strand2, Some(Orientation::Backward));
        assert_eq!(link.cigar.as_deref(), Some("4M"));
        assert_eq!(link.tags.get("RC"), Some(&TagValue::Int(2)));
    }

    #[test]
    fn edge_reads_each_side_orientation() {
        let graph =
            decode("E\te1\tutg1+\tutg2-\t10\t20$\t0\t10\t10M\tKC:i:7\n");
        let link = &graph.links[0];
        assert_eq!(link.source, "utg1");
        assert_eq!(link.target, "utg2");
        assert_eq!(link.strand1, Some(Orientation::Forward));
        assert_eq!(link.strand2, Some(Orientation::Backward));
        assert_eq!(link.cigar.as_deref(), Some("10M"));
        assert_eq!(link.tags.get("KC"), Some(&TagValue::Int(7)));
    }

    #[test]
    fn short_edge_line() {
        let graph = decode("E\te1\tutg1+\n");
        let link = &graph.links[0];
        assert_eq!(link.source, "utg1");
        assert_eq!(link.target, "");
        assert_eq!(link.strand2, None);
        assert_eq!(link.cigar, None);
    }

    #[test]
    fn path_record() {
        let graph = decode("P\tp1\tA+,B-,C+\t*\textra\n");
        let path = &graph.paths[0];
        assert_eq!(path.name, "p1");
        assert_eq!(path.steps, vec!["A+", "B-", "C+"]);
        assert_eq!(path.rest, vec!["*", "extra"]);

        let pairs = path.step_pairs().collect::<Vec<_>>();
        assert_eq!(pairs, vec![("A+", "B-"), ("B-", "C+")]);
    }

    #[test]
    fn empty_path_steps_are_kept() {
        let graph = decode("P\tp1\tA+,,B+\t*\n");
        let path = &graph.paths[0];
        assert_eq!(path.steps, vec!["A+", "", "B+"]);

        let pairs = path.step_pairs().collect::<Vec<_>>();
        assert_eq!(pairs, vec![("A+", ""), ("", "B+")]);
    }

    #[test]
    fn unsupported_and_blank_lines_are_ignored() {
        let text = "# comment\n\nF\ts1\tr1+\t0\t10\t0\t10\t*\n\
                    O\to1\tA+ B+\nU\tu1\tA B\nX\tjunk\nSA\tnot-a-segment\n";
        let graph = decode(text);
        assert_eq!(graph, Graph::default());
    }

    #[test]
    fn crlf_input() {
        let graph = decode("S\tA\t4\tACGT\r\nL\tA\t+\tA\t-\t*\r\n");
        let sequence = graph.nodes[0].sequence.as_ref();
        assert_eq!(sequence.and_then(Sequence::as_str), Some("ACGT"));
        assert_eq!(graph.links[0].cigar.as_deref(), Some("*"));
    }

    #[test]
    fn lossy_bytes() {
        let graph = decode_bytes(b"S\tA\t3\tAC\xffT\n");
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].length, Some(3));
    }

    #[test]
    fn scenario_two_segments() {
        let text = "H\tVN:Z:1.0\nS\tA\t10\tACGTACGTAC\nS\tB\t5\tACGTA\n\
                    L\tA\t+\tB\t+\t*\n";
        let graph = decode(text);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].length, Some(10));
        assert_eq!(graph.nodes[1].length, Some(5));
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.header.len(), 1);
    }
}
