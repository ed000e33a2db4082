//! Closest-edge detection for drop targets

use crate::types::DropData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Payload key the detected edge is stored under
pub const CLOSEST_EDGE_KEY: &str = "closestEdge";

/// A side of a drop target's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse one of the four edge literals
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| edge.as_str() == value)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layout direction of a sortable container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    /// The edge pair that makes sense for this axis
    pub fn allowed_edges(self) -> &'static [Edge] {
        match self {
            Self::Vertical => &[Edge::Top, Edge::Bottom],
            Self::Horizontal => &[Edge::Left, Edge::Right],
        }
    }

    /// Edge meaning "insert before the target"
    pub fn before_edge(self) -> Edge {
        match self {
            Self::Vertical => Edge::Top,
            Self::Horizontal => Edge::Left,
        }
    }

    /// Edge meaning "insert after the target"
    pub fn after_edge(self) -> Edge {
        match self {
            Self::Vertical => Edge::Bottom,
            Self::Horizontal => Edge::Right,
        }
    }
}

/// Pointer coordinates in the same space as [`Rect`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a drop target element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Build from an origin and a size
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(top, top + height, left, left + width)
    }

    fn distance_to(&self, edge: Edge, pointer: Point) -> f64 {
        match edge {
            Edge::Top => (pointer.y - self.top).abs(),
            Edge::Bottom => (pointer.y - self.bottom).abs(),
            Edge::Left => (pointer.x - self.left).abs(),
            Edge::Right => (pointer.x - self.right).abs(),
        }
    }
}

/// Pointer, target bounds and the edges the target accepts
#[derive(Debug, Clone, Copy)]
pub struct EdgeInput<'a> {
    pub pointer: Point,
    pub bounds: Rect,
    pub allowed_edges: &'a [Edge],
}

/// The allowed edge nearest to the pointer. On a tie the edge listed first
/// wins; with no allowed edges there is no answer.
pub fn closest_edge(input: &EdgeInput<'_>) -> Option<Edge> {
    let mut closest = None;
    let mut min_distance = f64::INFINITY;

    for &edge in input.allowed_edges {
        let distance = input.bounds.distance_to(edge, input.pointer);
        if distance < min_distance {
            min_distance = distance;
            closest = Some(edge);
        }
    }

    closest
}

/// Return `data` with its edge replaced by the one nearest the pointer
pub fn attach_closest_edge(data: DropData, input: &EdgeInput<'_>) -> DropData {
    data.with_edge(closest_edge(input))
}

/// Read the edge back out of an untyped payload.
///
/// Anything other than one of the four literals reads as no edge.
pub fn extract_closest_edge(payload: &Value) -> Option<Edge> {
    payload
        .get(CLOSEST_EDGE_KEY)
        .and_then(Value::as_str)
        .and_then(Edge::parse)
}
