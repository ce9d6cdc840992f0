//! 2D layouts for the trade graph.
//!
//! Every layout is a pure function of the graph's topology (plus a seed
//! for the spring layout), so identical input always yields identical
//! positions. Spring and Kamada-Kawai results are centered on their mean
//! and scaled so the largest absolute coordinate is 1.

use crate::graph::{NodeId, TradeGraph};
use petgraph::algo::dijkstra;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;

/// Seed used for the spring layout when none is configured.
pub const DEFAULT_SEED: u64 = 42;

const SPRING_ITERATIONS: usize = 50;
const SPRING_THRESHOLD: f64 = 1e-4;
const MIN_DISTANCE: f64 = 0.01;

const KK_EPSILON: f64 = 1e-4;
const KK_MAX_ROUNDS: usize = 500;
const KK_MAX_NEWTON_STEPS: usize = 50;

/// A point in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the origin.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Node positions keyed by country name.
pub type Layout = HashMap<String, Position>;

/// Available layout algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// Force-directed (Fruchterman-Reingold) with a fixed seed.
    #[default]
    Spring,
    /// Evenly spaced on the unit circle.
    Circular,
    /// Stress minimization over shortest-path distances.
    KamadaKawai,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [Self::Spring, Self::Circular, Self::KamadaKawai];

    /// Canonical identifier, as accepted by `from_str`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Circular => "circular",
            Self::KamadaKawai => "kamada-kawai",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spring => "Spring Layout",
            Self::Circular => "Circular Layout",
            Self::KamadaKawai => "Kamada-Kawai Layout",
        }
    }
}

impl std::fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised for an unrecognized layout name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown layout '{0}' (expected spring, circular or kamada-kawai)")]
pub struct ParseLayoutError(pub String);

impl FromStr for LayoutKind {
    type Err = ParseLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "spring" | "force" | "force-directed" => Ok(Self::Spring),
            "circular" | "circle" => Ok(Self::Circular),
            "kamada-kawai" | "kk" | "stress" => Ok(Self::KamadaKawai),
            _ => Err(ParseLayoutError(s.to_string())),
        }
    }
}

/// Computes node positions for `graph`.
///
/// `seed` only affects the spring layout. A single node sits at the
/// origin for every kind.
pub fn layout(graph: &TradeGraph, kind: LayoutKind, seed: u64) -> Layout {
    let indexes: Vec<NodeId> = graph.node_indexes().collect();

    let points = match indexes.len() {
        0 => Vec::new(),
        1 => vec![Position::default()],
        _ => match kind {
            LayoutKind::Spring => spring(graph, &indexes, seed),
            LayoutKind::Circular => circular(indexes.len()),
            LayoutKind::KamadaKawai => kamada_kawai(graph, &indexes),
        },
    };

    indexes
        .iter()
        .zip(points)
        .filter_map(|(idx, pos)| graph.get(*idx).map(|node| (node.name.clone(), pos)))
        .collect()
}

/// Places `n` points counter-clockwise on the unit circle, first at angle 0.
fn circular(n: usize) -> Vec<Position> {
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / n as f64;
            Position::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Adjacency as a dense boolean matrix over `indexes`.
fn adjacency(graph: &TradeGraph, indexes: &[NodeId]) -> Vec<Vec<bool>> {
    indexes
        .iter()
        .map(|&a| indexes.iter().map(|&b| a != b && graph.is_adjacent(a, b)).collect())
        .collect()
}

fn spring(graph: &TradeGraph, indexes: &[NodeId], seed: u64) -> Vec<Position> {
    let n = indexes.len();
    let adjacent = adjacency(graph, indexes);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut pos: Vec<Position> = (0..n)
        .map(|_| Position::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();

    // Optimal pairwise distance for a unit area.
    let k = (1.0 / n as f64).sqrt();

    let extent = |axis: fn(&Position) -> f64| {
        let (lo, hi) = pos
            .iter()
            .map(axis)
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        hi - lo
    };
    let mut temperature = extent(|p| p.x).max(extent(|p| p.y)) * 0.1;
    let cooling = temperature / (SPRING_ITERATIONS as f64 + 1.0);

    for _ in 0..SPRING_ITERATIONS {
        let mut displacement = vec![Position::default(); n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let distance = dx.hypot(dy).max(MIN_DISTANCE);
                let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                let force = k * k / (distance * distance) - attraction;
                displacement[i].x += dx * force;
                displacement[i].y += dy * force;
            }
        }

        let mut moved = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let mut length = d.norm();
            if length < MIN_DISTANCE {
                length = 0.1;
            }
            let step = Position::new(d.x * temperature / length, d.y * temperature / length);
            p.x += step.x;
            p.y += step.y;
            moved += step.norm();
        }

        temperature -= cooling;
        if moved / (n as f64) < SPRING_THRESHOLD {
            break;
        }
    }

    rescale(pos)
}

/// Hop-count distances between every pair of nodes.
///
/// Unreachable pairs get one more than the longest finite distance.
fn hop_distances(graph: &TradeGraph, indexes: &[NodeId]) -> Vec<Vec<f64>> {
    let mut dist: Vec<Vec<Option<usize>>> = indexes
        .iter()
        .map(|&from| {
            let reached = dijkstra(&graph.graph, from, None, |_| 1usize);
            indexes.iter().map(|to| reached.get(to).copied()).collect()
        })
        .collect();

    let longest = dist.iter().flatten().flatten().copied().max().unwrap_or(0);
    for row in dist.iter_mut() {
        for d in row.iter_mut() {
            d.get_or_insert(longest + 1);
        }
    }

    dist.into_iter()
        .map(|row| row.into_iter().map(|d| d.unwrap_or(0) as f64).collect())
        .collect()
}

/// First and second partial derivatives of the stress energy at node `m`.
struct Gradient {
    ex: f64,
    ey: f64,
    exx: f64,
    eyy: f64,
    exy: f64,
}

impl Gradient {
    fn at(m: usize, pos: &[Position], dist: &[Vec<f64>]) -> Self {
        let mut g = Gradient {
            ex: 0.0,
            ey: 0.0,
            exx: 0.0,
            eyy: 0.0,
            exy: 0.0,
        };

        for (i, p) in pos.iter().enumerate() {
            let d = dist[m][i];
            if i == m || d <= 0.0 {
                continue;
            }
            let dx = pos[m].x - p.x;
            let dy = pos[m].y - p.y;
            let r = dx.hypot(dy);
            if r < 1e-9 {
                continue;
            }
            // Spring strength 1/d² with ideal length d.
            let strength = 1.0 / (d * d);
            let r3 = r * r * r;
            g.ex += strength * (dx - d * dx / r);
            g.ey += strength * (dy - d * dy / r);
            g.exx += strength * (1.0 - d * dy * dy / r3);
            g.eyy += strength * (1.0 - d * dx * dx / r3);
            g.exy += strength * (d * dx * dy / r3);
        }

        g
    }

    fn magnitude(&self) -> f64 {
        self.ex.hypot(self.ey)
    }
}

fn kamada_kawai(graph: &TradeGraph, indexes: &[NodeId]) -> Vec<Position> {
    let n = indexes.len();
    let dist = hop_distances(graph, indexes);
    let start = circular(n);
    let mut pos = start.clone();

    for _ in 0..KK_MAX_ROUNDS {
        let worst = (0..n)
            .map(|m| (m, Gradient::at(m, &pos, &dist).magnitude()))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let m = match worst {
            Some((m, delta)) if delta >= KK_EPSILON => m,
            _ => break,
        };

        for _ in 0..KK_MAX_NEWTON_STEPS {
            let g = Gradient::at(m, &pos, &dist);
            if g.magnitude() < KK_EPSILON {
                break;
            }
            let det = g.exx * g.eyy - g.exy * g.exy;
            if det.abs() < 1e-12 {
                break;
            }
            pos[m].x += (-g.ex * g.eyy + g.ey * g.exy) / det;
            pos[m].y += (-g.ey * g.exx + g.ex * g.exy) / det;
        }
    }

    if pos.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return start;
    }

    rescale(pos)
}

/// Centers points on their mean and scales the largest coordinate to 1.
fn rescale(mut pos: Vec<Position>) -> Vec<Position> {
    if pos.is_empty() {
        return pos;
    }

    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p.y).sum::<f64>() / n;

    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        p.x -= mean_x;
        p.y -= mean_y;
        limit = limit.max(p.x.abs()).max(p.y.abs());
    }

    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.x /= limit;
            p.y /= limit;
        }
    }

    pos
}
