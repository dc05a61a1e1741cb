//! Undirected weighted graph keyed by opaque vertex ids, with a per-vertex
//! degree cap and Dijkstra shortest-path search.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Default MaxDegree: the maximum neighbour count per vertex.
pub const DEFAULT_MAX_DEGREE: usize = 5;
/// Default MaxEdgeLen in metres.
pub const DEFAULT_MAX_EDGE_LEN: f64 = 2.5;

/// Opaque, non-reusable, monotonically-increasing vertex identifier.
pub type VertexId = u64;

#[derive(Debug, Default, Clone)]
struct Neighbours(Vec<(VertexId, f64)>);

/// An undirected weighted graph with a configurable degree cap and max
/// edge length, both enforced at admission time.
#[derive(Debug, Clone)]
pub struct Graph {
    adjacency: HashMap<VertexId, Neighbours>,
    max_degree: usize,
    max_edge_len: f64,
}

impl Graph {
    pub fn new(max_degree: usize, max_edge_len: f64) -> Self {
        Self {
            adjacency: HashMap::new(),
            max_degree,
            max_edge_len,
        }
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn max_edge_len(&self) -> f64 {
        self.max_edge_len
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.0.len()).sum::<usize>() / 2
    }

    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.adjacency.contains_key(&v)
    }

    /// Insert `v` with an empty neighbour set; idempotent if already present.
    pub fn add_vertex(&mut self, v: VertexId) {
        self.adjacency.entry(v).or_default();
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.adjacency.get(&v).map(|n| n.0.len()).unwrap_or(0)
    }

    fn is_neighbour(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency
            .get(&u)
            .map(|n| n.0.iter().any(|(id, _)| *id == v))
            .unwrap_or(false)
    }

    /// Insert a symmetric edge `u <-> v` at weight `w`. Refuses (returns
    /// `false`) if `u == v`, `w <= 0`, `w > max_edge_len`, either endpoint is
    /// already at capacity, or the edge already exists.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId, w: f64) -> bool {
        if u == v || w <= 0.0 || w > self.max_edge_len {
            return false;
        }
        if self.degree(u) >= self.max_degree || self.degree(v) >= self.max_degree {
            return false;
        }
        if self.is_neighbour(u, v) {
            return false;
        }

        self.add_vertex(u);
        self.add_vertex(v);
        self.adjacency.get_mut(&u).unwrap().0.push((v, w));
        self.adjacency.get_mut(&v).unwrap().0.push((u, w));
        true
    }

    pub fn neighbours(&self, v: VertexId) -> &[(VertexId, f64)] {
        self.adjacency
            .get(&v)
            .map(|n| n.0.as_slice())
            .unwrap_or(&[])
    }

    /// Snapshot of every edge `(u, v, weight)`, each undirected edge once,
    /// for overlay construction. An iterator rather than a cloned map so
    /// overlay composition doesn't copy the graph.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId, f64)> + '_ {
        self.adjacency.iter().flat_map(|(&u, neighbours)| {
            neighbours
                .0
                .iter()
                .filter(move |(v, _)| u < *v)
                .map(move |&(v, w)| (u, v, w))
        })
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Dijkstra shortest path from `src` to `dst`. Returns an empty sequence
    /// when unreachable. Ties in the priority queue are broken by smaller
    /// `VertexId` so results are deterministic for a fixed graph.
    pub fn shortest_path(&self, src: VertexId, dst: VertexId) -> Vec<VertexId> {
        if !self.adjacency.contains_key(&src) || !self.adjacency.contains_key(&dst) {
            return Vec::new();
        }
        if src == dst {
            return vec![src];
        }

        let mut dist: HashMap<VertexId, f64> = HashMap::new();
        let mut prev: HashMap<VertexId, VertexId> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(src, 0.0);
        heap.push(HeapEntry {
            cost: 0.0,
            vertex: src,
        });

        while let Some(HeapEntry { cost, vertex }) = heap.pop() {
            if vertex == dst {
                break;
            }
            if cost > *dist.get(&vertex).unwrap_or(&f64::INFINITY) {
                continue;
            }
            for &(next, weight) in self.neighbours(vertex) {
                let candidate = cost + weight;
                let better = candidate < *dist.get(&next).unwrap_or(&f64::INFINITY);
                if better {
                    dist.insert(next, candidate);
                    prev.insert(next, vertex);
                    heap.push(HeapEntry {
                        cost: candidate,
                        vertex: next,
                    });
                }
            }
        }

        if !dist.contains_key(&dst) {
            return Vec::new();
        }

        let mut path = vec![dst];
        let mut current = dst;
        while let Some(&p) = prev.get(&current) {
            path.push(p);
            current = p;
        }
        path.reverse();
        path
    }
}

/// Min-heap entry ordered by ascending cost, tie-broken by ascending
/// `VertexId` for deterministic output on graphs with equal-weight paths.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    cost: f64,
    vertex: VertexId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_edge_is_symmetric() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        assert!(g.add_edge(1, 2, 1.5));
        assert_eq!(g.neighbours(1), &[(2, 1.5)]);
        assert_eq!(g.neighbours(2), &[(1, 1.5)]);
    }

    #[test]
    fn rejects_self_edge() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        assert!(!g.add_edge(1, 1, 1.0));
    }

    #[test]
    fn rejects_non_positive_weight() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        assert!(!g.add_edge(1, 2, 0.0));
        assert!(!g.add_edge(1, 2, -1.0));
    }

    #[test]
    fn rejects_edge_over_max_len() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, 2.5);
        assert!(!g.add_edge(1, 2, 3.0));
    }

    #[test]
    fn rejects_duplicate_edge() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        assert!(g.add_edge(1, 2, 1.0));
        assert!(!g.add_edge(1, 2, 1.0));
    }

    #[test]
    fn degree_cap_is_enforced() {
        let mut g = Graph::new(2, DEFAULT_MAX_EDGE_LEN);
        assert!(g.add_edge(0, 1, 1.0));
        assert!(g.add_edge(0, 2, 1.0));
        assert!(!g.add_edge(0, 3, 1.0)); // vertex 0 is at capacity
        assert_eq!(g.degree(0), 2);
    }

    #[test]
    fn shortest_path_of_vertex_to_itself_has_no_self_loop() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        g.add_vertex(1);
        assert_eq!(g.shortest_path(1, 1), vec![1]);
    }

    #[test]
    fn shortest_path_unreachable_is_empty() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        g.add_vertex(1);
        g.add_vertex(2);
        assert!(g.shortest_path(1, 2).is_empty());
    }

    #[test]
    fn shortest_path_picks_lower_cost_route() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        g.add_edge(1, 2, 2.0);
        g.add_edge(1, 3, 1.0);
        g.add_edge(3, 2, 1.0);
        assert_eq!(g.shortest_path(1, 2), vec![1, 3, 2]);
    }

    #[test]
    fn edges_iterator_yields_each_undirected_edge_once() {
        let mut g = Graph::new(DEFAULT_MAX_DEGREE, DEFAULT_MAX_EDGE_LEN);
        g.add_edge(1, 2, 1.0);
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges.len(), 1);
    }
}
