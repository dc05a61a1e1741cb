//! The LD-PRM roadmap: a bijective vertex↔world-ordinate table layered over
//! a [`Graph`], plus the incremental build, query, and optimisation
//! algorithms and overlay composition.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::PlannerConfig;
use crate::messages::WorldOrd;

use super::grid::Grid;
use super::{Graph, VertexId};

/// Holds the roadmap's connectivity graph plus the vertex↔world-ordinate
/// bijection and the construction parameters used while growing it.
pub struct Roadmap {
    graph: Graph,
    network: Vec<(VertexId, WorldOrd)>,
    reference: WorldOrd,
    map_size_m: f64,
    robot_diameter_m: f64,
    max_samples: usize,
    dispersion_radius: f64,
    next_vertex_id: VertexId,
    rng: ChaCha8Rng,
}

/// Outcome of a single `build()` call, used for logging and for the outer
/// retry loop in `PlannerLoop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Start/goal mapped directly onto an already-connected pair.
    DirectHit,
    /// Re-attaching start/goal to the existing roadmap found a route.
    ReattachHit,
    /// A route was found after sampling `n` additional vertices.
    SampledHit(usize),
    /// Either endpoint was not in free space; no search was attempted.
    GoalInaccessible,
    /// The sampling loop exhausted its budget without finding a route.
    Exhausted,
    /// Cooperative shutdown was observed mid-sample.
    ShutdownRequested,
}

impl Roadmap {
    pub fn new(config: &PlannerConfig, reference: WorldOrd) -> Self {
        let rng = match config.sample_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            graph: Graph::new(config.density, config.max_edge_len),
            network: Vec::new(),
            reference,
            map_size_m: config.map_size,
            robot_diameter_m: config.robot_diameter,
            max_samples: config.max_samples,
            dispersion_radius: config.dispersion_radius(),
            next_vertex_id: 0,
            rng,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn vertex_count(&self) -> usize {
        self.network.len()
    }

    pub fn set_reference(&mut self, reference: WorldOrd) {
        self.reference = reference;
    }

    fn ordinate_of(&self, v: VertexId) -> Option<WorldOrd> {
        self.network
            .iter()
            .find(|(id, _)| *id == v)
            .map(|(_, p)| *p)
    }

    fn vertex_at(&self, p: WorldOrd) -> Option<VertexId> {
        self.network
            .iter()
            .find(|(_, q)| q.x == p.x && q.y == p.y)
            .map(|(id, _)| *id)
    }

    /// If an existing vertex has ordinate equal to `p`, return it; else
    /// allocate a fresh [`VertexId`] and add it to both the graph and the
    /// network. Used for start and goal only — bypasses dispersion (R2).
    pub fn find_or_add(&mut self, p: WorldOrd) -> VertexId {
        if let Some(v) = self.vertex_at(p) {
            return v;
        }
        let v = self.next_vertex_id;
        self.next_vertex_id += 1;
        self.graph.add_vertex(v);
        self.network.push((v, p));
        v
    }

    /// True iff any existing vertex lies at Euclidean distance `< r` from `p`.
    pub fn violates_dispersion(&self, p: WorldOrd, r: f64) -> bool {
        self.network.iter().any(|(_, q)| q.distance(&p) < r)
    }

    /// For every other vertex `u` in the roadmap, connect `v` to `u` if they
    /// are within `MaxEdgeLen`, `v` has spare degree, and the straight-line
    /// segment between them is collision-free in `grid`. O(N) in roadmap
    /// size, acceptable because `MaxSamples` bounds roadmap growth.
    pub fn connect_to_existing(&mut self, v: VertexId, grid: &Grid) {
        let Some(v_ord) = self.ordinate_of(v) else {
            return;
        };
        let v_cell = grid.world_to_cell(v_ord);

        let mut candidates: Vec<(VertexId, WorldOrd)> = self
            .network
            .iter()
            .filter(|(id, _)| *id != v)
            .copied()
            .collect();
        candidates.sort_by_key(|(id, _)| *id);

        let max_edge_len = self.graph.max_edge_len();

        for (u, u_ord) in candidates {
            if self.graph.degree(v) >= self.graph.max_degree() {
                break;
            }
            let dist = v_ord.distance(&u_ord);
            if dist > max_edge_len {
                continue;
            }
            let u_cell = grid.world_to_cell(u_ord);
            if grid.can_connect(v_cell, u_cell) {
                self.graph.add_edge(v, u, dist);
            }
        }
    }

    fn translate(&self, path: &[VertexId]) -> Vec<WorldOrd> {
        path.iter()
            .filter_map(|&v| self.ordinate_of(v))
            .collect()
    }

    /// Run the full LD-PRM build algorithm (spec §4.3.2): direct hit,
    /// re-attach, then bounded random sampling with dispersion rejection.
    /// `shutdown` is polled at the top of every sampling iteration so a
    /// long-running build can be cancelled cooperatively.
    pub fn build(
        &mut self,
        grid: &Grid,
        start: WorldOrd,
        goal: WorldOrd,
        shutdown: &dyn Fn() -> bool,
    ) -> (Vec<WorldOrd>, BuildOutcome) {
        let mut cspace = grid.clone();
        cspace.expand_cspace(self.robot_diameter_m);

        let start_cell = cspace.world_to_cell(start);
        let goal_cell = cspace.world_to_cell(goal);
        if !cspace.is_free(start_cell) || !cspace.is_free(goal_cell) {
            log::info!("build: start or goal not in free space, returning empty path");
            return (Vec::new(), BuildOutcome::GoalInaccessible);
        }

        let v_s = self.find_or_add(start);
        let v_g = self.find_or_add(goal);

        let path = self.graph.shortest_path(v_s, v_g);
        if !path.is_empty() {
            log::info!(
                "build: direct hit (vertices={}, edges={})",
                self.graph.vertex_count(),
                self.graph.edge_count()
            );
            let world_path = self.optimise_path(&cspace, &self.translate(&path));
            return (world_path, BuildOutcome::DirectHit);
        }

        self.connect_to_existing(v_s, &cspace);
        self.connect_to_existing(v_g, &cspace);
        let path = self.graph.shortest_path(v_s, v_g);
        if !path.is_empty() {
            log::info!(
                "build: re-attach hit (vertices={}, edges={})",
                self.graph.vertex_count(),
                self.graph.edge_count()
            );
            let world_path = self.optimise_path(&cspace, &self.translate(&path));
            return (world_path, BuildOutcome::ReattachHit);
        }

        let half = self.map_size_m / 2.0;
        for sampled in 0..self.max_samples {
            if shutdown() {
                log::info!("build: shutdown observed mid-sample");
                return (Vec::new(), BuildOutcome::ShutdownRequested);
            }

            let x = self.rng.gen_range((self.reference.x - half)..(self.reference.x + half));
            let y = self.rng.gen_range((self.reference.y - half)..(self.reference.y + half));
            let p = WorldOrd::new(x, y).rounded();

            let cell = cspace.world_to_cell(p);
            if !cspace.is_free(cell) {
                continue;
            }
            if self.violates_dispersion(p, self.dispersion_radius) {
                continue;
            }

            let v = self.find_or_add(p);
            self.connect_to_existing(v, &cspace);

            let path = self.graph.shortest_path(v_s, v_g);
            if !path.is_empty() {
                log::info!(
                    "build: sampled hit after {} samples (vertices={}, edges={})",
                    sampled + 1,
                    self.graph.vertex_count(),
                    self.graph.edge_count()
                );
                let world_path = self.optimise_path(&cspace, &self.translate(&path));
                return (world_path, BuildOutcome::SampledHit(sampled + 1));
            }
        }

        log::info!(
            "build: exhausted {} samples without a path (vertices={}, edges={})",
            self.max_samples,
            self.graph.vertex_count(),
            self.graph.edge_count()
        );
        (Vec::new(), BuildOutcome::Exhausted)
    }

    /// Shortcut `path` by repeatedly jumping to the farthest ahead point
    /// still in line-of-sight. Preserves endpoints; output length in
    /// segments is `<=` input length.
    pub fn optimise_path(&self, grid: &Grid, path: &[WorldOrd]) -> Vec<WorldOrd> {
        if path.is_empty() {
            return Vec::new();
        }

        let mut result = vec![path[0]];
        let mut i = 0;
        let n = path.len() - 1;

        while i < n {
            let mut furthest = i + 1;
            for j in (i + 1..=n).rev() {
                let a = grid.world_to_cell(path[i]);
                let b = grid.world_to_cell(path[j]);
                if grid.can_connect(a, b) {
                    furthest = j;
                    break;
                }
            }
            result.push(path[furthest]);
            i = furthest;
        }

        result
    }

    /// Compose a BGR overlay the same size as `grid`: roadmap edges in blue,
    /// an optional path in thicker red, isolated vertices as single-pixel
    /// markers.
    pub fn overlay(&self, grid: &Grid, path: Option<&[WorldOrd]>) -> crate::overlay::Overlay {
        crate::overlay::compose(self, grid, path)
    }

    pub(crate) fn network(&self) -> &[(VertexId, WorldOrd)] {
        &self.network
    }

    /// Every vertex ordinate currently in the roadmap, in insertion order.
    pub fn network_ordinates(&self) -> Vec<WorldOrd> {
        self.network.iter().map(|(_, p)| *p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Cell;

    fn cfg() -> PlannerConfig {
        let mut c = PlannerConfig::default();
        c.sample_seed = Some(42);
        c
    }

    #[test]
    fn find_or_add_is_idempotent_for_equal_ordinate() {
        let mut rm = Roadmap::new(&cfg(), WorldOrd::new(0.0, 0.0));
        let a = rm.find_or_add(WorldOrd::new(1.0, 1.0));
        let b = rm.find_or_add(WorldOrd::new(1.0, 1.0));
        assert_eq!(a, b);
        assert_eq!(rm.vertex_count(), 1);
    }

    #[test]
    fn dispersion_rejects_nearby_samples() {
        let mut rm = Roadmap::new(&cfg(), WorldOrd::new(0.0, 0.0));
        rm.find_or_add(WorldOrd::new(0.0, 0.0));
        assert!(rm.violates_dispersion(WorldOrd::new(0.05, 0.0), 0.4));
        assert!(!rm.violates_dispersion(WorldOrd::new(5.0, 5.0), 0.4));
    }

    #[test]
    fn build_direct_line_of_sight() {
        let grid = Grid::all_free(40, 40, 0.1, WorldOrd::new(0.0, 0.0));
        let mut rm = Roadmap::new(&cfg(), WorldOrd::new(0.0, 0.0));
        let (path, outcome) = rm.build(&grid, WorldOrd::new(0.0, 0.0), WorldOrd::new(1.0, 1.0), &|| false);
        assert_eq!(outcome, BuildOutcome::DirectHit);
        assert_eq!(path.first().copied(), Some(WorldOrd::new(0.0, 0.0)));
        assert_eq!(path.last().copied(), Some(WorldOrd::new(1.0, 1.0)));
        assert!(path.len() <= 2);
    }

    #[test]
    fn build_returns_empty_when_goal_in_obstacle() {
        let mut grid = Grid::all_free(40, 40, 0.1, WorldOrd::new(0.0, 0.0));
        let goal = WorldOrd::new(1.0, 1.0);
        grid.set_occupied(grid.world_to_cell(goal));
        let mut rm = Roadmap::new(&cfg(), WorldOrd::new(0.0, 0.0));
        let (path, outcome) = rm.build(&grid, WorldOrd::new(0.0, 0.0), goal, &|| false);
        assert!(path.is_empty());
        assert_eq!(outcome, BuildOutcome::GoalInaccessible);
    }

    #[test]
    fn optimise_path_preserves_endpoints_and_shortcuts() {
        let grid = Grid::all_free(40, 40, 0.1, WorldOrd::new(0.0, 0.0));
        let rm = Roadmap::new(&cfg(), WorldOrd::new(0.0, 0.0));
        let path = vec![
            WorldOrd::new(0.0, 0.0),
            WorldOrd::new(0.3, 0.0),
            WorldOrd::new(0.6, 0.0),
            WorldOrd::new(1.0, 0.0),
        ];
        let optimised = rm.optimise_path(&grid, &path);
        assert_eq!(optimised.first(), path.first());
        assert_eq!(optimised.last(), path.last());
        assert!(optimised.len() <= path.len());
        for w in optimised.windows(2) {
            let a = grid.world_to_cell(w[0]);
            let b = grid.world_to_cell(w[1]);
            assert!(grid.can_connect(a, b));
        }
    }

    #[test]
    fn wall_forces_a_detour() {
        let mut grid = Grid::all_free(40, 40, 0.1, WorldOrd::new(0.0, 0.0));
        for row in 5..35 {
            grid.set_occupied(Cell::new(20, row));
        }
        let mut rm = Roadmap::new(&cfg(), WorldOrd::new(0.0, 0.0));
        let (path, outcome) = rm.build(&grid, WorldOrd::new(-1.0, 0.0), WorldOrd::new(1.0, 0.0), &|| false);
        assert!(!path.is_empty(), "expected a path around the wall, outcome={:?}", outcome);
        assert!(path.len() >= 3);
        assert_eq!(path.first().copied(), Some(WorldOrd::new(-1.0, 0.0)));
        assert_eq!(path.last().copied(), Some(WorldOrd::new(1.0, 0.0)));
    }
}
