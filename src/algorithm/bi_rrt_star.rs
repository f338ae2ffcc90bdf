/*
 * Copyright (C) 2023 Open Source Robotics Foundation
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
*/

use crate::{
    algorithm::{
        compute_parent_map, Algorithm, Coherent, Measure, MinimumCostBound, ParentMap,
        ParentMapError, RoadmapPath, SearchStatus, Solvable,
    },
    domain::{ConfigurationSampler, Domain, PathProjection, PathValidation, Space, Steering},
    error::ThisError,
    motion::Path,
    roadmap::{NodeId, Roadmap},
};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// User-facing tuning values for [`BiRrtStar`], resolved into [`Parameters`]
/// when a search is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiRrtStarConfiguration {
    /// The maximum length of a single extension. A non-positive value means
    /// "use the square root of the number of degrees of freedom".
    pub max_step_length: f64,

    /// Multiplier in the shrinking near-neighbor ball radius
    /// `γ · (ln N / N)^(1/d)`.
    pub gamma: f64,

    /// Distance below which a sample is considered to coincide with an
    /// existing node, making an extension pointless.
    pub coincidence_tolerance: f64,

    /// Extensions whose validated path is shorter than this make no useful
    /// progress and are discarded.
    pub minimum_path_length: f64,
}

impl Default for BiRrtStarConfiguration {
    fn default() -> Self {
        Self {
            max_step_length: -1.0,
            gamma: 1.0,
            coincidence_tolerance: 1e-16,
            minimum_path_length: 1e-10,
        }
    }
}

/// The parameter values a search actually runs with.
#[derive(Debug, Clone, Copy)]
pub struct Parameters {
    pub extend_max_length: f64,
    pub gamma: f64,
    pub coincidence_tolerance: f64,
    pub minimum_path_length: f64,
}

impl Parameters {
    /// The near-neighbor ball radius for a roadmap that currently holds
    /// `node_count` nodes: `min(γ · (ln N / N)^(1/d), L_max)`.
    pub fn near_radius(&self, node_count: usize, dimensions: usize) -> f64 {
        let n = node_count as f64;
        (self.gamma * (n.ln() / n).powf(1.0 / dimensions as f64)).min(self.extend_max_length)
    }
}

/// A single-query planning problem: a roadmap seeded with the start and goal
/// configurations, plus the sampler that will drive exploration.
pub struct Query<C, P, S> {
    pub roadmap: Roadmap<C, P>,
    pub init: NodeId,
    pub goals: Vec<NodeId>,
    pub sampler: S,
}

impl<C: PartialEq, P, S> Query<C, P, S> {
    /// Build the common two-node query: one start configuration, one goal
    /// configuration, nothing else in the roadmap yet.
    pub fn from_configurations(init: C, goal: C, sampler: S) -> Self {
        let mut roadmap = Roadmap::new();
        let init = roadmap.add_node(init);
        let goal = roadmap.add_node(goal);
        Self {
            roadmap,
            init,
            goals: vec![goal],
            sampler,
        }
    }
}

/// A bidirectional, asymptotically optimal, sampling-based planner.
///
/// Two trees are grown from the start and goal configurations. Every
/// extension picks its parent among the near-neighbor ball and rewires the
/// ball through the new node whenever that lowers a cost-to-root, so each
/// tree is simultaneously a shortest-path tree towards its own root. Once
/// the trees merge, every further step inserts an improving sample and
/// maintains both shortest-path trees over the unified roadmap, converging
/// towards the optimal path.
///
/// The planner owns its two parent maps exclusively and only ever mutates
/// the roadmap through node and edge insertion, so a partially executed
/// search is always left in a usable state between steps.
pub struct BiRrtStar<D, S> {
    domain: D,
    configuration: BiRrtStarConfiguration,
    _sampler: PhantomData<fn() -> S>,
}

impl<D, S> BiRrtStar<D, S> {
    pub fn new(domain: D) -> Self {
        Self::with_configuration(domain, Default::default())
    }

    pub fn with_configuration(domain: D, configuration: BiRrtStarConfiguration) -> Self {
        Self {
            domain,
            configuration,
            _sampler: PhantomData,
        }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn configuration(&self) -> &BiRrtStarConfiguration {
        &self.configuration
    }

    /// Modify the configuration of this planner. Searches that were already
    /// initialized keep the parameters they resolved.
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(BiRrtStarConfiguration) -> BiRrtStarConfiguration,
    {
        self.configuration = f(self.configuration);
        self
    }

    fn domain_err(err: impl Into<D::Error>) -> BiRrtStarSearchError<D::Error>
    where
        D: Domain,
    {
        BiRrtStarSearchError::Domain(err.into())
    }
}

impl<D: Clone, S> Clone for BiRrtStar<D, S> {
    fn clone(&self) -> Self {
        Self {
            domain: self.domain.clone(),
            configuration: self.configuration,
            _sampler: PhantomData,
        }
    }
}

/// The search state of a [`BiRrtStar`] run.
///
/// `roots[0]` always denotes the tree that grows next; the slots are swapped
/// after every growth-phase step. `to_root[k]` is the parent map rooted at
/// `roots[k]`. The phase is read off the roadmap: two connected components
/// mean growth, one means refinement.
pub struct Memory<D: Domain, S> {
    roadmap: Roadmap<D::Configuration, D::Path>,
    sampler: S,
    init: NodeId,
    goal: NodeId,
    roots: [NodeId; 2],
    to_root: [ParentMap; 2],
    parameters: Parameters,
}

impl<D: Domain, S> Memory<D, S> {
    pub fn roadmap(&self) -> &Roadmap<D::Configuration, D::Path> {
        &self.roadmap
    }

    pub fn init(&self) -> NodeId {
        self.init
    }

    pub fn goal(&self) -> NodeId {
        self.goal
    }

    pub fn roots(&self) -> [NodeId; 2] {
        self.roots
    }

    pub fn parent_maps(&self) -> &[ParentMap; 2] {
        &self.to_root
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

impl<D: Domain, S> Measure for Memory<D, S> {
    fn size(&self) -> usize {
        self.roadmap.node_count()
    }
}

impl<D: Domain, S> MinimumCostBound for Memory<D, S> {
    type Cost = f64;

    /// The cost of the best start-goal path known so far, or `None` while
    /// the two trees have not merged yet.
    fn minimum_cost_bound(&self) -> Option<f64> {
        if self.roadmap.component_count() != 1 {
            return None;
        }

        let k = if self.roots[0] == self.goal { 0 } else { 1 };
        self.to_root[k].cost_to_root(&self.roadmap, self.init).ok()
    }
}

#[derive(ThisError, Debug)]
pub enum BiRrtStarSearchError<D> {
    #[error("the query must contain exactly one goal node, but it contains {0}")]
    GoalAmbiguous(usize),
    #[error(
        "the roadmap has {0} connected components, but a bidirectional search \
        only works with one or two - something outside the planner has \
        modified the roadmap"
    )]
    PhaseInvariant(usize),
    #[error("an error occurred in a parent map:\n{0}")]
    ParentMap(ParentMapError),
    #[error("an error occurred in the domain:\n{0}")]
    Domain(D),
}

impl<D> From<ParentMapError> for BiRrtStarSearchError<D> {
    fn from(value: ParentMapError) -> Self {
        BiRrtStarSearchError::ParentMap(value)
    }
}

/// A near neighbor considered during choose-parent, remembering the path
/// towards the new sample and whether that path has been validated yet.
/// Validation is deferred until a candidate would actually improve a cost;
/// a candidate whose path failed validation has its path dropped.
struct CandidateRecord<P> {
    node: NodeId,
    path: Option<P>,
    validated: bool,
}

/// The outcome of choose-parent: the lowest-cost valid parent for the new
/// sample, plus the candidate records that the rewiring pass feeds on.
struct ChosenParent<P> {
    node: NodeId,
    path: P,
    cost: f64,
    candidates: Vec<CandidateRecord<P>>,
}

impl<D: Domain, S> Algorithm for BiRrtStar<D, S> {
    type Memory = Memory<D, S>;
}

impl<D, S> Coherent<Query<D::Configuration, D::Path, S>> for BiRrtStar<D, S>
where
    D: Domain + Space<D::Configuration>,
    S: ConfigurationSampler<D::Configuration>,
{
    type InitError = BiRrtStarSearchError<D::Error>;

    fn initialize(
        &self,
        query: Query<D::Configuration, D::Path, S>,
    ) -> Result<Self::Memory, Self::InitError> {
        if query.goals.len() != 1 {
            return Err(BiRrtStarSearchError::GoalAmbiguous(query.goals.len()));
        }
        let goal = query.goals[0];

        let extend_max_length = if self.configuration.max_step_length > 0.0 {
            self.configuration.max_step_length
        } else {
            (self.domain.dimensions() as f64).sqrt()
        };

        Ok(Memory {
            roadmap: query.roadmap,
            sampler: query.sampler,
            init: query.init,
            goal,
            roots: [query.init, goal],
            to_root: [ParentMap::new(query.init), ParentMap::new(goal)],
            parameters: Parameters {
                extend_max_length,
                gamma: self.configuration.gamma,
                coincidence_tolerance: self.configuration.coincidence_tolerance,
                minimum_path_length: self.configuration.minimum_path_length,
            },
        })
    }
}

impl<D, S> Solvable for BiRrtStar<D, S>
where
    D: Domain,
    D: Space<<D as Domain>::Configuration>
        + Steering<<D as Domain>::Configuration, Path = <D as Domain>::Path>
        + PathProjection<<D as Domain>::Path>
        + PathValidation<<D as Domain>::Path>,
    D::Configuration: PartialEq,
    D::SteeringError: Into<D::Error>,
    D::ProjectionError: Into<D::Error>,
    D::ValidationError: Into<D::Error>,
    S: ConfigurationSampler<D::Configuration>,
{
    type Solution = RoadmapPath<D::Configuration, <D as Domain>::Path>;
    type StepError = BiRrtStarSearchError<D::Error>;

    fn step(
        &self,
        memory: &mut Self::Memory,
    ) -> Result<SearchStatus<Self::Solution>, Self::StepError> {
        let Memory {
            roadmap,
            sampler,
            init,
            goal,
            roots,
            to_root,
            parameters,
        } = memory;

        let q = sampler.sample();

        match roadmap.component_count() {
            2 => {
                let mut q = q;
                if self.extend(roadmap, &mut to_root[0], roots[0], &mut q, parameters)? {
                    // In the unlikely event that the extension itself merged
                    // the two trees, one of the parent maps is already stale
                    // and the next step will rebuild both.
                    if roadmap.same_component(roots[0], roots[1]) {
                        tracing::debug!("the start and goal trees merged during extension");
                        return Ok(SearchStatus::Incomplete);
                    }
                    self.connect(roadmap, &mut to_root[1], roots[1], &q, parameters)?;
                }

                roots.swap(0, 1);
                to_root.swap(0, 1);
                Ok(SearchStatus::Incomplete)
            }
            1 => {
                if !to_root[1].contains(roots[0]) {
                    // First step after the merge: the incrementally grown
                    // maps only know their own tree, so recompute both over
                    // the unified roadmap.
                    to_root[0] = compute_parent_map(roadmap, roots[0]);
                    to_root[1] = compute_parent_map(roadmap, roots[1]);
                    tracing::debug!(
                        nodes = roadmap.node_count(),
                        "rebuilt both parent maps over the merged roadmap"
                    );
                }

                debug_assert_eq!(to_root[0].len(), to_root[1].len());
                debug_assert_eq!(to_root[0].len(), roadmap.node_count());

                self.improve(roadmap, to_root, roots, &q, parameters)?;

                let solution = self.current_solution(roadmap, to_root, roots, *init, *goal)?;
                Ok(SearchStatus::Solved(solution))
            }
            other => Err(BiRrtStarSearchError::PhaseInvariant(other)),
        }
    }
}

impl<D, S> BiRrtStar<D, S>
where
    D: Domain,
    D: Space<<D as Domain>::Configuration>
        + Steering<<D as Domain>::Configuration, Path = <D as Domain>::Path>
        + PathProjection<<D as Domain>::Path>
        + PathValidation<<D as Domain>::Path>,
    D::Configuration: PartialEq,
    D::SteeringError: Into<D::Error>,
    D::ProjectionError: Into<D::Error>,
    D::ValidationError: Into<D::Error>,
{
    /// Compose steering, projection, optional truncation and optional
    /// validation into one candidate path. The result always starts at
    /// `from`, but its end can fall short of `to` after truncation or
    /// partial validation.
    fn build_path(
        &self,
        from: &D::Configuration,
        to: &D::Configuration,
        max_length: f64,
        validate: bool,
    ) -> Result<Option<<D as Domain>::Path>, BiRrtStarSearchError<D::Error>> {
        let Some(path) = self.domain.steer(from, to).map_err(Self::domain_err)? else {
            return Ok(None);
        };
        let Some(mut path) = self.domain.project(&path).map_err(Self::domain_err)? else {
            return Ok(None);
        };

        if max_length > 0.0 && path.length() > max_length {
            let (start, _) = path.time_range();
            path = path.extract(start, start + max_length);
        }

        if !validate {
            return Ok(Some(path));
        }

        let outcome = self.domain.validate(&path).map_err(Self::domain_err)?;
        Ok(outcome.valid_prefix)
    }

    fn path_is_valid(&self, path: &<D as Domain>::Path) -> Result<bool, BiRrtStarSearchError<D::Error>> {
        Ok(self
            .domain
            .validate(path)
            .map_err(Self::domain_err)?
            .fully_valid)
    }

    /// Pick the lowest-cost valid parent for the sample `q` among the near
    /// neighbors, seeded with the nearest node and its already validated
    /// path. Candidate paths are only validated once they would improve the
    /// cost, and the validation result is memoized in the record.
    fn choose_parent(
        &self,
        roadmap: &Roadmap<D::Configuration, <D as Domain>::Path>,
        parent_map: &ParentMap,
        near: NodeId,
        seed_path: &<D as Domain>::Path,
        q: &D::Configuration,
        near_nodes: &[NodeId],
    ) -> Result<ChosenParent<<D as Domain>::Path>, BiRrtStarSearchError<D::Error>> {
        let mut cost = parent_map.cost_to_root(roadmap, near)? + seed_path.length();
        let mut chosen = near;
        let mut chosen_path = seed_path.clone();
        let mut candidates = Vec::with_capacity(near_nodes.len());

        for &candidate in near_nodes {
            if candidate == near {
                candidates.push(CandidateRecord {
                    node: candidate,
                    path: Some(seed_path.clone()),
                    validated: true,
                });
                continue;
            }

            let path = self.build_path(roadmap.configuration(candidate), q, -1.0, false)?;
            let mut record = CandidateRecord {
                node: candidate,
                path,
                validated: false,
            };
            if let Some(path) = &record.path {
                let candidate_cost = parent_map.cost_to_root(roadmap, candidate)? + path.length();
                if candidate_cost < cost {
                    record.validated = true;
                    if self.path_is_valid(path)? {
                        cost = candidate_cost;
                        chosen = candidate;
                        chosen_path = path.clone();
                    } else {
                        record.path = None;
                    }
                }
            }
            candidates.push(record);
        }

        Ok(ChosenParent {
            node: chosen,
            path: chosen_path,
            cost,
            candidates,
        })
    }

    /// Insert the forward and reverse edges between the chosen parent and
    /// the new node, and hang the new node off the parent map.
    fn attach(
        roadmap: &mut Roadmap<D::Configuration, <D as Domain>::Path>,
        parent_map: &mut ParentMap,
        chosen: &ChosenParent<<D as Domain>::Path>,
        qnew: NodeId,
    ) -> Result<(), BiRrtStarSearchError<D::Error>> {
        let forward = roadmap.add_edge(chosen.node, qnew, chosen.path.clone());
        roadmap.add_edge(qnew, chosen.node, chosen.path.reversed());
        parent_map.set_parent(roadmap, qnew, Some(forward))?;
        Ok(())
    }

    /// Re-point every near neighbor whose cost-to-root would drop by going
    /// through the new node. Paths that were not validated during
    /// choose-parent get validated here, and only then.
    fn rewire(
        &self,
        roadmap: &mut Roadmap<D::Configuration, <D as Domain>::Path>,
        parent_map: &mut ParentMap,
        chosen: &ChosenParent<<D as Domain>::Path>,
        qnew: NodeId,
    ) -> Result<(), BiRrtStarSearchError<D::Error>> {
        for record in &chosen.candidates {
            if record.node == chosen.node {
                continue;
            }
            let Some(path) = &record.path else {
                continue;
            };

            let rewired_cost = chosen.cost + path.length();
            if rewired_cost < parent_map.cost_to_root(roadmap, record.node)? {
                let valid = record.validated || self.path_is_valid(path)?;
                if valid {
                    roadmap.add_edge(record.node, qnew, path.clone());
                    let incoming = roadmap.add_edge(qnew, record.node, path.reversed());
                    parent_map.set_parent(roadmap, record.node, Some(incoming))?;
                    tracing::trace!(
                        node = record.node.index(),
                        "rewired a near neighbor through the new sample"
                    );
                }
            }
        }
        Ok(())
    }

    /// Grow the tree that `target_root` belongs to towards `q`. On success
    /// `q` is overwritten with the configuration that was actually reached,
    /// which can fall short of the request after truncation or partial
    /// validation.
    fn extend(
        &self,
        roadmap: &mut Roadmap<D::Configuration, <D as Domain>::Path>,
        parent_map: &mut ParentMap,
        target_root: NodeId,
        q: &mut D::Configuration,
        parameters: &Parameters,
    ) -> Result<bool, BiRrtStarSearchError<D::Error>> {
        let component = roadmap.component_of(target_root);
        let Some((near, distance)) = roadmap.nearest(&self.domain, q, Some(component)) else {
            return Ok(false);
        };
        if distance < parameters.coincidence_tolerance {
            return Ok(false);
        }

        let path = self.build_path(
            roadmap.configuration(near),
            q,
            parameters.extend_max_length,
            true,
        )?;
        let path = match path {
            Some(path) if path.length() >= parameters.minimum_path_length => path,
            _ => return Ok(false),
        };
        *q = path.terminal();

        let radius = parameters.near_radius(roadmap.node_count(), self.domain.dimensions());
        let near_nodes = roadmap.nodes_within_ball(&self.domain, q, radius, Some(component));

        let chosen = self.choose_parent(roadmap, parent_map, near, &path, q, &near_nodes)?;
        let qnew = roadmap.add_node(q.clone());
        Self::attach(roadmap, parent_map, &chosen, qnew)?;
        self.rewire(roadmap, parent_map, &chosen, qnew)?;
        Ok(true)
    }

    /// Repeatedly extend the tree of `target_root` towards `q` until the
    /// two components merge or an extension makes no progress.
    fn connect(
        &self,
        roadmap: &mut Roadmap<D::Configuration, <D as Domain>::Path>,
        parent_map: &mut ParentMap,
        target_root: NodeId,
        q: &D::Configuration,
        parameters: &Parameters,
    ) -> Result<bool, BiRrtStarSearchError<D::Error>> {
        while roadmap.component_count() == 2 {
            let mut target = q.clone();
            if !self.extend(roadmap, parent_map, target_root, &mut target, parameters)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Refinement-phase insertion: add the sample to the roadmap and run
    /// choose-parent plus rewiring once per parent map. The two passes may
    /// pick different parents; each map is the shortest-path tree towards
    /// its own root and the maps merely share the roadmap.
    fn improve(
        &self,
        roadmap: &mut Roadmap<D::Configuration, <D as Domain>::Path>,
        to_root: &mut [ParentMap; 2],
        roots: &[NodeId; 2],
        q: &D::Configuration,
        parameters: &Parameters,
    ) -> Result<bool, BiRrtStarSearchError<D::Error>> {
        let Some((near, distance)) = roadmap.nearest(&self.domain, q, None) else {
            return Ok(false);
        };
        if distance < parameters.coincidence_tolerance {
            return Ok(false);
        }

        let path = self.build_path(
            roadmap.configuration(near),
            q,
            parameters.extend_max_length,
            true,
        )?;
        let path = match path {
            Some(path) if path.length() >= parameters.minimum_path_length => path,
            _ => return Ok(false),
        };

        let radius = parameters.near_radius(roadmap.node_count(), self.domain.dimensions());
        let component = roadmap.component_of(roots[0]);
        let near_nodes = roadmap.nodes_within_ball(&self.domain, q, radius, Some(component));

        let qnew = roadmap.add_node(q.clone());

        for parent_map in to_root.iter_mut() {
            let chosen = self.choose_parent(roadmap, parent_map, near, &path, q, &near_nodes)?;
            Self::attach(roadmap, parent_map, &chosen, qnew)?;
            self.rewire(roadmap, parent_map, &chosen, qnew)?;
        }
        Ok(true)
    }

    /// Retrace the best known start-goal path by climbing from the start
    /// node through the parent map rooted at the goal.
    fn current_solution(
        &self,
        roadmap: &Roadmap<D::Configuration, <D as Domain>::Path>,
        to_root: &[ParentMap; 2],
        roots: &[NodeId; 2],
        init: NodeId,
        goal: NodeId,
    ) -> Result<RoadmapPath<D::Configuration, <D as Domain>::Path>, BiRrtStarSearchError<D::Error>> {
        let k = if roots[0] == goal { 0 } else { 1 };
        let map = &to_root[k];

        let mut sequence = Vec::new();
        let mut total_cost = 0.0;
        let mut current = init;
        loop {
            match map.parent(current) {
                None => return Err(ParentMapError::OrphanNode(current).into()),
                Some(None) => break,
                Some(Some(edge_id)) => {
                    let edge = roadmap.edge(edge_id);
                    total_cost += edge.path().length();
                    current = edge.from();
                    sequence.push((
                        edge.path().reversed(),
                        roadmap.configuration(current).clone(),
                    ));
                }
            }
        }

        Ok(RoadmapPath {
            initial: roadmap.configuration(init).clone(),
            sequence,
            total_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        motion::{Path as _, Segment},
        premade::{EuclideanDomain, SphericalObstacle, UniformSampler},
        roadmap::EdgeId,
    };
    use nalgebra::DVector;
    use std::collections::{HashMap, VecDeque};

    fn config(values: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(values)
    }

    struct ScriptedSampler {
        queue: VecDeque<DVector<f64>>,
    }

    impl ScriptedSampler {
        fn new(samples: &[&[f64]]) -> Self {
            Self {
                queue: samples.iter().map(|q| config(q)).collect(),
            }
        }
    }

    impl ConfigurationSampler<DVector<f64>> for ScriptedSampler {
        fn sample(&mut self) -> DVector<f64> {
            self.queue.pop_front().expect("ran out of scripted samples")
        }
    }

    type TestPlanner = BiRrtStar<EuclideanDomain, ScriptedSampler>;

    #[test]
    fn trivial_direct_connection_merges_and_yields_the_straight_cost() {
        let algorithm = TestPlanner::new(EuclideanDomain::new(2));
        let query = Query::from_configurations(
            config(&[0.0, 0.0]),
            config(&[1.0, 0.0]),
            ScriptedSampler::new(&[&[0.5, 0.0], &[0.5, 0.25]]),
        );
        let mut memory = algorithm.initialize(query).unwrap();
        assert_eq!(memory.roadmap().component_count(), 2);

        let status = algorithm.step(&mut memory).unwrap();
        assert!(status.incomplete());
        assert_eq!(memory.roadmap().component_count(), 1);

        let status = algorithm.step(&mut memory).unwrap();
        let solution = status.solution().expect("refinement step must report a path");
        assert!(solution.total_cost <= 1.0 + 1e-9);
        assert_eq!(solution.initial, config(&[0.0, 0.0]));
        assert_eq!(*solution.terminal(), config(&[1.0, 0.0]));

        // The parent map rooted at the goal prices the start at the same
        // cost that the solution reports.
        let k = if memory.roots()[0] == memory.goal() { 0 } else { 1 };
        let cost = memory.parent_maps()[k]
            .cost_to_root(memory.roadmap(), memory.init())
            .unwrap();
        assert!(cost <= 1.0 + 1e-9);
    }

    #[test]
    fn extension_is_truncated_to_the_step_length() {
        let algorithm = TestPlanner::with_configuration(
            EuclideanDomain::new(2),
            BiRrtStarConfiguration {
                max_step_length: 0.1,
                ..Default::default()
            },
        );
        let query = Query::from_configurations(
            config(&[0.0, 0.0]),
            config(&[1.0, 0.0]),
            ScriptedSampler::new(&[]),
        );
        let mut memory = algorithm.initialize(query).unwrap();

        let parameters = *memory.parameters();
        let mut q = config(&[1.0, 0.0]);
        let root = memory.roots[0];
        let extended = algorithm
            .extend(
                &mut memory.roadmap,
                &mut memory.to_root[0],
                root,
                &mut q,
                &parameters,
            )
            .unwrap();

        assert!(extended);
        assert!((q[0] - 0.1).abs() < 1e-12);
        assert!(q[1].abs() < 1e-12);

        // The new node sits at the truncated configuration.
        let qnew = memory
            .roadmap()
            .nodes()
            .find(|id| *memory.roadmap().configuration(*id) == q)
            .expect("the truncated configuration must be in the roadmap");
        assert!(memory.to_root[0].contains(qnew));
    }

    #[test]
    fn rewiring_reroutes_the_far_corner_through_the_diagonal() {
        // An L-shaped route of total length 2 is preloaded; a sample near
        // the far corner should pull that corner onto the diagonal.
        let mut roadmap = Roadmap::new();
        let a = roadmap.add_node(config(&[0.0, 0.0]));
        let b = roadmap.add_node(config(&[1.0, 0.0]));
        let c = roadmap.add_node(config(&[1.0, 1.0]));
        for (from, to) in [(a, b), (b, c)] {
            let path = Segment::new(
                roadmap.configuration(from).clone(),
                roadmap.configuration(to).clone(),
            );
            roadmap.add_edge(from, to, path.clone());
            roadmap.add_edge(to, from, path.reversed());
        }

        let algorithm = TestPlanner::with_configuration(
            EuclideanDomain::new(2),
            BiRrtStarConfiguration {
                max_step_length: 10.0,
                gamma: 10.0,
                ..Default::default()
            },
        );
        let query = Query {
            roadmap,
            init: a,
            goals: vec![c],
            sampler: ScriptedSampler::new(&[&[1.0, 0.99]]),
        };
        let mut memory = algorithm.initialize(query).unwrap();
        assert_eq!(memory.roadmap().component_count(), 1);

        let status = algorithm.step(&mut memory).unwrap();
        assert!(status.solved());

        let start_rooted = &memory.parent_maps()[0];
        assert_eq!(start_rooted.root(), a);
        let cost = start_rooted.cost_to_root(memory.roadmap(), c).unwrap();
        assert!(
            (cost - 2.0_f64.sqrt()).abs() < 0.05,
            "expected the corner to be rewired to ~sqrt(2), got {cost}"
        );
    }

    #[test]
    fn queries_with_multiple_goals_are_rejected() {
        let mut roadmap: Roadmap<DVector<f64>, Segment> = Roadmap::new();
        let init = roadmap.add_node(config(&[0.0, 0.0]));
        let goal_a = roadmap.add_node(config(&[1.0, 0.0]));
        let goal_b = roadmap.add_node(config(&[0.0, 1.0]));

        let algorithm = TestPlanner::new(EuclideanDomain::new(2));
        let result = algorithm.initialize(Query {
            roadmap,
            init,
            goals: vec![goal_a, goal_b],
            sampler: ScriptedSampler::new(&[]),
        });
        assert!(matches!(
            result,
            Err(BiRrtStarSearchError::GoalAmbiguous(2))
        ));
    }

    #[test]
    fn roadmaps_with_stray_components_fail_the_phase_invariant() {
        // A third component means something outside the planner has been
        // splicing nodes into the roadmap; the step must surface that
        // instead of guessing a phase.
        let mut roadmap: Roadmap<DVector<f64>, Segment> = Roadmap::new();
        let init = roadmap.add_node(config(&[0.0, 0.0]));
        let goal = roadmap.add_node(config(&[1.0, 0.0]));
        roadmap.add_node(config(&[5.0, 5.0]));

        let algorithm = TestPlanner::new(EuclideanDomain::new(2));
        let mut memory = algorithm
            .initialize(Query {
                roadmap,
                init,
                goals: vec![goal],
                sampler: ScriptedSampler::new(&[&[0.5, 0.0]]),
            })
            .unwrap();

        let result = algorithm.step(&mut memory);
        assert!(matches!(
            result,
            Err(BiRrtStarSearchError::PhaseInvariant(3))
        ));
    }

    #[test]
    fn infeasible_problems_keep_two_components_without_failing() {
        // One obstacle swallows the entire workspace, so path validation
        // rejects every motion.
        let domain = EuclideanDomain::new(2)
            .with_obstacle(SphericalObstacle::new(config(&[0.0, 0.0]), 1e6));
        let algorithm = BiRrtStar::<EuclideanDomain, UniformSampler>::new(domain);
        let query = Query::from_configurations(
            config(&[0.0, 0.0]),
            config(&[1.0, 0.0]),
            UniformSampler::new(config(&[-2.0, -2.0]), config(&[2.0, 2.0]), 99),
        );
        let mut memory = algorithm.initialize(query).unwrap();

        for _ in 0..50 {
            let status = algorithm.step(&mut memory).unwrap();
            assert!(status.incomplete());
            assert_eq!(memory.roadmap().component_count(), 2);
        }
        assert_eq!(memory.roadmap().node_count(), 2);
    }

    #[test]
    fn merging_triggers_a_parent_map_rebuild_with_full_coverage() {
        let algorithm = TestPlanner::new(EuclideanDomain::new(2));
        let query = Query::from_configurations(
            config(&[0.0, 0.0]),
            config(&[1.0, 0.0]),
            ScriptedSampler::new(&[&[0.5, 0.0], &[0.5, 0.25]]),
        );
        let mut memory = algorithm.initialize(query).unwrap();

        algorithm.step(&mut memory).unwrap();
        assert_eq!(memory.roadmap().component_count(), 1);
        // The incrementally grown maps only know their own tree, so the
        // slot that grew last cannot contain the other root yet.
        assert!(!memory.parent_maps()[1].contains(memory.roots()[0]));

        algorithm.step(&mut memory).unwrap();
        let node_count = memory.roadmap().node_count();
        assert_eq!(memory.parent_maps()[0].len(), node_count);
        assert_eq!(memory.parent_maps()[1].len(), node_count);
        for k in 0..2 {
            assert!(memory.parent_maps()[k].contains(memory.init()));
            assert!(memory.parent_maps()[k].contains(memory.goal()));
        }
    }

    #[test]
    fn near_radius_follows_the_shrinking_ball_formula() {
        let parameters = Parameters {
            extend_max_length: 2.0_f64.sqrt(),
            gamma: 1.0,
            coincidence_tolerance: 1e-16,
            minimum_path_length: 1e-10,
        };
        for n in [2usize, 3, 10, 100] {
            let expected = ((n as f64).ln() / n as f64)
                .powf(0.5)
                .min(parameters.extend_max_length);
            assert!((parameters.near_radius(n, 2) - expected).abs() < 1e-12);
        }

        // The step length caps the radius.
        let capped = Parameters {
            extend_max_length: 0.1,
            ..parameters
        };
        assert_eq!(capped.near_radius(2, 2), 0.1);

        // Gamma scales the uncapped radius linearly.
        let scaled = Parameters {
            gamma: 3.0,
            extend_max_length: 100.0,
            ..parameters
        };
        let base = Parameters {
            extend_max_length: 100.0,
            ..parameters
        };
        assert!(
            (scaled.near_radius(10, 2) - 3.0 * base.near_radius(10, 2)).abs() < 1e-12
        );
    }

    /// Drive a seeded random exploration and check the planner's universal
    /// invariants after every step: legal phase, acyclic parent maps that
    /// reach their roots, full coverage in refinement, symmetric edges,
    /// permanent merges, and non-increasing costs.
    #[test]
    fn random_exploration_maintains_planner_invariants() {
        let domain = EuclideanDomain::new(2)
            .with_obstacle(SphericalObstacle::new(config(&[0.5, 0.5]), 0.2));
        let algorithm = BiRrtStar::<EuclideanDomain, UniformSampler>::new(domain);
        let query = Query::from_configurations(
            config(&[0.0, 0.0]),
            config(&[1.0, 1.0]),
            UniformSampler::new(config(&[-0.5, -0.5]), config(&[1.5, 1.5]), 7),
        );
        let mut memory = algorithm.initialize(query).unwrap();

        let mut merged_seen = false;
        let mut best_costs: HashMap<(NodeId, NodeId), f64> = HashMap::new();
        let mut best_solution = f64::INFINITY;

        for _ in 0..120 {
            let status = algorithm.step(&mut memory).unwrap();
            let roadmap = memory.roadmap();

            let components = roadmap.component_count();
            assert!(components == 1 || components == 2);
            if merged_seen {
                assert_eq!(components, 1, "a merged roadmap must never split");
            }
            merged_seen |= components == 1;

            for map in memory.parent_maps() {
                for node in map.nodes() {
                    // Walking the parent chain must reach the root without
                    // revisiting a node.
                    let mut hops = 0;
                    let mut current = node;
                    while let Some(Some(edge)) = map.parent(current) {
                        current = roadmap.edge(edge).from();
                        hops += 1;
                        assert!(
                            hops <= roadmap.node_count(),
                            "parent chain of {node:?} does not terminate"
                        );
                    }
                    assert_eq!(current, map.root());

                    let cost = map.cost_to_root(roadmap, node).unwrap();
                    let key = (map.root(), node);
                    if let Some(previous) = best_costs.get(&key) {
                        assert!(
                            cost <= previous + 1e-9,
                            "cost to {node:?} regressed from {previous} to {cost}"
                        );
                    }
                    best_costs.insert(key, cost);
                }
            }

            if components == 1 {
                for map in memory.parent_maps() {
                    assert_eq!(map.len(), roadmap.node_count());
                }
            }

            // Every planner-inserted edge has a reverse twin.
            let mut directed: HashMap<(NodeId, NodeId), usize> = HashMap::new();
            for edge in roadmap.edges().map(|id: EdgeId| roadmap.edge(id)) {
                *directed.entry((edge.from(), edge.to())).or_default() += 1;
            }
            for ((from, to), count) in &directed {
                assert_eq!(
                    directed.get(&(*to, *from)),
                    Some(count),
                    "edge {from:?}->{to:?} is missing its reverse twin"
                );
            }

            if let SearchStatus::Solved(solution) = status {
                assert!(solution.total_cost <= best_solution + 1e-9);
                best_solution = solution.total_cost;
            }
        }

        assert!(merged_seen, "the seeded exploration should connect the trees");
        assert!(best_solution.is_finite());
    }
}
