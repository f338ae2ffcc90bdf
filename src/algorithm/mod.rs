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

pub mod parent_map;
pub use parent_map::{ParentMap, ParentMapError};

pub mod best_first;
pub use best_first::compute_parent_map;

pub mod path;
pub use path::RoadmapPath;

pub mod bi_rrt_star;
pub use bi_rrt_star::{BiRrtStar, BiRrtStarConfiguration, BiRrtStarSearchError, Query};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus<Solution> {
    Incomplete,
    Impossible,
    Solved(Solution),
}

impl<S> SearchStatus<S> {
    pub fn incomplete(&self) -> bool {
        matches!(self, SearchStatus::Incomplete)
    }

    pub fn impossible(&self) -> bool {
        matches!(self, SearchStatus::Impossible)
    }

    pub fn solved(&self) -> bool {
        matches!(self, SearchStatus::Solved(_))
    }

    pub fn solution(self) -> Option<S> {
        match self {
            Self::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    /// If the status contains a solution, apply a function to that solution.
    pub fn map<U, F: FnOnce(S) -> U>(self, op: F) -> SearchStatus<U> {
        match self {
            SearchStatus::Solved(solution) => SearchStatus::Solved(op(solution)),
            SearchStatus::Incomplete => SearchStatus::Incomplete,
            SearchStatus::Impossible => SearchStatus::Impossible,
        }
    }
}

pub trait Algorithm {
    /// The `Memory` type tracks the progress of each search.
    type Memory;
}

/// The `Coherent` trait determines when the user input is coherent (usable)
/// for the algorithm. An algorithm may support several query types, so this
/// trait can be implemented for each of them.
pub trait Coherent<Query>: Algorithm {
    type InitError;

    fn initialize(&self, query: Query) -> Result<Self::Memory, Self::InitError>;
}

/// The `Solvable` trait defines the basic structure that an algorithm needs
/// to satisfy in order for a Planner to operate on it.
pub trait Solvable: Algorithm + Sized {
    /// The `Solution` type is what the Algorithm will return once it has
    /// found a valid solution. Anytime algorithms may keep producing better
    /// solutions on subsequent steps.
    type Solution;

    /// A `StepError` will be returned when an issue is encountered during a
    /// step of the algorithm.
    type StepError;

    /// Take a step in the search algorithm. The same memory instance will be
    /// passed in with each iteration.
    fn step(
        &self,
        memory: &mut Self::Memory,
    ) -> Result<SearchStatus<Self::Solution>, Self::StepError>;
}

// Implement the Algorithm traits for Arc<Algo> so that planners can always
// have a way to cheaply copy the algorithm.
use std::sync::Arc;

impl<Algo: Algorithm> Algorithm for Arc<Algo> {
    type Memory = Algo::Memory;
}

impl<Query, Algo: Coherent<Query>> Coherent<Query> for Arc<Algo> {
    type InitError = Algo::InitError;

    fn initialize(&self, query: Query) -> Result<Self::Memory, Self::InitError> {
        self.as_ref().initialize(query)
    }
}

impl<Algo: Solvable> Solvable for Arc<Algo> {
    type Solution = Algo::Solution;
    type StepError = Algo::StepError;

    fn step(
        &self,
        memory: &mut Self::Memory,
    ) -> Result<SearchStatus<Self::Solution>, Self::StepError> {
        self.as_ref().step(memory)
    }
}

/// The `Measure` trait can be implemented by `Algorithm::Memory` types to
/// provide an indication of how large their current memory footprint is.
/// This may be used to halt search efforts that have grown excessively
/// large.
pub trait Measure {
    /// How "big" is the current memory footprint. The exact meaning of this
    /// value may vary between algorithms.
    fn size(&self) -> usize;
}

/// The `MinimumCostBound` trait can be implemented by `Algorithm::Memory`
/// types to report a bound for the cost of the solution that the search is
/// currently able to produce. This can be used to halt search efforts once
/// the cost drops below (or never reaches) a desired threshold.
///
/// Returning None implies that no bound is available yet.
pub trait MinimumCostBound {
    type Cost;
    fn minimum_cost_bound(&self) -> Option<Self::Cost>;
}
