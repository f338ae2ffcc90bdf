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

pub mod search;
pub use search::{AbstractSearch, Search};

pub mod halt;
pub use halt::Halt;

use crate::{
    algorithm::{Coherent, Solvable},
    error::Anyhow,
};

/// The Planner class spawns Search instances that advance a query using its
/// provided algorithm.
///
/// The `Planner::plan(query)` function will create a [`Search`] object which
/// manages the planning progress and can be stepped or driven to completion.
///
/// The Planner can also be given default halting behavior which will be
/// passed along to the Search when `plan(query)` is used. The Halting
/// generic must implement the [`Halt`] trait for the algorithm's memory.
#[derive(Debug, Clone)]
pub struct Planner<Algo, Halting = ()> {
    /// The object which determines the search pattern
    algorithm: Algo,

    /// The default halting behavior handed to each new search
    default_halting: Halting,
}

impl<Algo> Planner<Algo, ()> {
    /// Construct a new planner that has no halting behavior.
    pub fn new(algorithm: Algo) -> Self {
        Self {
            algorithm,
            default_halting: (),
        }
    }
}

impl<Algo, Halting> Planner<Algo, Halting> {
    pub fn new_haltable(algorithm: Algo, halting: Halting) -> Self {
        Self {
            algorithm,
            default_halting: halting,
        }
    }

    /// Consume this Planner and create a new Planner with a different
    /// default Halting value.
    pub fn with_halting<NewHalting>(self, halting: NewHalting) -> Planner<Algo, NewHalting> {
        Planner {
            algorithm: self.algorithm,
            default_halting: halting,
        }
    }

    /// Begin working on a query.
    ///
    /// This requires the Algorithm and Halting to be clonable. To produce a
    /// single search from an Algorithm that cannot be cloned, use
    /// [`Planner::into_search`].
    pub fn plan<Query>(&self, query: Query) -> Result<Search<Algo, Halting>, Algo::InitError>
    where
        Algo: Coherent<Query> + Solvable + Clone,
        Halting: Halt<Algo::Memory> + Clone,
    {
        let memory = self.algorithm.initialize(query)?;
        Ok(Search::new(
            memory,
            self.algorithm.clone(),
            self.default_halting.clone(),
        ))
    }

    /// Convert the planner into a single [`Search`] instance. This can be
    /// used for Algorithms that don't implement the [`Clone`] trait.
    pub fn into_search<Query>(self, query: Query) -> Result<Search<Algo, Halting>, Algo::InitError>
    where
        Algo: Coherent<Query> + Solvable,
        Halting: Halt<Algo::Memory>,
    {
        let memory = self.algorithm.initialize(query)?;
        Ok(Search::new(memory, self.algorithm, self.default_halting))
    }

    /// Convert this Planner into an abstract one which hides the underlying
    /// algorithm. This can be useful for mixing this planner into a
    /// container with other planners that support the same query and
    /// solution types but use different algorithms.
    pub fn into_abstract<Query>(self) -> AbstractPlanner<Query, Algo::Solution>
    where
        Algo: Coherent<Query> + Solvable + Clone + 'static,
        Algo::Memory: 'static,
        Algo::Solution: 'static,
        Algo::InitError: Into<Anyhow>,
        Algo::StepError: Into<Anyhow>,
        Halting: Halt<Algo::Memory> + Clone + 'static,
        Query: 'static,
    {
        AbstractPlanner {
            implementation: Box::new(self),
        }
    }
}

/// The object-safe face of a [`Planner`], with the error types rolled into
/// [`Anyhow`].
pub trait PlannerInterface<Query, Solution> {
    fn plan(&self, query: Query) -> Result<AbstractSearch<Solution>, Anyhow>;
}

impl<Algo, Halting, Query> PlannerInterface<Query, Algo::Solution> for Planner<Algo, Halting>
where
    Algo: Coherent<Query> + Solvable + Clone + 'static,
    Algo::Memory: 'static,
    Algo::Solution: 'static,
    Algo::InitError: Into<Anyhow>,
    Algo::StepError: Into<Anyhow>,
    Halting: Halt<Algo::Memory> + Clone + 'static,
{
    fn plan(&self, query: Query) -> Result<AbstractSearch<Algo::Solution>, Anyhow> {
        Planner::plan(self, query)
            .map(Into::into)
            .map_err(Into::into)
    }
}

/// A planner whose algorithm type has been hidden behind
/// [`PlannerInterface`].
pub struct AbstractPlanner<Query, Solution> {
    implementation: Box<dyn PlannerInterface<Query, Solution>>,
}

impl<Query, Solution> PlannerInterface<Query, Solution> for AbstractPlanner<Query, Solution> {
    fn plan(&self, query: Query) -> Result<AbstractSearch<Solution>, Anyhow> {
        self.implementation.plan(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithm::{Algorithm, Measure, SearchStatus},
        error::NoError,
        planner::halt::StepLimit,
    };

    /// A toy algorithm that counts upward until it reaches its goal value.
    #[derive(Default, Debug, Clone)]
    struct CountingAlgorithm;

    struct CountingMemory {
        current: u64,
        goal: u64,
        visited: Vec<u64>,
    }

    impl Measure for CountingMemory {
        fn size(&self) -> usize {
            self.visited.len()
        }
    }

    impl Algorithm for CountingAlgorithm {
        type Memory = CountingMemory;
    }

    impl Coherent<(u64, u64)> for CountingAlgorithm {
        type InitError = NoError;

        fn initialize(&self, (start, goal): (u64, u64)) -> Result<Self::Memory, Self::InitError> {
            Ok(CountingMemory {
                current: start,
                goal,
                visited: vec![start],
            })
        }
    }

    impl Solvable for CountingAlgorithm {
        type Solution = Vec<u64>;
        type StepError = NoError;

        fn step(
            &self,
            memory: &mut Self::Memory,
        ) -> Result<SearchStatus<Self::Solution>, Self::StepError> {
            if memory.current == memory.goal {
                return Ok(SearchStatus::Solved(memory.visited.clone()));
            }
            if memory.current > memory.goal {
                return Ok(SearchStatus::Impossible);
            }

            memory.current += 1;
            memory.visited.push(memory.current);
            Ok(SearchStatus::Incomplete)
        }
    }

    #[test]
    fn counting_algorithm_can_reach_a_higher_goal() {
        let planner = Planner::new(CountingAlgorithm);
        let result = planner.plan((5, 10)).unwrap().solve().unwrap();
        assert!(matches!(result, SearchStatus::Solved(_)));
        if let SearchStatus::Solved(solution) = result {
            assert_eq!(solution.first(), Some(&5));
            assert_eq!(solution.last(), Some(&10));
            assert_eq!(solution.len(), 6);
        }
    }

    #[test]
    fn counting_algorithm_finds_lower_goal_impossible() {
        let planner = Planner::new(CountingAlgorithm);
        let result = planner.plan((10, 5)).unwrap().solve().unwrap();
        assert!(matches!(result, SearchStatus::Impossible));
    }

    #[test]
    fn search_is_incomplete_after_insufficient_steps() {
        let planner = Planner::new(CountingAlgorithm);
        let mut search = planner.plan((5, 10)).unwrap();
        for _ in 0..5 {
            assert!(matches!(search.step().unwrap(), SearchStatus::Incomplete));
        }
        assert!(matches!(search.step().unwrap(), SearchStatus::Solved(_)));
    }

    #[test]
    fn abstract_planner_hides_the_algorithm_type() {
        let planner: AbstractPlanner<(u64, u64), Vec<u64>> =
            Planner::new(CountingAlgorithm).into_abstract();

        let mut search = planner.plan((3, 6)).unwrap();
        let result = search.solve().unwrap();
        assert!(matches!(result, SearchStatus::Solved(_)));
        if let SearchStatus::Solved(solution) = result {
            assert_eq!(solution, vec![3, 4, 5, 6]);
        }

        // The erased search can still be stepped one iteration at a time.
        let mut search = planner.plan((0, 2)).unwrap();
        assert!(matches!(search.step().unwrap(), SearchStatus::Incomplete));
        assert!(matches!(search.step().unwrap(), SearchStatus::Incomplete));
        assert!(matches!(search.step().unwrap(), SearchStatus::Solved(_)));
    }

    #[test]
    fn halting_interrupts_solve() {
        let planner = Planner::new_haltable(CountingAlgorithm, StepLimit::new(Some(3)));
        let mut search = planner.plan((0, 100)).unwrap();
        let result = search.solve().unwrap();
        assert!(matches!(result, SearchStatus::Incomplete));
        assert!(search.memory().current < 100);
    }
}
