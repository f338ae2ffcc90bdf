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
    algorithm::{SearchStatus, Solvable},
    error::Anyhow,
    planner::halt::Halt,
};

/// An in-progress search produced by a
/// [`Planner`][crate::planner::Planner]. The search owns the algorithm's
/// memory; it can be stepped one iteration at a time or driven with
/// [`Search::solve`] until its halting behavior interrupts it.
pub struct Search<Algo: Solvable, Halting> {
    memory: Algo::Memory,
    algorithm: Algo,
    halting: Halting,
}

impl<Algo: Solvable, Halting> Search<Algo, Halting> {
    pub fn new(memory: Algo::Memory, algorithm: Algo, halting: Halting) -> Self {
        Self {
            memory,
            algorithm,
            halting,
        }
    }

    /// Replace the halting behavior of this search.
    pub fn with_halting<NewHalting>(self, halting: NewHalting) -> Search<Algo, NewHalting> {
        Search {
            memory: self.memory,
            algorithm: self.algorithm,
            halting,
        }
    }

    /// Run a single iteration of the algorithm.
    pub fn step(&mut self) -> Result<SearchStatus<Algo::Solution>, Algo::StepError> {
        self.algorithm.step(&mut self.memory)
    }

    /// Keep stepping until the algorithm reports a solution, reports that
    /// the problem is impossible, or the halting behavior interrupts the
    /// effort. An interrupted search returns
    /// [`SearchStatus::Incomplete`] and can be resumed by calling solve
    /// again.
    pub fn solve(&mut self) -> Result<SearchStatus<Algo::Solution>, Algo::StepError>
    where
        Halting: Halt<Algo::Memory>,
    {
        loop {
            if self.halting.halt(&self.memory) {
                return Ok(SearchStatus::Incomplete);
            }

            match self.step()? {
                SearchStatus::Incomplete => continue,
                terminal => return Ok(terminal),
            }
        }
    }

    pub fn memory(&self) -> &Algo::Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Algo::Memory {
        &mut self.memory
    }

    pub fn into_memory(self) -> Algo::Memory {
        self.memory
    }
}

/// The object-safe face of a [`Search`], with the error type rolled into
/// [`Anyhow`]. This is what lets searches driven by different algorithms
/// live behind one interface.
pub trait SearchInterface<Solution> {
    fn step(&mut self) -> Result<SearchStatus<Solution>, Anyhow>;
    fn solve(&mut self) -> Result<SearchStatus<Solution>, Anyhow>;
}

impl<Algo, Halting> SearchInterface<Algo::Solution> for Search<Algo, Halting>
where
    Algo: Solvable,
    Algo::StepError: Into<Anyhow>,
    Halting: Halt<Algo::Memory>,
{
    fn step(&mut self) -> Result<SearchStatus<Algo::Solution>, Anyhow> {
        Search::step(self).map_err(Into::into)
    }

    fn solve(&mut self) -> Result<SearchStatus<Algo::Solution>, Anyhow> {
        Search::solve(self).map_err(Into::into)
    }
}

/// A search whose algorithm type has been hidden. This can be useful for
/// mixing searches into a container when they support the same solution
/// type but were produced by different planners.
pub struct AbstractSearch<Solution> {
    implementation: Box<dyn SearchInterface<Solution>>,
}

impl<Solution> AbstractSearch<Solution> {
    pub fn step(&mut self) -> Result<SearchStatus<Solution>, Anyhow> {
        self.implementation.step()
    }

    pub fn solve(&mut self) -> Result<SearchStatus<Solution>, Anyhow> {
        self.implementation.solve()
    }
}

impl<Algo, Halting> From<Search<Algo, Halting>> for AbstractSearch<Algo::Solution>
where
    Algo: Solvable + 'static,
    Algo::Memory: 'static,
    Algo::Solution: 'static,
    Algo::StepError: Into<Anyhow>,
    Halting: Halt<Algo::Memory> + 'static,
{
    fn from(search: Search<Algo, Halting>) -> Self {
        AbstractSearch {
            implementation: Box::new(search),
        }
    }
}
