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

use crate::algorithm::{Measure, MinimumCostBound};
use std::sync::Arc;

/// A trait to define conditions in which a search should be halted. The
/// settings can be changed in between calls to Search::solve().
pub trait Halt<Mem> {
    /// Check whether the current search should be interrupted.
    fn halt(&mut self, memory: &Mem) -> bool;
}

/// If an empty tuple is given for the options then we treat that as an
/// indication that we should let the solver continue without halting for
/// any reason.
impl<Mem> Halt<Mem> for () {
    fn halt(&mut self, _: &Mem) -> bool {
        false
    }
}

/// Tell the planner to interrupt its attempt to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Interruption {
    Continue,
    Stop,
}

/// Signature for an object that can interrupt the planner.
pub type Interrupter = Arc<dyn Fn() -> Interruption>;

/// This option allows the user to specify a callback to indicate whether
/// the search should continue.
#[derive(Clone)]
pub struct Interruptible(pub Option<Interrupter>);

impl Interruptible {
    pub fn new<F: Fn() -> Interruption + 'static>(f: F) -> Self {
        Self(Some(Arc::new(f)))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl<Mem> Halt<Mem> for Interruptible {
    fn halt(&mut self, _: &Mem) -> bool {
        if let Some(interrupter) = &self.0 {
            return Interruption::Stop == interrupter();
        }

        false
    }
}

/// This option sets a maximum number of steps that can be taken before the
/// search is told to halt.
#[derive(Debug, Clone)]
pub struct StepLimit {
    steps: usize,
    pub limit: Option<usize>,
}

impl StepLimit {
    pub fn new(limit: Option<usize>) -> Self {
        Self { steps: 0, limit }
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }
}

impl<Mem> Halt<Mem> for StepLimit {
    fn halt(&mut self, _: &Mem) -> bool {
        self.steps += 1;
        if let Some(limit) = self.limit {
            return self.steps > limit;
        }

        false
    }
}

/// The maximum size that the Memory's Measure can reach before the solve
/// attempt quits. For a roadmap planner this puts a limit on how many nodes
/// the roadmap may accumulate.
#[derive(Default, Clone)]
pub struct MeasureLimit(pub Option<usize>);

impl<Mem: Measure> Halt<Mem> for MeasureLimit {
    fn halt(&mut self, memory: &Mem) -> bool {
        if let Some(limit) = self.0 {
            return memory.size() > limit;
        }

        false
    }
}

/// Halt once the memory reports a cost bound at or below this threshold.
/// For an anytime planner this expresses "refine until the solution is good
/// enough".
#[derive(Default, Clone)]
pub struct CostThreshold<C>(pub Option<C>);

impl<Mem: MinimumCostBound> Halt<Mem> for CostThreshold<Mem::Cost>
where
    Mem::Cost: Clone + PartialOrd,
{
    fn halt(&mut self, memory: &Mem) -> bool {
        if let Some(threshold) = &self.0 {
            if let Some(bound) = memory.minimum_cost_bound() {
                return bound <= *threshold;
            }
        }

        false
    }
}

// Tuples of Halt<M> also implement Halt<M>, halting when any of their
// elements asks to halt. Every element is always evaluated so that
// stateful conditions like StepLimit keep counting.
impl<Mem, A: Halt<Mem>, B: Halt<Mem>> Halt<Mem> for (A, B) {
    fn halt(&mut self, memory: &Mem) -> bool {
        let a = self.0.halt(memory);
        let b = self.1.halt(memory);
        a || b
    }
}

impl<Mem, A: Halt<Mem>, B: Halt<Mem>, C: Halt<Mem>> Halt<Mem> for (A, B, C) {
    fn halt(&mut self, memory: &Mem) -> bool {
        let a = self.0.halt(memory);
        let b = self.1.halt(memory);
        let c = self.2.halt(memory);
        a || b || c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeMem;

    impl Measure for FakeMem {
        fn size(&self) -> usize {
            0
        }
    }

    impl MinimumCostBound for FakeMem {
        type Cost = f64;
        fn minimum_cost_bound(&self) -> Option<f64> {
            Some(2.5)
        }
    }

    #[test]
    fn empty_halting_never_halts() {
        let mut halting = ();
        for _ in 0..10 {
            assert!(!halting.halt(&FakeMem));
        }
    }

    #[test]
    fn step_limit_halts_after_its_budget() {
        let mut halting = StepLimit::new(Some(5));
        for _ in 0..5 {
            assert!(!halting.halt(&FakeMem));
        }
        assert!(halting.halt(&FakeMem));

        halting.reset();
        assert!(!halting.halt(&FakeMem));
    }

    #[test]
    fn cost_threshold_halts_once_the_bound_is_good_enough() {
        let mut too_strict = CostThreshold(Some(1.0));
        assert!(!too_strict.halt(&FakeMem));

        let mut satisfied = CostThreshold(Some(3.0));
        assert!(satisfied.halt(&FakeMem));

        let mut disabled: CostThreshold<f64> = CostThreshold(None);
        assert!(!disabled.halt(&FakeMem));
    }

    #[test]
    fn tuple_halting_combines_conditions() {
        let mut halting = (
            Interruptible::new(|| Interruption::Continue),
            StepLimit::new(Some(5)),
            MeasureLimit(Some(100)),
        );

        for _ in 0..5 {
            assert!(!halting.halt(&FakeMem));
        }
        assert!(halting.halt(&FakeMem));
    }
}
