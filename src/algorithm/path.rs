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

/// A solution retraced out of a roadmap: an initial configuration followed
/// by a sequence of paths, each paired with the configuration it arrives at.
#[derive(Debug, Clone)]
pub struct RoadmapPath<Configuration, P> {
    pub initial: Configuration,
    pub sequence: Vec<(P, Configuration)>,
    pub total_cost: f64,
}

impl<Configuration, P> RoadmapPath<Configuration, P> {
    /// The configuration at the end of the solution.
    pub fn terminal(&self) -> &Configuration {
        self.sequence.last().map(|(_, q)| q).unwrap_or(&self.initial)
    }

    /// The number of roadmap edges the solution traverses.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
