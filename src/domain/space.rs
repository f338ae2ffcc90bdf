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

/// Describe the metric structure of a configuration space.
pub trait Space<Configuration> {
    /// The number of degrees of freedom of the space.
    fn dimensions(&self) -> usize;

    /// The distance between two configurations. Must be non-negative;
    /// planners built on this trait do not attempt to recover from a
    /// negative distance.
    fn distance(&self, from: &Configuration, to: &Configuration) -> f64;
}
