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

/// Produce a candidate path between two configurations, ignoring obstacles.
pub trait Steering<Configuration> {
    /// What kind of path is produced by this steering method.
    type Path;

    /// What kind of error can happen while steering.
    type SteeringError;

    /// Steer from one configuration towards another. The steering method may
    /// decline to connect the pair by returning `Ok(None)`.
    ///
    /// A returned path starts at `from`; its end is only required to be
    /// `to` when no constraint prevents reaching it.
    fn steer(
        &self,
        from: &Configuration,
        to: &Configuration,
    ) -> Result<Option<Self::Path>, Self::SteeringError>;
}
