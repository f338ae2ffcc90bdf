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

/// Draw configurations for a sampling-based planner.
///
/// Sampling is total: it always produces a configuration and has no failure
/// mode. Samplers typically own a random number generator, which is why
/// [`ConfigurationSampler::sample`] takes `&mut self`; a deterministic
/// sampler makes the whole planning process deterministic.
pub trait ConfigurationSampler<Configuration> {
    fn sample(&mut self) -> Configuration;
}
