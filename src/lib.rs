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

pub mod domain;

pub mod planner;
pub use planner::Planner;

pub mod roadmap;
pub use roadmap::Roadmap;

pub mod algorithm;

pub mod motion;

pub mod error;

pub mod premade;

pub mod prelude {
    pub use super::algorithm::*;
    pub use super::domain::*;
    pub use super::motion::{Path, Segment};
    pub use super::planner::*;
    pub use super::premade::*;
    pub use super::roadmap::*;
}
