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

use crate::motion::Path;

/// A domain that is being planned over must, at a minimum, specify a type for
/// its configuration representation, the kind of path its steering method
/// produces, and a common error type that its collaborator errors convert
/// into.
///
/// The collaborator roles themselves are expressed by the traits in the
/// sub-modules of this module, such as [`Space`], [`Steering`],
/// [`PathProjection`] and [`PathValidation`]. A planning algorithm states
/// which roles it needs through its trait bounds.
pub trait Domain {
    type Configuration: Clone;
    type Path: Path<Self::Configuration> + Clone;
    type Error;
}

pub mod projection;
pub mod sampler;
pub mod space;
pub mod steering;
pub mod validation;

pub use projection::*;
pub use sampler::*;
pub use space::*;
pub use steering::*;
pub use validation::*;
