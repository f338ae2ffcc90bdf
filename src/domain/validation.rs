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

use crate::error::NoError;

/// The outcome of validating a path.
#[derive(Debug, Clone)]
pub struct Validated<P> {
    /// True if the whole path was certified valid.
    pub fully_valid: bool,

    /// The longest prefix of the path that was certified valid. `None` when
    /// not even the start of the path is valid. The prefix may be arbitrarily
    /// short, so callers that need actual progress must check its length.
    pub valid_prefix: Option<P>,
}

/// Certify that (a prefix of) a path is collision-free and satisfies the
/// constraints of the problem.
pub trait PathValidation<P> {
    /// What kind of error can happen while validating.
    type ValidationError;

    /// Validate the path without propagating past the first failure.
    fn validate(&self, path: &P) -> Result<Validated<P>, Self::ValidationError>;
}

/// A validation for obstacle-free problems: every path is fully valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<P: Clone> PathValidation<P> for AcceptAll {
    type ValidationError = NoError;

    fn validate(&self, path: &P) -> Result<Validated<P>, Self::ValidationError> {
        Ok(Validated {
            fully_valid: true,
            valid_prefix: Some(path.clone()),
        })
    }
}

/// A validation that rejects every path outright. Useful for testing how a
/// planner behaves when no motion is feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl<P> PathValidation<P> for RejectAll {
    type ValidationError = NoError;

    fn validate(&self, _: &P) -> Result<Validated<P>, Self::ValidationError> {
        Ok(Validated {
            fully_valid: false,
            valid_prefix: None,
        })
    }
}
