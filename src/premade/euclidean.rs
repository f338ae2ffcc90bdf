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
    domain::{ConfigurationSampler, Domain, PathProjection, PathValidation, Space, Steering, Validated},
    error::NoError,
    motion::{Path, Segment},
};
use nalgebra::DVector;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Configurations of the premade Euclidean domain.
pub type Configuration = DVector<f64>;

/// A sphere that configurations may not enter.
#[derive(Debug, Clone)]
pub struct SphericalObstacle {
    pub center: Configuration,
    pub radius: f64,
}

impl SphericalObstacle {
    pub fn new(center: Configuration, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, q: &Configuration) -> bool {
        (q - &self.center).norm() <= self.radius
    }
}

/// A ready-to-use planning domain over ℝᵈ: Euclidean distance, straight
/// line steering, no constraint manifold, and discretized collision
/// checking against spherical obstacles.
#[derive(Debug, Clone)]
pub struct EuclideanDomain {
    dimensions: usize,
    obstacles: Vec<SphericalObstacle>,
    /// Spacing of the samples checked along a path during validation.
    check_resolution: f64,
}

impl EuclideanDomain {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            obstacles: Vec::new(),
            check_resolution: 0.01,
        }
    }

    pub fn with_obstacle(mut self, obstacle: SphericalObstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_check_resolution(mut self, resolution: f64) -> Self {
        self.check_resolution = resolution;
        self
    }

    fn collides(&self, q: &Configuration) -> bool {
        self.obstacles.iter().any(|obstacle| obstacle.contains(q))
    }
}

impl Domain for EuclideanDomain {
    type Configuration = Configuration;
    type Path = Segment;
    type Error = NoError;
}

impl Space<Configuration> for EuclideanDomain {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn distance(&self, from: &Configuration, to: &Configuration) -> f64 {
        (from - to).norm()
    }
}

impl Steering<Configuration> for EuclideanDomain {
    type Path = Segment;
    type SteeringError = NoError;

    fn steer(
        &self,
        from: &Configuration,
        to: &Configuration,
    ) -> Result<Option<Segment>, Self::SteeringError> {
        Ok(Some(Segment::new(from.clone(), to.clone())))
    }
}

impl PathProjection<Segment> for EuclideanDomain {
    type ProjectionError = NoError;

    fn project(&self, path: &Segment) -> Result<Option<Segment>, Self::ProjectionError> {
        Ok(Some(path.clone()))
    }
}

impl PathValidation<Segment> for EuclideanDomain {
    type ValidationError = NoError;

    /// Walk the segment at `check_resolution` spacing (always including
    /// both endpoints) and cut the path at the last sample before the
    /// first collision.
    fn validate(&self, path: &Segment) -> Result<Validated<Segment>, Self::ValidationError> {
        let length = path.length();
        let steps = (length / self.check_resolution).ceil().max(1.0) as usize;

        let mut last_free = None;
        for k in 0..=steps {
            let t = length * k as f64 / steps as f64;
            if self.collides(&path.point_at(t)) {
                return Ok(Validated {
                    fully_valid: false,
                    valid_prefix: last_free.map(|t| path.extract(0.0, t)),
                });
            }
            last_free = Some(t);
        }

        Ok(Validated {
            fully_valid: true,
            valid_prefix: Some(path.clone()),
        })
    }
}

/// Sample configurations uniformly from an axis-aligned box. The generator
/// is seeded explicitly so that a planning run can be reproduced.
#[derive(Debug, Clone)]
pub struct UniformSampler {
    lower: Configuration,
    upper: Configuration,
    rng: StdRng,
}

impl UniformSampler {
    pub fn new(lower: Configuration, upper: Configuration, seed: u64) -> Self {
        assert_eq!(lower.len(), upper.len());
        Self {
            lower,
            upper,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ConfigurationSampler<Configuration> for UniformSampler {
    fn sample(&mut self) -> Configuration {
        Configuration::from_iterator(
            self.lower.len(),
            self.lower
                .iter()
                .zip(self.upper.iter())
                .map(|(lo, hi)| lo + self.rng.gen::<f64>() * (hi - lo)),
        )
    }
}
