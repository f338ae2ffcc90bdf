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
use nalgebra::DVector;

/// A straight line segment through ℝᵈ, parameterized by arc length over
/// `[0, length]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    start: DVector<f64>,
    end: DVector<f64>,
}

impl Segment {
    pub fn new(start: DVector<f64>, end: DVector<f64>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> &DVector<f64> {
        &self.start
    }

    pub fn end(&self) -> &DVector<f64> {
        &self.end
    }

    /// The configuration reached after travelling a distance of `t` from the
    /// start of the segment. Values outside `[0, length]` are clamped.
    pub fn point_at(&self, t: f64) -> DVector<f64> {
        let length = self.length();
        if length <= 0.0 {
            return self.start.clone();
        }

        let s = (t / length).clamp(0.0, 1.0);
        &self.start + (&self.end - &self.start) * s
    }
}

impl Path<DVector<f64>> for Segment {
    fn length(&self) -> f64 {
        (&self.end - &self.start).norm()
    }

    fn time_range(&self) -> (f64, f64) {
        (0.0, self.length())
    }

    fn extract(&self, from: f64, to: f64) -> Self {
        Segment {
            start: self.point_at(from),
            end: self.point_at(to),
        }
    }

    fn reversed(&self) -> Self {
        Segment {
            start: self.end.clone(),
            end: self.start.clone(),
        }
    }

    fn initial(&self) -> DVector<f64> {
        self.start.clone()
    }

    fn terminal(&self) -> DVector<f64> {
        self.end.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config(values: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(values)
    }

    #[test]
    fn length_is_euclidean_distance() {
        let segment = Segment::new(config(&[0.0, 0.0]), config(&[3.0, 4.0]));
        assert_relative_eq!(segment.length(), 5.0);
        assert_eq!(segment.time_range(), (0.0, 5.0));
    }

    #[test]
    fn extract_truncates_to_requested_length() {
        let segment = Segment::new(config(&[0.0, 0.0]), config(&[1.0, 0.0]));
        let truncated = segment.extract(0.0, 0.1);
        assert_relative_eq!(truncated.length(), 0.1);
        assert_relative_eq!(truncated.terminal()[0], 0.1);
        assert_relative_eq!(truncated.terminal()[1], 0.0);
    }

    #[test]
    fn reversed_swaps_endpoints() {
        let segment = Segment::new(config(&[0.0, 1.0]), config(&[2.0, 3.0]));
        let reversed = segment.reversed();
        assert_eq!(reversed.initial(), segment.terminal());
        assert_eq!(reversed.terminal(), segment.initial());
        assert_relative_eq!(reversed.length(), segment.length());
    }

    #[test]
    fn degenerate_segment_has_zero_length() {
        let q = config(&[0.5, 0.5]);
        let segment = Segment::new(q.clone(), q.clone());
        assert_eq!(segment.length(), 0.0);
        assert_eq!(segment.point_at(0.3), q);
    }
}
