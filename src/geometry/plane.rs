// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cutting plane: half-space classification and ray intersection

use crate::error::{CutError, CutResult};
use crate::utils::math::normalize_or_zero;
use nalgebra::{Matrix3, Matrix4, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Which half-space a point lies in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Strictly in front of the plane (along the normal)
    Positive,
    /// Behind the plane, or exactly on it
    Negative,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Positive => Side::Negative,
            Side::Negative => Side::Positive,
        }
    }
}

/// Infinite plane given by a point on it and a unit normal.
///
/// The plane must be expressed in the same coordinate space as the mesh it
/// cuts; see [`Plane::to_local`] for moving a world-space plane into mesh space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    position: Point3<f32>,
    normal: Unit<Vector3<f32>>,
}

impl Plane {
    /// Build a plane, normalizing `normal`.
    ///
    /// A zero normal produces a NaN unit vector which classifies every point as
    /// [`Side::Negative`]; use [`Plane::try_new`] to reject it instead.
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            position,
            normal: Unit::new_normalize(normal),
        }
    }

    pub fn try_new(position: Point3<f32>, normal: Vector3<f32>) -> CutResult<Self> {
        let normal = Unit::try_new(normal, 0.0).ok_or(CutError::DegeneratePlane)?;
        Ok(Self { position, normal })
    }

    pub fn position(&self) -> &Point3<f32> {
        &self.position
    }

    pub fn normal(&self) -> &Vector3<f32> {
        self.normal.as_ref()
    }

    /// Classify a point against the plane.
    ///
    /// The sign is taken from the normalized offset to the plane origin. A dot
    /// product of exactly zero counts as [`Side::Negative`].
    pub fn classify(&self, point: &Point3<f32>) -> Side {
        let delta = normalize_or_zero(&(point - self.position));
        if self.normal.dot(&delta) > 0.0 {
            Side::Positive
        } else {
            Side::Negative
        }
    }

    /// Signed distance from the plane along its normal
    pub fn signed_distance(&self, point: &Point3<f32>) -> f32 {
        self.normal.dot(&(point - self.position))
    }

    /// Distance along a ray to the plane.
    ///
    /// Returns `f32::INFINITY` when the ray is parallel to the plane or the
    /// quotient is otherwise not finite.
    pub fn intersect(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> f32 {
        let denom = self.normal.dot(direction);
        if denom == 0.0 {
            return f32::INFINITY;
        }
        let distance = self.normal.dot(&(self.position - origin)) / denom;
        if distance.is_finite() {
            distance
        } else {
            f32::INFINITY
        }
    }

    /// Re-express a world-space plane in the local space of a mesh.
    ///
    /// The position is moved as a point; the normal is carried by the
    /// inverse-transpose of the linear part so non-uniform scale keeps it
    /// perpendicular to the surface.
    pub fn to_local(&self, world_to_local: &Matrix4<f32>) -> CutResult<Plane> {
        let position = world_to_local.transform_point(&self.position);
        let linear: Matrix3<f32> = world_to_local.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .ok_or(CutError::SingularTransform)?
            .transpose();
        Plane::try_new(position, normal_matrix * self.normal.into_inner())
    }
}
