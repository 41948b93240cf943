// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector2, Vector3};

/// Normalize a vector, returning zero for a zero-length input instead of NaN
pub fn normalize_or_zero(v: &Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// Unit normal of a triangle, or zero when the triangle has no area
pub fn calculate_triangle_normal(
    p0: &Point3<f32>,
    p1: &Point3<f32>,
    p2: &Point3<f32>,
) -> Vector3<f32> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    normalize_or_zero(&v1.cross(&v2))
}

/// Orientation vector of a triangle built from its normalized edges.
///
/// Only the direction matters; callers compare it against a reference normal
/// with a dot product to decide whether to reverse the winding.
pub fn winding_normal(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Vector3<f32> {
    normalize_or_zero(&(p1 - p0)).cross(&normalize_or_zero(&(p2 - p0)))
}

/// Area of a triangle
pub fn triangle_area(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> f32 {
    (p1 - p0).cross(&(p2 - p0)).norm() * 0.5
}

/// Check if two floats are approximately equal
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp_point(a: &Point3<f32>, b: &Point3<f32>, t: f32) -> Point3<f32> {
    a + (b - a) * t
}

pub fn lerp_vector3(a: &Vector3<f32>, b: &Vector3<f32>, t: f32) -> Vector3<f32> {
    a + (b - a) * t
}

pub fn lerp_vector2(a: &Vector2<f32>, b: &Vector2<f32>, t: f32) -> Vector2<f32> {
    a + (b - a) * t
}
