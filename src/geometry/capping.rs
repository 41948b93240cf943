// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary loop reconstruction and cap triangulation
//!
//! Every split triangle contributes one segment of two new vertices lying on
//! the plane. Segments from neighbouring triangles meet at bit-identical
//! positions, so loops are recovered by chaining segments through an exact
//! position lookup. Each loop is then closed by a triangle fan around its
//! centroid, emitted once per piece with opposite facing.

use super::accumulator::{CornerVertex, SideAccumulator};
use super::{BoneWeight, Plane};
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector2, Vector3};

/// Exact bit pattern of a position, used as the loop join key
type PositionKey = [u32; 3];

fn position_key(point: &Point3<f32>) -> PositionKey {
    [point.x.to_bits(), point.y.to_bits(), point.z.to_bits()]
}

/// Ordered ring of new vertices bounding one hole in the cut surface
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLoop {
    pub vertices: Vec<CornerVertex>,
}

impl BoundaryLoop {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Mean position of the loop vertices
    pub fn centroid(&self) -> Point3<f32> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.position.coords);
        Point3::from(sum / self.vertices.len() as f32)
    }

    /// Blended influence for the centroid, `None` when the loop carries no
    /// skinning
    pub fn centroid_weight(&self) -> Option<BoneWeight> {
        if self.vertices.iter().any(|v| v.bone_weight.is_none()) {
            return None;
        }
        Some(BoneWeight::blend(
            self.vertices.iter().filter_map(|v| v.bone_weight.as_ref()),
        ))
    }

    /// Cap texture coordinates of every loop vertex, including the auxiliary
    /// depth coordinate along the plane normal
    pub fn cap_coordinates(&self, plane: &Plane) -> Vec<Vector3<f32>> {
        let frame = CapFrame::new(plane.normal());
        let centroid = self.centroid();
        self.vertices
            .iter()
            .map(|v| frame.project(&(v.position - centroid)))
            .collect()
    }
}

/// Planar basis used to lay out cap UVs
#[derive(Debug, Clone, Copy)]
struct CapFrame {
    left: Vector3<f32>,
    up: Vector3<f32>,
    normal: Vector3<f32>,
}

impl CapFrame {
    fn new(normal: &Vector3<f32>) -> Self {
        let up = Vector3::new(normal.y, -normal.x, normal.z);
        Self {
            left: normal.cross(&up),
            up,
            normal: *normal,
        }
    }

    fn project(&self, offset: &Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            0.5 + offset.dot(&self.left),
            0.5 + offset.dot(&self.up),
            0.5 + offset.dot(&self.normal),
        )
    }
}

/// Chain the new-vertex pool into boundary loops.
///
/// The pool is read as segments `(pool[2k], pool[2k + 1])`. A trailing odd
/// vertex is ignored.
pub fn build_loops(pool: &[CornerVertex]) -> Vec<BoundaryLoop> {
    let usable = pool.len() - pool.len() % 2;
    let pool = &pool[..usable];

    let mut endpoints: AHashMap<PositionKey, Vec<usize>> = AHashMap::with_capacity(pool.len());
    for (i, vertex) in pool.iter().enumerate() {
        endpoints.entry(position_key(&vertex.position)).or_default().push(i);
    }

    let mut consumed: AHashSet<PositionKey> = AHashSet::with_capacity(pool.len());
    let mut loops = Vec::new();

    for seed in (0..pool.len()).step_by(2) {
        if consumed.contains(&position_key(&pool[seed].position)) {
            continue;
        }

        let mut members = vec![seed, seed + 1];
        consumed.insert(position_key(&pool[seed].position));
        consumed.insert(position_key(&pool[seed + 1].position));

        loop {
            let tail = members[members.len() - 1];
            let next = endpoints
                .get(&position_key(&pool[tail].position))
                .and_then(|ends| {
                    ends.iter()
                        .map(|&end| end ^ 1)
                        .find(|&other| !consumed.contains(&position_key(&pool[other].position)))
                });
            match next {
                Some(other) => {
                    consumed.insert(position_key(&pool[other].position));
                    members.push(other);
                }
                None => break,
            }
        }

        loops.push(BoundaryLoop {
            vertices: members.into_iter().map(|i| pool[i]).collect(),
        });
    }

    loops
}

/// Close one loop on both pieces with a fan around its centroid.
///
/// Each piece gets the same triangles with opposite facing: the positive
/// piece's cap faces `-normal`, the negative piece's cap faces `+normal`.
/// Returns the number of triangles added per piece.
pub fn fill_cap(
    boundary: &BoundaryLoop,
    plane: &Plane,
    positive: &mut SideAccumulator,
    negative: &mut SideAccumulator,
) -> usize {
    let count = boundary.len();
    if count == 0 {
        return 0;
    }

    let normal = *plane.normal();
    let centroid = boundary.centroid();
    let center_weight = boundary.centroid_weight();
    let coordinates = boundary.cap_coordinates(plane);

    for (side, facing) in [(&mut *positive, -normal), (&mut *negative, normal)] {
        let cap = side.cap_submesh();
        let center = CornerVertex {
            position: centroid,
            normal: facing,
            uv: Vector2::new(0.5, 0.5),
            bone_weight: center_weight,
        };

        for i in 0..count {
            let j = (i + 1) % count;
            let rim = |k: usize| CornerVertex {
                position: boundary.vertices[k].position,
                normal: facing,
                uv: coordinates[k].xy(),
                bone_weight: boundary.vertices[k].bone_weight,
            };
            side.add_triangle([rim(i), rim(j), center], &facing, cap);
        }
    }

    count
}
