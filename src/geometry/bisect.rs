// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane bisection of a mesh snapshot into two capped pieces
//!
//! Every triangle is classified against the plane. Triangles wholly on one
//! side are copied to that side; straddling triangles are split into two
//! triangles per side, producing two new vertices on the plane. The new
//! vertices are then chained into boundary loops and each loop is closed with
//! a fan of cap triangles on both pieces.

use super::accumulator::{CornerVertex, SideAccumulator};
use super::capping::{build_loops, fill_cap};
use super::{MeshSnapshot, Plane, Side};
use crate::error::{CutError, CutResult};
use crate::utils::math::{calculate_triangle_normal, lerp_point, lerp_vector2, lerp_vector3, normalize_or_zero};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The two closed pieces produced by a cut
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPieces {
    /// Piece on the side the plane normal points to
    pub positive: MeshSnapshot,
    /// Piece behind the plane, including points exactly on it
    pub negative: MeshSnapshot,
    /// Number of boundary loops that were capped
    pub loops: usize,
}

/// Counters describing one bisection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BisectionStats {
    pub copied_positive: usize,
    pub copied_negative: usize,
    pub split_triangles: usize,
    pub new_vertices: usize,
    pub loops: usize,
    pub cap_triangles: usize,
}

/// Working state of a single cut
struct CutState<'a> {
    source: &'a MeshSnapshot,
    plane: &'a Plane,
    sides: Vec<Side>,
    positive: SideAccumulator,
    negative: SideAccumulator,
    new_vertices: Vec<CornerVertex>,
    stats: BisectionStats,
}

/// Stateless entry point for bisecting snapshots
pub struct Bisector;

impl Bisector {
    /// Cut `source` along `plane`.
    ///
    /// Fails with [`CutError::NoIntersection`] when every vertex lies on one
    /// side and with [`CutError::InvalidSnapshot`] when the input breaks its
    /// invariants.
    pub fn run(source: &MeshSnapshot, plane: &Plane) -> CutResult<CutPieces> {
        Self::run_with_stats(source, plane).map(|(pieces, _)| pieces)
    }

    pub fn run_with_stats(source: &MeshSnapshot, plane: &Plane) -> CutResult<(CutPieces, BisectionStats)> {
        source.validate()?;

        let mut state = CutState::new(source, plane);
        state.split_or_copy();

        if state.positive.is_empty() || state.negative.is_empty() {
            debug!(
                vertices = source.vertex_count(),
                triangles = source.triangle_count(),
                "Plane misses mesh, nothing to cut"
            );
            return Err(CutError::NoIntersection);
        }

        state.cap();
        let (pieces, stats) = state.finalize();

        debug!(
            copied_positive = stats.copied_positive,
            copied_negative = stats.copied_negative,
            split = stats.split_triangles,
            loops = stats.loops,
            cap_triangles = stats.cap_triangles,
            "Bisection complete"
        );

        Ok((pieces, stats))
    }
}

impl<'a> CutState<'a> {
    fn new(source: &'a MeshSnapshot, plane: &'a Plane) -> Self {
        let submeshes = source.submesh_count();
        let skinned = source.is_skinned();
        Self {
            source,
            plane,
            sides: source.vertices.iter().map(|v| plane.classify(v)).collect(),
            positive: SideAccumulator::new(submeshes, skinned),
            negative: SideAccumulator::new(submeshes, skinned),
            new_vertices: Vec::new(),
            stats: BisectionStats::default(),
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideAccumulator {
        match side {
            Side::Positive => &mut self.positive,
            Side::Negative => &mut self.negative,
        }
    }

    fn split_or_copy(&mut self) {
        let source = self.source;
        for (submesh, corners) in source.triangle_iter() {
            let sides = corners.map(|i| self.sides[i as usize]);

            if sides[0] == sides[1] && sides[0] == sides[2] {
                match sides[0] {
                    Side::Positive => self.stats.copied_positive += 1,
                    Side::Negative => self.stats.copied_negative += 1,
                }
                self.side_mut(sides[0]).add_source_triangle(source, corners, submesh);
            } else {
                self.split_triangle(submesh, corners, sides);
            }
        }
    }

    /// Split a straddling triangle into two triangles on each side.
    ///
    /// The first vertex met on each side fills both of that side's slots; a
    /// second vertex on the same side replaces the second slot. On the side
    /// holding a lone vertex the second emitted triangle is therefore
    /// degenerate.
    fn split_triangle(&mut self, submesh: usize, corners: [u32; 3], sides: [Side; 3]) {
        let mut positive = Vec::with_capacity(2);
        let mut negative = Vec::with_capacity(2);
        for (&index, &side) in corners.iter().zip(sides.iter()) {
            match side {
                Side::Positive => positive.push(index as usize),
                Side::Negative => negative.push(index as usize),
            }
        }
        let slots = |found: &[usize]| [found[0], found[found.len() - 1]];
        if positive.is_empty() || negative.is_empty() {
            return;
        }
        let (positive, negative) = (slots(&positive), slots(&negative));

        let new0 = self.edge_vertex(positive[0], negative[0]);
        let new1 = self.edge_vertex(positive[1], negative[1]);
        self.new_vertices.push(new0);
        self.new_vertices.push(new1);
        self.stats.split_triangles += 1;
        self.stats.new_vertices += 2;

        let source = self.source;
        let face = calculate_triangle_normal(
            &source.vertices[corners[0] as usize],
            &source.vertices[corners[1] as usize],
            &source.vertices[corners[2] as usize],
        );
        let (reference0, reference1) = if face == Vector3::zeros() {
            (new0.normal, new1.normal)
        } else {
            (face, face)
        };

        for (side, pair) in [(Side::Positive, positive), (Side::Negative, negative)] {
            let p0 = CornerVertex::from_source(source, pair[0]);
            let p1 = CornerVertex::from_source(source, pair[1]);
            let accumulator = self.side_mut(side);
            accumulator.add_triangle([p0, new0, new1], &reference0, submesh);
            accumulator.add_triangle([p0, p1, new1], &reference1, submesh);
        }
    }

    /// Interpolate a new vertex where the edge `from -> to` meets the plane.
    ///
    /// The ray always starts at the positive endpoint, so two triangles that
    /// share the edge compute bit-identical positions.
    fn edge_vertex(&self, from: usize, to: usize) -> CornerVertex {
        let a = CornerVertex::from_source(self.source, from);
        let b = CornerVertex::from_source(self.source, to);

        let offset = b.position - a.position;
        let length = offset.norm();
        let distance = self.plane.intersect(&a.position, &normalize_or_zero(&offset));
        let t = if length > 0.0 {
            (distance / length).clamp(0.0, 1.0)
        } else {
            0.0
        };

        CornerVertex {
            position: lerp_point(&a.position, &b.position, t),
            normal: lerp_vector3(&a.normal, &b.normal, t),
            uv: lerp_vector2(&a.uv, &b.uv, t),
            bone_weight: match (a.bone_weight, b.bone_weight) {
                (Some(wa), Some(wb)) => Some(wa.lerp(&wb, t)),
                _ => None,
            },
        }
    }

    fn cap(&mut self) {
        let loops = build_loops(&self.new_vertices);
        self.stats.loops = loops.len();
        for boundary in &loops {
            self.stats.cap_triangles += fill_cap(boundary, self.plane, &mut self.positive, &mut self.negative);
        }
    }

    fn finalize(self) -> (CutPieces, BisectionStats) {
        let mut positive = self.positive.into_snapshot();
        let mut negative = self.negative.into_snapshot();
        positive.bind_poses = self.source.bind_poses.clone();
        negative.bind_poses = self.source.bind_poses.clone();

        let pieces = CutPieces {
            positive,
            negative,
            loops: self.stats.loops,
        };
        (pieces, self.stats)
    }
}
