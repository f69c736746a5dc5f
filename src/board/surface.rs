//! Multi-probe ground sampling.

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::body::{CollisionQuery, SurfaceHit};
use super::constants::physics as consts;
use super::math::WORLD_UP;

/// Cast primitive used by every probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeShape {
    Ray,
    Sphere { radius: f32 },
}

impl Default for ProbeShape {
    fn default() -> Self {
        ProbeShape::Ray
    }
}

/// World-space probe location and its cast axis for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbePose {
    pub position: Point3<f32>,
    /// Probe up; casts go along its negation.
    pub up: Unit<Vector3<f32>>,
}

/// Per-probe result, with distance measured from the probe itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub point: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
    pub distance: f32,
}

/// Fused support surface under the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    pub is_supported: bool,
    pub normal: Unit<Vector3<f32>>,
    pub closest_point: Point3<f32>,
}

impl SurfaceState {
    pub fn unsupported() -> Self {
        Self {
            is_supported: false,
            normal: Unit::new_unchecked(WORLD_UP),
            closest_point: Point3::origin(),
        }
    }
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self::unsupported()
    }
}

/// Fires one cast per probe and fuses the hits. Pure function of geometry and probe pose.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSampler {
    pub max_distance: f32,
    /// Casts begin this far up the probe axis so a probe resting inside a collider
    /// still sees the collider's surface.
    pub start_offset: f32,
    pub shape: ProbeShape,
}

impl SurfaceSampler {
    pub fn new(max_distance: f32, start_offset: f32, shape: ProbeShape) -> Self {
        Self {
            max_distance,
            start_offset: start_offset.max(0.0),
            shape,
        }
    }

    /// Casts from a single probe.
    pub fn sample_probe<Q: CollisionQuery + ?Sized>(&self, query: &Q, probe: &ProbePose) -> Option<ProbeHit> {
        let origin = probe.position + probe.up.into_inner() * self.start_offset;
        let down = -probe.up;
        let reach = self.max_distance + self.start_offset;

        let hit: SurfaceHit = match self.shape {
            ProbeShape::Ray => query.cast_ray(origin, down, reach)?,
            ProbeShape::Sphere { radius } => query.cast_sphere(origin, radius, down, reach)?,
        };

        // Still zero-length after the offset: the cast began inside geometry and the
        // normal is meaningless.
        if hit.distance <= consts::EPSILON {
            return None;
        }

        Some(ProbeHit {
            point: hit.point,
            normal: hit.normal,
            distance: hit.distance - self.start_offset,
        })
    }

    /// Casts from every probe; `hits[i]` corresponds to `probes[i]`.
    pub fn sample<Q: CollisionQuery + ?Sized>(
        &self,
        query: &Q,
        probes: &[ProbePose],
    ) -> (SurfaceState, Vec<Option<ProbeHit>>) {
        let hits: Vec<Option<ProbeHit>> = probes.iter().map(|p| self.sample_probe(query, p)).collect();
        let surface = fuse(probes, &hits);
        (surface, hits)
    }
}

/// Aggregate normal is the normalized sum of hit normals; closest point is the nearest hit.
pub fn fuse(probes: &[ProbePose], hits: &[Option<ProbeHit>]) -> SurfaceState {
    let mut normal_sum = Vector3::zeros();
    let mut closest: Option<&ProbeHit> = None;
    for hit in hits.iter().flatten() {
        normal_sum += hit.normal.into_inner();
        if closest.map_or(true, |c| hit.distance < c.distance) {
            closest = Some(hit);
        }
    }

    let magnitude = normal_sum.norm();
    match closest {
        Some(c) if magnitude > consts::EPSILON => SurfaceState {
            is_supported: true,
            normal: Unit::new_unchecked(normal_sum / magnitude),
            closest_point: c.point,
        },
        _ => {
            let mut state = SurfaceState::unsupported();
            if let Some(p) = probes.first() {
                state.closest_point = p.position;
            }
            state
        }
    }
}
