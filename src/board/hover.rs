//! Spring-less hover suspension.
//!
//! Every probe is driven toward a point `target_height * height_scalar` above the surface
//! it sees. The desired probe speed ramps linearly to zero over `damping_distance`, so the
//! controller matches velocity rather than modelling a spring, and the corrective
//! acceleration is projected onto the hit normal so it never pushes sideways.

use nalgebra::{Point3, Unit, Vector3};
use tracing::trace;

use super::body::{BoardBody, BodyState, CollisionQuery, ForceMode};
use super::constants::physics as consts;
use super::math::{from_array, normalize_or, LOCAL_UP};
use super::surface::{ProbeHit, ProbePose, SurfaceSampler, SurfaceState};
use crate::config::{ConfigError, HoverConfig};

/// Hover attachment point on the board, with its finite-difference velocity.
#[derive(Debug, Clone)]
pub struct HoverProbe {
    pub name: String,
    /// Body-local attachment point.
    pub offset: Point3<f32>,
    /// Body-local up of the probe frame; the probe casts along its negation.
    pub up: Vector3<f32>,
    previous_position: Option<Point3<f32>>,
    velocity: Vector3<f32>,
}

impl HoverProbe {
    pub fn new(name: impl Into<String>, offset: Point3<f32>, up: Vector3<f32>) -> Self {
        Self {
            name: name.into(),
            offset,
            up: normalize_or(&up, LOCAL_UP),
            previous_position: None,
            velocity: Vector3::zeros(),
        }
    }

    pub fn pose(&self, body: &BodyState) -> ProbePose {
        ProbePose {
            position: body.transform_point(&self.offset),
            up: Unit::new_normalize(body.rotation * self.up),
        }
    }

    /// Observed world velocity of the attachment point.
    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    fn observe(&mut self, position: Point3<f32>, dt: f32) {
        if let Some(prev) = self.previous_position {
            if dt > consts::EPSILON {
                self.velocity = (position - prev) / dt;
            }
        }
        self.previous_position = Some(position);
    }

    pub fn reset(&mut self) {
        self.previous_position = None;
        self.velocity = Vector3::zeros();
    }
}

#[derive(Debug, Clone)]
pub struct HoverController {
    probes: Vec<HoverProbe>,
    sampler: SurfaceSampler,
    target_height: f32,
    damping_distance: f32,
    hover_speed: f32,
    height_scalar: f32,
    enabled: bool,
    surface: SurfaceState,
    hits: Vec<Option<ProbeHit>>,
}

impl HoverController {
    /// Builds the controller; rejects configurations that would divide by zero at runtime.
    pub fn new(config: &HoverConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let probes: Vec<HoverProbe> = config
            .probes
            .iter()
            .map(|p| HoverProbe::new(p.name.clone(), Point3::from(from_array(p.offset)), from_array(p.up)))
            .collect();
        let hits = vec![None; probes.len()];

        Ok(Self {
            probes,
            sampler: SurfaceSampler::new(config.probe_distance, config.probe_start_offset, config.probe_shape),
            target_height: config.target_height,
            damping_distance: config.damping_distance,
            hover_speed: config.max_speed.map_or(config.hover_speed, |max| config.hover_speed.min(max)),
            height_scalar: 1.0,
            enabled: true,
            surface: SurfaceState::unsupported(),
            hits,
        })
    }

    /// Samples the surface and, when enabled, pushes one corrective force per grounded probe.
    pub fn tick<B, Q>(&mut self, body: &mut B, query: &Q, dt: f32) -> SurfaceState
    where
        B: BoardBody + ?Sized,
        Q: CollisionQuery + ?Sized,
    {
        let state = *body.state();
        let poses: Vec<ProbePose> = self
            .probes
            .iter_mut()
            .map(|probe| {
                let pose = probe.pose(&state);
                probe.observe(pose.position, dt);
                pose
            })
            .collect();

        let (fused, hits) = self.sampler.sample(query, &poses);
        if fused.is_supported != self.surface.is_supported {
            trace!(supported = fused.is_supported, "hover support changed");
        }
        self.surface = if fused.is_supported {
            fused
        } else {
            // Keep last tick's normal while airborne so lean/turn math stays continuous.
            SurfaceState {
                is_supported: false,
                normal: self.surface.normal,
                closest_point: fused.closest_point,
            }
        };
        self.hits = hits;

        if self.enabled {
            for (i, pose) in poses.iter().enumerate() {
                let Some(hit) = self.hits[i] else {
                    continue;
                };
                let accel = self.probe_acceleration(pose, &hit, self.probes[i].velocity);
                body.add_force_at_point(accel, pose.position, ForceMode::Acceleration);
            }
        }

        self.surface
    }

    /// Corrective acceleration for one probe, already projected on the hit normal.
    pub fn probe_acceleration(&self, pose: &ProbePose, hit: &ProbeHit, probe_velocity: Vector3<f32>) -> Vector3<f32> {
        let target = hit.point + hit.normal.into_inner() * self.effective_target_height();
        let to_target = target - pose.position;
        let desired_velocity = normalize_or(&to_target, Vector3::zeros()) * self.desired_probe_speed(to_target.norm());
        let accel = desired_velocity - probe_velocity;
        let n = hit.normal.into_inner();
        n * accel.dot(&n)
    }

    /// `hover_speed * clamp01(distance / damping_distance)`.
    pub fn desired_probe_speed(&self, distance_to_target: f32) -> f32 {
        self.hover_speed * (distance_to_target / self.damping_distance).clamp(0.0, 1.0)
    }

    pub fn effective_target_height(&self) -> f32 {
        self.target_height * self.height_scalar
    }

    pub fn is_grounded(&self) -> bool {
        self.surface.is_supported
    }

    pub fn surface_normal(&self) -> Vector3<f32> {
        self.surface.normal.into_inner()
    }

    pub fn surface(&self) -> &SurfaceState {
        &self.surface
    }

    pub fn probe_hits(&self) -> &[Option<ProbeHit>] {
        &self.hits
    }

    pub fn probes(&self) -> &[HoverProbe] {
        &self.probes
    }

    pub fn height_scalar(&self) -> f32 {
        self.height_scalar
    }

    pub fn set_height_scalar(&mut self, scalar: f32) {
        self.height_scalar = if scalar.is_nan() { 1.0 } else { scalar.clamp(0.0, 1.0) };
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling stops force output only; sampling continues so grounding stays current.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn reset(&mut self) {
        for probe in &mut self.probes {
            probe.reset();
        }
        self.height_scalar = 1.0;
        self.enabled = true;
        self.surface = SurfaceState::unsupported();
        self.hits.iter_mut().for_each(|h| *h = None);
    }
}
