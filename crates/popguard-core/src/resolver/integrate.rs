//! Force integration.
//!
//! The force pass only produces forces; an [`Integrator`] turns them into
//! velocity and position changes. Hosts with their own physics engine plug
//! in here. Headless runs use [`EulerIntegrator`].

use glam::Vec2;

use crate::entity::Body;

/// Applies a force to a body and advances it by one tick.
pub trait Integrator {
    /// Applies `force` for `dt` seconds, then moves the body.
    fn integrate(&self, body: &mut Body, force: Vec2, dt: f32);

    /// Moves a body that receives no force (projectiles).
    fn advance(&self, body: &mut Body, dt: f32) {
        body.position += body.velocity * dt;
    }
}

/// Semi-implicit Euler integration with linear damping.
///
/// `v += f / m * dt; v *= 1 / (1 + damping * dt); p += v * dt`
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use popguard_core::entity::Body;
/// use popguard_core::resolver::{EulerIntegrator, Integrator};
///
/// let integrator = EulerIntegrator::new(1.0, 0.0);
/// let mut body = Body::at(Vec2::ZERO);
/// integrator.integrate(&mut body, Vec2::new(2.0, 0.0), 0.5);
/// assert_eq!(body.velocity, Vec2::new(1.0, 0.0));
/// assert_eq!(body.position, Vec2::new(0.5, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerIntegrator {
    mass: f32,
    linear_damping: f32,
}

impl EulerIntegrator {
    /// Creates an integrator. Non-positive masses are treated as 1.
    #[must_use]
    pub fn new(mass: f32, linear_damping: f32) -> Self {
        Self {
            mass: if mass > 0.0 { mass } else { 1.0 },
            linear_damping: linear_damping.max(0.0),
        }
    }

    /// Returns the body mass.
    #[must_use]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Returns the linear damping coefficient.
    #[must_use]
    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }
}

impl Default for EulerIntegrator {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Integrator for EulerIntegrator {
    fn integrate(&self, body: &mut Body, force: Vec2, dt: f32) {
        body.velocity += force / self.mass * dt;
        body.velocity *= 1.0 / (1.0 + self.linear_damping * dt);
        body.position += body.velocity * dt;
    }
}
