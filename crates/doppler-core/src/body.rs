use glam::Vec2;

/// A point body moving with constant velocity between control inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Body {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Explicit Euler step: `position += velocity * dt`.
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Add a control delta to the velocity, clamping each component to
    /// `[-max_speed, max_speed]`.
    pub fn accelerate(&mut self, delta: Vec2, max_speed: f32) {
        let limit = Vec2::splat(max_speed);
        self.velocity = (self.velocity + delta).clamp(-limit, limit);
    }
}

/// The emitting body. `frequency` is signed and deliberately unclamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Source {
    pub body: Body,
    /// Emission rate in wavefronts per second.
    pub frequency: f32,
}

impl Source {
    pub fn new(body: Body, frequency: f32) -> Self {
        Self { body, frequency }
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_moves_by_velocity_times_dt() {
        let mut body = Body::new(Vec2::new(100.0, 200.0), Vec2::new(34.0, -10.0));
        body.integrate(0.5);
        assert_eq!(body.position, Vec2::new(117.0, 195.0));
        assert_eq!(body.velocity, Vec2::new(34.0, -10.0));
    }

    #[test]
    fn test_stationary_body_does_not_drift() {
        let mut body = Body::new(Vec2::new(1.0, 2.0), Vec2::ZERO);
        for _ in 0..1000 {
            body.integrate(1.0 / 60.0);
        }
        assert_eq!(body.position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_accelerate_clamps_each_axis() {
        let mut body = Body::new(Vec2::ZERO, Vec2::ZERO);
        for _ in 0..100 {
            body.accelerate(Vec2::new(34.0, -34.0), 1020.0);
        }
        assert_eq!(body.velocity, Vec2::new(1020.0, -1020.0));

        body.accelerate(Vec2::new(-34.0, 0.0), 1020.0);
        assert_eq!(body.velocity, Vec2::new(986.0, -1020.0));
    }
}
