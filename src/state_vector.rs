use nalgebra::Vector3;

/// Geocentric state vector in the working units: position in AU,
/// velocity in AU/day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector { position, velocity }
    }

    pub fn from_components(components: [f64; 6]) -> Self {
        StateVector {
            position: Vector3::new(components[0], components[1], components[2]),
            velocity: Vector3::new(components[3], components[4], components[5]),
        }
    }

    pub fn to_components(self) -> [f64; 6] {
        [
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        ]
    }

    /// Component `i` in 0..6 (positions first, then velocities).
    pub fn component(&self, i: usize) -> f64 {
        match i {
            0..=2 => self.position[i],
            3..=5 => self.velocity[i - 3],
            _ => panic!("state vector component index out of range: {i}"),
        }
    }

    /// Componentwise difference `self - other`.
    pub fn minus(&self, other: &StateVector) -> StateVector {
        StateVector {
            position: self.position - other.position,
            velocity: self.velocity - other.velocity,
        }
    }

    pub fn scaled(&self, factor: f64) -> StateVector {
        StateVector {
            position: self.position * factor,
            velocity: self.velocity * factor,
        }
    }

    /// Squared norm over all six components.
    pub fn norm_squared(&self) -> f64 {
        self.position.norm_squared() + self.velocity.norm_squared()
    }
}
