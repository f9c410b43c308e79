//! Headless corridor world for training and evaluating drone controllers.
//!
//! The corridor is a tube of fixed radius around a gently winding
//! centerline that extends along the +x axis. Drones fly with a crude
//! kinematic model (yaw, pitch, thrust, no inertia) and sense the walls
//! through ray-marched clearance probes. This is deliberately not a physics
//! engine; it only has to exercise the same contract a real scene would:
//! sensors in, actions out, progress and collisions back.
//!
//! Sensor conventions:
//!
//! - sensors 0..9: obstacle clearance along nine body-relative rays,
//!   normalized to [0, 1] where 1.0 means nothing within range
//! - sensor 9: alignment with the corridor ahead, mapped to [0, 1]

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use neurodrone_evolution::Environment;
use rand::Rng;

/// Sensor vector width; must match the controller layout's input width.
pub(crate) const SENSOR_COUNT: usize = 10;

const RAY_RANGE: f32 = 20.0;
const RAY_STEPS: usize = 20;
const TUBE_RADIUS: f32 = 4.0;
const LOOKAHEAD: f32 = 2.0;

const TURN_RATE: f32 = 1.5;
const CLIMB_RATE: f32 = 1.5;
const MAX_PITCH: f32 = 1.2;
/// Pitched probe rays look 30 degrees above and below the nose.
const PITCH_RAY: f32 = PI / 6.0;
/// Half of top speed: thrust output -1..1 maps to 0..2× this.
const SPEED_SCALE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Vec3 {
    const UP: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };
    const DOWN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: -1.0,
    };

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len > f32::EPSILON).then(|| self.scale(1.0 / len))
    }
}

/// Unit vector for a yaw/pitch pair (yaw 0 faces +x, pitch 0 is level).
fn direction(yaw: f32, pitch: f32) -> Vec3 {
    Vec3 {
        x: pitch.cos() * yaw.cos(),
        y: pitch.cos() * yaw.sin(),
        z: pitch.sin(),
    }
}

/// One sinusoidal component of the centerline.
#[derive(Debug, Clone, Copy)]
struct Bend {
    amplitude: f32,
    frequency: f32,
    phase: f32,
}

impl Bend {
    fn sample(self, x: f32) -> f32 {
        self.amplitude * (self.frequency * x + self.phase).sin()
    }
}

#[derive(Debug, Clone, Copy)]
struct Drone {
    position: Vec3,
    yaw: f32,
    pitch: f32,
}

/// The winding-tube environment.
///
/// The corridor shape is fixed for the lifetime of the value, so every
/// generation flies the same track; [`Environment::reset`] respawns the
/// drones at the corridor mouth.
#[derive(Debug, Clone)]
pub(crate) struct Corridor {
    bends_y: [Bend; 3],
    bends_z: [Bend; 3],
    drones: Vec<Drone>,
}

impl Corridor {
    /// A corridor with seeded random bends.
    pub(crate) fn generate<R>(population_size: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut bend = |_| Bend {
            amplitude: rng.random_range(0.5..2.0),
            frequency: rng.random_range(0.01..0.05),
            phase: rng.random_range(0.0..TAU),
        };
        let bends_y = std::array::from_fn(&mut bend);
        let bends_z = std::array::from_fn(&mut bend);
        let mut corridor = Self {
            bends_y,
            bends_z,
            drones: Vec::new(),
        };
        corridor.reset(population_size);
        corridor
    }

    /// A perfectly straight corridor; useful as a first track and in tests.
    pub(crate) fn straight(population_size: usize) -> Self {
        let flat = Bend {
            amplitude: 0.0,
            frequency: 0.0,
            phase: 0.0,
        };
        let mut corridor = Self {
            bends_y: [flat; 3],
            bends_z: [flat; 3],
            drones: Vec::new(),
        };
        corridor.reset(population_size);
        corridor
    }

    fn center_y(&self, x: f32) -> f32 {
        self.bends_y.iter().map(|b| b.sample(x)).sum()
    }

    fn center_z(&self, x: f32) -> f32 {
        self.bends_z.iter().map(|b| b.sample(x)).sum()
    }

    /// A point is wall if it lies behind the corridor mouth or outside the
    /// tube radius around the centerline.
    fn is_wall(&self, point: Vec3) -> bool {
        if point.x < 0.0 {
            return true;
        }
        let dy = point.y - self.center_y(point.x);
        let dz = point.z - self.center_z(point.x);
        (dy * dy + dz * dz).sqrt() > TUBE_RADIUS
    }

    /// Marches a ray outward and reports the normalized distance to the
    /// first wall sample, or 1.0 when the whole range is clear.
    #[expect(clippy::cast_precision_loss)]
    fn clearance(&self, origin: Vec3, ray: Vec3) -> f32 {
        for step in 1..=RAY_STEPS {
            let t = RAY_RANGE * step as f32 / RAY_STEPS as f32;
            if self.is_wall(origin.add(ray.scale(t))) {
                return t / RAY_RANGE;
            }
        }
        1.0
    }

    /// How well the drone faces the corridor a short distance ahead,
    /// mapped from [-1, 1] to [0, 1].
    fn alignment(&self, drone: &Drone) -> f32 {
        let ahead = drone.position.x + LOOKAHEAD;
        let target = Vec3 {
            x: ahead,
            y: self.center_y(ahead),
            z: self.center_z(ahead),
        };
        let Some(to_target) = target.sub(drone.position).normalized() else {
            return 0.5;
        };
        let facing = direction(drone.yaw, drone.pitch).dot(to_target);
        (facing + 1.0) / 2.0
    }

    fn spawn(&self) -> Drone {
        Drone {
            position: Vec3 {
                x: 0.0,
                y: self.center_y(0.0),
                z: self.center_z(0.0),
            },
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl Environment for Corridor {
    fn sensor_len(&self) -> usize {
        SENSOR_COUNT
    }

    fn sense(&self, index: usize) -> Vec<f32> {
        let drone = &self.drones[index];
        let rays = [
            direction(drone.yaw, drone.pitch),
            direction(drone.yaw - FRAC_PI_4, drone.pitch),
            direction(drone.yaw + FRAC_PI_4, drone.pitch),
            direction(drone.yaw - FRAC_PI_2, 0.0),
            direction(drone.yaw + FRAC_PI_2, 0.0),
            Vec3::UP,
            Vec3::DOWN,
            direction(drone.yaw, drone.pitch + PITCH_RAY),
            direction(drone.yaw, drone.pitch - PITCH_RAY),
        ];

        let mut sensors = Vec::with_capacity(SENSOR_COUNT);
        for ray in rays {
            sensors.push(self.clearance(drone.position, ray));
        }
        sensors.push(self.alignment(drone));
        sensors
    }

    fn apply(&mut self, index: usize, actions: &[f32], delta: f32) {
        let turn = actions.first().copied().unwrap_or(0.0);
        let climb = actions.get(1).copied().unwrap_or(0.0);
        let thrust = actions.get(2).copied().unwrap_or(0.0);

        let drone = &mut self.drones[index];
        drone.yaw += turn.clamp(-1.0, 1.0) * TURN_RATE * delta;
        drone.pitch = (drone.pitch + climb.clamp(-1.0, 1.0) * CLIMB_RATE * delta)
            .clamp(-MAX_PITCH, MAX_PITCH);

        // Thrust output -1 hovers, +1 is full speed, matching the tanh
        // output range of the controllers.
        let speed = (thrust.clamp(-1.0, 1.0) + 1.0) * SPEED_SCALE;
        let step = direction(drone.yaw, drone.pitch).scale(speed * delta);
        drone.position = drone.position.add(step);
    }

    fn progress(&self, index: usize) -> f32 {
        self.drones[index].position.x
    }

    fn collided(&self, index: usize) -> bool {
        self.is_wall(self.drones[index].position)
    }

    fn reset(&mut self, population_size: usize) {
        self.drones = (0..population_size).map(|_| self.spawn()).collect();
    }
}
