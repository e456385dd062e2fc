//! The fixed table of celestial bodies.

use serde::{Deserialize, Serialize};

/// Orbit radius of Earth, the reference for every other body's radius.
pub const EARTH_ORBIT_RADIUS: f64 = 80.0;

/// A celestial body in the animated system.
///
/// Everything static about a body lives in the accessor table below;
/// derived state (position, rotation angle) is owned by
/// [`SolarSystem`](crate::system::SolarSystem).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
}

impl Body {
    /// Every body, in table order. Recompute and change notification
    /// iterate in this order.
    pub const ALL: [Body; 6] = [
        Body::Sun,
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
    ];

    /// Simulated days for one full revolution around the origin.
    pub const fn orbital_period_days(self) -> f64 {
        match self {
            // The Sun's orbit radius is zero, so its period never
            // enters a visible position.
            Body::Sun => 1.0,
            Body::Mercury => 88.0,
            Body::Venus => 224.0,
            Body::Earth => 365.25,
            Body::Mars => 686.98,
            Body::Jupiter => 4380.0,
        }
    }

    /// Simulated days for one self-rotation (sidereal day).
    pub const fn rotation_period_days(self) -> f64 {
        match self {
            Body::Sun => 25.0,
            Body::Mercury => 58.5,
            Body::Venus => 116.7,
            Body::Earth => 1.0,
            Body::Mars => 1.0,
            Body::Jupiter => 0.5,
        }
    }

    /// Orbit radius, scaled from Earth's.
    pub fn orbit_radius(self) -> f64 {
        match self {
            Body::Sun => 0.0,
            Body::Mercury => EARTH_ORBIT_RADIUS * 0.4,
            Body::Venus => EARTH_ORBIT_RADIUS * 0.7,
            Body::Earth => EARTH_ORBIT_RADIUS,
            Body::Mars => EARTH_ORBIT_RADIUS * 1.5,
            Body::Jupiter => EARTH_ORBIT_RADIUS * 5.2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Earth => "Earth",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
        }
    }
}

#[test]
fn radii_scale_from_earth() {
    assert_eq!(Body::Earth.orbit_radius(), 80.0);
    assert_eq!(Body::Mercury.orbit_radius(), 32.0);
    assert_eq!(Body::Venus.orbit_radius(), 56.0);
    assert_eq!(Body::Mars.orbit_radius(), 120.0);
    assert_eq!(Body::Jupiter.orbit_radius(), 416.0);
    assert_eq!(Body::Sun.orbit_radius(), 0.0);
}
