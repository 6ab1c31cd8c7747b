//! Waypoint planning between two points.
//!
//! The number of waypoints follows Fitts' law: longer moves and smaller
//! targets get more steps, faster moves fewer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::math::{bezier_curve, overshoot, should_overshoot, Vector};
use crate::options::PathOptions;
use crate::timing;

/// Target width assumed when the caller does not provide one.
pub const DEFAULT_WIDTH: f64 = 100.0;
/// Step budget of a move at unit speed.
pub const MIN_STEPS: f64 = 25.0;
/// Overshoot points land within this distance of the destination.
pub const OVERSHOOT_RADIUS: f64 = 120.0;
/// Spread of the short correcting curve after an overshoot.
pub const OVERSHOOT_SPREAD: f64 = 10.0;

/// One sampled point of a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the UNIX epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Waypoint {
    pub fn point(&self) -> Vector {
        Vector::new(self.x, self.y)
    }
}

impl From<Vector> for Waypoint {
    fn from(v: Vector) -> Self {
        Waypoint {
            x: v.x,
            y: v.y,
            timestamp: None,
        }
    }
}

/// End of a path: a point and the width of whatever sits there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEnd {
    pub point: Vector,
    /// `0` means unknown; [`DEFAULT_WIDTH`] is used instead.
    pub width: f64,
}

impl PathEnd {
    pub fn new(point: Vector, width: f64) -> Self {
        Self { point, width }
    }
}

impl From<Vector> for PathEnd {
    fn from(point: Vector) -> Self {
        Self { point, width: 0.0 }
    }
}

impl From<BoundingBox> for PathEnd {
    fn from(bbox: BoundingBox) -> Self {
        Self {
            point: bbox.origin(),
            width: bbox.width,
        }
    }
}

/// Index of difficulty of reaching a target of `width` at `distance`.
pub fn fitts(distance: f64, width: f64) -> f64 {
    2.0 * (distance / width + 1.0).log2()
}

/// Number of segments for a move of `length` onto a target of `width`.
///
/// `speed` is the time factor: `25 / move_speed` or a random value in `[0, 1)`.
pub fn step_count(length: f64, width: f64, speed: f64) -> usize {
    let base_time = speed * MIN_STEPS;
    let steps = ((fitts(length, width) + 1.0).log2() + base_time) * 3.0;
    steps.ceil().max(1.0) as usize
}

/// Plan a curved path from `start` to `end`.
///
/// The first waypoint is `start` and the last `end`, both clamped to the
/// positive quadrant like every point in between.
///
/// ```
/// use phantom_cursor::{math::Vector, options::PathOptions, path::path};
///
/// let mut rng = rand::thread_rng();
/// let points = path(&mut rng, Vector::new(10.0, 10.0), Vector::new(300.0, 200.0), &PathOptions::default());
/// assert_eq!(points.first().unwrap().point(), Vector::new(10.0, 10.0));
/// assert_eq!(points.last().unwrap().point(), Vector::new(300.0, 200.0));
/// ```
pub fn path<R: Rng + ?Sized>(
    rng: &mut R,
    start: Vector,
    end: impl Into<PathEnd>,
    options: &PathOptions,
) -> Vec<Waypoint> {
    let end = end.into();
    let points = if start == end.point {
        vec![start.clamp_positive(); 2]
    } else {
        let width = if end.width != 0.0 { end.width } else { DEFAULT_WIDTH };
        let curve = bezier_curve(rng, start, end.point, options.spread_override);
        let length = curve.length() * 0.8;
        let speed = match options.move_speed {
            Some(move_speed) if move_speed > 0.0 => 25.0 / move_speed,
            _ => rng.gen::<f64>(),
        };
        let steps = step_count(length, width, speed);
        curve
            .lut(steps)
            .into_iter()
            .map(Vector::clamp_positive)
            .collect()
    };

    if options.use_timestamps {
        let now = chrono::Utc::now().timestamp_millis() as f64;
        timing::generate_timestamps(rng, &points, options.move_speed, now)
    } else {
        points.into_iter().map(Waypoint::from).collect()
    }
}

/// Legs of a move onto `destination`.
///
/// Beyond `threshold` the move first lands near the destination, then a
/// tight correcting curve sized by `target_width` finishes it. Otherwise a
/// single leg goes straight there.
pub fn plan_move<R: Rng + ?Sized>(
    rng: &mut R,
    start: Vector,
    destination: Vector,
    target_width: f64,
    threshold: f64,
    options: &PathOptions,
) -> Vec<Vec<Waypoint>> {
    if !should_overshoot(start, destination, threshold) {
        return vec![path(rng, start, destination, options)];
    }
    let near = overshoot(rng, destination, OVERSHOOT_RADIUS);
    let first = path(rng, start, near, options);
    let correction = PathOptions {
        spread_override: Some(OVERSHOOT_SPREAD),
        ..options.clone()
    };
    let mut second = path(rng, near, PathEnd::new(destination, target_width), &correction);
    if let Some(last) = first.last().and_then(|w| w.timestamp) {
        timing::rebase(&mut second, last);
    }
    vec![first, second]
}
