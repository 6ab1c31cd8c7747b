//! Vector arithmetic and randomized curve construction.
//!
//! Everything here is pure. NaN inputs propagate as NaN; callers validate.

use std::ops::{Add, Div, Mul, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bezier::Bezier;
use crate::geometry::BoundingBox;
use crate::options::BoxOptions;

/// Lower bound on the lateral spread of generated anchors.
pub const MIN_SPREAD: f64 = 2.0;
/// Upper bound on the lateral spread of generated anchors.
pub const MAX_SPREAD: f64 = 200.0;

/// A 2D (optionally 3D) coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Vector {
    pub const ORIGIN: Vector = Vector {
        x: 0.0,
        y: 0.0,
        z: None,
    };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub fn magnitude(self) -> f64 {
        let z = self.z.unwrap_or(0.0);
        (self.x * self.x + self.y * self.y + z * z).sqrt()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn unit(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return self;
        }
        self / mag
    }

    pub fn set_magnitude(self, amount: f64) -> Self {
        self.unit() * amount
    }

    /// Rotates the planar part by -90°.
    pub fn perpendicular(self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
            z: self.z,
        }
    }

    pub fn distance(self, other: Vector) -> f64 {
        direction(self, other).magnitude()
    }

    pub fn lerp(self, other: Vector, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Component-wise clamp of `x` and `y` to `>= 0`.
    pub fn clamp_positive(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
            z: self.z,
        }
    }
}

fn zip_z(a: Option<f64>, b: Option<f64>, f: impl Fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(f(a.unwrap_or(0.0), b.unwrap_or(0.0))),
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: zip_z(self.z, rhs.z, |a, b| a + b),
        }
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: zip_z(self.z, rhs.z, |a, b| a - b),
        }
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, factor: f64) -> Vector {
        Vector {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z.map(|z| z * factor),
        }
    }
}

impl Div<f64> for Vector {
    type Output = Vector;

    fn div(self, divisor: f64) -> Vector {
        Vector {
            x: self.x / divisor,
            y: self.y / divisor,
            z: self.z.map(|z| z / divisor),
        }
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Vector::new(x, y)
    }
}

/// Vector pointing from `from` to `to`.
pub fn direction(from: Vector, to: Vector) -> Vector {
    to - from
}

/// `b + (b - a)`: continues the segment `a → b` by its own length.
pub fn extrapolate(a: Vector, b: Vector) -> Vector {
    b + (b - a)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linear map of `value` from `[from1, to1]` onto `[from2, to2]`.
pub fn scale(value: f64, (from1, to1): (f64, f64), (from2, to2): (f64, f64)) -> f64 {
    (value - from1) * (to2 - from2) / (to1 - from1) + from2
}

pub fn random_number_range<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen::<f64>() * (max - min) + min
}

/// Uniformly distributed point on the segment `a → b`.
pub fn random_vector_on_line<R: Rng + ?Sized>(rng: &mut R, a: Vector, b: Vector) -> Vector {
    a + direction(a, b) * rng.gen::<f64>()
}

fn random_normal_line<R: Rng + ?Sized>(
    rng: &mut R,
    a: Vector,
    b: Vector,
    range: f64,
) -> (Vector, Vector) {
    let mid = random_vector_on_line(rng, a, b);
    let normal = direction(a, mid).perpendicular().set_magnitude(range);
    (mid, normal)
}

/// Two control points offset to the same side of `a → b`, sorted by x.
pub fn generate_bezier_anchors<R: Rng + ?Sized>(
    rng: &mut R,
    a: Vector,
    b: Vector,
    spread: f64,
) -> [Vector; 2] {
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let mut calc = || {
        let (mid, normal) = random_normal_line(&mut *rng, a, b, spread);
        random_vector_on_line(&mut *rng, mid, mid + normal * side)
    };
    let mut anchors = [calc(), calc()];
    anchors.sort_by(|l, r| l.x.total_cmp(&r.x));
    anchors
}

/// Cubic curve from `start` to `finish` bulging to one random side.
pub fn bezier_curve<R: Rng + ?Sized>(
    rng: &mut R,
    start: Vector,
    finish: Vector,
    spread_override: Option<f64>,
) -> Bezier {
    let spread = spread_override
        .unwrap_or_else(|| clamp(direction(start, finish).magnitude(), MIN_SPREAD, MAX_SPREAD));
    let [first, second] = generate_bezier_anchors(rng, start, finish, spread);
    Bezier::new(vec![start, first, second, finish])
}

/// Magnitude of the derivative of the cubic `p0..p3` at `t`.
pub fn bezier_curve_speed(t: f64, p0: Vector, p1: Vector, p2: Vector, p3: Vector) -> f64 {
    let mt = 1.0 - t;
    let b1 = 3.0 * mt * mt * (p1.x - p0.x) + 6.0 * mt * t * (p2.x - p1.x) + 3.0 * t * t * (p3.x - p2.x);
    let b2 = 3.0 * mt * mt * (p1.y - p0.y) + 6.0 * mt * t * (p2.y - p1.y) + 3.0 * t * t * (p3.y - p2.y);
    (b1 * b1 + b2 * b2).sqrt()
}

/// Random point within `radius` of `coordinate`, uniform over the disk.
pub fn overshoot<R: Rng + ?Sized>(rng: &mut R, coordinate: Vector, radius: f64) -> Vector {
    let angle = rng.gen::<f64>() * 2.0 * std::f64::consts::PI;
    let rad = radius * rng.gen::<f64>().sqrt();
    coordinate + Vector::new(rad * angle.cos(), rad * angle.sin())
}

pub fn should_overshoot(a: Vector, b: Vector, threshold: f64) -> bool {
    direction(a, b).magnitude() > threshold
}

/// Random point inside `bbox`, inset by `padding_percentage` of each side.
///
/// An explicit `destination` offset wins over random sampling.
pub fn random_box_point<R: Rng + ?Sized>(
    rng: &mut R,
    bbox: &BoundingBox,
    options: &BoxOptions,
) -> Vector {
    if let Some(offset) = options.destination {
        return bbox.origin() + offset;
    }
    let (mut padding_width, mut padding_height) = (0.0, 0.0);
    if let Some(pct) = options.padding_percentage.filter(|p| *p > 0.0 && *p <= 100.0) {
        padding_width = bbox.width * pct / 100.0;
        padding_height = bbox.height * pct / 100.0;
    }
    Vector::new(
        bbox.x + padding_width / 2.0 + rng.gen::<f64>() * (bbox.width - padding_width),
        bbox.y + padding_height / 2.0 + rng.gen::<f64>() * (bbox.height - padding_height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn arithmetic_keeps_z_only_when_present() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new_3d(3.0, 4.0, 5.0);
        assert_eq!(a + a, Vector::new(2.0, 4.0));
        assert_eq!((a + b).z, Some(5.0));
        assert_eq!((b - a).z, Some(5.0));
        assert_eq!(b * 2.0, Vector::new_3d(6.0, 8.0, 10.0));
    }

    #[test]
    fn unit_of_zero_is_zero() {
        assert_eq!(Vector::ORIGIN.unit(), Vector::ORIGIN);
        let u = Vector::new(3.0, 4.0).unit();
        assert!((u.magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn perpendicular_is_orthogonal() {
        let v = Vector::new(3.0, -7.0);
        let p = v.perpendicular();
        assert_eq!(v.x * p.x + v.y * p.y, 0.0);
    }

    #[test]
    fn nan_propagates() {
        let v = Vector::new(f64::NAN, 1.0) + Vector::new(1.0, 1.0);
        assert!(v.x.is_nan());
    }

    #[test]
    fn random_vector_stays_on_segment() {
        let mut rng = StdRng::seed_from_u64(7);
        let (a, b) = (Vector::new(0.0, 0.0), Vector::new(10.0, 0.0));
        for _ in 0..100 {
            let p = random_vector_on_line(&mut rng, a, b);
            assert!((0.0..=10.0).contains(&p.x));
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn anchors_bulge_to_one_side() {
        let mut rng = StdRng::seed_from_u64(42);
        let (a, b) = (Vector::new(0.0, 0.0), Vector::new(400.0, 0.0));
        for _ in 0..50 {
            let [p, q] = generate_bezier_anchors(&mut rng, a, b, 100.0);
            assert!(p.x <= q.x);
            assert!(p.y * q.y >= 0.0, "anchors on opposite sides: {p:?} {q:?}");
        }
    }

    #[test]
    fn overshoot_stays_within_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let target = Vector::new(500.0, 500.0);
        for _ in 0..200 {
            assert!(overshoot(&mut rng, target, 120.0).distance(target) <= 120.0);
        }
    }

    #[test]
    fn box_point_respects_padding() {
        let mut rng = StdRng::seed_from_u64(9);
        let bbox = BoundingBox::new(100.0, 100.0, 200.0, 50.0);
        let options = BoxOptions {
            padding_percentage: Some(50.0),
            destination: None,
        };
        for _ in 0..100 {
            let p = random_box_point(&mut rng, &bbox, &options);
            assert!((150.0..=250.0).contains(&p.x));
            assert!((112.5..=137.5).contains(&p.y));
        }
    }

    #[test]
    fn box_point_honours_destination() {
        let mut rng = StdRng::seed_from_u64(1);
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 40.0);
        let options = BoxOptions {
            padding_percentage: None,
            destination: Some(Vector::new(5.0, 6.0)),
        };
        assert_eq!(random_box_point(&mut rng, &bbox, &options), Vector::new(15.0, 26.0));
    }

    #[test]
    fn speed_of_straight_cubic_is_constant() {
        let p = |x| Vector::new(x, 0.0);
        let v0 = bezier_curve_speed(0.0, p(0.0), p(1.0), p(2.0), p(3.0));
        let v1 = bezier_curve_speed(0.5, p(0.0), p(1.0), p(2.0), p(3.0));
        assert!((v0 - 3.0).abs() < 1e-12);
        assert!((v1 - 3.0).abs() < 1e-12);
    }
}
