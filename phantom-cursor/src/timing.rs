//! Dispatch timestamps derived from the speed along the path.
//!
//! Each segment is treated as the middle of a local cubic built from its
//! neighbours; its travel time is the integral of that cubic's speed.

use rand::Rng;

use crate::math::{bezier_curve_speed, extrapolate, random_number_range, Vector};
use crate::path::Waypoint;

/// Trapezoidal integral of the cubic speed over `t ∈ [0, 1]`.
fn integrate_speed(samples: usize, p0: Vector, p1: Vector, p2: Vector, p3: Vector) -> f64 {
    let samples = samples.max(1);
    let dt = 1.0 / samples as f64;
    let mut total =
        (bezier_curve_speed(0.0, p0, p1, p2, p3) + bezier_curve_speed(1.0, p0, p1, p2, p3)) / 2.0;
    for i in 1..samples {
        total += bezier_curve_speed(i as f64 * dt, p0, p1, p2, p3);
    }
    total * dt
}

/// Attach timestamps to `points`, the first one stamped `start_ms`.
///
/// `move_speed` divides every segment's time; unset or non-positive picks a
/// random factor in `[0.5, 1.0)`.
pub fn generate_timestamps<R: Rng + ?Sized>(
    rng: &mut R,
    points: &[Vector],
    move_speed: Option<f64>,
    start_ms: f64,
) -> Vec<Waypoint> {
    let speed = move_speed
        .filter(|s| *s > 0.0)
        .unwrap_or_else(|| random_number_range(rng, 0.5, 1.0));

    let mut waypoints: Vec<Waypoint> = points.iter().copied().map(Waypoint::from).collect();
    let Some(first) = waypoints.first_mut() else {
        return waypoints;
    };
    first.timestamp = Some(start_ms);

    let mut now = start_ms;
    for i in 0..points.len().saturating_sub(1) {
        let (p1, p2) = (points[i], points[i + 1]);
        let p0 = if i == 0 { extrapolate(p2, p1) } else { points[i - 1] };
        let p3 = points.get(i + 2).copied().unwrap_or_else(|| extrapolate(p1, p2));
        let time = integrate_speed(points.len(), p0, p1, p2, p3) / speed;
        now += time.round();
        waypoints[i + 1].timestamp = Some(now);
    }
    waypoints
}

/// Shift timestamps so the first one equals `start_ms`.
pub fn rebase(waypoints: &mut [Waypoint], start_ms: f64) {
    let Some(origin) = waypoints.first().and_then(|w| w.timestamp) else {
        return;
    };
    for w in waypoints {
        if let Some(ts) = w.timestamp.as_mut() {
            *ts += start_ms - origin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn straight_line_speed_integrates_to_three_chords() {
        let p = |x| Vector::new(x, 0.0);
        let integral = integrate_speed(10, p(0.0), p(1.0), p(2.0), p(3.0));
        assert!((integral - 3.0).abs() < 1e-9);
    }

    #[test]
    fn timestamps_are_non_decreasing() {
        let mut rng = StdRng::seed_from_u64(4);
        let points: Vec<Vector> = (0..30)
            .map(|i| Vector::new(i as f64 * 7.0, (i as f64 * 0.3).sin() * 40.0 + 50.0))
            .collect();
        let waypoints = generate_timestamps(&mut rng, &points, None, 1_000.0);
        assert_eq!(waypoints[0].timestamp, Some(1_000.0));
        let stamps: Vec<f64> = waypoints.iter().map(|w| w.timestamp.unwrap()).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(stamps.iter().all(|t| t.fract() == 0.0));
    }

    #[test]
    fn zero_length_costs_nothing() {
        let mut rng = StdRng::seed_from_u64(4);
        let waypoints = generate_timestamps(&mut rng, &[Vector::ORIGIN; 2], Some(1.0), 5.0);
        assert_eq!(waypoints[1].timestamp, Some(5.0));
    }

    #[test]
    fn faster_moves_take_less_time() {
        let mut rng = StdRng::seed_from_u64(4);
        let points: Vec<Vector> = (0..20).map(|i| Vector::new(i as f64 * 20.0, 0.0)).collect();
        let slow = generate_timestamps(&mut rng, &points, Some(0.5), 0.0);
        let fast = generate_timestamps(&mut rng, &points, Some(2.0), 0.0);
        assert!(fast.last().unwrap().timestamp < slow.last().unwrap().timestamp);
    }

    #[test]
    fn rebase_shifts_every_stamp() {
        let mut waypoints = vec![
            Waypoint { x: 0.0, y: 0.0, timestamp: Some(10.0) },
            Waypoint { x: 1.0, y: 0.0, timestamp: Some(15.0) },
        ];
        rebase(&mut waypoints, 100.0);
        assert_eq!(waypoints[1].timestamp, Some(105.0));
    }
}
