//! Bezier curve evaluation and analysis.
//!
//! Curves of any order are supported. Orders up to three are evaluated with
//! closed-form Bernstein weights; higher orders fall back to repeated linear
//! interpolation (de Casteljau). Arc length has no closed form for cubics and
//! is estimated with a 24-node Gauss–Legendre quadrature.

use std::f64::consts::{PI, TAU};

use crate::math::Vector;

/// Gauss–Legendre abscissae for n = 24 on `[-1, 1]`.
const T_VALUES: [f64; 24] = [
    -0.064_056_892_862_605_626_085_043_082_624_745_038_590_9,
    0.064_056_892_862_605_626_085_043_082_624_745_038_590_9,
    -0.191_118_867_473_616_309_158_639_820_757_069_631_840_4,
    0.191_118_867_473_616_309_158_639_820_757_069_631_840_4,
    -0.315_042_679_696_163_374_386_793_291_319_810_240_786_4,
    0.315_042_679_696_163_374_386_793_291_319_810_240_786_4,
    -0.433_793_507_626_045_138_487_084_231_913_349_712_452_4,
    0.433_793_507_626_045_138_487_084_231_913_349_712_452_4,
    -0.545_421_471_388_839_535_658_375_617_218_372_370_010_7,
    0.545_421_471_388_839_535_658_375_617_218_372_370_010_7,
    -0.648_093_651_936_975_569_252_495_786_910_747_626_669_6,
    0.648_093_651_936_975_569_252_495_786_910_747_626_669_6,
    -0.740_124_191_578_554_364_243_828_103_099_978_425_523_2,
    0.740_124_191_578_554_364_243_828_103_099_978_425_523_2,
    -0.820_001_985_973_902_921_953_949_872_669_745_208_076_1,
    0.820_001_985_973_902_921_953_949_872_669_745_208_076_1,
    -0.886_415_527_004_401_034_213_154_341_982_196_755_087_3,
    0.886_415_527_004_401_034_213_154_341_982_196_755_087_3,
    -0.938_274_552_002_732_758_523_649_001_708_721_449_654_8,
    0.938_274_552_002_732_758_523_649_001_708_721_449_654_8,
    -0.974_728_555_971_309_498_198_391_993_008_169_061_741_1,
    0.974_728_555_971_309_498_198_391_993_008_169_061_741_1,
    -0.995_187_219_997_021_360_179_997_409_700_736_811_874_5,
    0.995_187_219_997_021_360_179_997_409_700_736_811_874_5,
];

/// Gauss–Legendre weights matching [`T_VALUES`].
const C_VALUES: [f64; 24] = [
    0.127_938_195_346_752_156_974_056_165_224_695_371_851_7,
    0.127_938_195_346_752_156_974_056_165_224_695_371_851_7,
    0.125_837_456_346_828_296_121_375_382_511_183_688_726_4,
    0.125_837_456_346_828_296_121_375_382_511_183_688_726_4,
    0.121_670_472_927_803_391_204_463_153_476_262_425_607,
    0.121_670_472_927_803_391_204_463_153_476_262_425_607,
    0.115_505_668_053_725_601_353_344_483_906_783_559_862_2,
    0.115_505_668_053_725_601_353_344_483_906_783_559_862_2,
    0.107_444_270_115_965_634_782_577_342_446_606_222_794_6,
    0.107_444_270_115_965_634_782_577_342_446_606_222_794_6,
    0.097_618_652_104_113_888_269_880_664_464_247_154_427_9,
    0.097_618_652_104_113_888_269_880_664_464_247_154_427_9,
    0.086_190_161_531_953_275_917_185_202_983_742_667_185,
    0.086_190_161_531_953_275_917_185_202_983_742_667_185,
    0.073_346_481_411_080_305_734_033_615_253_116_518_119_3,
    0.073_346_481_411_080_305_734_033_615_253_116_518_119_3,
    0.059_298_584_915_436_780_746_367_758_500_108_584_541_2,
    0.059_298_584_915_436_780_746_367_758_500_108_584_541_2,
    0.044_277_438_817_419_806_168_602_748_211_338_228_859_3,
    0.044_277_438_817_419_806_168_602_748_211_338_228_859_3,
    0.027_292_508_677_790_063_071_448_352_833_634_218_915_6,
    0.027_292_508_677_790_063_071_448_352_833_634_218_915_6,
    0.012_341_229_799_987_199_546_805_667_070_037_291_575_9,
    0.012_341_229_799_987_199_546_805_667_070_037_291_575_9,
];

const EPSILON: f64 = 0.000_001;
/// Finest parameter resolution used while reducing a curve.
const REDUCE_STEP: f64 = 0.01;
const MAX_INTERSECTION_DEPTH: usize = 32;

fn approximately(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Evaluate the curve defined by `points` at `t`.
///
/// `t == 0` and `t == 1` return the first and last control point exactly.
pub fn compute(t: f64, points: &[Vector]) -> Vector {
    let order = points.len() - 1;
    if t == 0.0 {
        return points[0];
    }
    if t == 1.0 {
        return points[order];
    }
    let mt = 1.0 - t;
    match order {
        0 => points[0],
        1 => points[0] * mt + points[1] * t,
        2 => points[0] * (mt * mt) + points[1] * (2.0 * mt * t) + points[2] * (t * t),
        3 => {
            points[0] * (mt * mt * mt)
                + points[1] * (3.0 * mt * mt * t)
                + points[2] * (3.0 * mt * t * t)
                + points[3] * (t * t * t)
        }
        _ => {
            let mut work = points.to_vec();
            while work.len() > 1 {
                for i in 0..work.len() - 1 {
                    work[i] = work[i].lerp(work[i + 1], t);
                }
                work.pop();
            }
            work[0]
        }
    }
}

/// Control points of every derivative of `points`, first derivative first.
pub fn derive(points: &[Vector]) -> Vec<Vec<Vector>> {
    let mut levels = Vec::with_capacity(points.len().saturating_sub(1));
    let mut current = points.to_vec();
    while current.len() > 1 {
        let c = (current.len() - 1) as f64;
        let next: Vec<Vector> = current.windows(2).map(|w| (w[1] - w[0]) * c).collect();
        levels.push(next.clone());
        current = next;
    }
    levels
}

/// Arc length of a curve given its derivative, integrated over `[0, 1]`.
pub fn gauss_legendre_length(derivative: impl Fn(f64) -> Vector) -> f64 {
    let z = 0.5;
    let sum: f64 = T_VALUES
        .iter()
        .zip(C_VALUES.iter())
        .map(|(t, c)| c * derivative(z * t + z).magnitude())
        .sum();
    z * sum
}

/// Roots of the first derivative expressed as 2 (linear) or 3 (quadratic)
/// Bernstein coefficients. Other lengths have no closed form here.
pub fn droots(p: &[f64]) -> Vec<f64> {
    match *p {
        [a, b, c] => {
            let d = a - 2.0 * b + c;
            if d != 0.0 {
                let m1 = -(b * b - a * c).sqrt();
                let m2 = -a + b;
                vec![-(m1 + m2) / d, -(-m1 + m2) / d]
            } else if b != c {
                vec![(2.0 * b - c) / (2.0 * (b - c))]
            } else {
                Vec::new()
            }
        }
        [a, b] if a != b => vec![a / (a - b)],
        _ => Vec::new(),
    }
}

/// Signed angle at `o` between `o → v1` and `o → v2`.
fn angle(o: Vector, v1: Vector, v2: Vector) -> f64 {
    let (dx1, dy1) = (v1.x - o.x, v1.y - o.y);
    let (dx2, dy2) = (v2.x - o.x, v2.y - o.y);
    let cross = dx1 * dy2 - dy1 * dx2;
    let dot = dx1 * dx2 + dy1 * dy2;
    cross.atan2(dot)
}

/// Sorted, de-duplicated parameters in `[0, 1]` where a derivative vanishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extrema {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curvature {
    /// Signed curvature.
    pub k: f64,
    /// Radius of curvature (`1 / k`), zero where undefined.
    pub r: f64,
}

/// A circular arc approximating part of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub center: Vector,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Parameter interval of the approximated part.
    pub interval: (f64, f64),
}

/// A piece of a larger curve together with its parameter range there.
#[derive(Debug, Clone)]
pub struct Segment {
    pub t1: f64,
    pub t2: f64,
    pub curve: Bezier,
}

impl Segment {
    fn map(&self, t: f64) -> f64 {
        self.t1 + t * (self.t2 - self.t1)
    }

    fn halves(&self) -> (Segment, Segment) {
        let mid = self.map(0.5);
        let (left, right) = self.curve.split(0.5);
        (
            Segment {
                t1: self.t1,
                t2: mid,
                curve: left,
            },
            Segment {
                t1: mid,
                t2: self.t2,
                curve: right,
            },
        )
    }
}

/// A Bezier curve of order `points.len() - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bezier {
    points: Vec<Vector>,
    dpoints: Vec<Vec<Vector>>,
}

impl Bezier {
    /// Build a curve from at least two control points.
    ///
    /// ```
    /// use phantom_cursor::bezier::Bezier;
    /// use phantom_cursor::math::Vector;
    ///
    /// let curve = Bezier::new(vec![Vector::new(0.0, 0.0), Vector::new(30.0, 40.0)]);
    /// assert_eq!(curve.order(), 1);
    /// assert!((curve.length() - 50.0).abs() < 1e-9);
    /// ```
    pub fn new(points: Vec<Vector>) -> Self {
        assert!(points.len() >= 2, "a curve needs at least two control points");
        let dpoints = derive(&points);
        Self { points, dpoints }
    }

    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    pub fn order(&self) -> usize {
        self.points.len() - 1
    }

    pub fn get(&self, t: f64) -> Vector {
        compute(t, &self.points)
    }

    pub fn derivative(&self, t: f64) -> Vector {
        compute(t, &self.dpoints[0])
    }

    /// Unit normal at `t` (planar).
    pub fn normal(&self, t: f64) -> Vector {
        let d = self.derivative(t);
        let q = d.x.hypot(d.y);
        Vector::new(-d.y / q, d.x / q)
    }

    pub fn length(&self) -> f64 {
        gauss_legendre_length(|t| self.derivative(t))
    }

    /// `steps + 1` points at uniform parameter spacing.
    pub fn lut(&self, steps: usize) -> Vec<Vector> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.get(i as f64 / steps as f64))
            .collect()
    }

    pub fn extrema(&self) -> Extrema {
        let roots_for = |dim: fn(&Vector) -> f64| {
            let mut roots = droots(&self.dpoints[0].iter().map(dim).collect::<Vec<_>>());
            if self.order() == 3 {
                roots.extend(droots(&self.dpoints[1].iter().map(dim).collect::<Vec<_>>()));
            }
            roots.retain(|t| (0.0..=1.0).contains(t));
            roots.sort_by(f64::total_cmp);
            roots
        };
        let x = roots_for(|v| v.x);
        let y = roots_for(|v| v.y);
        let mut values: Vec<f64> = x.iter().chain(y.iter()).copied().collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Extrema { x, y, values }
    }

    /// Inflection parameters of a cubic; empty for other orders.
    pub fn inflections(&self) -> Vec<f64> {
        if self.order() != 3 {
            return Vec::new();
        }
        let p = self.aligned();
        let a = p[2].x * p[1].y;
        let b = p[3].x * p[1].y;
        let c = p[1].x * p[2].y;
        let d = p[3].x * p[2].y;
        let v1 = 18.0 * (-3.0 * a + 2.0 * b + 3.0 * c - d);
        let v2 = 18.0 * (3.0 * a - b - 3.0 * c);
        let v3 = 18.0 * (c - a);

        if approximately(v1, 0.0) {
            if !approximately(v2, 0.0) {
                let t = -v3 / v2;
                if (0.0..=1.0).contains(&t) {
                    return vec![t];
                }
            }
            return Vec::new();
        }
        let d2 = 2.0 * v1;
        let trm = v2 * v2 - 4.0 * v1 * v3;
        if trm < 0.0 {
            return Vec::new();
        }
        let sq = trm.sqrt();
        [(sq - v2) / d2, -(v2 + sq) / d2]
            .into_iter()
            .filter(|t| (0.0..=1.0).contains(t))
            .collect()
    }

    /// Control points translated and rotated so the chord lies on the x axis.
    fn aligned(&self) -> Vec<Vector> {
        let p1 = self.points[0];
        let p2 = self.points[self.order()];
        let a = -(p2.y - p1.y).atan2(p2.x - p1.x);
        let (sin, cos) = a.sin_cos();
        self.points
            .iter()
            .map(|v| {
                Vector::new(
                    (v.x - p1.x) * cos - (v.y - p1.y) * sin,
                    (v.x - p1.x) * sin + (v.y - p1.y) * cos,
                )
            })
            .collect()
    }

    pub fn curvature(&self, t: f64) -> Curvature {
        let flat = Curvature { k: 0.0, r: 0.0 };
        if self.dpoints.len() < 2 {
            return flat;
        }
        let d = compute(t, &self.dpoints[0]);
        let dd = compute(t, &self.dpoints[1]);
        let num = d.x * dd.y - d.y * dd.x;
        let dnm = (d.x * d.x + d.y * d.y).powf(1.5);
        if num == 0.0 || dnm == 0.0 {
            return flat;
        }
        Curvature {
            k: num / dnm,
            r: dnm / num,
        }
    }

    /// Split at `t` into the parts before and after it.
    pub fn split(&self, t: f64) -> (Bezier, Bezier) {
        let mut left = Vec::with_capacity(self.points.len());
        let mut right = Vec::with_capacity(self.points.len());
        let mut work = self.points.clone();
        left.push(work[0]);
        right.push(work[work.len() - 1]);
        while work.len() > 1 {
            work = work.windows(2).map(|w| w[0].lerp(w[1], t)).collect();
            left.push(work[0]);
            right.push(work[work.len() - 1]);
        }
        right.reverse();
        (Bezier::new(left), Bezier::new(right))
    }

    /// The part of the curve between `t1` and `t2`.
    pub fn split_range(&self, t1: f64, t2: f64) -> Bezier {
        if t1 == 0.0 {
            return self.split(t2).0;
        }
        if t2 == 1.0 {
            return self.split(t1).1;
        }
        let right = self.split(t1).1;
        right.split((t2 - t1) / (1.0 - t1)).0
    }

    /// Whether the curve neither folds over itself nor turns by more than 60°.
    pub fn simple(&self) -> bool {
        if self.order() == 3 {
            let p = &self.points;
            let a1 = angle(p[0], p[3], p[1]);
            let a2 = angle(p[0], p[3], p[2]);
            if (a1 > 0.0 && a2 < 0.0) || (a1 < 0.0 && a2 > 0.0) {
                return false;
            }
        }
        let n1 = self.normal(0.0);
        let n2 = self.normal(1.0);
        let s = (n1.x * n2.x + n1.y * n2.y).clamp(-1.0, 1.0);
        s.acos().abs() < PI / 3.0
    }

    /// Split into maximal simple segments.
    ///
    /// Returns an empty list when some piece cannot be made simple at the
    /// finest resolution (e.g. a cusp).
    pub fn reduce(&self) -> Vec<Segment> {
        let mut bounds = self.extrema().values;
        if bounds.first() != Some(&0.0) {
            bounds.insert(0, 0.0);
        }
        if bounds.last() != Some(&1.0) {
            bounds.push(1.0);
        }

        let mut reduced = Vec::new();
        for w in bounds.windows(2).filter(|w| w[1] > w[0]) {
            let parent = Segment {
                t1: w[0],
                t2: w[1],
                curve: self.split_range(w[0], w[1]),
            };
            let mut t1 = 0.0;
            while t1 < 1.0 {
                let rest = parent.curve.split_range(t1, 1.0);
                if rest.simple() {
                    reduced.push(Segment {
                        t1: parent.map(t1),
                        t2: parent.t2,
                        curve: rest,
                    });
                    break;
                }
                let (mut lo, mut hi) = (t1, 1.0);
                while hi - lo > REDUCE_STEP / 2.0 {
                    let mid = (lo + hi) / 2.0;
                    if parent.curve.split_range(t1, mid).simple() {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                if lo - t1 < REDUCE_STEP {
                    return Vec::new();
                }
                reduced.push(Segment {
                    t1: parent.map(t1),
                    t2: parent.map(lo),
                    curve: parent.curve.split_range(t1, lo),
                });
                t1 = lo;
            }
        }
        reduced
    }

    /// Parameter pairs `(t_a, t_b)` where the curve crosses itself.
    pub fn self_intersects(&self, threshold: f64) -> Vec<(f64, f64)> {
        let mut pieces = self.reduce();
        if pieces.is_empty() {
            pieces = (0..16)
                .map(|i| {
                    let (t1, t2) = (i as f64 / 16.0, (i + 1) as f64 / 16.0);
                    Segment {
                        t1,
                        t2,
                        curve: self.split_range(t1, t2),
                    }
                })
                .collect();
        }

        let mut found = Vec::new();
        for i in 0..pieces.len() {
            for other in pieces.iter().skip(i + 2) {
                intersect_segments(&pieces[i], other, threshold, 0, &mut found);
            }
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3);
        found
    }

    /// Approximate the curve with circular arcs within `error_threshold`.
    ///
    /// Straight stretches have no circle through them and yield no arcs.
    pub fn arcs(&self, error_threshold: f64) -> Vec<CircularArc> {
        let mut circles = Vec::new();
        let mut t_s = 0.0;
        loop {
            let np1 = self.get(t_s);
            let mut t_e: f64 = 1.0;
            let mut prev_e = 1.0;
            let mut arc: Option<CircularArc> = None;
            let mut prev_arc: Option<CircularArc> = None;
            let mut curr_good = false;
            let mut safety = 0;

            loop {
                let prev_good = curr_good;
                prev_arc = arc.or(prev_arc);
                let t_m = (t_s + t_e) / 2.0;
                arc = circle_through(np1, self.get(t_m), self.get(t_e)).map(|mut a| {
                    a.interval = (t_s, t_e);
                    a
                });
                curr_good = arc
                    .as_ref()
                    .is_some_and(|a| self.arc_error(a, np1, t_s, t_e) <= error_threshold);
                let done = prev_good && !curr_good;
                if !done {
                    prev_e = t_e;
                }
                if curr_good {
                    if t_e >= 1.0 {
                        prev_e = 1.0;
                        prev_arc = arc;
                        break;
                    }
                    t_e = (t_e + (t_e - t_s) / 2.0).min(1.0);
                } else {
                    t_e = t_m;
                }
                safety += 1;
                if done || safety >= 100 {
                    break;
                }
            }
            if safety >= 100 {
                break;
            }
            if let Some(found) = prev_arc.or(arc) {
                circles.push(found);
            }
            if prev_e <= t_s || t_e >= 1.0 {
                break;
            }
            t_s = prev_e;
        }
        circles
    }

    fn arc_error(&self, arc: &CircularArc, np1: Vector, s: f64, e: f64) -> f64 {
        let q = (e - s) / 4.0;
        let reference = arc.center.distance(np1);
        let d1 = arc.center.distance(self.get(s + q));
        let d2 = arc.center.distance(self.get(e - q));
        (d1 - reference).abs() + (d2 - reference).abs()
    }

    /// Axis-aligned box around the control polygon.
    fn hull_bbox(&self) -> (Vector, Vector) {
        let (mut min, mut max) = (self.points[0], self.points[0]);
        for p in &self.points[1..] {
            min = Vector::new(min.x.min(p.x), min.y.min(p.y));
            max = Vector::new(max.x.max(p.x), max.y.max(p.y));
        }
        (min, max)
    }
}

fn intersect_segments(
    a: &Segment,
    b: &Segment,
    threshold: f64,
    depth: usize,
    found: &mut Vec<(f64, f64)>,
) {
    let (a_min, a_max) = a.curve.hull_bbox();
    let (b_min, b_max) = b.curve.hull_bbox();
    let overlap = a_min.x <= b_max.x && b_min.x <= a_max.x && a_min.y <= b_max.y && b_min.y <= a_max.y;
    if !overlap {
        return;
    }
    let size = |min: Vector, max: Vector| ((max.x - min.x) + (max.y - min.y)) / 2.0;
    if (size(a_min, a_max) < threshold && size(b_min, b_max) < threshold)
        || depth >= MAX_INTERSECTION_DEPTH
    {
        found.push(((a.t1 + a.t2) / 2.0, (b.t1 + b.t2) / 2.0));
        return;
    }
    let (a1, a2) = a.halves();
    let (b1, b2) = b.halves();
    for (x, y) in [(&a1, &b1), (&a1, &b2), (&a2, &b1), (&a2, &b2)] {
        intersect_segments(x, y, threshold, depth + 1, found);
    }
}

/// Circle through three points, or `None` when they are collinear.
fn circle_through(p1: Vector, p2: Vector, p3: Vector) -> Option<CircularArc> {
    let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let s1 = p1.x * p1.x + p1.y * p1.y;
    let s2 = p2.x * p2.x + p2.y * p2.y;
    let s3 = p3.x * p3.x + p3.y * p3.y;
    let center = Vector::new(
        (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d,
        (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d,
    );

    let mut s = (p1.y - center.y).atan2(p1.x - center.x);
    let m = (p2.y - center.y).atan2(p2.x - center.x);
    let mut e = (p3.y - center.y).atan2(p3.x - center.x);
    if s < e {
        if s > m || m > e {
            s += TAU;
        }
        if s > e {
            std::mem::swap(&mut s, &mut e);
        }
    } else if e < m && m < s {
        std::mem::swap(&mut s, &mut e);
    } else {
        e += TAU;
    }

    Some(CircularArc {
        center,
        radius: center.distance(p1),
        start_angle: s,
        end_angle: e,
        interval: (0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector {
        Vector::new(x, y)
    }

    fn arch() -> Bezier {
        Bezier::new(vec![v(0.0, 0.0), v(100.0, 100.0), v(200.0, 100.0), v(300.0, 0.0)])
    }

    #[test]
    fn endpoints_are_exact_for_every_order() {
        for n in 2..=7 {
            let points: Vec<Vector> = (0..n)
                .map(|i| v(i as f64 * 13.7 + 0.1, (i as f64 * 1.3).sin() * 50.0))
                .collect();
            let curve = Bezier::new(points.clone());
            assert_eq!(curve.get(0.0), points[0]);
            assert_eq!(curve.get(1.0), points[n - 1]);
        }
    }

    #[test]
    fn de_casteljau_agrees_with_degree_elevation() {
        // A cubic elevated to order four traces the same curve.
        let cubic = arch();
        let p = cubic.points();
        let elevated = Bezier::new(vec![
            p[0],
            p[0] * 0.25 + p[1] * 0.75,
            p[1] * 0.5 + p[2] * 0.5,
            p[2] * 0.75 + p[3] * 0.25,
            p[3],
        ]);
        for i in 1..10 {
            let t = i as f64 / 10.0;
            assert!(cubic.get(t).distance(elevated.get(t)) < 1e-9);
        }
    }

    #[test]
    fn straight_cubic_length_is_chord() {
        let line = Bezier::new(vec![v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0), v(30.0, 0.0)]);
        assert!((line.length() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn arch_length_exceeds_chord() {
        let curve = arch();
        let polyline: f64 = curve.lut(1000).windows(2).map(|w| w[0].distance(w[1])).sum();
        assert!(curve.length() > 300.0);
        assert!((curve.length() - polyline).abs() < 0.01);
    }

    #[test]
    fn lut_has_steps_plus_one_points() {
        let lut = arch().lut(10);
        assert_eq!(lut.len(), 11);
        assert_eq!(lut[0], v(0.0, 0.0));
        assert_eq!(lut[10], v(300.0, 0.0));
    }

    #[test]
    fn droots_handles_linear_and_quadratic() {
        assert_eq!(droots(&[1.0, -1.0]), vec![0.5]);
        assert!(droots(&[1.0, 1.0]).is_empty());
        assert_eq!(droots(&[300.0, 0.0, -300.0]), vec![0.5]);
    }

    #[test]
    fn arch_extremum_is_the_apex() {
        let extrema = arch().extrema();
        assert!(extrema.x.is_empty());
        assert_eq!(extrema.y, vec![0.5]);
        assert_eq!(extrema.values, vec![0.5]);
    }

    #[test]
    fn s_curve_has_one_inflection() {
        let s = Bezier::new(vec![v(0.0, 0.0), v(100.0, 100.0), v(200.0, -100.0), v(300.0, 0.0)]);
        let inflections = s.inflections();
        assert_eq!(inflections.len(), 1);
        assert!((inflections[0] - 0.5).abs() < 1e-9);
        assert!(arch().inflections().is_empty());
    }

    #[test]
    fn curvature_sign_follows_turn_direction() {
        assert!(arch().curvature(0.5).k < 0.0);
        let line = Bezier::new(vec![v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0), v(3.0, 3.0)]);
        assert_eq!(line.curvature(0.3), Curvature { k: 0.0, r: 0.0 });
    }

    #[test]
    fn split_halves_meet_on_the_curve() {
        let curve = arch();
        let (left, right) = curve.split(0.3);
        assert_eq!(left.get(0.0), curve.get(0.0));
        assert!(left.get(1.0).distance(curve.get(0.3)) < 1e-9);
        assert!(right.get(0.0).distance(curve.get(0.3)) < 1e-9);
        assert_eq!(right.get(1.0), curve.get(1.0));

        let middle = curve.split_range(0.25, 0.75);
        assert!(middle.get(0.0).distance(curve.get(0.25)) < 1e-9);
        assert!(middle.get(1.0).distance(curve.get(0.75)) < 1e-9);
    }

    #[test]
    fn reduce_covers_the_curve_with_simple_segments() {
        let curve = Bezier::new(vec![v(0.0, 0.0), v(300.0, 400.0), v(-100.0, 400.0), v(200.0, 0.0)]);
        let segments = curve.reduce();
        assert!(!segments.is_empty());
        assert_eq!(segments[0].t1, 0.0);
        assert_eq!(segments[segments.len() - 1].t2, 1.0);
        for pair in segments.windows(2) {
            assert!((pair[0].t2 - pair[1].t1).abs() < 1e-12);
        }
        assert!(segments.iter().all(|s| s.curve.simple()));
    }

    #[test]
    fn loop_is_detected_as_self_intersection() {
        let looped = Bezier::new(vec![v(0.0, 0.0), v(300.0, 300.0), v(-200.0, 300.0), v(100.0, 0.0)]);
        let hits = looped.self_intersects(0.5);
        assert!(!hits.is_empty());
        let (ta, tb) = hits[0];
        assert!(looped.get(ta).distance(looped.get(tb)) < 5.0);
        assert!(arch().self_intersects(0.5).is_empty());
    }

    #[test]
    fn arcs_approximate_a_quarter_circle() {
        // Standard cubic approximation of a quarter circle of radius 100.
        let k = 0.552_284_749_831 * 100.0;
        let quarter = Bezier::new(vec![v(100.0, 0.0), v(100.0, k), v(k, 100.0), v(0.0, 100.0)]);
        let arcs = quarter.arcs(0.5);
        assert!(!arcs.is_empty());
        let first = arcs[0];
        assert!(first.center.distance(Vector::ORIGIN) < 1.0);
        assert!((first.radius - 100.0).abs() < 1.0);
        assert_eq!(arcs[arcs.len() - 1].interval.1, 1.0);
    }
}
