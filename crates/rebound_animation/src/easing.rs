//! Easing curves for the duration model

/// Easing function type
///
/// Maps linear progress in [0, 1] to eased progress. Curves may overshoot the
/// unit range in between, but must map 1.0 to 1.0 for timed animations to land
/// on their target.
#[derive(Clone, Copy, Debug, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f64, f64, f64, f64),
    Custom(fn(f64) -> f64),
}

#[derive(Clone, Copy)]
enum Ends {
    In,
    Out,
    InOut,
}

impl Easing {
    /// Apply the easing function to a progress value
    pub fn apply(&self, t: f64) -> f64 {
        let (ends, power) = match *self {
            Easing::Linear => return t,
            Easing::CubicBezier(x1, y1, x2, y2) => {
                return UnitBezier::new(x1, y1, x2, y2).solve(t)
            }
            Easing::Custom(f) => return f(t),
            Easing::EaseInQuad => (Ends::In, 2),
            Easing::EaseOutQuad => (Ends::Out, 2),
            Easing::EaseInOutQuad => (Ends::InOut, 2),
            Easing::EaseInCubic => (Ends::In, 3),
            Easing::EaseOutCubic => (Ends::Out, 3),
            Easing::EaseInOutCubic => (Ends::InOut, 3),
            Easing::EaseInQuart => (Ends::In, 4),
            Easing::EaseOutQuart => (Ends::Out, 4),
            Easing::EaseInOutQuart => (Ends::InOut, 4),
        };
        power_curve(ends, power, t)
    }
}

/// `t^n`, its mirror, or the two halves joined at 0.5
fn power_curve(ends: Ends, n: i32, t: f64) -> f64 {
    match ends {
        Ends::In => t.powi(n),
        Ends::Out => 1.0 - (1.0 - t).powi(n),
        Ends::InOut if t < 0.5 => (2.0 * t).powi(n) / 2.0,
        Ends::InOut => 1.0 - (2.0 - 2.0 * t).powi(n) / 2.0,
    }
}

/// Cubic bezier through (0,0) and (1,1) with polynomial coefficients
/// precomputed per axis
struct UnitBezier {
    x: [f64; 3],
    y: [f64; 3],
}

impl UnitBezier {
    const EPSILON: f64 = 1e-7;

    fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: Self::coefficients(x1, x2),
            y: Self::coefficients(y1, y2),
        }
    }

    /// `[a, b, c]` such that `B(s) = ((a·s + b)·s + c)·s`
    fn coefficients(p1: f64, p2: f64) -> [f64; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        [1.0 - c - b, b, c]
    }

    fn sample([a, b, c]: [f64; 3], s: f64) -> f64 {
        ((a * s + b) * s + c) * s
    }

    fn slope([a, b, c]: [f64; 3], s: f64) -> f64 {
        (3.0 * a * s + 2.0 * b) * s + c
    }

    /// Eased y for progress `x`
    fn solve(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        Self::sample(self.y, self.parameter_for(x))
    }

    /// Curve parameter whose x equals `x`: Newton first, bisection when the
    /// slope flattens out
    fn parameter_for(&self, x: f64) -> f64 {
        let mut s = x;
        for _ in 0..8 {
            let err = Self::sample(self.x, s) - x;
            if err.abs() < Self::EPSILON {
                return s;
            }
            let slope = Self::slope(self.x, s);
            if slope.abs() < Self::EPSILON {
                break;
            }
            s -= err / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        s = x;
        for _ in 0..32 {
            let sx = Self::sample(self.x, s);
            if (sx - x).abs() < Self::EPSILON {
                break;
            }
            if sx < x {
                lo = s;
            } else {
                hi = s;
            }
            s = 0.5 * (lo + hi);
        }
        s
    }
}
