//! Rate functions: maps from normalized progress `t ∈ [0, 1]` to eased progress.
//!
//! Two families share one namespace. The engine built-ins (`smooth`, `rush_into`,
//! `there_and_back`, ...) follow the classic sigmoid/bezier definitions used by scene renderers;
//! the easing library (`ease_out_bounce`, `ease_in_back`, ...) follows the easings.net set.
//! Parameterised curves ([`RateFunction::CubicBezier`], [`RateFunction::Spring`]) and the
//! combinators ([`RateFunction::Compose`], [`RateFunction::Chain`]) are built on top.

use std::f64::consts::PI;

use crate::foundation::error::{ChoreoError, ChoreoResult};

/// Inflection used by `smooth` and the curves derived from it.
const SMOOTH_INFLECTION: f64 = 10.0;
const PAUSE_RATIO: f64 = 1.0 / 3.0;
const RUNNING_START_PULL: f64 = -0.5;
const WIGGLES: f64 = 2.0;
const DECAY_HALF_LIFE: f64 = 0.1;
const NOT_QUITE_THERE_PROPORTION: f64 = 0.7;
const LINGER_UNTIL: f64 = 0.8;

const SPRING_STIFFNESS: f64 = 100.0;
const SPRING_DAMPING: f64 = 10.0;
const SPRING_MASS: f64 = 1.0;

/// Parameterless named curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Curve {
    /// `t`.
    Linear,
    /// Step: `0` until the segment completes.
    Hold,
    /// Normalized sigmoid.
    Smooth,
    /// First half of `smooth`, rescaled.
    RushInto,
    /// Second half of `smooth`, rescaled.
    RushFrom,
    /// Quarter circle approaching 1.
    SlowInto,
    /// `smooth` applied to each half.
    DoubleSmooth,
    /// Goes to 1 and back to 0.
    ThereAndBack,
    /// Goes to 1, pauses, back to 0.
    ThereAndBackWithPause,
    /// Pulls back before running forward.
    RunningStart,
    /// Oscillates around 0 with a smooth envelope.
    Wiggle,
    /// Linear over the first 80% then rests at 1.
    Lingering,
    /// `1 - exp(-t / half_life)`.
    ExponentialDecay,
    /// `smooth` scaled to 70%.
    NotQuiteThere,
    /// CSS `ease-in`.
    EaseIn,
    /// CSS `ease-out`.
    EaseOut,
    /// CSS `ease-in-out`.
    EaseInOut,
    /// Default physical spring.
    Spring,
    // easings.net family
    InSine,
    OutSine,
    InOutSine,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InBack,
    OutBack,
    InOutBack,
    InElastic,
    OutElastic,
    InOutElastic,
    InBounce,
    OutBounce,
    InOutBounce,
}

/// Canonical names, in catalogue order.
pub const CURVES: &[(&str, Curve)] = &[
    ("linear", Curve::Linear),
    ("hold", Curve::Hold),
    ("smooth", Curve::Smooth),
    ("rush_into", Curve::RushInto),
    ("rush_from", Curve::RushFrom),
    ("slow_into", Curve::SlowInto),
    ("double_smooth", Curve::DoubleSmooth),
    ("there_and_back", Curve::ThereAndBack),
    ("there_and_back_with_pause", Curve::ThereAndBackWithPause),
    ("running_start", Curve::RunningStart),
    ("wiggle", Curve::Wiggle),
    ("lingering", Curve::Lingering),
    ("exponential_decay", Curve::ExponentialDecay),
    ("not_quite_there", Curve::NotQuiteThere),
    ("ease_in", Curve::EaseIn),
    ("ease_out", Curve::EaseOut),
    ("ease_in_out", Curve::EaseInOut),
    ("spring", Curve::Spring),
    ("ease_in_sine", Curve::InSine),
    ("ease_out_sine", Curve::OutSine),
    ("ease_in_out_sine", Curve::InOutSine),
    ("ease_in_quad", Curve::InQuad),
    ("ease_out_quad", Curve::OutQuad),
    ("ease_in_out_quad", Curve::InOutQuad),
    ("ease_in_cubic", Curve::InCubic),
    ("ease_out_cubic", Curve::OutCubic),
    ("ease_in_out_cubic", Curve::InOutCubic),
    ("ease_in_quart", Curve::InQuart),
    ("ease_out_quart", Curve::OutQuart),
    ("ease_in_out_quart", Curve::InOutQuart),
    ("ease_in_quint", Curve::InQuint),
    ("ease_out_quint", Curve::OutQuint),
    ("ease_in_out_quint", Curve::InOutQuint),
    ("ease_in_expo", Curve::InExpo),
    ("ease_out_expo", Curve::OutExpo),
    ("ease_in_out_expo", Curve::InOutExpo),
    ("ease_in_circ", Curve::InCirc),
    ("ease_out_circ", Curve::OutCirc),
    ("ease_in_out_circ", Curve::InOutCirc),
    ("ease_in_back", Curve::InBack),
    ("ease_out_back", Curve::OutBack),
    ("ease_in_out_back", Curve::InOutBack),
    ("ease_in_elastic", Curve::InElastic),
    ("ease_out_elastic", Curve::OutElastic),
    ("ease_in_out_elastic", Curve::InOutElastic),
    ("ease_in_bounce", Curve::InBounce),
    ("ease_out_bounce", Curve::OutBounce),
    ("ease_in_out_bounce", Curve::InOutBounce),
];

/// Short names resolving to a canonical curve.
pub const ALIASES: &[(&str, &str)] = &[
    ("bounce", "ease_out_bounce"),
    ("elastic", "ease_out_elastic"),
    ("back", "ease_out_back"),
    ("step", "hold"),
    ("ease_in_out_sin", "ease_in_out_sine"),
];

/// Curves whose value at `t = 1` is deliberately not `1`.
pub const NON_TERMINATING: &[Curve] = &[
    Curve::ThereAndBack,
    Curve::ThereAndBackWithPause,
    Curve::Wiggle,
    Curve::ExponentialDecay,
    Curve::NotQuiteThere,
];

/// Lowercase, trim and accept `-` for `_`.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

impl Curve {
    /// Canonical name of this curve.
    pub fn name(self) -> &'static str {
        CURVES
            .iter()
            .find(|(_, c)| *c == self)
            .map(|(n, _)| *n)
            .unwrap_or("linear")
    }

    /// Resolve a canonical name or alias.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        let key = ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, target)| (*target).to_string())
            .unwrap_or(key);
        CURVES.iter().find(|(n, _)| *n == key).map(|(_, c)| *c)
    }

    /// Evaluate the curve at clamped `t`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Hold => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Smooth => smooth(t),
            Self::RushInto => 2.0 * smooth(t / 2.0),
            Self::RushFrom => 2.0 * smooth(t / 2.0 + 0.5) - 1.0,
            Self::SlowInto => (1.0 - (1.0 - t) * (1.0 - t)).sqrt(),
            Self::DoubleSmooth => {
                if t < 0.5 {
                    0.5 * smooth(2.0 * t)
                } else {
                    0.5 * (1.0 + smooth(2.0 * t - 1.0))
                }
            }
            Self::ThereAndBack => there_and_back(t),
            Self::ThereAndBackWithPause => {
                let a = 1.0 / PAUSE_RATIO;
                if t < 0.5 - PAUSE_RATIO / 2.0 {
                    smooth(a * t)
                } else if t < 0.5 + PAUSE_RATIO / 2.0 {
                    1.0
                } else {
                    smooth(a - a * t)
                }
            }
            Self::RunningStart => running_start(t, RUNNING_START_PULL),
            Self::Wiggle => there_and_back(t) * (WIGGLES * PI * t).sin(),
            Self::Lingering => squish(t, 0.0, LINGER_UNTIL),
            Self::ExponentialDecay => 1.0 - (-t / DECAY_HALF_LIFE).exp(),
            Self::NotQuiteThere => NOT_QUITE_THERE_PROPORTION * smooth(t),
            Self::EaseIn => cubic_bezier_ease(t, 0.42, 0.0, 1.0, 1.0),
            Self::EaseOut => cubic_bezier_ease(t, 0.0, 0.0, 0.58, 1.0),
            Self::EaseInOut => cubic_bezier_ease(t, 0.42, 0.0, 0.58, 1.0),
            Self::Spring => spring(t, SPRING_STIFFNESS, SPRING_DAMPING, SPRING_MASS),
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Self::InQuint => t.powi(5),
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Self::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * t - 10.0)
                }
            }
            Self::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutExpo => {
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Self::OutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            Self::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Self::InBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                c3 * t * t * t - c1 * t * t
            }
            Self::OutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            Self::InOutBack => {
                let c1 = 1.70158;
                let c2 = c1 * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
            Self::InElastic => {
                let c4 = (2.0 * PI) / 3.0;
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
                }
            }
            Self::OutElastic => {
                let c4 = (2.0 * PI) / 3.0;
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Self::InOutElastic => {
                let c5 = (2.0 * PI) / 4.5;
                if t == 0.0 || t == 1.0 {
                    t
                } else if t < 0.5 {
                    -(2f64.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                } else {
                    (2f64.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
                }
            }
            Self::InBounce => 1.0 - bounce_out(1.0 - t),
            Self::OutBounce => bounce_out(t),
            Self::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

/// A unit-interval timing function.
///
/// Values are immutable; [`RateFunction::compose`] and [`RateFunction::chain`] build new functions
/// from clones of their inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum RateFunction {
    /// Named parameterless curve.
    Curve(Curve),
    /// CSS-style cubic bezier through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
    CubicBezier {
        /// First control point x (in `[0, 1]`).
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x (in `[0, 1]`).
        x2: f64,
        /// Second control point y.
        y2: f64,
    },
    /// Damped spring step response, snapped to 1 at the end of the segment.
    Spring {
        /// Spring constant.
        stiffness: f64,
        /// Damping coefficient.
        damping: f64,
        /// Mass (> 0).
        mass: f64,
    },
    /// Staircase with `n` equal steps.
    Steps(u32),
    /// `inner` compressed into `[a, b]`, constant outside.
    Squish {
        /// Squished function.
        inner: Box<RateFunction>,
        /// Start of the active window.
        a: f64,
        /// End of the active window.
        b: f64,
    },
    /// `inner` scaled by `proportion`.
    NotQuiteThere {
        /// Scaled function.
        inner: Box<RateFunction>,
        /// Output scale.
        proportion: f64,
    },
    /// Weighted blend: `Σ wᵢ·fᵢ(t) / Σ wᵢ`.
    Compose {
        /// Blended functions.
        functions: Vec<RateFunction>,
        /// Non-negative weights, one per function.
        weights: Vec<f64>,
    },
    /// Sequential activation: each function owns a sub-range of input and output.
    Chain {
        /// Functions in activation order.
        functions: Vec<RateFunction>,
        /// Relative segment durations, one per function.
        durations: Vec<f64>,
    },
}

impl Default for RateFunction {
    fn default() -> Self {
        Self::Curve(Curve::Linear)
    }
}

impl From<Curve> for RateFunction {
    fn from(c: Curve) -> Self {
        Self::Curve(c)
    }
}

impl RateFunction {
    /// `t ↦ t`.
    pub fn linear() -> Self {
        Self::Curve(Curve::Linear)
    }

    /// Resolve a built-in name or alias.
    pub fn from_name(name: &str) -> ChoreoResult<Self> {
        Curve::from_name(name)
            .map(Self::Curve)
            .ok_or_else(|| ChoreoError::unknown_rate_function(name))
    }

    /// Build a validated spring.
    pub fn spring(stiffness: f64, damping: f64, mass: f64) -> ChoreoResult<Self> {
        if !(stiffness.is_finite() && damping.is_finite() && mass.is_finite()) {
            return Err(ChoreoError::easing("spring parameters must be finite"));
        }
        if stiffness <= 0.0 || damping < 0.0 || mass <= 0.0 {
            return Err(ChoreoError::easing(
                "spring requires stiffness > 0, damping >= 0, mass > 0",
            ));
        }
        Ok(Self::Spring {
            stiffness,
            damping,
            mass,
        })
    }

    /// Build a validated cubic bezier.
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> ChoreoResult<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(ChoreoError::easing("cubic_bezier points must be finite"));
        }
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(ChoreoError::easing("cubic_bezier x1/x2 must be in [0, 1]"));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Build a validated staircase.
    pub fn steps(n: u32) -> ChoreoResult<Self> {
        if n == 0 {
            return Err(ChoreoError::easing("steps must be > 0"));
        }
        Ok(Self::Steps(n))
    }

    /// Compress `inner` into the window `[a, b]`.
    pub fn squish(inner: RateFunction, a: f64, b: f64) -> ChoreoResult<Self> {
        if !(a.is_finite() && b.is_finite()) || !(0.0..=1.0).contains(&a) || !(a..=1.0).contains(&b)
        {
            return Err(ChoreoError::easing("squish requires 0 <= a <= b <= 1"));
        }
        Ok(Self::Squish {
            inner: Box::new(inner),
            a,
            b,
        })
    }

    /// Scale `inner` by `proportion`.
    pub fn not_quite_there(inner: RateFunction, proportion: f64) -> ChoreoResult<Self> {
        if !proportion.is_finite() {
            return Err(ChoreoError::easing("proportion must be finite"));
        }
        Ok(Self::NotQuiteThere {
            inner: Box::new(inner),
            proportion,
        })
    }

    /// Weighted blend of `functions`.
    pub fn compose(functions: Vec<RateFunction>, weights: Vec<f64>) -> ChoreoResult<Self> {
        check_weights("compose", functions.len(), &weights)?;
        Ok(Self::Compose { functions, weights })
    }

    /// Sequential chain of `functions` over sub-ranges proportional to `durations`.
    pub fn chain(functions: Vec<RateFunction>, durations: Vec<f64>) -> ChoreoResult<Self> {
        check_weights("chain", functions.len(), &durations)?;
        Ok(Self::Chain {
            functions,
            durations,
        })
    }

    /// Canonical name when this is a named curve.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Curve(c) => Some(c.name()),
            _ => None,
        }
    }

    /// Evaluate at `t` (clamped to `[0, 1]`).
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Curve(c) => c.apply(t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            Self::Spring {
                stiffness,
                damping,
                mass,
            } => spring(t, *stiffness, *damping, *mass),
            Self::Steps(n) => {
                if t >= 1.0 {
                    1.0
                } else {
                    let n = f64::from(*n);
                    (t * n).floor() / n
                }
            }
            Self::Squish { inner, a, b } => {
                if a == b {
                    return *a;
                }
                if t < *a {
                    inner.apply(0.0)
                } else if t > *b {
                    inner.apply(1.0)
                } else {
                    inner.apply((t - a) / (b - a))
                }
            }
            Self::NotQuiteThere { inner, proportion } => proportion * inner.apply(t),
            Self::Compose { functions, weights } => {
                let total: f64 = weights.iter().sum();
                functions
                    .iter()
                    .zip(weights)
                    .map(|(f, w)| w * f.apply(t))
                    .sum::<f64>()
                    / total
            }
            Self::Chain {
                functions,
                durations,
            } => apply_chain(functions, durations, t),
        }
    }
}

fn check_weights(what: &str, n: usize, weights: &[f64]) -> ChoreoResult<()> {
    if n == 0 {
        return Err(ChoreoError::easing(format!(
            "{what} needs at least one function"
        )));
    }
    if weights.len() != n {
        return Err(ChoreoError::easing(format!(
            "{what} got {n} functions but {} weights",
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ChoreoError::easing(format!(
            "{what} weights must be finite and >= 0"
        )));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(ChoreoError::easing(format!(
            "{what} weights must have a positive sum"
        )));
    }
    Ok(())
}

fn apply_chain(functions: &[RateFunction], durations: &[f64], t: f64) -> f64 {
    let total: f64 = durations.iter().sum();
    let last_active = durations.iter().rposition(|d| *d > 0.0);
    let mut start = 0.0;
    for (i, (f, d)) in functions.iter().zip(durations).enumerate() {
        if *d <= 0.0 {
            continue;
        }
        let is_last = Some(i) == last_active;
        // The last active segment always closes at 1 so rounding cannot leave a gap.
        let end = if is_last {
            1.0
        } else {
            (start + d / total).min(1.0)
        };
        if t <= end || is_last {
            let width = end - start;
            if width <= 0.0 {
                return end;
            }
            let local = ((t - start) / width).clamp(0.0, 1.0);
            return start + width * f.apply(local);
        }
        start = end;
    }
    t
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn smooth(t: f64) -> f64 {
    let error = sigmoid(-SMOOTH_INFLECTION / 2.0);
    ((sigmoid(SMOOTH_INFLECTION * (t - 0.5)) - error) / (1.0 - 2.0 * error)).clamp(0.0, 1.0)
}

fn there_and_back(t: f64) -> f64 {
    let new_t = if t < 0.5 { 2.0 * t } else { 2.0 * (1.0 - t) };
    smooth(new_t)
}

fn squish(t: f64, a: f64, b: f64) -> f64 {
    if t < a {
        0.0
    } else if t > b {
        1.0
    } else {
        (t - a) / (b - a)
    }
}

fn running_start(t: f64, pull: f64) -> f64 {
    // Degree-6 bezier over control values [0, 0, pull, pull, 1, 1, 1].
    const BINOMIAL: [f64; 7] = [1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0];
    let points = [0.0, 0.0, pull, pull, 1.0, 1.0, 1.0];
    let u = 1.0 - t;
    points
        .iter()
        .enumerate()
        .map(|(k, p)| BINOMIAL[k] * t.powi(k as i32) * u.powi(6 - k as i32) * p)
        .sum()
}

fn cubic_bezier_ease(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    fn sample_curve(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * t * a1 + 3.0 * omt * t * t * a2 + t * t * t
    }
    fn sample_curve_derivative(a1: f64, a2: f64, t: f64) -> f64 {
        let omt = 1.0 - t;
        3.0 * omt * omt * a1 + 6.0 * omt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    // Newton-Raphson, then bisection to pin down flat regions.
    let mut t = x;
    for _ in 0..8 {
        let x_t = sample_curve(x1, x2, t) - x;
        let d = sample_curve_derivative(x1, x2, t);
        if d.abs() < 1e-7 {
            break;
        }
        t = (t - x_t / d).clamp(0.0, 1.0);
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    for _ in 0..20 {
        let x_t = sample_curve(x1, x2, t);
        if (x_t - x).abs() < 1e-9 {
            break;
        }
        if x_t < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }

    sample_curve(y1, y2, t)
}

fn spring(t: f64, stiffness: f64, damping: f64, mass: f64) -> f64 {
    if t >= 1.0 {
        return 1.0;
    }
    // Step response from 0 to 1 with x(0)=0, v(0)=0.
    let k = stiffness.max(0.0);
    let c = damping.max(0.0);
    let m = mass.max(1e-9);

    let w0 = (k / m).sqrt();
    if w0 == 0.0 {
        return t;
    }
    let zeta = c / (2.0 * (k * m).sqrt()).max(1e-9);

    if (zeta - 1.0).abs() < 1e-6 {
        let e = (-w0 * t).exp();
        1.0 - e * (1.0 + w0 * t)
    } else if zeta < 1.0 {
        let wd = w0 * (1.0 - zeta * zeta).sqrt();
        let e = (-zeta * w0 * t).exp();
        let k = zeta / (1.0 - zeta * zeta).sqrt();
        1.0 - e * ((wd * t).cos() + k * (wd * t).sin())
    } else {
        let z2 = (zeta * zeta - 1.0).sqrt();
        let r1 = -w0 * (zeta - z2);
        let r2 = -w0 * (zeta + z2);
        let c2 = (zeta + z2) / (2.0 * z2);
        let c1 = (zeta - z2) / (2.0 * z2);
        1.0 - (c2 * (r1 * t).exp() - c1 * (r2 * t).exp())
    }
}

fn bounce_out(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

// ----------------------------
// Serde
// ----------------------------

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedDef {
    CubicBezier([f64; 4]),
    Spring {
        stiffness: f64,
        damping: f64,
        mass: f64,
    },
    Steps(u32),
    Squish {
        inner: RateFunction,
        a: f64,
        b: f64,
    },
    NotQuiteThere {
        inner: RateFunction,
        proportion: f64,
    },
    Compose {
        functions: Vec<RateFunction>,
        weights: Vec<f64>,
    },
    Chain {
        functions: Vec<RateFunction>,
        durations: Vec<f64>,
    },
}

impl serde::Serialize for RateFunction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let tagged = match self {
            Self::Curve(c) => return serializer.serialize_str(c.name()),
            Self::CubicBezier { x1, y1, x2, y2 } => TaggedDef::CubicBezier([*x1, *y1, *x2, *y2]),
            Self::Spring {
                stiffness,
                damping,
                mass,
            } => TaggedDef::Spring {
                stiffness: *stiffness,
                damping: *damping,
                mass: *mass,
            },
            Self::Steps(n) => TaggedDef::Steps(*n),
            Self::Squish { inner, a, b } => TaggedDef::Squish {
                inner: (**inner).clone(),
                a: *a,
                b: *b,
            },
            Self::NotQuiteThere { inner, proportion } => TaggedDef::NotQuiteThere {
                inner: (**inner).clone(),
                proportion: *proportion,
            },
            Self::Compose { functions, weights } => TaggedDef::Compose {
                functions: functions.clone(),
                weights: weights.clone(),
            },
            Self::Chain {
                functions,
                durations,
            } => TaggedDef::Chain {
                functions: functions.clone(),
                durations: durations.clone(),
            },
        };
        tagged.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for RateFunction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Tagged(TaggedDef),
        }

        let built = match Repr::deserialize(deserializer)? {
            Repr::Name(name) => RateFunction::from_name(&name),
            Repr::Tagged(TaggedDef::CubicBezier([x1, y1, x2, y2])) => {
                RateFunction::cubic_bezier(x1, y1, x2, y2)
            }
            Repr::Tagged(TaggedDef::Spring {
                stiffness,
                damping,
                mass,
            }) => RateFunction::spring(stiffness, damping, mass),
            Repr::Tagged(TaggedDef::Steps(n)) => RateFunction::steps(n),
            Repr::Tagged(TaggedDef::Squish { inner, a, b }) => RateFunction::squish(inner, a, b),
            Repr::Tagged(TaggedDef::NotQuiteThere { inner, proportion }) => {
                RateFunction::not_quite_there(inner, proportion)
            }
            Repr::Tagged(TaggedDef::Compose { functions, weights }) => {
                RateFunction::compose(functions, weights)
            }
            Repr::Tagged(TaggedDef::Chain {
                functions,
                durations,
            }) => RateFunction::chain(functions, durations),
        };
        built.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
