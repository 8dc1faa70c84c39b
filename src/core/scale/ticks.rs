//! Tick spacing in 1/2/5 × 10^k steps.

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Signed tick increment for roughly `count` ticks over `[start, stop]`.
///
/// Positive results are step sizes; negative results `-k` mean a step of
/// `1 / k`, which keeps fractional steps exact when multiplied back.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return 0.0;
    }
    let step = (stop - start) / count as f64;
    if step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Evenly spaced round values within `[start, stop]` (either order).
#[must_use]
pub fn tick_values(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let increment = tick_increment(lo, hi, count);
    if increment == 0.0 || !increment.is_finite() {
        return Vec::new();
    }

    let mut ticks = Vec::new();
    if increment > 0.0 {
        let mut r0 = (lo / increment).round();
        let mut r1 = (hi / increment).round();
        if r0 * increment < lo {
            r0 += 1.0;
        }
        if r1 * increment > hi {
            r1 -= 1.0;
        }
        push_steps(&mut ticks, r0, r1, |r| r * increment);
    } else {
        let inverse = -increment;
        let mut r0 = (lo * inverse).round();
        let mut r1 = (hi * inverse).round();
        if r0 / inverse < lo {
            r0 += 1.0;
        }
        if r1 / inverse > hi {
            r1 -= 1.0;
        }
        push_steps(&mut ticks, r0, r1, |r| r / inverse);
    }

    if reverse {
        ticks.reverse();
    }
    ticks
}

/// Upper bound on generated ticks, whatever the requested count.
const MAX_TICKS: usize = 1_000;

/// Pushes `value(r0 + i)` for each whole step in `r0..=r1`.
///
/// Steps are counted rather than accumulated: past 2^53 adding one to a float
/// no longer changes it. Values that collapse onto the previous one are skipped.
fn push_steps(ticks: &mut Vec<f64>, r0: f64, r1: f64, value: impl Fn(f64) -> f64) {
    let count = r1 - r0 + 1.0;
    if !count.is_finite() || count < 1.0 {
        return;
    }
    let count = (count as usize).min(MAX_TICKS);
    for i in 0..count {
        let tick = value(r0 + i as f64);
        if ticks.last().is_none_or(|&last| tick > last) {
            ticks.push(tick);
        }
    }
}

/// Extends `[start, stop]` outward to multiples of the tick step.
#[must_use]
pub fn nice_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let reverse = stop < start;
    let (mut lo, mut hi) = if reverse { (stop, start) } else { (start, stop) };
    let mut previous: Option<f64> = None;

    for _ in 0..10 {
        let step = tick_increment(lo, hi, count);
        if previous == Some(step) {
            break;
        }
        if step > 0.0 {
            lo = (lo / step).floor() * step;
            hi = (hi / step).ceil() * step;
        } else if step < 0.0 {
            lo = (lo * step).ceil() / step;
            hi = (hi * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }

    if reverse { (hi, lo) } else { (lo, hi) }
}
