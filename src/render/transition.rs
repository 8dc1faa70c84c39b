//! Time-based attribute interpolation per element key.
//!
//! Transitions never block: the host advances time through `tick(now)` and
//! writes the sampled attributes back to the scene. Starting a transition on
//! a key that is still animating samples the running one at `now` and
//! continues from there, so the latest target always wins.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::render::AttrMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    #[default]
    CubicInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicInOut => {
                let doubled = t * 2.0;
                if doubled <= 1.0 {
                    doubled * doubled * doubled / 2.0
                } else {
                    let shifted = doubled - 2.0;
                    (shifted * shifted * shifted + 2.0) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    from: AttrMap,
    to: AttrMap,
    started_at: Duration,
    duration: Duration,
    easing: Easing,
}

impl Transition {
    fn progress(&self, now: Duration) -> f64 {
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn sample(&self, now: Duration) -> AttrMap {
        let progress = self.progress(now);
        let eased = if progress >= 1.0 {
            1.0
        } else {
            self.easing.apply(progress)
        };
        self.to
            .iter()
            .map(|(attr, target)| {
                let value = match self.from.get(attr) {
                    Some(start) => start.interpolate(target, eased),
                    None => target.clone(),
                };
                (*attr, value)
            })
            .collect()
    }
}

/// Attributes of one element at the sampled instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSample<K> {
    pub key: K,
    pub attrs: AttrMap,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct TransitionController<K> {
    active: HashMap<K, Transition>,
    easing: Easing,
}

impl<K> Default for TransitionController<K> {
    fn default() -> Self {
        Self {
            active: HashMap::new(),
            easing: Easing::default(),
        }
    }
}

impl<K> TransitionController<K>
where
    K: Clone + Eq + Hash,
{
    #[must_use]
    pub fn new(easing: Easing) -> Self {
        Self {
            active: HashMap::new(),
            easing,
        }
    }

    #[must_use]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Animates `key` from `current` to `target` over `duration`.
    ///
    /// Returns the attributes to display right now. A zero duration applies
    /// `target` immediately and leaves nothing active.
    pub fn start(
        &mut self,
        key: K,
        current: &AttrMap,
        target: AttrMap,
        duration: Duration,
        now: Duration,
    ) -> AttrMap {
        let from = match self.active.remove(&key) {
            Some(running) => {
                let mut sampled = current.clone();
                sampled.extend(running.sample(now));
                sampled
            }
            None => current.clone(),
        };

        if duration.is_zero() {
            return target;
        }

        let transition = Transition {
            from,
            to: target,
            started_at: now,
            duration,
            easing: self.easing,
        };
        let sample = transition.sample(now);
        self.active.insert(key, transition);
        sample
    }

    /// Samples every active transition at `now`; finished ones report their
    /// target once and are dropped.
    pub fn tick(&mut self, now: Duration) -> Vec<TransitionSample<K>> {
        let samples: Vec<TransitionSample<K>> = self
            .active
            .iter()
            .map(|(key, transition)| TransitionSample {
                key: key.clone(),
                attrs: transition.sample(now),
                finished: transition.progress(now) >= 1.0,
            })
            .collect();
        self.active
            .retain(|_, transition| transition.progress(now) < 1.0);
        if !samples.is_empty() {
            trace!(sampled = samples.len(), active = self.active.len(), "transition tick");
        }
        samples
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.active.remove(key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.active.clear();
    }

    #[must_use]
    pub fn is_active(&self, key: &K) -> bool {
        self.active.contains_key(key)
    }

    /// Target attributes of the running transition for `key`.
    #[must_use]
    pub fn target(&self, key: &K) -> Option<&AttrMap> {
        self.active.get(key).map(|transition| &transition.to)
    }

    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }
}
