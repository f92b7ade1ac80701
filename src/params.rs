//! Live-tunable parameters with synchronous change notification.
//!
//! There are exactly three knobs: how many particles make up the line, how
//! fast the winding drifts, and the base winding angle. Each has a declared
//! range and step; [`ParameterStore::set`] snaps incoming values onto that
//! grid instead of rejecting them, then notifies every subscriber before it
//! returns.
//!
//! # Example
//!
//! ```ignore
//! use whorl::params::{ParamKey, ParameterStore};
//!
//! let mut store = ParameterStore::new();
//! store.subscribe(|change| println!("{:?} -> {}", change.key, change.value));
//!
//! // Snapped to the nearest multiple of 100 inside [100, 300000]
//! store.set(ParamKey::ParticleCount, 1234.0);
//! assert_eq!(store.particle_count(), 1200);
//! ```

use std::fmt;

/// Identifies one of the adjustable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Number of particles in the line strip.
    ParticleCount,
    /// Multiplier applied to elapsed time before it is subtracted from the angle.
    TimeScale,
    /// Base winding angle in degrees.
    AngleNumber,
}

impl ParamKey {
    /// All keys in panel order.
    pub const ALL: [ParamKey; 3] = [
        ParamKey::ParticleCount,
        ParamKey::TimeScale,
        ParamKey::AngleNumber,
    ];

    /// Declared range and step for this parameter.
    pub fn spec(self) -> ParamSpec {
        match self {
            ParamKey::ParticleCount => ParamSpec::new(100.0, 300_000.0, 100.0),
            ParamKey::TimeScale => ParamSpec::new(0.0001, 1.0, 0.0001),
            ParamKey::AngleNumber => ParamSpec::new(0.0, 360.0, 30.0),
        }
    }

    /// Whether a change to this key requires new particle buffers.
    pub fn is_structural(self) -> bool {
        matches!(self, ParamKey::ParticleCount)
    }

    /// Human readable label, used by the control panel.
    pub fn label(self) -> &'static str {
        match self {
            ParamKey::ParticleCount => "number",
            ParamKey::TimeScale => "time scale",
            ParamKey::AngleNumber => "angle",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Range and granularity of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ParamSpec {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }

    /// Clamp into `[min, max]` and snap to the nearest step counted from `min`.
    ///
    /// NaN collapses to `min`.
    pub fn normalize(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        let (min, max, step) = (self.min as f64, self.max as f64, self.step as f64);
        let clamped = (value as f64).clamp(min, max);
        if clamped >= max {
            return self.max;
        }
        let snapped = if step > 0.0 {
            min + ((clamped - min) / step).round() * step
        } else {
            clamped
        };
        snapped.clamp(min, max) as f32
    }
}

/// Snapshot of every parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub particle_count: u32,
    pub time_scale: f32,
    pub angle_number: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            particle_count: 6000,
            time_scale: 0.001,
            angle_number: 120.0,
        }
    }
}

impl Parameters {
    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::ParticleCount => self.particle_count as f32,
            ParamKey::TimeScale => self.time_scale,
            ParamKey::AngleNumber => self.angle_number,
        }
    }

    fn put(&mut self, key: ParamKey, value: f32) {
        match key {
            ParamKey::ParticleCount => self.particle_count = value.round() as u32,
            ParamKey::TimeScale => self.time_scale = value,
            ParamKey::AngleNumber => self.angle_number = value,
        }
    }
}

/// Notification passed to subscribers after a parameter is written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamChange {
    pub key: ParamKey,
    /// The stored value after clamping and snapping.
    pub value: f32,
}

/// Handle returned by [`ParameterStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(ParamChange)>;

/// Owns the parameter values and the list of change listeners.
pub struct ParameterStore {
    values: Parameters,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl ParameterStore {
    /// Create a store holding the default values.
    pub fn new() -> Self {
        Self::with_values(Parameters::default())
    }

    /// Create a store from initial values, normalized the same way as [`set`](Self::set).
    pub fn with_values(initial: Parameters) -> Self {
        let mut values = Parameters::default();
        for key in ParamKey::ALL {
            values.put(key, key.spec().normalize(initial.get(key)));
        }
        Self {
            values,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current value of a parameter.
    pub fn get(&self, key: ParamKey) -> f32 {
        self.values.get(key)
    }

    /// Declared range of a parameter.
    pub fn spec(&self, key: ParamKey) -> ParamSpec {
        key.spec()
    }

    /// Copy of all current values.
    pub fn snapshot(&self) -> Parameters {
        self.values
    }

    pub fn particle_count(&self) -> u32 {
        self.values.particle_count
    }

    pub fn time_scale(&self) -> f32 {
        self.values.time_scale
    }

    pub fn angle_number(&self) -> f32 {
        self.values.angle_number
    }

    /// Write a parameter, clamping and snapping it to its declared grid.
    ///
    /// Every listener runs, in subscription order, before this returns.
    /// Returns the value actually stored.
    pub fn set(&mut self, key: ParamKey, value: f32) -> f32 {
        let stored = key.spec().normalize(value);
        self.values.put(key, stored);

        let change = ParamChange { key, value: stored };
        for (_, listener) in self.listeners.iter_mut() {
            listener(change);
        }
        stored
    }

    /// Register a listener for every subsequent [`set`](Self::set).
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(ParamChange) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterStore")
            .field("values", &self.values)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new();
        assert_eq!(store.particle_count(), 6000);
        assert!((store.time_scale() - 0.001).abs() < 1e-7);
        assert_eq!(store.angle_number(), 120.0);
    }

    #[test]
    fn test_set_clamps_out_of_range() {
        let mut store = ParameterStore::new();

        assert_eq!(store.set(ParamKey::ParticleCount, 5.0), 100.0);
        assert_eq!(store.set(ParamKey::ParticleCount, 1e9), 300_000.0);
        assert_eq!(store.set(ParamKey::AngleNumber, -45.0), 0.0);
        assert_eq!(store.set(ParamKey::AngleNumber, 400.0), 360.0);
        assert!((store.set(ParamKey::TimeScale, 0.0) - 0.0001).abs() < 1e-7);
        assert_eq!(store.set(ParamKey::TimeScale, 2.0), 1.0);
    }

    #[test]
    fn test_set_snaps_to_step() {
        let mut store = ParameterStore::new();

        store.set(ParamKey::ParticleCount, 1234.0);
        assert_eq!(store.particle_count(), 1200);

        store.set(ParamKey::ParticleCount, 1251.0);
        assert_eq!(store.particle_count(), 1300);

        store.set(ParamKey::AngleNumber, 100.0);
        assert_eq!(store.angle_number(), 90.0);

        store.set(ParamKey::TimeScale, 0.01234);
        assert!((store.time_scale() - 0.0123).abs() < 1e-6);
    }

    #[test]
    fn test_nan_collapses_to_min() {
        let mut store = ParameterStore::new();
        assert_eq!(store.set(ParamKey::AngleNumber, f32::NAN), 0.0);
    }

    #[test]
    fn test_listeners_run_in_order_before_return() {
        let mut store = ParameterStore::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = log.clone();
        store.subscribe(move |c| first.borrow_mut().push(("first", c.key, c.value)));
        let second = log.clone();
        store.subscribe(move |c| second.borrow_mut().push(("second", c.key, c.value)));

        store.set(ParamKey::AngleNumber, 95.0);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], ("first", ParamKey::AngleNumber, 90.0));
        assert_eq!(log[1], ("second", ParamKey::AngleNumber, 90.0));
    }

    #[test]
    fn test_set_to_same_value_still_notifies() {
        let mut store = ParameterStore::new();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        store.subscribe(move |_| *h.borrow_mut() += 1);

        let current = store.get(ParamKey::ParticleCount);
        store.set(ParamKey::ParticleCount, current);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = ParameterStore::new();
        let hits = Rc::new(RefCell::new(0));
        let h = hits.clone();
        let id = store.subscribe(move |_| *h.borrow_mut() += 1);
        assert_eq!(store.listener_count(), 1);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        assert_eq!(store.listener_count(), 0);
        store.set(ParamKey::TimeScale, 0.5);
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_with_values_normalizes() {
        let store = ParameterStore::with_values(Parameters {
            particle_count: 42,
            time_scale: 3.0,
            angle_number: 44.0,
        });
        assert_eq!(store.particle_count(), 100);
        assert_eq!(store.time_scale(), 1.0);
        assert_eq!(store.angle_number(), 30.0);
    }

    #[test]
    fn test_only_particle_count_is_structural() {
        assert!(ParamKey::ParticleCount.is_structural());
        assert!(!ParamKey::TimeScale.is_structural());
        assert!(!ParamKey::AngleNumber.is_structural());
    }
}
