//! Thread-safe rolling store for sensor readings.
//!
//! One fixed-capacity ring per stream plus the solenoid status scalar,
//! all guarded by a single coarse lock: update rates are tens of hertz at
//! most and snapshots are a hundred floats, so one critical section per
//! operation is plenty.

use std::collections::VecDeque;

use parking_lot::Mutex;

use riglink_types::SensorStream;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug)]
struct Streams {
    coil_current: VecDeque<f64>,
    temperature: VecDeque<f64>,
    pressure: VecDeque<f64>,
    solenoid_pressure: VecDeque<f64>,
    solenoid_status: String,
}

impl Streams {
    fn ring(&mut self, stream: SensorStream) -> &mut VecDeque<f64> {
        match stream {
            SensorStream::CoilCurrent => &mut self.coil_current,
            SensorStream::Temperature => &mut self.temperature,
            SensorStream::Pressure => &mut self.pressure,
            SensorStream::SolenoidPressure => &mut self.solenoid_pressure,
        }
    }

    fn ring_ref(&self, stream: SensorStream) -> &VecDeque<f64> {
        match stream {
            SensorStream::CoilCurrent => &self.coil_current,
            SensorStream::Temperature => &self.temperature,
            SensorStream::Pressure => &self.pressure,
            SensorStream::SolenoidPressure => &self.solenoid_pressure,
        }
    }
}

/// Rolling buffers for every sensor stream of the link.
///
/// Mutated exclusively by the receiver loops; read by whoever consumes the
/// data. All reads return copies; a caller never holds an alias
/// into the live rings.
#[derive(Debug)]
pub struct SensorBuffer {
    capacity: usize,
    inner: Mutex<Streams>,
}

impl SensorBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Streams {
                coil_current: VecDeque::with_capacity(capacity),
                temperature: VecDeque::with_capacity(capacity),
                pressure: VecDeque::with_capacity(capacity),
                solenoid_pressure: VecDeque::with_capacity(capacity),
                solenoid_status: "CLOSED".to_string(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a reading, evicting the oldest once at capacity.
    pub fn push(&self, stream: SensorStream, value: f64) {
        let mut inner = self.inner.lock();
        let ring = inner.ring(stream);
        ring.push_back(value);
        if ring.len() > self.capacity {
            ring.pop_front();
        }
    }

    /// Append a solenoid pressure reading and update the status scalar in
    /// one critical section.
    pub fn push_solenoid(&self, pressure: f64, status: impl Into<String>) {
        let mut inner = self.inner.lock();
        let ring = inner.ring(SensorStream::SolenoidPressure);
        ring.push_back(pressure);
        if ring.len() > self.capacity {
            ring.pop_front();
        }
        inner.solenoid_status = status.into();
    }

    /// Independent copy of a stream, oldest first.
    pub fn snapshot(&self, stream: SensorStream) -> Vec<f64> {
        let inner = self.inner.lock();
        inner.ring_ref(stream).iter().copied().collect()
    }

    /// Most recent reading of a stream, if any has arrived.
    pub fn latest(&self, stream: SensorStream) -> Option<f64> {
        let inner = self.inner.lock();
        inner.ring_ref(stream).back().copied()
    }

    pub fn len(&self, stream: SensorStream) -> usize {
        self.inner.lock().ring_ref(stream).len()
    }

    pub fn is_empty(&self, stream: SensorStream) -> bool {
        self.len(stream) == 0
    }

    /// Current solenoid valve status string.
    pub fn solenoid_status(&self) -> String {
        self.inner.lock().solenoid_status.clone()
    }
}

impl Default for SensorBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
