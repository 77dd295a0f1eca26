//! World clock port

/// Simulation time, independent of wall-clock time
pub trait WorldClockPort: Send + Sync {
    /// Seconds since the world started
    fn now_seconds(&self) -> f64;

    /// Whole world days elapsed
    fn day(&self) -> u32;
}
