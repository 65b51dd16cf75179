use std::time::Duration;

/// Decides how long the model "computes" for a given input.
///
/// Implementations must be pure: the same bytes always map to the same
/// duration. The service suspends on a timer for that long, it never spins.
pub trait DelayStrategy: Send + Sync + 'static {
    fn delay_for(&self, image: &[u8]) -> Duration;
}

/// 10 to 30 ms, keyed on the first byte of the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct JitterDelay;

impl JitterDelay {
    pub const BASE_MS: u64 = 10;
    pub const SPREAD: u64 = 21;
}

impl DelayStrategy for JitterDelay {
    fn delay_for(&self, image: &[u8]) -> Duration {
        let first = image.first().copied().unwrap_or(0) as u64;
        Duration::from_millis(Self::BASE_MS + first % Self::SPREAD)
    }
}

/// Answers immediately. Used by tests that only care about classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayStrategy for NoDelay {
    fn delay_for(&self, _image: &[u8]) -> Duration {
        Duration::ZERO
    }
}
