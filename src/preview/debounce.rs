/// Default quiet period before a render fires.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Single-shot render timer.
///
/// Every `queue` restarts the countdown, so a render only becomes ready
/// after `delay_ms` without further changes. Time is passed in as
/// milliseconds since the host loop started.
#[derive(Debug, Clone)]
pub struct RenderDebouncer {
    delay_ms: u64,
    pending: Option<u64>,
}

impl RenderDebouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Arm the timer, replacing any pending request.
    pub const fn queue(&mut self, now_ms: u64) {
        self.pending = Some(now_ms);
    }

    /// Returns true exactly once per armed timer, when its quiet period
    /// has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// When the pending render is due, if any.
    pub fn deadline(&self) -> Option<u64> {
        self.pending
            .map(|queued_at| queued_at.saturating_add(self.delay_ms))
    }

    pub const fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for RenderDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
