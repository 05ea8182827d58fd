/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn system_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Issues task ids derived from the clock, strictly increasing within a process.
///
/// Two adds inside the same millisecond (or a clock that steps backwards) would
/// otherwise collide, so each id is at least one past the previous one.
pub struct IdGenerator {
    last: u64,
    clock: Box<dyn FnMut() -> u64 + Send>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::with_clock(system_millis)
    }

    pub fn with_clock(clock: impl FnMut() -> u64 + Send + 'static) -> Self {
        Self {
            last: 0,
            clock: Box::new(clock),
        }
    }

    /// Record an id that already exists (e.g. loaded from disk) so new ids stay above it.
    pub fn observe(&mut self, id: u64) {
        self.last = self.last.max(id);
    }

    pub fn next_id(&mut self) -> u64 {
        let now = (self.clock)();
        let id = now.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").field("last", &self.last).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_clock_when_it_advances() {
        let mut ticks = vec![100, 250, 900].into_iter();
        let mut ids = IdGenerator::with_clock(move || ticks.next().unwrap_or(0));
        assert_eq!(ids.next_id(), 100);
        assert_eq!(ids.next_id(), 250);
        assert_eq!(ids.next_id(), 900);
    }

    #[test]
    fn stalled_clock_still_yields_unique_ids() {
        let mut ids = IdGenerator::with_clock(|| 5_000);
        let issued: Vec<u64> = (0..4).map(|_| ids.next_id()).collect();
        assert_eq!(issued, vec![5_000, 5_001, 5_002, 5_003]);
    }

    #[test]
    fn clock_going_backwards_does_not_reuse_ids() {
        let mut ticks = vec![2_000, 1_000].into_iter();
        let mut ids = IdGenerator::with_clock(move || ticks.next().unwrap_or(0));
        assert_eq!(ids.next_id(), 2_000);
        assert_eq!(ids.next_id(), 2_001);
    }

    #[test]
    fn observed_ids_raise_the_floor() {
        let mut ids = IdGenerator::with_clock(|| 10);
        ids.observe(1_000);
        ids.observe(50);
        assert_eq!(ids.next_id(), 1_001);
    }

    #[test]
    fn system_clock_is_past_2020() {
        assert!(system_millis() > 1_577_836_800_000);
    }
}
