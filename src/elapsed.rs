pub const MS_PER_SECOND: u64 = 1_000;
pub const MS_PER_MINUTE: u64 = 60_000;
pub const MS_PER_HOUR: u64 = 3_600_000;
pub const MS_PER_DAY: u64 = 86_400_000;

/// Fixed-length year used for the year split. This deliberately ignores leap
/// years, so the year count drifts from the calendar over multi-year spans.
pub const DAYS_PER_YEAR: u64 = 365;

/// Decomposed elapsed duration: a years/days/hh/mm/ss breakdown plus running
/// totals. Derived and ephemeral; recomputed on every tick, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub years: u64,
    /// Days left over after whole (365-day) years are taken out.
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_days: u64,
    pub total_hours: u64,
    pub total_minutes: u64,
    pub total_seconds: u64,
}

impl Elapsed {
    /// Decompose a non-negative millisecond count. Pure and deterministic.
    pub fn from_millis(ms: u64) -> Self {
        let total_seconds = ms / MS_PER_SECOND;
        let total_minutes = ms / MS_PER_MINUTE;
        let total_hours = ms / MS_PER_HOUR;
        let total_days = ms / MS_PER_DAY;

        let years = total_days / DAYS_PER_YEAR;

        Self {
            years,
            days: total_days - years * DAYS_PER_YEAR,
            hours: (ms % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (ms % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (ms % MS_PER_MINUTE) / MS_PER_SECOND,
            total_days,
            total_hours,
            total_minutes,
            total_seconds,
        }
    }

    /// Elapsed time between two epoch-millisecond instants, clamped to zero
    /// when `now` is earlier than `start`.
    pub fn between(start_ms: i64, now_ms: i64) -> Self {
        Self::from_millis(now_ms.saturating_sub(start_ms).max(0) as u64)
    }

    /// Total elapsed milliseconds this decomposition was derived from,
    /// truncated to whole seconds.
    pub fn whole_ms(&self) -> u64 {
        self.total_seconds * MS_PER_SECOND
    }
}
