/// Source of `created_at` timestamps.
pub trait Clock: Send + Sync {
    /// Local wall-clock time.
    fn now(&self) -> jiff::civil::DateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> jiff::civil::DateTime {
        jiff::Zoned::now().datetime()
    }
}
