use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing the current moment across application. This
/// allows commands that depend on "today" to be tested.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;
}

/// Local calendar date for the provided clock. Ledger days are local days.
pub fn today(clock: &dyn Clock) -> NaiveDate {
    clock.now().date_naive()
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
