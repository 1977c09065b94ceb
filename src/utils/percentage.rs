use std::{fmt::Display, ops::Deref};

/// Progress towards something, rendered with two decimals like `42.50%`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Share of `value` in `whole`. Negative values and an empty whole yield zero.
    pub fn ratio(value: i64, whole: i64) -> Percentage {
        if whole <= 0 {
            return Percentage(0.);
        }
        Percentage::new_opt(value as f64 / whole as f64 * 100.).unwrap_or(Percentage(0.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
