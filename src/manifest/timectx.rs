use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

/// The user's "now": the reference instant shifted into their own time zone,
/// carried through the whole run so every derived local time composes on the
/// same calendar date.
pub struct TimeContext {
    pub tz: Tz,
    pub local_now: DateTime<Tz>,
}

impl TimeContext {
    /// Fails only on an unknown zone identifier, which skips that one user.
    pub fn resolve(timezone: &str, reference: DateTime<Utc>) -> Result<Self, String> {
        let tz: Tz = timezone
            .parse()
            .map_err(|e| format!("Invalid timezone '{}': {}", timezone, e))?;
        Ok(Self {
            tz,
            local_now: reference.with_timezone(&tz),
        })
    }

    pub fn local_hour(&self) -> u32 {
        self.local_now.hour()
    }

    pub fn local_date(&self) -> NaiveDate {
        self.local_now.date_naive()
    }

    /// "YYYY-MM-DD", the shape events are stored under.
    pub fn local_date_string(&self) -> String {
        self.local_now.format("%Y-%m-%d").to_string()
    }
}
