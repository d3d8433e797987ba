use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;
use std::time::{Duration, SystemTime};

pub trait TimeProvider: Send + Sync + std::fmt::Debug {
    fn now_local(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone)]
pub struct RealTimeProvider {
    timezone: Option<Tz>,
}

impl RealTimeProvider {
    pub fn new(timezone_str: Option<&str>) -> Self {
        let timezone = timezone_str.and_then(|s| s.parse::<Tz>().ok());
        Self { timezone }
    }
}

impl TimeProvider for RealTimeProvider {
    fn now_local(&self) -> DateTime<FixedOffset> {
        let now_utc = Utc::now();
        if let Some(tz) = self.timezone {
            now_utc.with_timezone(&tz).fixed_offset()
        } else {
            let local = Local::now();
            local.with_timezone(local.offset())
        }
    }
}

/// Wall clock for tests, in UTC, moved only by [`FakeTimeProvider::advance`].
#[derive(Debug)]
pub struct FakeTimeProvider {
    system_time: RwLock<SystemTime>,
}

impl FakeTimeProvider {
    pub fn new(system_time: SystemTime) -> Self {
        Self {
            system_time: RwLock::new(system_time),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.system_time.write() += duration;
    }
}

impl TimeProvider for FakeTimeProvider {
    fn now_local(&self) -> DateTime<FixedOffset> {
        let datetime: DateTime<Utc> = (*self.system_time.read()).into();
        datetime.fixed_offset()
    }
}

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Label shown next to a message: `H:MM` for messages younger than a day,
/// `D/M/YY H:MM` otherwise. Rendered in the offset of `now`.
pub fn message_time(created: DateTime<Utc>, now: DateTime<FixedOffset>) -> String {
    let local = created.with_timezone(now.offset());
    let age_days = (now.timestamp_millis() - created.timestamp_millis()).div_euclid(DAY_MS);
    if age_days == 0 {
        local.format("%-H:%M").to_string()
    } else {
        local.format("%-d/%-m/%y %-H:%M").to_string()
    }
}

/// Long form used by the image preview, e.g. `Fri Mar 01 2024, 9:05`.
pub fn preview_date(created: DateTime<Utc>, now: DateTime<FixedOffset>) -> String {
    created
        .with_timezone(now.offset())
        .format("%a %b %d %Y, %-H:%M")
        .to_string()
}
