// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cell::Cell;

use chrono::TimeDelta;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

/// The largest clock offset, in days, either way.
pub const MAX_OFFSET_DAYS: i64 = 100 * 365;

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The system clock.
#[cfg(feature = "clock")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "clock")]
impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Another clock shifted by a constant offset. Lets an operator look at the
/// schedule as it will be some days from now.
#[derive(Clone, Debug)]
pub struct OffsetClock<C> {
    inner: C,
    offset: TimeDelta,
}

impl<C: Clock> OffsetClock<C> {
    /// Fails if the offset is more than `MAX_OFFSET_DAYS` either way.
    pub fn days(inner: C, days: i64) -> Fallible<Self> {
        if days.unsigned_abs() > MAX_OFFSET_DAYS.unsigned_abs() {
            return Err(ErrorReport::config(format!(
                "clock offset of {days} days is out of range (at most {MAX_OFFSET_DAYS})."
            )));
        }
        Ok(Self {
            inner,
            offset: TimeDelta::days(days),
        })
    }

    pub fn offset(&self) -> TimeDelta {
        self.offset
    }
}

impl<C: Clock> Clock for OffsetClock<C> {
    fn now(&self) -> Timestamp {
        self.inner.now() + self.offset
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_fixed_clock() -> Fallible<()> {
        let start = Timestamp::parse("2025-01-01T00:00:00Z")?;
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(TimeDelta::minutes(90));
        assert_eq!(clock.now(), Timestamp::parse("2025-01-01T01:30:00Z")?);
        Ok(())
    }

    #[test]
    fn test_offset_clock() -> Fallible<()> {
        let start = Timestamp::parse("2025-01-01T00:00:00Z")?;
        let fixed = FixedClock::new(start);
        let clock = OffsetClock::days(&fixed, 3)?;
        assert_eq!(clock.now(), Timestamp::parse("2025-01-04T00:00:00Z")?);
        fixed.advance(TimeDelta::hours(1));
        assert_eq!(clock.now(), Timestamp::parse("2025-01-04T01:00:00Z")?);
        let back = OffsetClock::days(&fixed, -1)?;
        assert_eq!(back.offset(), TimeDelta::days(-1));
        assert_eq!(back.now(), Timestamp::parse("2024-12-31T01:00:00Z")?);
        Ok(())
    }

    #[test]
    fn test_offset_out_of_range() -> Fallible<()> {
        let fixed = FixedClock::new(Timestamp::parse("2025-01-01T00:00:00Z")?);
        assert!(OffsetClock::days(&fixed, MAX_OFFSET_DAYS).is_ok());
        assert!(OffsetClock::days(&fixed, -MAX_OFFSET_DAYS).is_ok());
        let err = OffsetClock::days(&fixed, i64::MAX)
            .err()
            .ok_or_else(|| ErrorReport::new("offset accepted"))?;
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(OffsetClock::days(&fixed, i64::MIN).is_err());
        Ok(())
    }
}
