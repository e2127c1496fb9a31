//! Local time announcement

use async_trait::async_trait;
use chrono::{Local, NaiveTime, Timelike};

use crate::handlers::{Handler, Reply};
use crate::Result;

/// Announces the current local time
pub struct TimeHandler;

#[async_trait]
impl Handler for TimeHandler {
    fn name(&self) -> &'static str {
        "time"
    }

    fn keywords(&self) -> &[&'static str] {
        &["the time", "what time"]
    }

    async fn handle(&self, _utterance: &str) -> Result<Reply> {
        let now = Local::now().time();
        Ok(Reply::say(format!("The time is {}", spoken_time(now))))
    }
}

/// Render a time for speech, e.g. "10 45 PM"
///
/// The colon is dropped so TTS voices do not read it as punctuation.
#[must_use]
pub fn spoken_time(time: NaiveTime) -> String {
    let meridiem = if time.hour() < 12 { "AM" } else { "PM" };
    let hour12 = match time.hour() % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12} {:02} {meridiem}", time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spoken_time() {
        let t = NaiveTime::from_hms_opt(22, 45, 0).unwrap();
        assert_eq!(spoken_time(t), "10 45 PM");

        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(spoken_time(t), "9 05 AM");
    }

    #[test]
    fn test_spoken_time_midnight_and_noon() {
        let t = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(spoken_time(t), "12 00 AM");

        let t = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
        assert_eq!(spoken_time(t), "12 30 PM");
    }
}
