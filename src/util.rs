
pub const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Formats a seconds-of-day value as HH:MM:SS. Values past midnight keep
/// counting hours (25:00:00) so a late start still reads as the same day.
pub fn pretty_time(seconds: &i64) -> String {
    let s = (*seconds).max(0);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Short form used for settings output, drops the hour when it is zero.
pub fn pretty_duration(seconds: &u64) -> String {
    if seconds >= &3600 {
        return format!("{}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Hour and minute a seconds-of-day value falls in, wrapped onto a single day.
pub fn hour_minute(seconds: i64) -> (u32, u32) {
    let s = seconds.rem_euclid(SECONDS_PER_DAY);
    ((s / 3600) as u32, ((s % 3600) / 60) as u32)
}
