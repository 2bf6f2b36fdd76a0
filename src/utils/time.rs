//! Chat timestamp labels and the message edit window.
//!
//! Each public function has an `_at` twin taking an explicit "now"; the plain
//! versions use the device's local time zone.
use crate::constants::DEFAULT_EDIT_WINDOW_MINUTES;
use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Utc};
use std::fmt::Display;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 instant. Values without an offset (`timestamp` columns)
/// are read as UTC.
pub fn parse_timestamp(iso: &str) -> Option<DateTime<Utc>> {
    let iso = iso.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(iso, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Relative label for a chat bubble: "Just now", "5 min ago", "14:05",
/// "Yesterday" or "03/10/2026".
pub fn format_message_time(iso: &str) -> String {
    format_message_time_at(iso, &Local::now())
}

pub fn format_message_time_at<Tz>(iso: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(instant) = parse_timestamp(iso) else {
        log::warn!("Could not parse message timestamp: {:?}", iso);
        return String::new();
    };

    let local = instant.with_timezone(&now.timezone());
    let elapsed = now.clone().signed_duration_since(instant);

    if elapsed < Duration::minutes(1) {
        return "Just now".to_string();
    }
    if elapsed < Duration::minutes(60) {
        return format!("{} min ago", elapsed.num_minutes());
    }

    let today = now.date_naive();
    let day = local.date_naive();
    if day == today {
        local.format("%H:%M").to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_string()
    } else {
        local.format("%d/%m/%Y").to_string()
    }
}

/// Absolute "dd/MM/yyyy HH:mm" label in local time.
pub fn format_full_timestamp(iso: &str) -> String {
    format_full_timestamp_in(iso, &Local)
}

pub fn format_full_timestamp_in<Tz>(iso: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match parse_timestamp(iso) {
        Some(instant) => instant.with_timezone(tz).format("%d/%m/%Y %H:%M").to_string(),
        None => {
            log::warn!("Could not parse timestamp: {:?}", iso);
            String::new()
        }
    }
}

/// Whether a message sent at `iso` may still be edited (15 minute window).
pub fn can_edit_message(iso: &str) -> bool {
    is_within_edit_window(iso, DEFAULT_EDIT_WINDOW_MINUTES)
}

pub fn is_within_edit_window(iso: &str, window_minutes: i64) -> bool {
    is_within_edit_window_at(iso, window_minutes, &Utc::now())
}

/// Instants slightly in the future (clock skew) count as inside the window.
pub fn is_within_edit_window_at<Tz: TimeZone>(
    iso: &str,
    window_minutes: i64,
    now: &DateTime<Tz>,
) -> bool {
    let Some(window) = Duration::try_minutes(window_minutes) else {
        log::warn!("Edit window of {} minutes is out of range", window_minutes);
        return false;
    };
    match parse_timestamp(iso) {
        Some(instant) => now.clone().signed_duration_since(instant) <= window,
        None => {
            log::warn!("Could not parse timestamp for edit window: {:?}", iso);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn zone() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        zone().with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn iso(dt: DateTime<FixedOffset>) -> String {
        dt.with_timezone(&Utc).to_rfc3339()
    }

    #[test]
    fn test_parse_formats() {
        assert!(parse_timestamp("2026-10-17T09:30:00Z").is_some());
        assert!(parse_timestamp("2026-10-17T09:30:00.123456+00:00").is_some());
        assert!(parse_timestamp("2026-10-17T09:30:00.123456").is_some());
        assert!(parse_timestamp("2026-10-17 09:30:00").is_some());
        assert!(parse_timestamp("yesterday-ish").is_none());

        let offset = parse_timestamp("2026-10-17T11:30:00+02:00").unwrap();
        let naive = parse_timestamp("2026-10-17T09:30:00").unwrap();
        assert_eq!(offset, naive);
    }

    #[test]
    fn test_just_now() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let sent = now - Duration::seconds(30);
        assert_eq!(format_message_time_at(&iso(sent), &now), "Just now");
    }

    #[test]
    fn test_minutes_ago() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let sent = now - Duration::minutes(10);
        assert_eq!(format_message_time_at(&iso(sent), &now), "10 min ago");
        let sent = now - Duration::minutes(59) - Duration::seconds(59);
        assert_eq!(format_message_time_at(&iso(sent), &now), "59 min ago");
    }

    #[test]
    fn test_same_day_shows_clock_time() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let sent = local(2026, 10, 17, 10, 30, 0);
        assert_eq!(format_message_time_at(&iso(sent), &now), "10:30");
    }

    #[test]
    fn test_uses_local_zone_for_clock_time() {
        let now = local(2026, 10, 17, 15, 0, 0);
        // 08:30 UTC is 10:30 at +02:00
        assert_eq!(
            format_message_time_at("2026-10-17T08:30:00Z", &now),
            "10:30"
        );
    }

    #[test]
    fn test_yesterday() {
        let now = local(2026, 10, 17, 1, 30, 0);
        let sent = local(2026, 10, 16, 23, 0, 0);
        assert_eq!(format_message_time_at(&iso(sent), &now), "Yesterday");
        let sent = local(2026, 10, 16, 0, 5, 0);
        assert_eq!(format_message_time_at(&iso(sent), &now), "Yesterday");
    }

    #[test]
    fn test_two_days_ago_shows_date() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let sent = now - Duration::days(2);
        assert_eq!(format_message_time_at(&iso(sent), &now), "15/10/2026");
    }

    #[test]
    fn test_future_instant_is_just_now() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let sent = now + Duration::minutes(3);
        assert_eq!(format_message_time_at(&iso(sent), &now), "Just now");
    }

    #[test]
    fn test_unparsable_input() {
        let now = local(2026, 10, 17, 15, 0, 0);
        assert_eq!(format_message_time_at("not a date", &now), "");
        assert_eq!(format_full_timestamp_in("", &zone()), "");
        assert!(!is_within_edit_window_at("garbage", 15, &now));
    }

    #[test]
    fn test_full_timestamp() {
        assert_eq!(
            format_full_timestamp_in("2026-03-05T07:04:00Z", &zone()),
            "05/03/2026 09:04"
        );
        assert_eq!(
            format_full_timestamp_in("2026-03-05T07:04:00Z", &Utc),
            "05/03/2026 07:04"
        );
    }

    #[test]
    fn test_edit_window() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let recent = iso(now - Duration::minutes(14));
        let stale = iso(now - Duration::minutes(16));
        assert!(is_within_edit_window_at(&recent, 15, &now));
        assert!(!is_within_edit_window_at(&stale, 15, &now));
        assert!(is_within_edit_window_at(&stale, 30, &now));
    }

    #[test]
    fn test_out_of_range_window_is_closed() {
        let now = local(2026, 10, 17, 15, 0, 0);
        let recent = iso(now - Duration::minutes(1));
        assert!(!is_within_edit_window_at(&recent, i64::MAX, &now));
        assert!(!is_within_edit_window_at(&recent, i64::MIN, &now));
        assert!(!is_within_edit_window("2026-10-17T09:30:00Z", i64::MAX));
    }

    #[test]
    fn test_can_edit_message_uses_current_time() {
        let recent = (Utc::now() - Duration::minutes(1)).to_rfc3339();
        let stale = (Utc::now() - Duration::hours(2)).to_rfc3339();
        assert!(can_edit_message(&recent));
        assert!(!can_edit_message(&stale));
    }
}
