use crate::local_time::MINUTES_PER_DAY;

/// Decides whether `local_minute` is a fire point of a daily window that
/// starts at `start_minute`, ends at `end_minute` (inclusive) and repeats
/// every `interval_minutes`. All minutes are minutes of the day.
///
/// Fire points are phase anchored at the window start, so a window starting
/// at 08:00 with an interval of 90 fires at 08:00, 09:30, 11:00 and so on.
/// A window where `start_minute == end_minute` fires exactly once a day and
/// ignores the interval. A window where `end_minute < start_minute` wraps
/// over midnight.
pub fn is_due(
    local_minute: i64,
    start_minute: i64,
    end_minute: i64,
    interval_minutes: i64,
) -> bool {
    if interval_minutes <= 0 {
        return false;
    }

    if start_minute == end_minute {
        return local_minute == start_minute;
    }

    if end_minute > start_minute {
        if local_minute < start_minute || local_minute > end_minute {
            return false;
        }
        return (local_minute - start_minute) % interval_minutes == 0;
    }

    // Wraps midnight: [start, 1439] and [0, end]
    if local_minute >= start_minute {
        (local_minute - start_minute) % interval_minutes == 0
    } else if local_minute <= end_minute {
        let distance = (MINUTES_PER_DAY - start_minute) + local_minute;
        distance % interval_minutes == 0
    } else {
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn due_minutes(start: i64, end: i64, interval: i64) -> Vec<i64> {
        (0..MINUTES_PER_DAY)
            .filter(|m| is_due(*m, start, end, interval))
            .collect()
    }

    #[test]
    fn rejects_non_positive_intervals() {
        for interval in &[0, -1, -60] {
            assert!(due_minutes(0, 1439, *interval).is_empty());
            assert!(!is_due(480, 480, 480, *interval));
        }
    }

    #[test]
    fn zero_width_window_fires_once() {
        for interval in &[1, 7, 60, 5000] {
            assert_eq!(due_minutes(480, 480, *interval), vec![480]);
        }
        assert_eq!(due_minutes(0, 0, 15), vec![0]);
        assert_eq!(due_minutes(1439, 1439, 15), vec![1439]);
    }

    #[test]
    fn same_day_window_is_inclusive_and_anchored_at_start() {
        assert_eq!(due_minutes(480, 600, 60), vec![480, 540, 600]);
        assert_eq!(due_minutes(480, 599, 60), vec![480, 540]);

        // 08:00, 09:30, 11:00, never multiples of 90 from midnight
        let fires = due_minutes(480, 720, 90);
        assert_eq!(fires, vec![480, 570, 660]);

        for m in 0..MINUTES_PER_DAY {
            let expected = (480..=1200).contains(&m) && (m - 480) % 45 == 0;
            assert_eq!(is_due(m, 480, 1200, 45), expected, "minute {}", m);
        }
    }

    #[test]
    fn wrapping_window() {
        let (start, end, interval) = (1380, 120, 60);
        assert!(is_due(1380, start, end, interval));
        assert!(!is_due(1439, start, end, interval));
        assert!(is_due(0, start, end, interval));
        assert!(is_due(60, start, end, interval));
        assert!(!is_due(61, start, end, interval));
        assert!(is_due(120, start, end, interval));
        assert!(!is_due(180, start, end, interval));
        assert!(!is_due(1379, start, end, interval));
    }

    #[test]
    fn overnight_window_every_two_hours() {
        assert_eq!(
            due_minutes(22 * 60, 6 * 60, 120),
            vec![0, 120, 240, 360, 1320]
        );
    }

    #[test]
    fn wrapping_window_keeps_phase_over_midnight() {
        // 23:30 start with a 45 min interval lands on 00:15, 01:00 ...
        assert_eq!(due_minutes(1410, 90, 45), vec![15, 60, 1410]);
    }
}
