//! Display formatting for timestamps and day separators.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};

use jarvis_types::message::Message;

/// 12-hour clock time, e.g. "3:05 PM".
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%-I:%M %p").to_string()
}

/// Day separator label relative to `today`.
///
/// "Today", "Yesterday", "Apr 16" within the current year, otherwise
/// "Apr 16, 2024".
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Today".to_string();
    }
    if today.pred_opt() == Some(date) {
        return "Yesterday".to_string();
    }
    if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// A run of messages that share a day label.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    pub label: String,
    pub messages: Vec<&'a Message>,
}

/// Group messages by local calendar day, labels in first-seen order.
pub fn group_by_day(messages: &[Message], today: NaiveDate) -> Vec<DayGroup<'_>> {
    group_by_day_in(messages, today, &Local)
}

/// Same as [`group_by_day`] with an explicit time zone.
pub fn group_by_day_in<'a, Tz: TimeZone>(
    messages: &'a [Message],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<DayGroup<'a>> {
    let mut groups: Vec<DayGroup<'a>> = Vec::new();
    for message in messages {
        let day = day_of(&message.timestamp, tz);
        let label = format_date_label(day, today);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.messages.push(message),
            None => groups.push(DayGroup {
                label,
                messages: vec![message],
            }),
        }
    }
    groups
}

fn day_of<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(&at(2025, 4, 16, 15, 5)), "3:05 PM");
        assert_eq!(format_timestamp(&at(2025, 4, 16, 0, 30)), "12:30 AM");
        assert_eq!(format_timestamp(&at(2025, 4, 16, 11, 59)), "11:59 AM");
    }

    #[test]
    fn test_date_labels() {
        let today = day(2025, 4, 16);
        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(day(2025, 4, 15), today), "Yesterday");
        assert_eq!(format_date_label(day(2025, 4, 2), today), "Apr 2");
        assert_eq!(format_date_label(day(2024, 4, 16), today), "Apr 16, 2024");
    }

    #[test]
    fn test_yesterday_across_year_boundary() {
        assert_eq!(format_date_label(day(2024, 12, 31), day(2025, 1, 1)), "Yesterday");
    }

    #[test]
    fn test_group_by_day_first_seen_order() {
        let today = day(2025, 4, 16);
        let messages = vec![
            Message::user("a").at(at(2025, 4, 15, 9, 0)),
            Message::bot("b").at(at(2025, 4, 15, 9, 1)),
            Message::user("c").at(at(2025, 4, 16, 8, 0)),
            // Out-of-order message joins its existing group.
            Message::bot("d").at(at(2025, 4, 15, 23, 0)),
        ];
        let groups = group_by_day_in(&messages, today, &Utc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Yesterday");
        assert_eq!(
            groups[0].messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "d"]
        );
        assert_eq!(groups[1].label, "Today");
        assert_eq!(groups[1].messages.len(), 1);
    }

    #[test]
    fn test_group_by_day_empty() {
        assert!(group_by_day(&[], day(2025, 4, 16)).is_empty());
    }
}
