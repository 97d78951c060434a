use crate::models::{CANONICAL_TIMESTAMP_FORMAT, INVALID_DATE};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// `H:MM[:SS[.F]]`, optional AM/PM, optional UTC offset
const TIME: &str = concat!(
    r"(?P<hour>\d{1,2}):(?P<minute>\d{2})",
    r"(?::(?P<second>\d{2})(?:[.,](?P<frac>\d+))?)?",
    r"(?:\s*(?P<ampm>[AaPp]\.?[Mm])\b\.?)?",
    r"(?:\s*(?P<offset>[Zz]\b|(?i:UTC|GMT)\b|[+-]\d{2}:?\d{2}))?",
);

const MONTH: &str = concat!(
    r"\b(?P<mon>(?i:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?",
    r"|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?))\b\.?",
);

const ORDINAL: &str = r"(?:st|nd|rd|th)?";

/// Why a timestamp could not be canonicalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// No grammar recognised the input
    Unrecognized,
    /// A grammar matched but the calendar/clock values are impossible
    OutOfRange { grammar: &'static str },
    /// A matched component could not be converted
    Malformed(String),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Unrecognized => write!(f, "no known date format matched"),
            TimestampError::OutOfRange { grammar } => {
                write!(f, "date/time values out of range for {} format", grammar)
            }
            TimestampError::Malformed(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for TimestampError {}

/// Result of a successful grammar match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// Wall clock time exactly as written
    pub datetime: NaiveDateTime,
    /// UTC offset, when the input carried one
    pub offset: Option<FixedOffset>,
    /// Name of the grammar that matched
    pub grammar: &'static str,
}

impl ParsedTimestamp {
    /// `YYYY-MM-DD HH:MM:SS.FFFF`, fraction truncated to four digits
    pub fn canonical(&self) -> String {
        format!(
            "{}.{:04}",
            self.datetime.format(CANONICAL_TIMESTAMP_FORMAT),
            self.datetime.nanosecond() / 100_000
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum YearSource {
    Captured,
    Reference,
}

#[derive(Debug, Clone)]
struct DateGrammar {
    name: &'static str,
    regex: Regex,
    year: YearSource,
    /// Swap month/day when the month field is > 12 and the day field fits
    day_first_fallback: bool,
}

impl DateGrammar {
    fn new(name: &'static str, pattern: String, year: YearSource, day_first_fallback: bool) -> Self {
        Self {
            name,
            regex: Regex::new(&pattern).expect("built-in date grammar must compile"),
            year,
            day_first_fallback,
        }
    }
}

/// Converts timestamp substrings into `YYYY-MM-DD HH:MM:SS.FFFF`.
///
/// Grammars are tried in a fixed order and searched anywhere in the input,
/// so surrounding tokens (brackets, weekday names, trailing text) are
/// tolerated. Formats without a year use the reference year.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    grammars: Arc<Vec<DateGrammar>>,
    /// Clock anywhere in the input, for dates matched without one
    loose_time: Regex,
    reference_year: i32,
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampNormalizer {
    pub fn new() -> Self {
        Self::with_reference_year(Utc::now().year())
    }

    pub fn with_reference_year(reference_year: i32) -> Self {
        // a connector such as "at", "@", "-" or "|" may sit between date and clock
        let time_tail = format!(r"(?:\]?[\sT,]+(?:(?i:at)\s+|[-@|]\s*)?{})?", TIME);
        let grammars = vec![
            DateGrammar::new(
                "year-month-day",
                format!(
                    r"(?:^|\D)(?P<year>\d{{4}})[-/.](?P<month>\d{{1,2}})[-/.](?P<day>\d{{1,2}}){}",
                    time_tail
                ),
                YearSource::Captured,
                false,
            ),
            DateGrammar::new(
                "month-day-year",
                format!(
                    r"(?:^|\D)(?P<month>\d{{1,2}})[-/.](?P<day>\d{{1,2}})[-/.](?P<year>\d{{4}}){}",
                    time_tail
                ),
                YearSource::Captured,
                true,
            ),
            DateGrammar::new(
                "common log",
                format!(r"(?:^|\D)(?P<day>\d{{1,2}})/{}/(?P<year>\d{{4}}):{}", MONTH, TIME),
                YearSource::Captured,
                false,
            ),
            DateGrammar::new(
                "month-name day year",
                format!(r"{}\s*(?P<day>\d{{1,2}}){},?\s+(?P<year>\d{{4}}){}", MONTH, ORDINAL, time_tail),
                YearSource::Captured,
                false,
            ),
            DateGrammar::new(
                "ctime",
                format!(r"{}\s+(?P<day>\d{{1,2}})\s+{}\s+(?P<year>\d{{4}})\b", MONTH, TIME),
                YearSource::Captured,
                false,
            ),
            DateGrammar::new(
                "day month-name year",
                format!(r"(?:^|\D)(?P<day>\d{{1,2}}){}\s+{},?\s+(?P<year>\d{{4}}){}", ORDINAL, MONTH, time_tail),
                YearSource::Captured,
                false,
            ),
            DateGrammar::new(
                "syslog",
                format!(r"{}\s+(?P<day>\d{{1,2}}){}\s+{}", MONTH, ORDINAL, TIME),
                YearSource::Reference,
                false,
            ),
            DateGrammar::new(
                "logcat",
                format!(r"(?:^|[\s\[(])(?P<month>\d{{1,2}})-(?P<day>\d{{1,2}})\s+{}", TIME),
                YearSource::Reference,
                false,
            ),
            DateGrammar::new(
                "klog",
                format!(r"(?:^|[\s\[(])(?P<month>\d{{2}})(?P<day>\d{{2}})\s+{}", TIME),
                YearSource::Reference,
                false,
            ),
        ];

        Self {
            grammars: Arc::new(grammars),
            loose_time: Regex::new(&format!(r"(?:^|[^\d:.])(?:{})", TIME)).expect("built-in time grammar must compile"),
            reference_year,
        }
    }

    /// Canonicalize `raw`; never fails, unparseable input yields a sentinel
    pub fn normalize(&self, raw: &str) -> String {
        match self.parse(raw) {
            Ok(parsed) => parsed.canonical(),
            Err(TimestampError::Unrecognized) | Err(TimestampError::OutOfRange { .. }) => {
                INVALID_DATE.to_string()
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    /// Match `raw` against the first grammar that recognises it
    pub fn parse(&self, raw: &str) -> Result<ParsedTimestamp, TimestampError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TimestampError::Unrecognized);
        }

        for grammar in self.grammars.iter() {
            if let Some(caps) = grammar.regex.captures(raw) {
                return self.build(grammar, &caps, raw);
            }
        }

        Err(TimestampError::Unrecognized)
    }

    fn build(&self, grammar: &DateGrammar, caps: &Captures, raw: &str) -> Result<ParsedTimestamp, TimestampError> {
        let year = match grammar.year {
            YearSource::Captured => {
                let text = caps.name("year").ok_or(TimestampError::Unrecognized)?.as_str();
                number(text, "year")? as i32
            }
            YearSource::Reference => self.reference_year,
        };

        let mut month = match (caps.name("month"), caps.name("mon")) {
            (Some(m), _) => number(m.as_str(), "month")?,
            (None, Some(m)) => month_from_name(m.as_str()).ok_or(TimestampError::Unrecognized)?,
            (None, None) => return Err(TimestampError::Unrecognized),
        };
        let mut day = number(caps.name("day").ok_or(TimestampError::Unrecognized)?.as_str(), "day")?;

        if grammar.day_first_fallback && month > 12 && day <= 12 {
            std::mem::swap(&mut month, &mut day);
        }

        let out_of_range = TimestampError::OutOfRange { grammar: grammar.name };
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| out_of_range.clone())?;

        // the clock may sit elsewhere in the input, e.g. before the date
        let loose;
        let clock = match caps.name("hour") {
            Some(_) => caps,
            None => match self.loose_time.captures(raw) {
                Some(found) => {
                    loose = found;
                    &loose
                }
                None => caps,
            },
        };

        let time = build_time(clock)?.ok_or(out_of_range.clone())?;
        let offset = match clock.name("offset") {
            Some(m) => Some(parse_offset(m.as_str())?.ok_or(out_of_range)?),
            None => None,
        };

        Ok(ParsedTimestamp {
            datetime: NaiveDateTime::new(date, time),
            offset,
            grammar: grammar.name,
        })
    }
}

fn number(text: &str, field: &str) -> Result<u32, TimestampError> {
    text.parse::<u32>()
        .map_err(|e| TimestampError::Malformed(format!("invalid {} '{}': {}", field, text, e)))
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// `Ok(None)` means the clock values are impossible (hour 25, 13 PM)
fn build_time(caps: &Captures) -> Result<Option<NaiveTime>, TimestampError> {
    let Some(hour) = caps.name("hour") else {
        return Ok(NaiveTime::from_hms_opt(0, 0, 0));
    };

    let mut hour = number(hour.as_str(), "hour")?;
    let minute = match caps.name("minute") {
        Some(m) => number(m.as_str(), "minute")?,
        None => 0,
    };
    let second = match caps.name("second") {
        Some(m) => number(m.as_str(), "second")?,
        None => 0,
    };
    let nanos = match caps.name("frac") {
        Some(m) => {
            let digits: String = m.as_str().chars().take(9).collect();
            let width = digits.chars().count() as u32;
            number(&digits, "fraction")? * 10u32.pow(9 - width)
        }
        None => 0,
    };

    if let Some(ampm) = caps.name("ampm") {
        if hour == 0 || hour > 12 {
            return Ok(None);
        }
        let pm = ampm.as_str().starts_with(['p', 'P']);
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }

    Ok(NaiveTime::from_hms_nano_opt(hour, minute, second, nanos))
}

/// `Ok(None)` means the offset is outside +-24h
fn parse_offset(text: &str) -> Result<Option<FixedOffset>, TimestampError> {
    let upper = text.to_uppercase();
    if upper == "Z" || upper == "UTC" || upper == "GMT" {
        return Ok(FixedOffset::east_opt(0));
    }

    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return Err(TimestampError::Malformed(format!("invalid UTC offset '{}'", text)));
    }
    let hours = number(&digits[..2], "offset hours")? as i32;
    let minutes = number(&digits[2..], "offset minutes")? as i32;

    Ok(FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    fn normalizer() -> TimestampNormalizer {
        TimestampNormalizer::with_reference_year(2024)
    }

    #[test]
    fn test_iso_without_fraction() {
        assert_eq!(normalizer().normalize("2024-01-15 10:30:00"), "2024-01-15 10:30:00.0000");
    }

    #[test]
    fn test_iso_with_t_fraction_and_zone() {
        let n = normalizer();
        assert_eq!(n.normalize("2024-01-15T10:30:00.123456Z"), "2024-01-15 10:30:00.1234");
        assert_eq!(n.normalize("2024-01-15T10:30:00.5+02:00"), "2024-01-15 10:30:00.5000");

        let parsed = n.parse("2024-01-15T10:30:00-0700").unwrap();
        assert_eq!(parsed.offset, FixedOffset::west_opt(7 * 3600));
    }

    #[test]
    fn test_slash_and_dot_separators() {
        let n = normalizer();
        assert_eq!(n.normalize("2024/01/15 10:30:00"), "2024-01-15 10:30:00.0000");
        assert_eq!(n.normalize("2024.01.15T10:30:00"), "2024-01-15 10:30:00.0000");
        assert_eq!(n.normalize("[2024-01-15] 10:30:00,250"), "2024-01-15 10:30:00.2500");
    }

    #[test]
    fn test_month_first_and_day_first_numeric() {
        let n = normalizer();
        assert_eq!(n.normalize("01/15/2024 10:30:00"), "2024-01-15 10:30:00.0000");
        assert_eq!(n.normalize("15-01-2024 10:30:00"), "2024-01-15 10:30:00.0000");
        assert_eq!(n.normalize("03.04.2024 10:30:00"), "2024-03-04 10:30:00.0000");
    }

    #[test]
    fn test_month_name_with_ordinal() {
        let n = normalizer();
        assert_eq!(n.normalize("May 3rd 2023 14:05:09.123"), "2023-05-03 14:05:09.1230");
        assert_eq!(n.normalize("January 1st, 2024 08:00"), "2024-01-01 08:00:00.0000");
        assert_eq!(n.normalize("22nd February 2024 23:59:59"), "2024-02-22 23:59:59.0000");
    }

    #[test]
    fn test_common_log_format() {
        assert_eq!(
            normalizer().normalize("10/Oct/2000:13:55:36 -0700"),
            "2000-10-10 13:55:36.0000"
        );
    }

    #[test]
    fn test_ctime_with_weekday() {
        assert_eq!(
            normalizer().normalize("Sun Dec 04 04:47:44 2005"),
            "2005-12-04 04:47:44.0000"
        );
    }

    #[test]
    fn test_yearless_formats_use_reference_year() {
        let n = normalizer();
        assert_eq!(n.normalize("Jun 14 15:16:01"), "2024-06-14 15:16:01.0000");
        assert_eq!(n.normalize("Dec  4 04:47:44"), "2024-12-04 04:47:44.0000");
        assert_eq!(n.normalize("03-17 16:13:38.811"), "2024-03-17 16:13:38.8110");
        assert_eq!(n.normalize("0115 10:30:00.123456"), "2024-01-15 10:30:00.1234");
    }

    #[test]
    fn test_twelve_hour_clock() {
        let n = normalizer();
        assert_eq!(n.normalize("01/15/2024 08:00:00 PM"), "2024-01-15 20:00:00.0000");
        assert_eq!(n.normalize("01/15/2024 12:15:00 am"), "2024-01-15 00:15:00.0000");
        assert_eq!(n.normalize("01/15/2024 13:00:00 PM"), INVALID_DATE);
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(normalizer().normalize("2024-01-15"), "2024-01-15 00:00:00.0000");
    }

    #[test]
    fn test_surrounding_tokens_are_tolerated() {
        assert_eq!(
            normalizer().normalize("at 2024-01-15 10:30:00 (server time)"),
            "2024-01-15 10:30:00.0000"
        );
    }

    #[test]
    fn test_connector_between_date_and_time() {
        let n = normalizer();
        assert_eq!(n.normalize("2024-01-15 at 10:30:00"), "2024-01-15 10:30:00.0000");
        assert_eq!(n.normalize("2024-01-15 - 10:30:00.5"), "2024-01-15 10:30:00.5000");
        assert_eq!(n.normalize("15 Jan 2024 @ 10:30:00"), "2024-01-15 10:30:00.0000");
        assert_eq!(
            n.normalize("Thursday, March 7th 2024 at 9:05 PM"),
            "2024-03-07 21:05:00.0000"
        );
    }

    #[test]
    fn test_time_before_date() {
        let n = normalizer();
        assert_eq!(n.normalize("10:30:00 01/15/2024"), "2024-01-15 10:30:00.0000");
        assert_eq!(n.normalize("25:00:00 01/15/2024"), INVALID_DATE);
    }

    #[test]
    fn test_two_digit_year_is_not_read_as_yearless() {
        let n = normalizer();
        assert_eq!(n.normalize("23-06-15 10:30:00"), INVALID_DATE);
        assert_eq!(n.normalize("[03-17 16:13:38.811]"), "2024-03-17 16:13:38.8110");
    }

    #[test]
    fn test_unparseable_inputs() {
        let n = normalizer();
        assert_eq!(n.normalize("UNKNOWN"), INVALID_DATE);
        assert_eq!(n.normalize(""), INVALID_DATE);
        assert_eq!(n.normalize("   "), INVALID_DATE);
        assert_eq!(n.normalize("10:30:00"), INVALID_DATE);
        assert_eq!(n.normalize("not a date at all"), INVALID_DATE);
    }

    #[test]
    fn test_impossible_values_are_invalid() {
        let n = normalizer();
        assert_eq!(n.normalize("2024-13-01 10:00:00"), INVALID_DATE);
        assert_eq!(n.normalize("2023-02-29 10:00:00"), INVALID_DATE);
        assert_eq!(n.normalize("2024-01-15 25:00:00"), INVALID_DATE);
        assert!(matches!(
            n.parse("2024-01-15 10:61:00"),
            Err(TimestampError::OutOfRange { grammar: "year-month-day" })
        ));
    }

    #[test]
    fn test_non_ascii_digits_yield_error_sentinel() {
        let out = normalizer().normalize("\u{ff12}\u{ff10}\u{ff12}\u{ff14}-01-15 10:30:00");
        assert!(out.starts_with("Error: invalid year"), "got {}", out);
    }

    #[test]
    fn test_parse_reports_grammar() {
        let parsed = normalizer().parse("May 3rd 2023 14:05:09").unwrap();
        assert_eq!(parsed.grammar, "month-name day year");
        assert_eq!(parsed.offset, None);
    }

    #[derive(Debug, Clone)]
    struct CanonicalInput(String);

    impl Arbitrary for CanonicalInput {
        fn arbitrary(g: &mut Gen) -> Self {
            let year = 1970 + u32::arbitrary(g) % 100;
            let month = 1 + u32::arbitrary(g) % 12;
            let day = 1 + u32::arbitrary(g) % 28;
            let hour = u32::arbitrary(g) % 24;
            let minute = u32::arbitrary(g) % 60;
            let second = u32::arbitrary(g) % 60;
            let frac = u32::arbitrary(g) % 10_000;
            CanonicalInput(format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:04}",
                year, month, day, hour, minute, second, frac
            ))
        }
    }

    #[quickcheck]
    fn prop_canonical_timestamps_are_stable(input: CanonicalInput) -> bool {
        let n = normalizer();
        let once = n.normalize(&input.0);
        once == input.0 && n.normalize(&once) == once
    }

    #[quickcheck]
    fn prop_normalize_never_panics(raw: String) -> bool {
        let out = normalizer().normalize(&raw);
        !out.is_empty()
    }
}
