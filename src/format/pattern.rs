//! Compiles Luxon-style pattern strings (`HH:mm`, `EEE, dd MMM yyyy`) into
//! segments: chrono format items, localized macros (`D`, `t`, `T`, `f`) and
//! milliseconds.
//!
//! A run of one repeated ASCII letter is a token. Text inside single quotes is
//! literal, `''` is a literal quote, and every other character is copied as is.

use chrono::format::{Fixed, Item, Numeric, Pad};

use super::options::{DisplayOptions, MonthWidth, NumericWidth, TextWidth};
use super::FormatError;

/// One compiled piece of a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// A chrono item rendered as is.
    Item(Item<'static>),
    /// A localized macro token (`D`, `t`, `f`, ...), laid out per locale.
    Macro(DisplayOptions),
    /// Milliseconds, zero-padded to three digits when `padded`.
    Millisecond { padded: bool },
}

pub fn compile(pattern: &str) -> Result<Vec<Segment>, FormatError> {
    if pattern.is_empty() {
        return Err(FormatError::EmptyPattern);
    }

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.next_if_eq(&'\'').is_some() {
                literal.push('\'');
                continue;
            }
            let mut closed = false;
            while let Some(quoted) = chars.next() {
                if quoted == '\'' {
                    if chars.next_if_eq(&'\'').is_some() {
                        literal.push('\'');
                        continue;
                    }
                    closed = true;
                    break;
                }
                literal.push(quoted);
            }
            if !closed {
                return Err(FormatError::UnterminatedLiteral(pattern.to_string()));
            }
        } else if c.is_ascii_alphabetic() {
            let mut run = 1;
            while chars.next_if_eq(&c).is_some() {
                run += 1;
            }
            flush_literal(&mut literal, &mut segments);
            let segment = token(c, run).ok_or_else(|| FormatError::UnsupportedToken {
                token: c.to_string().repeat(run),
                pattern: pattern.to_string(),
            })?;
            segments.push(segment);
        } else {
            literal.push(c);
        }
    }
    flush_literal(&mut literal, &mut segments);

    Ok(segments)
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        let text = std::mem::take(literal).into_boxed_str();
        segments.push(Segment::Item(Item::OwnedLiteral(text)));
    }
}

fn token(letter: char, run: usize) -> Option<Segment> {
    let numeric = |n: Numeric, pad: Pad| Some(Segment::Item(Item::Numeric(n, pad)));
    let fixed = |f: Fixed| Some(Segment::Item(Item::Fixed(f)));

    match (letter, run) {
        ('y', 1) => numeric(Numeric::Year, Pad::None),
        ('y', 2) => numeric(Numeric::YearMod100, Pad::Zero),
        ('y', 4) => numeric(Numeric::Year, Pad::Zero),
        ('k', 4) => numeric(Numeric::IsoYear, Pad::Zero),
        ('q', 1) => numeric(Numeric::Quarter, Pad::None),
        ('M' | 'L', 1) => numeric(Numeric::Month, Pad::None),
        ('M' | 'L', 2) => numeric(Numeric::Month, Pad::Zero),
        ('M' | 'L', 3) => fixed(Fixed::ShortMonthName),
        ('M' | 'L', 4) => fixed(Fixed::LongMonthName),
        ('W', 1) => numeric(Numeric::IsoWeek, Pad::None),
        ('W', 2) => numeric(Numeric::IsoWeek, Pad::Zero),
        ('d', 1) => numeric(Numeric::Day, Pad::None),
        ('d', 2) => numeric(Numeric::Day, Pad::Zero),
        ('o', 1) => numeric(Numeric::Ordinal, Pad::None),
        ('o', 3) => numeric(Numeric::Ordinal, Pad::Zero),
        ('E' | 'c', 1) => numeric(Numeric::WeekdayFromMon, Pad::None),
        ('E' | 'c', 3) => fixed(Fixed::ShortWeekdayName),
        ('E' | 'c', 4) => fixed(Fixed::LongWeekdayName),
        ('H', 1) => numeric(Numeric::Hour, Pad::None),
        ('H', 2) => numeric(Numeric::Hour, Pad::Zero),
        ('h', 1) => numeric(Numeric::Hour12, Pad::None),
        ('h', 2) => numeric(Numeric::Hour12, Pad::Zero),
        ('m', 1) => numeric(Numeric::Minute, Pad::None),
        ('m', 2) => numeric(Numeric::Minute, Pad::Zero),
        ('s', 1) => numeric(Numeric::Second, Pad::None),
        ('s', 2) => numeric(Numeric::Second, Pad::Zero),
        ('S', 1) => Some(Segment::Millisecond { padded: false }),
        ('S', 3) => Some(Segment::Millisecond { padded: true }),
        ('a', 1) => fixed(Fixed::UpperAmPm),
        ('Z', 1 | 2) => fixed(Fixed::TimezoneOffsetColon),
        ('Z', 3) => fixed(Fixed::TimezoneOffset),
        ('Z', 4) | ('z', 1) => fixed(Fixed::TimezoneName),
        _ => macro_options(letter, run).map(Segment::Macro),
    }
}

/// Localized date and time presets.
fn macro_options(letter: char, run: usize) -> Option<DisplayOptions> {
    let date = |month: MonthWidth, weekday: Option<TextWidth>| DisplayOptions {
        weekday,
        year: Some(NumericWidth::Numeric),
        month: Some(month),
        day: Some(NumericWidth::Numeric),
        ..DisplayOptions::default()
    };
    let time = |seconds: bool, hour12: Option<bool>| DisplayOptions {
        hour: Some(if hour12 == Some(false) {
            NumericWidth::TwoDigit
        } else {
            NumericWidth::Numeric
        }),
        minute: Some(NumericWidth::TwoDigit),
        second: seconds.then_some(NumericWidth::TwoDigit),
        hour12,
        ..DisplayOptions::default()
    };
    let both = |day_part: DisplayOptions, time_part: DisplayOptions| DisplayOptions {
        hour: time_part.hour,
        minute: time_part.minute,
        second: time_part.second,
        ..day_part
    };

    let options = match (letter, run) {
        ('D', 1) => date(MonthWidth::Numeric, None),
        ('D', 2) => date(MonthWidth::Short, None),
        ('D', 3) => date(MonthWidth::Long, None),
        ('D', 4) => date(MonthWidth::Long, Some(TextWidth::Long)),
        ('t', 1) => time(false, None),
        ('t', 2) => time(true, None),
        ('T', 1) => time(false, Some(false)),
        ('T', 2) => time(true, Some(false)),
        ('f', 1) => both(date(MonthWidth::Numeric, None), time(false, None)),
        ('f', 2) => both(date(MonthWidth::Short, None), time(false, None)),
        ('F', 1) => both(date(MonthWidth::Numeric, None), time(true, None)),
        ('F', 2) => both(date(MonthWidth::Short, None), time(true, None)),
        _ => return None,
    };
    Some(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Segment {
        Segment::Item(Item::OwnedLiteral(text.into()))
    }

    fn numeric(n: Numeric, pad: Pad) -> Segment {
        Segment::Item(Item::Numeric(n, pad))
    }

    fn fixed(f: Fixed) -> Segment {
        Segment::Item(Item::Fixed(f))
    }

    fn single_macro(pattern: &str) -> DisplayOptions {
        match compile(pattern).unwrap().as_slice() {
            [Segment::Macro(options)] => options.clone(),
            other => panic!("expected one macro for {}, got {:?}", pattern, other),
        }
    }

    #[test]
    fn test_compile_hour_minute() {
        assert_eq!(
            compile("HH:mm").unwrap(),
            vec![
                numeric(Numeric::Hour, Pad::Zero),
                literal(":"),
                numeric(Numeric::Minute, Pad::Zero),
            ]
        );
    }

    #[test]
    fn test_compile_date_with_names() {
        assert_eq!(
            compile("EEE, dd MMM yyyy").unwrap(),
            vec![
                fixed(Fixed::ShortWeekdayName),
                literal(", "),
                numeric(Numeric::Day, Pad::Zero),
                literal(" "),
                fixed(Fixed::ShortMonthName),
                literal(" "),
                numeric(Numeric::Year, Pad::Zero),
            ]
        );
    }

    #[test]
    fn test_quoted_literals() {
        assert_eq!(
            compile("'week' W").unwrap(),
            vec![literal("week "), numeric(Numeric::IsoWeek, Pad::None)]
        );
        assert_eq!(
            compile("h 'o''clock'").unwrap(),
            vec![numeric(Numeric::Hour12, Pad::None), literal(" o'clock")]
        );
        assert_eq!(compile("''").unwrap(), vec![literal("'")]);
    }

    #[test]
    fn test_percent_sign_is_plain_text() {
        assert_eq!(
            compile("ss%").unwrap(),
            vec![numeric(Numeric::Second, Pad::Zero), literal("%")]
        );
    }

    #[test]
    fn test_fractional_seconds() {
        assert_eq!(
            compile("ss.SSS").unwrap(),
            vec![
                numeric(Numeric::Second, Pad::Zero),
                literal("."),
                Segment::Millisecond { padded: true },
            ]
        );
        assert_eq!(
            compile("S").unwrap(),
            vec![Segment::Millisecond { padded: false }]
        );
        assert!(compile("SS").is_err());
    }

    #[test]
    fn test_date_macros() {
        let short = single_macro("D");
        assert_eq!(short.month, Some(MonthWidth::Numeric));
        assert_eq!(short.year, Some(NumericWidth::Numeric));
        assert_eq!(short.hour, None);

        assert_eq!(single_macro("DD").month, Some(MonthWidth::Short));
        assert_eq!(single_macro("DDD").month, Some(MonthWidth::Long));

        let full = single_macro("DDDD");
        assert_eq!(full.weekday, Some(TextWidth::Long));
        assert_eq!(full.month, Some(MonthWidth::Long));
    }

    #[test]
    fn test_time_macros() {
        let localized = single_macro("t");
        assert_eq!(localized.hour12, None);
        assert_eq!(localized.second, None);
        assert_eq!(single_macro("tt").second, Some(NumericWidth::TwoDigit));

        let simple = single_macro("T");
        assert_eq!(simple.hour12, Some(false));
        assert_eq!(simple.hour, Some(NumericWidth::TwoDigit));
        assert_eq!(simple.minute, Some(NumericWidth::TwoDigit));
        assert_eq!(single_macro("TT").second, Some(NumericWidth::TwoDigit));
    }

    #[test]
    fn test_date_time_macros() {
        let short = single_macro("f");
        assert_eq!(short.month, Some(MonthWidth::Numeric));
        assert!(short.hour.is_some() && short.minute.is_some());
        assert_eq!(short.second, None);

        assert_eq!(single_macro("ff").month, Some(MonthWidth::Short));
        assert_eq!(single_macro("F").second, Some(NumericWidth::TwoDigit));
        assert_eq!(single_macro("FF").month, Some(MonthWidth::Short));
    }

    #[test]
    fn test_rejects_bad_patterns() {
        assert_eq!(compile(""), Err(FormatError::EmptyPattern));
        assert_eq!(
            compile("HHH:mm"),
            Err(FormatError::UnsupportedToken {
                token: "HHH".to_string(),
                pattern: "HHH:mm".to_string(),
            })
        );
        assert!(matches!(
            compile("HH:mm 'open"),
            Err(FormatError::UnterminatedLiteral(_))
        ));
        assert!(matches!(
            compile("QQ"),
            Err(FormatError::UnsupportedToken { .. })
        ));
        assert!(matches!(
            compile("DDDDD"),
            Err(FormatError::UnsupportedToken { .. })
        ));
    }
}
