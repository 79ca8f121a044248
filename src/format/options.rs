//! Structured display-unit options ("hour + minute, 2-digit", ...).

use chrono::format::{Fixed, Item, Numeric, Pad};
use serde::Deserialize;

use super::locale::{Conventions, DateOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NumericWidth {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextWidth {
    /// Rendered like `Short`; the locale tables carry no narrow names.
    Narrow,
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MonthWidth {
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "2-digit")]
    TwoDigit,
    #[serde(rename = "narrow")]
    Narrow,
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "long")]
    Long,
}

/// Which date/time units to show and how wide. Layout (field order,
/// separators, 12/24 hour clock) comes from the locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    pub weekday: Option<TextWidth>,
    pub year: Option<NumericWidth>,
    pub month: Option<MonthWidth>,
    pub day: Option<NumericWidth>,
    pub hour: Option<NumericWidth>,
    pub minute: Option<NumericWidth>,
    pub second: Option<NumericWidth>,
    pub hour12: Option<bool>,
    pub time_zone_name: Option<TextWidth>,
    /// Locale for this line only.
    pub locale: Option<String>,
}

impl DisplayOptions {
    /// Hour and minute, both 2-digit.
    pub const fn hour_minute() -> Self {
        Self {
            weekday: None,
            year: None,
            month: None,
            day: None,
            hour: Some(NumericWidth::TwoDigit),
            minute: Some(NumericWidth::TwoDigit),
            second: None,
            hour12: None,
            time_zone_name: None,
            locale: None,
        }
    }

    /// Short weekday, 2-digit day and short month name.
    pub const fn weekday_day_month() -> Self {
        Self {
            weekday: Some(TextWidth::Short),
            year: None,
            month: Some(MonthWidth::Short),
            day: Some(NumericWidth::TwoDigit),
            hour: None,
            minute: None,
            second: None,
            hour12: None,
            time_zone_name: None,
            locale: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.weekday.is_none()
            && self.year.is_none()
            && self.month.is_none()
            && self.day.is_none()
            && self.hour.is_none()
            && self.minute.is_none()
            && self.second.is_none()
            && self.time_zone_name.is_none()
    }

    /// Lays the requested units out as chrono format items.
    pub fn items(&self, conventions: &Conventions) -> Vec<Item<'static>> {
        if self.is_empty() {
            let numeric_date = Self {
                year: Some(NumericWidth::Numeric),
                month: Some(MonthWidth::Numeric),
                day: Some(NumericWidth::Numeric),
                ..Self::default()
            };
            return numeric_date.items(conventions);
        }

        let date = self.date_items(conventions);
        let time = self.time_items(conventions);

        let mut items = date;
        if !items.is_empty() && !time.is_empty() {
            items.push(Item::Literal(", "));
        }
        items.extend(time);
        items
    }

    fn date_items(&self, conventions: &Conventions) -> Vec<Item<'static>> {
        let day = self.day.map(|width| Item::Numeric(Numeric::Day, pad(width)));
        let year = self.year.map(|width| match width {
            NumericWidth::Numeric => Item::Numeric(Numeric::Year, Pad::None),
            NumericWidth::TwoDigit => Item::Numeric(Numeric::YearMod100, Pad::Zero),
        });
        let (month, textual) = match self.month {
            None => (None, false),
            Some(MonthWidth::Numeric) => (Some(Item::Numeric(Numeric::Month, Pad::None)), false),
            Some(MonthWidth::TwoDigit) => (Some(Item::Numeric(Numeric::Month, Pad::Zero)), false),
            Some(MonthWidth::Narrow | MonthWidth::Short) => {
                (Some(Item::Fixed(Fixed::ShortMonthName)), true)
            }
            Some(MonthWidth::Long) => (Some(Item::Fixed(Fixed::LongMonthName)), true),
        };

        let ordered: Vec<(Unit, Item<'static>)> = match conventions.order {
            DateOrder::MonthFirst => vec![(Unit::Month, month), (Unit::Day, day), (Unit::Year, year)],
            DateOrder::DayFirst => vec![(Unit::Day, day), (Unit::Month, month), (Unit::Year, year)],
            DateOrder::YearFirst => vec![(Unit::Year, year), (Unit::Month, month), (Unit::Day, day)],
        }
        .into_iter()
        .filter_map(|(unit, item)| item.map(|item| (unit, item)))
        .collect();

        let mut items = Vec::new();
        if let Some(width) = self.weekday {
            items.push(Item::Fixed(match width {
                TextWidth::Long => Fixed::LongWeekdayName,
                TextWidth::Narrow | TextWidth::Short => Fixed::ShortWeekdayName,
            }));
            if !ordered.is_empty() {
                items.push(Item::Literal(", "));
            }
        }

        let mut previous: Option<Unit> = None;
        for (unit, item) in ordered {
            if let Some(before) = previous {
                items.push(Item::Literal(if !textual {
                    conventions.numeric_separator
                } else if before == Unit::Day && unit == Unit::Year {
                    ", "
                } else {
                    " "
                }));
            }
            items.push(item);
            previous = Some(unit);
        }
        items
    }

    fn time_items(&self, conventions: &Conventions) -> Vec<Item<'static>> {
        let hour12 = self.hour12.unwrap_or(conventions.hour12);
        let mut units = Vec::new();

        if let Some(width) = self.hour {
            let numeric = if hour12 { Numeric::Hour12 } else { Numeric::Hour };
            units.push(Item::Numeric(numeric, pad(width)));
        }
        // Minutes and seconds following another unit are always two digits.
        if let Some(width) = self.minute {
            let width = if units.is_empty() { width } else { NumericWidth::TwoDigit };
            units.push(Item::Numeric(Numeric::Minute, pad(width)));
        }
        if let Some(width) = self.second {
            let width = if units.is_empty() { width } else { NumericWidth::TwoDigit };
            units.push(Item::Numeric(Numeric::Second, pad(width)));
        }

        let mut items = Vec::new();
        for (index, unit) in units.into_iter().enumerate() {
            if index > 0 {
                items.push(Item::Literal(":"));
            }
            items.push(unit);
        }
        if self.hour.is_some() && hour12 && conventions.day_period {
            items.push(Item::Literal(" "));
            items.push(Item::Fixed(Fixed::UpperAmPm));
        }
        if self.time_zone_name.is_some() {
            if !items.is_empty() {
                items.push(Item::Literal(" "));
            }
            items.push(Item::Fixed(Fixed::TimezoneName));
        }
        items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Month,
    Year,
}

fn pad(width: NumericWidth) -> Pad {
    match width {
        NumericWidth::Numeric => Pad::None,
        NumericWidth::TwoDigit => Pad::Zero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::locale::conventions;
    use chrono::Locale;

    #[test]
    fn test_hour_minute_24h() {
        let items = DisplayOptions::hour_minute().items(&conventions(Locale::de_DE));
        assert_eq!(
            items,
            vec![
                Item::Numeric(Numeric::Hour, Pad::Zero),
                Item::Literal(":"),
                Item::Numeric(Numeric::Minute, Pad::Zero),
            ]
        );
    }

    #[test]
    fn test_hour_minute_12h_appends_day_period() {
        let items = DisplayOptions::hour_minute().items(&conventions(Locale::en_US));
        assert_eq!(items.first(), Some(&Item::Numeric(Numeric::Hour12, Pad::Zero)));
        assert_eq!(items.last(), Some(&Item::Fixed(Fixed::UpperAmPm)));
    }

    #[test]
    fn test_explicit_hour12_overrides_locale() {
        let options = DisplayOptions {
            hour12: Some(false),
            ..DisplayOptions::hour_minute()
        };
        let items = options.items(&conventions(Locale::en_US));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_hour12_without_day_period_names() {
        let options = DisplayOptions {
            hour12: Some(true),
            ..DisplayOptions::hour_minute()
        };
        let items = options.items(&conventions(Locale::de_DE));
        assert_eq!(
            items,
            vec![
                Item::Numeric(Numeric::Hour12, Pad::Zero),
                Item::Literal(":"),
                Item::Numeric(Numeric::Minute, Pad::Zero),
            ]
        );
    }

    #[test]
    fn test_weekday_day_month_orders_by_locale() {
        let us = DisplayOptions::weekday_day_month().items(&conventions(Locale::en_US));
        assert_eq!(
            us,
            vec![
                Item::Fixed(Fixed::ShortWeekdayName),
                Item::Literal(", "),
                Item::Fixed(Fixed::ShortMonthName),
                Item::Literal(" "),
                Item::Numeric(Numeric::Day, Pad::Zero),
            ]
        );

        let fr = DisplayOptions::weekday_day_month().items(&conventions(Locale::fr_FR));
        assert_eq!(fr[2], Item::Numeric(Numeric::Day, Pad::Zero));
        assert_eq!(fr[4], Item::Fixed(Fixed::ShortMonthName));
    }

    #[test]
    fn test_numeric_date_uses_locale_separator() {
        let options = DisplayOptions {
            day: Some(NumericWidth::TwoDigit),
            month: Some(MonthWidth::TwoDigit),
            year: Some(NumericWidth::Numeric),
            ..DisplayOptions::default()
        };
        let items = options.items(&conventions(Locale::de_DE));
        assert_eq!(items[1], Item::Literal("."));
        assert_eq!(items[3], Item::Literal("."));
    }

    #[test]
    fn test_empty_options_fall_back_to_numeric_date() {
        let items = DisplayOptions::default().items(&conventions(Locale::en_US));
        assert_eq!(
            items,
            vec![
                Item::Numeric(Numeric::Month, Pad::None),
                Item::Literal("/"),
                Item::Numeric(Numeric::Day, Pad::None),
                Item::Literal("/"),
                Item::Numeric(Numeric::Year, Pad::None),
            ]
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let options: DisplayOptions = serde_json::from_str(
            r#"{"hour": "2-digit", "minute": "2-digit", "second": "numeric", "hour12": false}"#,
        )
        .unwrap();
        assert_eq!(options.hour, Some(NumericWidth::TwoDigit));
        assert_eq!(options.second, Some(NumericWidth::Numeric));
        assert_eq!(options.hour12, Some(false));
        assert_eq!(options.weekday, None);
    }
}
