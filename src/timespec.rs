//! 解析人类可读的时间表达式, 例如 `-1 day`、`yesterday`、`last Monday` 或 `2024-03-01 12:00`
//!
//! 支持的形式:
//! - `now`, `today`, `midnight`, `yesterday`, `tomorrow`
//! - 一个或多个 `[+-]N unit`, 后面可以跟 `ago`
//!   (`unit` 为 sec/min/hour/day/week/month/year, 单复数均可)
//! - `last <weekday>`, `next <weekday>`, `this <weekday>`, `<weekday>`
//! - `@<unix timestamp>`
//! - `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH:MM:SS`

use chrono::{
    DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Weekday,
};

/// 以 `now` 为基准解析 `expr`。无法识别的表达式返回 `None`
pub fn resolve(expr: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let expr = expr.trim();
    if expr.is_empty() {
        return None;
    }
    let lower = expr.to_ascii_lowercase();
    let midnight = now.date().and_time(NaiveTime::MIN);

    match lower.as_str() {
        "now" => return Some(now),
        "today" | "midnight" => return Some(midnight),
        "yesterday" => return midnight.checked_sub_signed(TimeDelta::try_days(1)?),
        "tomorrow" => return midnight.checked_add_signed(TimeDelta::try_days(1)?),
        _ => {}
    }

    if let Some(timestamp) = lower.strip_prefix('@') {
        let seconds = timestamp.parse::<i64>().ok()?;
        return DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc());
    }

    if let Some(absolute) = parse_absolute(expr) {
        return Some(absolute);
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    match words.as_slice() {
        [direction @ ("last" | "next" | "this"), day] => {
            let weekday = parse_weekday(day)?;
            Some(relative_weekday(midnight, weekday, direction))
        }
        [day] if parse_weekday(day).is_some() => {
            let weekday = parse_weekday(day)?;
            Some(relative_weekday(midnight, weekday, "this"))
        }
        _ => resolve_offsets(&words, now),
    }
}

/// 以当前本地时间为基准解析 `expr`
pub fn resolve_now(expr: &str) -> Option<NaiveDateTime> {
    resolve(expr, Local::now().naive_local())
}

pub fn is_valid(expr: &str) -> bool {
    resolve_now(expr).is_some()
}

fn parse_absolute(expr: &str) -> Option<NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(expr, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(expr, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    match word {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// `last` 严格早于今天, `next` 严格晚于今天, `this` 为今天或下一次出现
fn relative_weekday(midnight: NaiveDateTime, weekday: Weekday, direction: &str) -> NaiveDateTime {
    let today = midnight.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let forward = (target - today).rem_euclid(7);
    let days = match direction {
        "last" => {
            if forward == 0 {
                -7
            } else {
                forward - 7
            }
        }
        "next" => {
            if forward == 0 {
                7
            } else {
                forward
            }
        }
        _ => forward,
    };
    midnight + TimeDelta::days(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

fn parse_unit(word: &str) -> Option<Unit> {
    let unit = match word.trim_end_matches('s') {
        "sec" | "second" => Unit::Second,
        "min" | "minute" => Unit::Minute,
        "hour" => Unit::Hour,
        "day" => Unit::Day,
        "week" => Unit::Week,
        "month" => Unit::Month,
        "year" => Unit::Year,
        _ => return None,
    };
    Some(unit)
}

/// 把 `+5days` 或 `-1` 这类token拆成带符号的数字和可选的单位
fn split_amount(token: &str) -> Option<(i64, &str)> {
    let digits_start = usize::from(token.starts_with(|c: char| c == '+' || c == '-'));
    let digits_end = token[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(token.len(), |i| i + digits_start);
    if digits_end == digits_start {
        return None;
    }
    let amount = token[..digits_end].parse::<i64>().ok()?;
    Some((amount, &token[digits_end..]))
}

fn resolve_offsets(words: &[&str], now: NaiveDateTime) -> Option<NaiveDateTime> {
    let (words, ago) = match words.split_last() {
        Some((&"ago", rest)) => (rest, true),
        _ => (words, false),
    };
    if words.is_empty() {
        return None;
    }

    let mut result = now;
    let mut i = 0;
    while i < words.len() {
        let (mut amount, glued) = split_amount(words[i])?;
        let unit = if glued.is_empty() {
            i += 1;
            parse_unit(words.get(i)?)?
        } else {
            parse_unit(glued)?
        };
        i += 1;
        if ago {
            amount = -amount;
        }
        result = apply(result, amount, unit)?;
    }
    Some(result)
}

fn apply(at: NaiveDateTime, amount: i64, unit: Unit) -> Option<NaiveDateTime> {
    let delta = match unit {
        Unit::Second => TimeDelta::try_seconds(amount)?,
        Unit::Minute => TimeDelta::try_minutes(amount)?,
        Unit::Hour => TimeDelta::try_hours(amount)?,
        Unit::Day => TimeDelta::try_days(amount)?,
        Unit::Week => TimeDelta::try_weeks(amount)?,
        Unit::Month | Unit::Year => {
            let months = if unit == Unit::Year {
                amount.checked_mul(12)?
            } else {
                amount
            };
            let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            return if months < 0 {
                at.checked_sub_months(magnitude)
            } else {
                at.checked_add_months(magnitude)
            };
        }
    };
    at.checked_add_signed(delta)
}
