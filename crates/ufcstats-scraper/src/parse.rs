//! Field parsers for the text fragments printed on ufcstats pages.
//!
//! Every parser expects a trimmed fragment and fails with
//! [`ScrapeError::Parse`] naming the expected pattern. Missing-value markers
//! (`--`, `---`, empty) are only accepted through [`optional`].

use crate::error::{ScrapeError, ScrapeResult};
use crate::stats::{Count, Ratio};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use shared::EntityType;

static HEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\d)' (\d{1,2})"$"#).expect("invalid regex: height"));
static WEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+) lbs\.?$").expect("invalid regex: weight"));
static REACH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\d+(?:\.\d+)?)"$"#).expect("invalid regex: reach"));
static RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:record:\s*)?(\d+)-(\d+)-(\d+)(?:\s*\((\d+)\s*nc\))?$")
        .expect("invalid regex: record")
});
static DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):([0-5]\d)$").expect("invalid regex: duration"));
static COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+) of (\d+)$").expect("invalid regex: count"));
static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)%$").expect("invalid regex: percent"));
static UINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("invalid regex: uint"));
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("invalid regex: float"));
static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^,]+?)(?:,\s*([^,]+?))?,\s*([^,]+)").expect("invalid regex: location")
});
static TIME_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+) Rnd \((\d+(?:-\d+)*)\)$").expect("invalid regex: time format")
});
static SCORECARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\S.*?)\s+(\d{1,3})\s*-\s*(\d{1,3})\.?\s*").expect("invalid regex: scorecard")
});
static DETAILS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^details:?\s*").expect("invalid regex: details label"));

/// True for the markers the site prints in place of a value
pub fn is_missing(text: &str) -> bool {
    matches!(text.trim(), "" | "--" | "---")
}

/// Run `parse` unless the fragment is a missing-value marker
pub fn optional<T>(
    text: &str,
    parse: impl FnOnce(&str) -> ScrapeResult<T>,
) -> ScrapeResult<Option<T>> {
    if is_missing(text) {
        Ok(None)
    } else {
        parse(text).map(Some)
    }
}

fn number<T: std::str::FromStr>(
    field: &'static str,
    expected: &'static str,
    digits: &str,
) -> ScrapeResult<T> {
    digits
        .parse()
        .map_err(|_| ScrapeError::parse(field, expected, digits))
}

/// `D' D"` or `D' DD"` to inches
pub fn parse_height(text: &str) -> ScrapeResult<u32> {
    const EXPECTED: &str = "D' DD\"";
    let caps = HEIGHT
        .captures(text)
        .ok_or_else(|| ScrapeError::parse("height", EXPECTED, text))?;
    let feet: u32 = number("height", EXPECTED, &caps[1])?;
    let inches: u32 = number("height", EXPECTED, &caps[2])?;
    if inches >= 12 {
        return Err(ScrapeError::parse("height", EXPECTED, text));
    }
    Ok(feet * 12 + inches)
}

/// `D+ lbs` to pounds
pub fn parse_weight(text: &str) -> ScrapeResult<u32> {
    let caps = WEIGHT
        .captures(text)
        .ok_or_else(|| ScrapeError::parse("weight", "D+ lbs", text))?;
    number("weight", "D+ lbs", &caps[1])
}

/// `D+(.D+)?"` to inches
pub fn parse_reach(text: &str) -> ScrapeResult<f64> {
    let caps = REACH
        .captures(text)
        .ok_or_else(|| ScrapeError::parse("reach", "D+(.D+)?\"", text))?;
    number("reach", "D+(.D+)?\"", &caps[1])
}

/// Win/loss/draw tally with optional no contests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub no_contests: u32,
}

/// `[Record: ]W-L-D[ (N NC)]`
pub fn parse_record(text: &str) -> ScrapeResult<FighterRecord> {
    const EXPECTED: &str = "W-L-D[ (N NC)]";
    let caps = RECORD
        .captures(text)
        .ok_or_else(|| ScrapeError::parse("record", EXPECTED, text))?;
    let no_contests = match caps.get(4) {
        Some(m) => number("record", EXPECTED, m.as_str())?,
        None => 0,
    };
    Ok(FighterRecord {
        wins: number("record", EXPECTED, &caps[1])?,
        losses: number("record", EXPECTED, &caps[2])?,
        draws: number("record", EXPECTED, &caps[3])?,
        no_contests,
    })
}

/// `M:SS` to seconds
pub fn parse_duration(field: &'static str, text: &str) -> ScrapeResult<u32> {
    let caps = DURATION
        .captures(text)
        .ok_or_else(|| ScrapeError::parse(field, "M:SS", text))?;
    let minutes: u32 = number(field, "M:SS", &caps[1])?;
    let seconds: u32 = number(field, "M:SS", &caps[2])?;
    Ok(minutes * 60 + seconds)
}

/// `M:SS` or `--`
pub fn parse_optional_duration(field: &'static str, text: &str) -> ScrapeResult<Option<u32>> {
    optional(text, |t| parse_duration(field, t))
}

/// `D+ of D+`
pub fn parse_count(field: &'static str, text: &str) -> ScrapeResult<Count> {
    let caps = COUNT
        .captures(text)
        .ok_or_else(|| ScrapeError::parse(field, "D+ of D+", text))?;
    let landed = number(field, "D+ of D+", &caps[1])?;
    let attempted = number(field, "D+ of D+", &caps[2])?;
    Count::new(landed, attempted)
        .map_err(|_| ScrapeError::parse(field, "landed <= attempted", text))
}

/// `D+%` to a ratio
pub fn parse_percent(field: &'static str, text: &str) -> ScrapeResult<Ratio> {
    let caps = PERCENT
        .captures(text)
        .ok_or_else(|| ScrapeError::parse(field, "D+%", text))?;
    let percent: u32 = number(field, "D+%", &caps[1])?;
    Ratio::from_percent(percent)
        .ok_or_else(|| ScrapeError::parse(field, "percent in [0, 100]", text))
}

/// `D+%` or `---`
pub fn parse_optional_percent(field: &'static str, text: &str) -> ScrapeResult<Option<Ratio>> {
    optional(text, |t| parse_percent(field, t))
}

pub fn parse_uint(field: &'static str, text: &str) -> ScrapeResult<u32> {
    if !UINT.is_match(text) {
        return Err(ScrapeError::parse(field, "D+", text));
    }
    number(field, "D+", text)
}

/// Non-negative decimal
pub fn parse_float(field: &'static str, text: &str) -> ScrapeResult<f64> {
    if !FLOAT.is_match(text) {
        return Err(ScrapeError::parse(field, "D+(.D+)?", text));
    }
    number(field, "D+(.D+)?", text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stance {
    Orthodox,
    Southpaw,
    Switch,
    #[serde(rename = "Open Stance")]
    OpenStance,
    Sideways,
}

/// Case-insensitive stance name
pub fn parse_stance(text: &str) -> ScrapeResult<Stance> {
    match text.to_ascii_lowercase().as_str() {
        "orthodox" => Ok(Stance::Orthodox),
        "southpaw" => Ok(Stance::Southpaw),
        "switch" => Ok(Stance::Switch),
        "open stance" => Ok(Stance::OpenStance),
        "sideways" => Ok(Stance::Sideways),
        _ => Err(ScrapeError::parse(
            "stance",
            "Orthodox, Southpaw, Switch, Open Stance or Sideways",
            text,
        )),
    }
}

/// `March 16, 2024`
pub fn parse_long_date(field: &'static str, text: &str) -> ScrapeResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%B %d, %Y")
        .map_err(|_| ScrapeError::parse(field, "Month D, YYYY", text))
}

/// `Jul 19, 1991`
pub fn parse_short_date(field: &'static str, text: &str) -> ScrapeResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%b %d, %Y")
        .map_err(|_| ScrapeError::parse(field, "Mon D, YYYY", text))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub country: String,
}

/// `city[, state], country`
///
/// Only the leading parts are read; anything after the country is ignored.
pub fn parse_location(text: &str) -> ScrapeResult<Location> {
    let caps = LOCATION
        .captures(text)
        .ok_or_else(|| ScrapeError::parse("location", "city[, state], country", text))?;
    Ok(Location {
        city: caps[1].trim().to_string(),
        state: caps.get(2).map(|m| m.as_str().trim().to_string()),
        country: caps[3].trim().to_string(),
    })
}

/// One fighter's result in a bout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    NoContest,
}

pub fn parse_outcome(text: &str) -> ScrapeResult<Outcome> {
    match text {
        "W" => Ok(Outcome::Win),
        "L" => Ok(Outcome::Loss),
        "D" => Ok(Outcome::Draw),
        "NC" => Ok(Outcome::NoContest),
        _ => Err(ScrapeError::parse("result", "W, L, D or NC", text)),
    }
}

/// Time format label, e.g. `3 Rnd (5-5-5)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFormat {
    pub label: String,
    /// Number of scheduled rounds, when the label declares them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_rounds: Option<u32>,
}

/// `N Rnd (a-b-…)` with exactly N segments; any other non-empty label is
/// kept as-is without a round count (`No Time Limit`, `1 Rnd + OT (15-3)`)
pub fn parse_time_format(text: &str) -> ScrapeResult<TimeFormat> {
    const EXPECTED: &str = "N Rnd (a-b-...)";
    if text.is_empty() {
        return Err(ScrapeError::parse("time_format", EXPECTED, text));
    }

    let scheduled_rounds = match TIME_FORMAT.captures(text) {
        Some(caps) => {
            let rounds: u32 = number("time_format", EXPECTED, &caps[1])?;
            if caps[2].split('-').count() != rounds as usize {
                return Err(ScrapeError::parse("time_format", EXPECTED, text));
            }
            Some(rounds)
        }
        None if text.contains(" Rnd (") && !text.contains('+') => {
            return Err(ScrapeError::parse("time_format", EXPECTED, text));
        }
        None => None,
    };

    Ok(TimeFormat {
        label: text.to_string(),
        scheduled_rounds,
    })
}

/// One judge's card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    pub judge: String,
    pub score_1: u32,
    pub score_2: u32,
}

/// `Judge S1 - S2.` repeated; the matches must cover the whole text
pub fn parse_scorecards(text: &str) -> ScrapeResult<Vec<Scorecard>> {
    const EXPECTED: &str = "Judge S1 - S2. ...";
    let text = text.trim();
    let mut cards = Vec::new();
    let mut end = 0;

    for caps in SCORECARD.captures_iter(text) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
        if whole.0 != end {
            return Err(ScrapeError::parse("scorecards", EXPECTED, text));
        }
        end = whole.1;
        cards.push(Scorecard {
            judge: caps[1].to_string(),
            score_1: number("scorecards", EXPECTED, &caps[2])?,
            score_2: number("scorecards", EXPECTED, &caps[3])?,
        });
    }

    if cards.is_empty() || end != text.len() {
        return Err(ScrapeError::parse("scorecards", EXPECTED, text));
    }
    Ok(cards)
}

/// Remove the `Details:` label the site prints in front of the details text
///
/// The label is part of the same text node as the value, so it survives
/// element selection. Applied before free text is stored and before
/// scorecards are parsed.
pub fn strip_details_label(text: &str) -> &str {
    match DETAILS_LABEL.find(text) {
        Some(m) => text[m.end()..].trim(),
        None => text.trim(),
    }
}

/// Check a link points at a details page of the given kind
pub fn check_link(entity: EntityType, link: &str) -> ScrapeResult<String> {
    let field = match entity {
        EntityType::Event => "event link",
        EntityType::Fighter => "fighter link",
        EntityType::Fight => "fight link",
    };
    let expected = match entity {
        EntityType::Event => "http://www.ufcstats.com/event-details/...",
        EntityType::Fighter => "http://www.ufcstats.com/fighter-details/...",
        EntityType::Fight => "http://www.ufcstats.com/fight-details/...",
    };

    let url = url::Url::parse(link.trim()).map_err(|_| ScrapeError::parse(field, expected, link))?;
    let host_ok = url.host_str() == Some("www.ufcstats.com");
    let path_ok = url.path().starts_with(&entity.details_path())
        && url.path().len() > entity.details_path().len();
    if !host_ok || !path_ok {
        return Err(ScrapeError::parse(field, expected, link));
    }
    Ok(url.to_string())
}
