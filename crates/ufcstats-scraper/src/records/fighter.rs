//! Fighter profile records.

use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{collapse_whitespace, FieldMap};
use crate::parse::{
    check_link, optional, parse_float, parse_height, parse_percent, parse_reach, parse_record,
    parse_short_date, parse_stance, parse_weight, FighterRecord, Stance,
};
use crate::stats::Ratio;
use chrono::NaiveDate;
use serde::Serialize;
use shared::EntityType;

/// Labels of the personal information list
pub const PERSONAL_LABELS: &[&str] = &["height", "weight", "reach", "stance", "dob"];

/// Labels of the career statistics lists, with dots removed
pub const CAREER_LABELS: &[&str] = &[
    "slpm", "str acc", "sapm", "str def", "td avg", "td acc", "td def", "sub avg",
];

/// Fragments collected from a fighter page
#[derive(Debug)]
pub struct RawFighter {
    pub link: String,
    pub name: String,
    pub nickname: String,
    pub record: String,
    pub personal_info: FieldMap,
    pub career_stats: FieldMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    /// Inches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Pounds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    /// Inches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reach: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stance: Option<Stance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl PersonalInfo {
    /// `None` when every field is missing
    pub fn from_fields(fields: &FieldMap) -> ScrapeResult<Option<Self>> {
        fields.require_all()?;

        let info = Self {
            height: optional(fields.require("height")?, parse_height)?,
            weight: optional(fields.require("weight")?, parse_weight)?,
            reach: optional(fields.require("reach")?, parse_reach)?,
            stance: optional(fields.require("stance")?, parse_stance)?,
            date_of_birth: optional(fields.require("dob")?, |t| {
                parse_short_date("date_of_birth", t)
            })?,
        };

        let empty = info.height.is_none()
            && info.weight.is_none()
            && info.reach.is_none()
            && info.stance.is_none()
            && info.date_of_birth.is_none();
        Ok((!empty).then_some(info))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerStats {
    /// Significant strikes landed per minute
    pub slpm: f64,
    pub str_acc: Ratio,
    /// Significant strikes absorbed per minute
    pub sapm: f64,
    pub str_def: Ratio,
    /// Takedowns per 15 minutes
    pub td_avg: f64,
    pub td_acc: Ratio,
    pub td_def: Ratio,
    /// Submission attempts per 15 minutes
    pub sub_avg: f64,
}

impl CareerStats {
    /// `None` when every value is zero
    ///
    /// The site prints all zeros for fighters without recorded statistics,
    /// which is not a real record.
    pub fn from_fields(fields: &FieldMap) -> ScrapeResult<Option<Self>> {
        fields.require_all()?;

        let stats = Self {
            slpm: parse_float("slpm", fields.require("slpm")?)?,
            str_acc: parse_percent("str_acc", fields.require("str acc")?)?,
            sapm: parse_float("sapm", fields.require("sapm")?)?,
            str_def: parse_percent("str_def", fields.require("str def")?)?,
            td_avg: parse_float("td_avg", fields.require("td avg")?)?,
            td_acc: parse_percent("td_acc", fields.require("td acc")?)?,
            td_def: parse_percent("td_def", fields.require("td def")?)?,
            sub_avg: parse_float("sub_avg", fields.require("sub avg")?)?,
        };

        let values = [
            stats.slpm,
            stats.str_acc.value(),
            stats.sapm,
            stats.str_def.value(),
            stats.td_avg,
            stats.td_acc.value(),
            stats.td_def.value(),
            stats.sub_avg,
        ];
        Ok(values.iter().any(|v| *v != 0.0).then_some(stats))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterProfile {
    pub link: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub record: FighterRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_stats: Option<CareerStats>,
}

impl FighterProfile {
    pub fn from_raw(raw: RawFighter) -> ScrapeResult<Self> {
        let link = check_link(EntityType::Fighter, &raw.link)?;

        let name = collapse_whitespace(&raw.name);
        if name.is_empty() {
            return Err(ScrapeError::missing("fighter name"));
        }
        let nickname = collapse_whitespace(&raw.nickname);

        Ok(Self {
            link,
            name,
            nickname: (!nickname.is_empty()).then_some(nickname),
            record: parse_record(raw.record.trim())?,
            personal_info: PersonalInfo::from_fields(&raw.personal_info)?,
            career_stats: CareerStats::from_fields(&raw.career_stats)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal(values: [&str; 5]) -> FieldMap {
        let mut map = FieldMap::new("personal info", PERSONAL_LABELS);
        for (label, value) in PERSONAL_LABELS.iter().zip(values) {
            map.insert(label, value).unwrap();
        }
        map
    }

    fn career(values: [&str; 8]) -> FieldMap {
        let mut map = FieldMap::new("career statistics", CAREER_LABELS);
        for (label, value) in CAREER_LABELS.iter().zip(values) {
            map.insert(label, value).unwrap();
        }
        map
    }

    #[test]
    fn test_personal_info() {
        let fields = personal(["6' 4\"", "205 lbs.", "84.5\"", "Orthodox", "Jul 19, 1987"]);
        let info = PersonalInfo::from_fields(&fields).unwrap().unwrap();
        assert_eq!(info.height, Some(76));
        assert_eq!(info.weight, Some(205));
        assert_eq!(info.reach, Some(84.5));
        assert_eq!(info.date_of_birth, NaiveDate::from_ymd_opt(1987, 7, 19));

        let info = PersonalInfo::from_fields(&personal(["5' 9\"", "--", "--", "", "--"]))
            .unwrap()
            .unwrap();
        assert_eq!(info.height, Some(69));
        assert_eq!(info.stance, None);
    }

    #[test]
    fn test_personal_info_all_absent() {
        let info = PersonalInfo::from_fields(&personal(["--", "--", "--", "", "--"])).unwrap();
        assert!(info.is_none());
    }

    #[test]
    fn test_personal_info_malformed() {
        assert!(PersonalInfo::from_fields(&personal(["six feet", "--", "--", "", "--"])).is_err());
        let mut partial = FieldMap::new("personal info", PERSONAL_LABELS);
        partial.insert("height", "5' 9\"").unwrap();
        assert!(PersonalInfo::from_fields(&partial).is_err());
    }

    #[test]
    fn test_career_stats() {
        let stats = CareerStats::from_fields(&career([
            "4.29", "58%", "2.22", "64%", "1.93", "45%", "95%", "0.5",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(stats.slpm, 4.29);
        assert_eq!(stats.td_def.value(), 0.95);
    }

    #[test]
    fn test_career_stats_all_zero_is_absent() {
        let stats = CareerStats::from_fields(&career([
            "0.00", "0%", "0.00", "0%", "0.00", "0%", "0%", "0.0",
        ]))
        .unwrap();
        assert!(stats.is_none());

        // A single non-zero value keeps the stats
        let stats = CareerStats::from_fields(&career([
            "0.00", "0%", "0.00", "0%", "0.00", "0%", "0%", "0.5",
        ]))
        .unwrap();
        assert!(stats.is_some());
    }

    #[test]
    fn test_career_stats_malformed() {
        assert!(CareerStats::from_fields(&career([
            "--", "0%", "0.00", "0%", "0.00", "0%", "0%", "0.0",
        ]))
        .is_err());
    }

    #[test]
    fn test_profile() {
        let raw = RawFighter {
            link: "http://www.ufcstats.com/fighter-details/07f72a2a7591b409".to_string(),
            name: "  Jon   Jones ".to_string(),
            nickname: "".to_string(),
            record: "Record: 27-1-0 (1 NC)".to_string(),
            personal_info: personal(["--", "--", "--", "", "--"]),
            career_stats: career(["0.00", "0%", "0.00", "0%", "0.00", "0%", "0%", "0.0"]),
        };
        let profile = FighterProfile::from_raw(raw).unwrap();
        assert_eq!(profile.name, "Jon Jones");
        assert_eq!(profile.nickname, None);
        assert_eq!(profile.record.no_contests, 1);
        assert!(profile.personal_info.is_none());
        assert!(profile.career_stats.is_none());

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("careerStats").is_none());
        assert_eq!(json["record"]["noContests"], 1);
    }
}
