//! Fight records: result, bout information and round-by-round statistics.

use super::PerFighter;
use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{collapse_whitespace, FieldMap};
use crate::parse::{
    check_link, parse_count, parse_duration, parse_optional_duration, parse_optional_percent,
    parse_outcome, parse_scorecards, parse_time_format, parse_uint, strip_details_label, Outcome,
    Scorecard, TimeFormat,
};
use crate::stats::{Count, Ratio};
use serde::Serialize;
use shared::EntityType;

/// Labels of the bout information line
pub const BOUT_LABELS: &[&str] = &["method", "round", "time", "time format", "referee"];

/// Columns of a totals row, fighter names included
pub const TOTALS_COLUMNS: usize = 10;

/// Columns of a significant strikes row, fighter names included
pub const SIGNIFICANT_COLUMNS: usize = 9;

/// Cells of one table row: per column, the values printed for each fighter
pub type RawRow = Vec<PerFighter<String>>;

/// The four statistics tables of a fight page
#[derive(Debug, Clone)]
pub struct RawRoundTables {
    pub totals: RawRow,
    pub totals_by_round: Vec<RawRow>,
    pub significant: RawRow,
    pub significant_by_round: Vec<RawRow>,
}

/// Fragments collected from a fight page
#[derive(Debug)]
pub struct RawFight {
    pub link: String,
    pub event_name: String,
    pub fighter_names: PerFighter<String>,
    /// Result markers (`W`, `L`, `D`, `NC`)
    pub statuses: PerFighter<String>,
    /// Bout title, e.g. `UFC Women's Strawweight Title Bout`
    pub description: String,
    /// `src` of every image next to the bout title
    pub images: Vec<String>,
    pub bout: FieldMap,
    /// Details line, label included
    pub details: String,
    pub tables: Option<RawRoundTables>,
}

/// Paired result; only W/L, L/W, D/D and NC/NC are valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FightResult {
    pub fighter_1: Outcome,
    pub fighter_2: Outcome,
}

impl FightResult {
    pub fn new(fighter_1: Outcome, fighter_2: Outcome) -> ScrapeResult<Self> {
        use Outcome::*;
        match (fighter_1, fighter_2) {
            (Win, Loss) | (Loss, Win) | (Draw, Draw) | (NoContest, NoContest) => Ok(Self {
                fighter_1,
                fighter_2,
            }),
            _ => Err(ScrapeError::consistency(format!(
                "invalid result pairing {:?}/{:?}",
                fighter_1, fighter_2
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeightClass {
    Strawweight,
    Flyweight,
    Bantamweight,
    Featherweight,
    Lightweight,
    #[serde(rename = "Super Lightweight")]
    SuperLightweight,
    Welterweight,
    #[serde(rename = "Super Welterweight")]
    SuperWelterweight,
    Middleweight,
    #[serde(rename = "Super Middleweight")]
    SuperMiddleweight,
    #[serde(rename = "Light Heavyweight")]
    LightHeavyweight,
    Heavyweight,
    Cruiserweight,
    #[serde(rename = "Super Heavyweight")]
    SuperHeavyweight,
    #[serde(rename = "Catch Weight")]
    CatchWeight,
    #[serde(rename = "Open Weight")]
    OpenWeight,
}

const WEIGHT_CLASSES: &[(&str, WeightClass)] = &[
    ("strawweight", WeightClass::Strawweight),
    ("flyweight", WeightClass::Flyweight),
    ("bantamweight", WeightClass::Bantamweight),
    ("featherweight", WeightClass::Featherweight),
    ("lightweight", WeightClass::Lightweight),
    ("super lightweight", WeightClass::SuperLightweight),
    ("welterweight", WeightClass::Welterweight),
    ("super welterweight", WeightClass::SuperWelterweight),
    ("middleweight", WeightClass::Middleweight),
    ("super middleweight", WeightClass::SuperMiddleweight),
    ("light heavyweight", WeightClass::LightHeavyweight),
    ("heavyweight", WeightClass::Heavyweight),
    ("cruiserweight", WeightClass::Cruiserweight),
    ("super heavyweight", WeightClass::SuperHeavyweight),
    ("catch weight", WeightClass::CatchWeight),
    ("open weight", WeightClass::OpenWeight),
];

impl WeightClass {
    /// Longest case-insensitive match in the bout description, Open Weight if none
    pub fn infer(description: &str) -> WeightClass {
        let lower = description.to_lowercase();
        WEIGHT_CLASSES
            .iter()
            .filter(|(name, _)| lower.contains(name))
            .max_by_key(|(name, _)| name.len())
            .map(|(_, class)| *class)
            .unwrap_or(WeightClass::OpenWeight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Bonus {
    #[serde(rename = "Performance of the Night")]
    PerformanceOfTheNight,
    #[serde(rename = "Fight of the Night")]
    FightOfTheNight,
    #[serde(rename = "Submission of the Night")]
    SubmissionOfTheNight,
    #[serde(rename = "KO of the Night")]
    KnockoutOfTheNight,
}

impl Bonus {
    /// Decode a bonus image
    ///
    /// `Ok(None)` for the title belt image, an error for anything unknown.
    pub fn from_image(src: &str) -> ScrapeResult<Option<Bonus>> {
        let file = src.rsplit('/').next().unwrap_or(src);
        match file {
            "belt.png" => Ok(None),
            "perf.png" => Ok(Some(Bonus::PerformanceOfTheNight)),
            "fight.png" => Ok(Some(Bonus::FightOfTheNight)),
            "sub.png" => Ok(Some(Bonus::SubmissionOfTheNight)),
            "ko.png" => Ok(Some(Bonus::KnockoutOfTheNight)),
            _ => Err(ScrapeError::consistency(format!("unknown bonus image {:?}", src))),
        }
    }
}

/// Free-text details for finishes, judges' cards for decisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoutDecision {
    Details(String),
    Scorecards(Vec<Scorecard>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoutInfo {
    pub title_bout: bool,
    pub interim_title: bool,
    pub bonuses: Vec<Bonus>,
    pub sex: Sex,
    pub weight_class: WeightClass,
    pub method: String,
    pub round: u32,
    /// Seconds into the final round
    pub time: u32,
    pub time_format: TimeFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referee: Option<String>,
    #[serde(flatten)]
    pub decision: BoutDecision,
}

impl BoutInfo {
    pub fn from_raw(
        description: &str,
        images: &[String],
        bout: &FieldMap,
        details: &str,
    ) -> ScrapeResult<Self> {
        let description = collapse_whitespace(description);
        if description.is_empty() {
            return Err(ScrapeError::missing("bout description"));
        }
        let lower = description.to_lowercase();
        let title_bout = lower.contains("title bout");
        let interim_title = title_bout && lower.contains("interim");
        let sex = if lower.contains("women") { Sex::Female } else { Sex::Male };
        let weight_class = WeightClass::infer(&description);

        let mut bonuses = Vec::new();
        for src in images {
            if let Some(bonus) = Bonus::from_image(src)? {
                bonuses.push(bonus);
            }
        }

        let method = bout.require("method")?.to_string();
        if method.is_empty() {
            return Err(ScrapeError::parse("method", "non-empty text", method));
        }

        let round = parse_uint("round", bout.require("round")?)?;
        if !(1..=5).contains(&round) {
            return Err(ScrapeError::parse("round", "1 to 5", round.to_string()));
        }
        let time = parse_duration("time", bout.require("time")?)?;
        let time_format = parse_time_format(bout.require("time format")?)?;
        if let Some(scheduled) = time_format.scheduled_rounds {
            if round > scheduled {
                return Err(ScrapeError::consistency(format!(
                    "round {} exceeds the {} scheduled rounds",
                    round, scheduled
                )));
            }
        }
        let referee = bout
            .require("referee")?
            .trim()
            .to_string();
        let referee = (!referee.is_empty()).then_some(referee);

        let details = strip_details_label(details);
        let decision = if method.starts_with("Decision") {
            if details.is_empty() {
                return Err(ScrapeError::consistency("decision without scorecards"));
            }
            BoutDecision::Scorecards(parse_scorecards(details)?)
        } else {
            // Older bouts often print no details at all
            if !details.is_empty() && parse_scorecards(details).is_ok() {
                return Err(ScrapeError::consistency(format!(
                    "scorecards for a {} result",
                    method
                )));
            }
            BoutDecision::Details(details.to_string())
        };

        Ok(Self {
            title_bout,
            interim_title,
            bonuses,
            sex,
            weight_class,
            method,
            round,
            time,
            time_format,
            referee,
            decision,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterTotals {
    pub knockdowns: u32,
    pub sig_strikes: Count,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sig_strikes_ratio: Option<Ratio>,
    pub total_strikes: Count,
    pub takedowns: Count,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub takedowns_ratio: Option<Ratio>,
    pub submission_attempts: u32,
    pub reversals: u32,
    /// Control time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_time: Option<u32>,
}

impl FighterTotals {
    /// Build from the nine value cells of a totals row
    pub fn from_cells(cells: &[&str]) -> ScrapeResult<Self> {
        let [kd, sig, sig_pct, total, td, td_pct, sub, rev, ctrl] = cells else {
            return Err(ScrapeError::missing(format!(
                "totals cells (expected 9, found {})",
                cells.len()
            )));
        };

        let sig_strikes = parse_count("sig_strikes", sig)?;
        let sig_strikes_ratio = parse_optional_percent("sig_strikes_ratio", sig_pct)?;
        sig_strikes.check_ratio("sig_strikes", sig_strikes_ratio)?;

        let takedowns = parse_count("takedowns", td)?;
        let takedowns_ratio = parse_optional_percent("takedowns_ratio", td_pct)?;
        takedowns.check_ratio("takedowns", takedowns_ratio)?;

        Ok(Self {
            knockdowns: parse_uint("knockdowns", kd)?,
            sig_strikes,
            sig_strikes_ratio,
            total_strikes: parse_count("total_strikes", total)?,
            takedowns,
            takedowns_ratio,
            submission_attempts: parse_uint("submission_attempts", sub)?,
            reversals: parse_uint("reversals", rev)?,
            control_time: parse_optional_duration("control_time", ctrl)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificantStrikeBreakdown {
    pub total: Count,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ratio: Option<Ratio>,
    pub head: Count,
    pub body: Count,
    pub leg: Count,
    pub distance: Count,
    pub clinch: Count,
    pub ground: Count,
}

impl SignificantStrikeBreakdown {
    /// Build from the eight value cells of a significant strikes row
    pub fn from_cells(cells: &[&str]) -> ScrapeResult<Self> {
        let [total, pct, head, body, leg, distance, clinch, ground] = cells else {
            return Err(ScrapeError::missing(format!(
                "significant strikes cells (expected 8, found {})",
                cells.len()
            )));
        };

        let breakdown = Self {
            total: parse_count("sig_strikes", total)?,
            total_ratio: parse_optional_percent("sig_strikes_ratio", pct)?,
            head: parse_count("head", head)?,
            body: parse_count("body", body)?,
            leg: parse_count("leg", leg)?,
            distance: parse_count("distance", distance)?,
            clinch: parse_count("clinch", clinch)?,
            ground: parse_count("ground", ground)?,
        };
        breakdown.validate()?;
        Ok(breakdown)
    }

    /// Both positional groupings must add up to the total
    pub fn validate(&self) -> ScrapeResult<()> {
        self.total.check_ratio("sig_strikes", self.total_ratio)?;

        let by_target = self.head + self.body + self.leg;
        if by_target != self.total {
            return Err(ScrapeError::consistency(format!(
                "head + body + leg = {}, total is {}",
                by_target, self.total
            )));
        }
        let by_position = self.distance + self.clinch + self.ground;
        if by_position != self.total {
            return Err(ScrapeError::consistency(format!(
                "distance + clinch + ground = {}, total is {}",
                by_position, self.total
            )));
        }
        Ok(())
    }
}

/// Whole-fight row plus one row per round
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundBreakdown<T> {
    pub all_rounds: PerFighter<T>,
    pub rounds: Vec<PerFighter<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    pub totals: RoundBreakdown<FighterTotals>,
    pub significant_strikes: RoundBreakdown<SignificantStrikeBreakdown>,
}

impl RoundStats {
    pub fn from_raw(tables: &RawRoundTables, names: &PerFighter<String>) -> ScrapeResult<Self> {
        let totals = RoundBreakdown {
            all_rounds: build_row(
                &tables.totals,
                TOTALS_COLUMNS,
                names,
                FighterTotals::from_cells,
            )?,
            rounds: tables
                .totals_by_round
                .iter()
                .map(|row| build_row(row, TOTALS_COLUMNS, names, FighterTotals::from_cells))
                .collect::<ScrapeResult<Vec<_>>>()?,
        };
        let significant_strikes = RoundBreakdown {
            all_rounds: build_row(
                &tables.significant,
                SIGNIFICANT_COLUMNS,
                names,
                SignificantStrikeBreakdown::from_cells,
            )?,
            rounds: tables
                .significant_by_round
                .iter()
                .map(|row| {
                    build_row(
                        row,
                        SIGNIFICANT_COLUMNS,
                        names,
                        SignificantStrikeBreakdown::from_cells,
                    )
                })
                .collect::<ScrapeResult<Vec<_>>>()?,
        };

        let stats = Self {
            totals,
            significant_strikes,
        };
        stats.check_tables_agree()?;
        Ok(stats)
    }

    /// Significant strikes must be the same in both tables, row by row
    fn check_tables_agree(&self) -> ScrapeResult<()> {
        if self.totals.rounds.len() != self.significant_strikes.rounds.len() {
            return Err(ScrapeError::consistency(format!(
                "{} rounds of totals but {} rounds of significant strikes",
                self.totals.rounds.len(),
                self.significant_strikes.rounds.len()
            )));
        }

        let totals = std::iter::once(&self.totals.all_rounds).chain(&self.totals.rounds);
        let significant = std::iter::once(&self.significant_strikes.all_rounds)
            .chain(&self.significant_strikes.rounds);
        for (row, (t, s)) in totals.zip(significant).enumerate() {
            for (t, s) in t.as_array().into_iter().zip(s.as_array()) {
                if t.sig_strikes != s.total {
                    return Err(ScrapeError::consistency(format!(
                        "row {}: significant strikes {} in totals, {} in breakdown",
                        row, t.sig_strikes, s.total
                    )));
                }
            }
        }
        Ok(())
    }

    /// One per-round row per round fought
    pub fn check_round_count(&self, round: u32) -> ScrapeResult<()> {
        if self.totals.rounds.len() != round as usize {
            return Err(ScrapeError::consistency(format!(
                "fight ended in round {} but {} rounds of statistics were found",
                round,
                self.totals.rounds.len()
            )));
        }
        Ok(())
    }
}

fn build_row<T>(
    row: &RawRow,
    columns: usize,
    names: &PerFighter<String>,
    build: fn(&[&str]) -> ScrapeResult<T>,
) -> ScrapeResult<PerFighter<T>> {
    if row.len() != columns {
        return Err(ScrapeError::missing(format!(
            "statistics columns (expected {}, found {})",
            columns,
            row.len()
        )));
    }

    let printed = &row[0];
    if collapse_whitespace(&printed.fighter_1) != names.fighter_1
        || collapse_whitespace(&printed.fighter_2) != names.fighter_2
    {
        return Err(ScrapeError::consistency(format!(
            "statistics row names {:?} / {:?} do not match the fighters",
            printed.fighter_1, printed.fighter_2
        )));
    }

    let side_1: Vec<&str> = row[1..].iter().map(|c| c.fighter_1.trim()).collect();
    let side_2: Vec<&str> = row[1..].iter().map(|c| c.fighter_2.trim()).collect();
    Ok(PerFighter::new(build(&side_1)?, build(&side_2)?))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FightRecord {
    pub link: String,
    pub event_name: String,
    pub fighter_1_name: String,
    pub fighter_2_name: String,
    pub result: FightResult,
    pub bout_info: BoutInfo,
    /// Totals and significant strikes, present or absent together
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_stats: Option<RoundStats>,
}

impl FightRecord {
    pub fn from_raw(raw: RawFight) -> ScrapeResult<Self> {
        let link = check_link(EntityType::Fight, &raw.link)?;

        let event_name = collapse_whitespace(&raw.event_name);
        if event_name.is_empty() {
            return Err(ScrapeError::missing("event name"));
        }
        let names = PerFighter::new(
            collapse_whitespace(&raw.fighter_names.fighter_1),
            collapse_whitespace(&raw.fighter_names.fighter_2),
        );
        if names.fighter_1.is_empty() || names.fighter_2.is_empty() {
            return Err(ScrapeError::missing("fighter names"));
        }

        let result = FightResult::new(
            parse_outcome(raw.statuses.fighter_1.trim())?,
            parse_outcome(raw.statuses.fighter_2.trim())?,
        )?;
        let bout_info = BoutInfo::from_raw(&raw.description, &raw.images, &raw.bout, &raw.details)?;

        let round_stats = match &raw.tables {
            Some(tables) => {
                let stats = RoundStats::from_raw(tables, &names)?;
                stats.check_round_count(bout_info.round)?;
                Some(stats)
            }
            None => None,
        };

        Ok(Self {
            link,
            event_name,
            fighter_1_name: names.fighter_1,
            fighter_2_name: names.fighter_2,
            result,
            bout_info,
            round_stats,
        })
    }
}
