//! Fight details page: result, bout information and the statistics tables.
//!
//! Older fights carry no statistics at all; otherwise the page holds four
//! tables in a fixed order: totals, totals per round, significant strikes and
//! significant strikes per round.

use super::DetailsPage;
use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{
    attr, clean_text, select_child, select_exactly, select_one, selector, split_label, FieldMap,
};
use crate::records::fight::{RawRow, BOUT_LABELS};
use crate::records::{FightRecord, PerFighter, RawFight, RawRoundTables};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use shared::EntityType;

static EVENT_NAME: Lazy<Selector> = Lazy::new(|| selector("h2.b-content__title a"));
static PERSONS: Lazy<Selector> = Lazy::new(|| selector("div.b-fight-details__person"));
static STATUS: Lazy<Selector> = Lazy::new(|| selector("i.b-fight-details__person-status"));
static PERSON_NAME: Lazy<Selector> = Lazy::new(|| selector("h3.b-fight-details__person-name"));
static FIGHT_TITLE: Lazy<Selector> = Lazy::new(|| selector("i.b-fight-details__fight-title"));
static IMAGES: Lazy<Selector> = Lazy::new(|| selector("img"));
static TEXT: Lazy<Selector> = Lazy::new(|| selector("p.b-fight-details__text"));
static BOUT_ITEMS: Lazy<Selector> =
    Lazy::new(|| selector("i.b-fight-details__text-item_first, i.b-fight-details__text-item"));
static TABLES: Lazy<Selector> = Lazy::new(|| selector("section.b-fight-details__section table"));
static HEADERS: Lazy<Selector> = Lazy::new(|| selector("thead th"));
static BODY_ROWS: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static CELLS: Lazy<Selector> = Lazy::new(|| selector("td"));
static CELL_TEXT: Lazy<Selector> = Lazy::new(|| selector("p.b-fight-details__table-text"));

pub struct FightDetailsPage;

impl DetailsPage for FightDetailsPage {
    type Record = FightRecord;

    const ENTITY: EntityType = EntityType::Fight;

    fn parse(link: &str, html: &str) -> ScrapeResult<FightRecord> {
        parse_fight(link, html)
    }
}

pub fn parse_fight(link: &str, html: &str) -> ScrapeResult<FightRecord> {
    let doc = Html::parse_document(html);

    let event_name = clean_text(select_one(&doc, &EVENT_NAME, "event name")?);

    let persons: Vec<_> = doc.select(&PERSONS).collect();
    let [person_1, person_2] = persons[..] else {
        return Err(ScrapeError::missing(format!(
            "fighter boxes (expected 2, found {})",
            persons.len()
        )));
    };
    let person = |p: ElementRef| -> ScrapeResult<(String, String)> {
        Ok((
            clean_text(select_child(p, &STATUS, "result marker")?),
            clean_text(select_child(p, &PERSON_NAME, "fighter name")?),
        ))
    };
    let (status_1, name_1) = person(person_1)?;
    let (status_2, name_2) = person(person_2)?;

    let title = select_one(&doc, &FIGHT_TITLE, "bout title")?;
    let description = clean_text(title);
    let images = title
        .select(&IMAGES)
        .map(|img| attr(img, "src", "bout title image").map(str::to_string))
        .collect::<ScrapeResult<Vec<_>>>()?;

    let body = doc.root_element();
    let texts = select_exactly(body, &TEXT, 2, "bout text paragraphs")?;
    let mut bout = FieldMap::new("bout info", BOUT_LABELS);
    for item in texts[0].select(&BOUT_ITEMS) {
        let text = clean_text(item);
        let (label, value) = split_label(&text)
            .ok_or_else(|| ScrapeError::missing(format!("bout info item {:?}", text)))?;
        bout.insert(&label, value)?;
    }
    let details = clean_text(texts[1]);

    let tables = parse_tables(&doc)?;

    FightRecord::from_raw(RawFight {
        link: link.to_string(),
        event_name,
        fighter_names: PerFighter::new(name_1, name_2),
        statuses: PerFighter::new(status_1, status_2),
        description,
        images,
        bout,
        details,
        tables,
    })
}

fn parse_tables(doc: &Html) -> ScrapeResult<Option<RawRoundTables>> {
    let tables: Vec<_> = doc.select(&TABLES).collect();
    match tables[..] {
        [] => Ok(None),
        [totals, totals_by_round, significant, significant_by_round] => Ok(Some(RawRoundTables {
            totals: single_row(totals, "totals table")?,
            totals_by_round: round_rows(totals_by_round, "totals per round table")?,
            significant: single_row(significant, "significant strikes table")?,
            significant_by_round: round_rows(
                significant_by_round,
                "significant strikes per round table",
            )?,
        })),
        _ => Err(ScrapeError::missing(format!(
            "statistics tables (expected 0 or 4, found {})",
            tables.len()
        ))),
    }
}

fn single_row(table: ElementRef, what: &str) -> ScrapeResult<RawRow> {
    let rows = select_exactly(table, &BODY_ROWS, 1, what)?;
    raw_row(rows[0])
}

/// Body rows of a per-round table, checked against its `Round N` headers
fn round_rows(table: ElementRef, what: &str) -> ScrapeResult<Vec<RawRow>> {
    let headers: Vec<String> = table
        .select(&HEADERS)
        .map(clean_text)
        .filter(|h| h.starts_with("Round"))
        .collect();
    let rows = table.select(&BODY_ROWS).map(raw_row).collect::<ScrapeResult<Vec<_>>>()?;

    if headers.len() != rows.len() {
        return Err(ScrapeError::missing(format!(
            "{}: {} round headers for {} rows",
            what,
            headers.len(),
            rows.len()
        )));
    }
    for (index, header) in headers.iter().enumerate() {
        if *header != format!("Round {}", index + 1) {
            return Err(ScrapeError::missing(format!("{}: unexpected header {:?}", what, header)));
        }
    }
    Ok(rows)
}

/// Each cell prints one value per fighter, stacked
fn raw_row(row: ElementRef) -> ScrapeResult<RawRow> {
    row.select(&CELLS)
        .map(|cell| {
            let values = select_exactly(cell, &CELL_TEXT, 2, "statistics cell values")?;
            Ok(PerFighter::new(clean_text(values[0]), clean_text(values[1])))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parse::Outcome;
    use crate::records::{Bonus, BoutDecision};

    pub const FIGHT_LINK: &str = "http://www.ufcstats.com/fight-details/8e83da4ad5e1ad3c";

    fn cell(a: &str, b: &str) -> String {
        format!(
            r#"<td class="b-fight-details__table-col">
                 <p class="b-fight-details__table-text">{}</p>
                 <p class="b-fight-details__table-text">{}</p>
               </td>"#,
            a, b
        )
    }

    fn row(cells: &[(&str, &str)]) -> String {
        let cells: Vec<String> = cells.iter().map(|(a, b)| cell(a, b)).collect();
        format!("<tr class=\"b-fight-details__table-row\">{}</tr>", cells.join(""))
    }

    const NAMES: (&str, &str) = ("Alex Pereira", "Jamahal Hill");

    fn totals() -> String {
        row(&[
            NAMES,
            ("1", "0"),
            ("20 of 30", "10 of 20"),
            ("66%", "50%"),
            ("30 of 40", "12 of 25"),
            ("0 of 0", "1 of 3"),
            ("---", "33%"),
            ("0", "0"),
            ("0", "0"),
            ("0:12", "--"),
        ])
    }

    fn significant() -> String {
        row(&[
            NAMES,
            ("20 of 30", "10 of 20"),
            ("66%", "50%"),
            ("15 of 20", "5 of 12"),
            ("3 of 5", "3 of 4"),
            ("2 of 5", "2 of 4"),
            ("18 of 28", "8 of 16"),
            ("2 of 2", "2 of 4"),
            ("0 of 0", "0 of 0"),
        ])
    }

    fn section(table: String) -> String {
        format!(
            r#"<section class="b-fight-details__section js-fight-section">{}</section>"#,
            table
        )
    }

    fn single_table(body: String) -> String {
        section(format!(
            "<table><thead><tr><th>Fighter</th><th>KD</th></tr></thead><tbody>{}</tbody></table>",
            body
        ))
    }

    fn round_table(rows: &[String]) -> String {
        let rounds: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "<thead><tr><th colspan=\"10\">Round {}</th></tr></thead><tbody>{}</tbody>",
                    i + 1,
                    r
                )
            })
            .collect();
        section(format!(
            "<table><thead><tr><th>Fighter</th><th>KD</th></tr></thead>{}</table>",
            rounds.join("")
        ))
    }

    pub fn one_round_tables() -> String {
        [
            single_table(totals()),
            round_table(&[totals()]),
            single_table(significant()),
            round_table(&[significant()]),
        ]
        .join("\n")
    }

    /// Tables whose head + body + leg breakdown falls one short of the total
    pub fn mismatched_breakdown_tables() -> String {
        let significant = significant().replacen("15 of 20", "14 of 20", 1);
        [
            single_table(totals()),
            round_table(&[totals()]),
            single_table(significant.clone()),
            round_table(&[significant]),
        ]
        .join("\n")
    }

    pub fn fight_page(method: &str, round: &str, details: &str, tables: &str) -> String {
        format!(
            r##"<html><body>
              <h2 class="b-content__title">
                <a class="b-link" href="http://www.ufcstats.com/event-details/e1">
                  UFC 300: Pereira vs. Hill
                </a>
              </h2>
              <div class="b-fight-details__persons">
                <div class="b-fight-details__person">
                  <i class="b-fight-details__person-status
                            b-fight-details__person-status_style_green"> W </i>
                  <h3 class="b-fight-details__person-name"><a href="#">Alex Pereira</a></h3>
                </div>
                <div class="b-fight-details__person">
                  <i class="b-fight-details__person-status
                            b-fight-details__person-status_style_gray"> L </i>
                  <h3 class="b-fight-details__person-name"><a href="#">Jamahal Hill</a></h3>
                </div>
              </div>
              <div class="b-fight-details__fight">
                <i class="b-fight-details__fight-title">
                  <img src="http://www.ufcstats.com/static/belt.png">
                  <img src="http://www.ufcstats.com/static/perf.png">
                  UFC Light Heavyweight Title Bout
                </i>
                <p class="b-fight-details__text">
                  <i class="b-fight-details__text-item_first">
                    <i class="b-fight-details__label">Method:</i>
                    <i style="font-style: normal">{method}</i>
                  </i>
                  <i class="b-fight-details__text-item">
                    <i class="b-fight-details__label">Round:</i> {round}
                  </i>
                  <i class="b-fight-details__text-item">
                    <i class="b-fight-details__label">Time:</i> 3:14
                  </i>
                  <i class="b-fight-details__text-item">
                    <i class="b-fight-details__label">Time format:</i> 5 Rnd (5-5-5-5-5)
                  </i>
                  <i class="b-fight-details__text-item">
                    <i class="b-fight-details__label">Referee:</i> <span>Marc Goddard</span>
                  </i>
                </p>
                <p class="b-fight-details__text">
                  <i class="b-fight-details__label">Details:</i>
                  {details}
                </p>
              </div>
              {tables}
            </body></html>"##
        )
    }

    #[test]
    fn test_parse_fight() {
        let html = fight_page("KO/TKO", "1", "Punch to Head At Distance", &one_round_tables());
        let fight = parse_fight(FIGHT_LINK, &html).unwrap();

        assert_eq!(fight.event_name, "UFC 300: Pereira vs. Hill");
        assert_eq!(fight.fighter_2_name, "Jamahal Hill");
        assert_eq!(fight.result.fighter_1, Outcome::Win);
        assert_eq!(fight.bout_info.time, 194);
        assert_eq!(fight.bout_info.referee.as_deref(), Some("Marc Goddard"));
        assert_eq!(fight.bout_info.bonuses, vec![Bonus::PerformanceOfTheNight]);
        assert_eq!(
            fight.bout_info.decision,
            BoutDecision::Details("Punch to Head At Distance".to_string())
        );

        let stats = fight.round_stats.unwrap();
        assert_eq!(stats.totals.all_rounds.fighter_1.knockdowns, 1);
        assert_eq!(stats.significant_strikes.rounds[0].fighter_2.leg.landed(), 2);
    }

    #[test]
    fn test_decision_scorecards() {
        let cards = r#"
            <i class="b-fight-details__text-item">Sal D'Amato <span>29 - 28.</span></i>
            <i class="b-fight-details__text-item">Chris Lee <span>29 - 28.</span></i>
            <i class="b-fight-details__text-item">Derek Cleary <span>28 - 29.</span></i>"#;
        let html = fight_page("Decision - Split", "3", cards, "");
        let fight = parse_fight(FIGHT_LINK, &html).unwrap();
        match fight.bout_info.decision {
            BoutDecision::Scorecards(cards) => {
                assert_eq!(cards.len(), 3);
                assert_eq!(cards[2].judge, "Derek Cleary");
            }
            other => panic!("expected scorecards, got {:?}", other),
        }
        assert!(fight.round_stats.is_none());
    }

    #[test]
    fn test_partial_tables_rejected() {
        let tables = [single_table(totals()), round_table(&[totals()])].join("\n");
        let html = fight_page("KO/TKO", "1", "Punch", &tables);
        assert!(matches!(
            parse_fight(FIGHT_LINK, &html),
            Err(ScrapeError::MissingStructure(_))
        ));
    }

    #[test]
    fn test_round_rows_must_match_result() {
        let tables = [
            single_table(totals()),
            round_table(&[totals()]),
            single_table(significant()),
            round_table(&[significant()]),
        ]
        .join("\n");
        let html = fight_page("KO/TKO", "2", "Punch", &tables);
        assert!(matches!(
            parse_fight(FIGHT_LINK, &html),
            Err(ScrapeError::Consistency(_))
        ));
    }

    #[test]
    fn test_breakdown_must_sum_to_total() {
        let html = fight_page("KO/TKO", "1", "Punch", &mismatched_breakdown_tables());
        assert!(matches!(
            parse_fight(FIGHT_LINK, &html),
            Err(ScrapeError::Consistency(_))
        ));
    }

    #[test]
    fn test_missing_fighter_box() {
        let html = fight_page("KO/TKO", "1", "Punch", "")
            .replacen("b-fight-details__person\"", "other\"", 1);
        assert!(matches!(
            parse_fight(FIGHT_LINK, &html),
            Err(ScrapeError::MissingStructure(_))
        ));
    }
}
