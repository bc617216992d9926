//! Event details page: name, date, location and the fight card.

use super::DetailsPage;
use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{attr, clean_text, select_exactly, select_one, selector, split_label, FieldMap};
use crate::records::event::EVENT_LABELS;
use crate::records::{EventFight, EventSummary, FighterRef, PerFighter};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use shared::{EntityType, NewLink};
use tracing::{debug, warn};

static TITLE: Lazy<Selector> = Lazy::new(|| selector("span.b-content__title-highlight"));
static INFO_ITEMS: Lazy<Selector> = Lazy::new(|| selector("li.b-list__box-list-item"));
static ROWS: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static CELLS: Lazy<Selector> = Lazy::new(|| selector("td"));
static ANCHORS: Lazy<Selector> = Lazy::new(|| selector("a"));

pub struct EventDetailsPage;

impl DetailsPage for EventDetailsPage {
    type Record = EventSummary;

    const ENTITY: EntityType = EntityType::Event;
    const CHILD_LABEL: Option<&'static str> = Some("Fights found");

    fn parse(link: &str, html: &str) -> ScrapeResult<EventSummary> {
        parse_event(link, html)
    }

    fn discovered_links(record: &EventSummary, id: i64) -> Vec<(EntityType, NewLink)> {
        let fighters = record
            .fighter_links()
            .into_iter()
            .map(|l| (EntityType::Fighter, l));
        let fights = record.fight_links(id).into_iter().map(|l| (EntityType::Fight, l));
        fighters.chain(fights).collect()
    }

    fn child_count(record: &EventSummary) -> usize {
        record.fights.len()
    }
}

/// Parse an event page
///
/// Malformed fight rows are logged and skipped; a card without a single
/// valid row fails the whole page.
pub fn parse_event(link: &str, html: &str) -> ScrapeResult<EventSummary> {
    let doc = Html::parse_document(html);

    let name = clean_text(select_one(&doc, &TITLE, "event name")?);

    let mut info = FieldMap::new("event info", EVENT_LABELS);
    for item in doc.select(&INFO_ITEMS) {
        if let Some((label, value)) = split_label(&clean_text(item)) {
            info.insert(&label, value)?;
        }
    }

    let mut fights = Vec::new();
    for (index, row) in doc.select(&ROWS).enumerate() {
        match parse_row(row) {
            Ok(fight) => fights.push(fight),
            Err(e) => {
                warn!(event = %link, row = index, error = %e, "Skipping fight row");
                debug!(row = %row.html(), "Skipped row markup");
            }
        }
    }

    EventSummary::new(link, &name, &info, fights)
}

fn parse_row(row: ElementRef) -> ScrapeResult<EventFight> {
    let link = attr(row, "data-link", "fight row")?;
    let cell = row
        .select(&CELLS)
        .nth(1)
        .ok_or_else(|| ScrapeError::missing("fighters column"))?;
    let anchors = select_exactly(cell, &ANCHORS, 2, "fighter anchors")?;

    let fighter = |anchor: ElementRef| -> ScrapeResult<FighterRef> {
        FighterRef::new(attr(anchor, "href", "fighter anchor")?, &clean_text(anchor))
    };
    EventFight::new(link, PerFighter::new(fighter(anchors[0])?, fighter(anchors[1])?))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub const EVENT_LINK: &str = "http://www.ufcstats.com/event-details/b6a5a5f5e4c3d2e1";

    fn fight_row(fight: &str, a: (&str, &str), b: (&str, &str)) -> String {
        format!(
            r##"<tr class="b-fight-details__table-row"
                   data-link="http://www.ufcstats.com/fight-details/{fight}">
                 <td class="b-fight-details__table-col"><p><a href="#">win</a></p></td>
                 <td class="b-fight-details__table-col l-page_align_left">
                   <p class="b-fight-details__table-text">
                     <a href="http://www.ufcstats.com/fighter-details/{}" class="b-link">
                       {}
                     </a>
                   </p>
                   <p class="b-fight-details__table-text">
                     <a href="http://www.ufcstats.com/fighter-details/{}" class="b-link"> {} </a>
                   </p>
                 </td>
                 <td>1</td>
               </tr>"##,
            a.0, a.1, b.0, b.1
        )
    }

    pub fn event_page(rows: &[String]) -> String {
        format!(
            r#"<html><body>
              <h2 class="b-content__title">
                <span class="b-content__title-highlight">
                  UFC 300: Pereira vs. Hill
                </span>
              </h2>
              <ul class="b-list__box-list">
                <li class="b-list__box-list-item">
                  <i class="b-list__box-item-title">Date:</i>
                  April 13, 2024
                </li>
                <li class="b-list__box-list-item">
                  <i class="b-list__box-item-title">Location:</i>
                  Las Vegas, Nevada, USA
                </li>
              </ul>
              <table class="b-fight-details__table">
                <thead><tr><th>W/L</th><th>Fighter</th></tr></thead>
                <tbody>{}</tbody>
              </table>
            </body></html>"#,
            rows.join("\n")
        )
    }

    pub fn two_fight_card() -> String {
        event_page(&[
            fight_row("f100", ("a1", "Alex Pereira"), ("b2", "Jamahal Hill")),
            fight_row("f200", ("c3", "Zhang Weili"), ("d4", "Yan Xiaonan")),
        ])
    }

    #[test]
    fn test_parse_event() {
        let event = parse_event(EVENT_LINK, &two_fight_card()).unwrap();
        assert_eq!(event.name, "UFC 300: Pereira vs. Hill");
        assert_eq!(event.location.city, "Las Vegas");
        assert_eq!(event.fights.len(), 2);
        assert_eq!(event.fights[1].fighters.fighter_1.name, "Zhang Weili");
        assert_eq!(event.fights[0].link, "http://www.ufcstats.com/fight-details/f100");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let html = event_page(&[
            "<tr><td>no link</td></tr>".to_string(),
            fight_row("f100", ("a1", "Alex Pereira"), ("b2", "Jamahal Hill")),
            fight_row("f300", ("a1", "Alex Pereira"), ("a1", "Alex Pereira")),
        ]);
        let event = parse_event(EVENT_LINK, &html).unwrap();
        assert_eq!(event.fights.len(), 1);
    }

    #[test]
    fn test_empty_card_fails() {
        let result = parse_event(EVENT_LINK, &event_page(&[]));
        assert!(matches!(result, Err(ScrapeError::MissingStructure(_))));
    }

    #[test]
    fn test_discovered_links() {
        let event = parse_event(EVENT_LINK, &two_fight_card()).unwrap();
        let links = EventDetailsPage::discovered_links(&event, 3);
        let fighters: Vec<_> = links.iter().filter(|(e, _)| *e == EntityType::Fighter).collect();
        let fights: Vec<_> = links.iter().filter(|(e, _)| *e == EntityType::Fight).collect();
        assert_eq!(fighters.len(), 4);
        assert_eq!(fights.len(), 2);
        assert!(fights.iter().all(|(_, l)| l.event_id == Some(3)));
        assert_eq!(EventDetailsPage::child_count(&event), 2);
    }
}
