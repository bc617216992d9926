//! Completed events list (`/statistics/events/completed?page=all`).

use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{attr, clean_text, select_child, selector};
use crate::records::EventListing;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

static ROWS: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static CELLS: Lazy<Selector> = Lazy::new(|| selector("td"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static DATE: Lazy<Selector> = Lazy::new(|| selector("span.b-statistics__date"));

/// Parse the events list, newest first
///
/// The site lists the next scheduled event above the completed ones; leading
/// events dated after `today` are dropped. Malformed rows are logged and
/// skipped.
pub fn parse_events_list(html: &str, today: NaiveDate) -> Vec<EventListing> {
    let doc = Html::parse_document(html);

    let mut events = Vec::new();
    for (index, row) in doc.select(&ROWS).enumerate() {
        if clean_text(row).is_empty() {
            continue;
        }
        match parse_row(row) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!(row = index, error = %e, "Skipping events list row");
                debug!(row = %row.html(), "Skipped row markup");
            }
        }
    }

    let upcoming = events.iter().take_while(|e| e.date > today).count();
    if upcoming > 0 {
        debug!(count = upcoming, "Dropping upcoming events");
    }
    events.split_off(upcoming)
}

fn parse_row(row: ElementRef) -> ScrapeResult<EventListing> {
    let cells: Vec<_> = row.select(&CELLS).collect();
    let [event, location] = cells[..] else {
        return Err(ScrapeError::missing(format!(
            "events list columns (expected 2, found {})",
            cells.len()
        )));
    };

    let anchor = select_child(event, &ANCHOR, "event anchor")?;
    let date = select_child(event, &DATE, "event date")?;
    EventListing::new(
        attr(anchor, "href", "event anchor")?,
        &clean_text(anchor),
        &clean_text(date),
        &clean_text(location),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const VEGAS: &str = "Las Vegas, Nevada, USA";

    pub fn event_row(id: &str, name: &str, date: &str, location: &str) -> String {
        format!(
            r#"<tr class="b-statistics__table-row">
                 <td class="b-statistics__table-col">
                   <i class="b-statistics__table-content">
                     <a href="http://www.ufcstats.com/event-details/{}"
                        class="b-link b-link_style_black"> {} </a>
                     <span class="b-statistics__date"> {} </span>
                   </i>
                 </td>
                 <td class="b-statistics__table-col b-statistics__table-col_style_big-top-padding">
                   {}
                 </td>
               </tr>"#,
            id, name, date, location
        )
    }

    pub fn events_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><table class="b-statistics__table-events">
                 <thead><tr><th>Name/date</th><th>Location</th></tr></thead>
                 <tbody>
                   <tr class="b-statistics__table-row_type_first"><td colspan="2"></td></tr>
                   {}
                 </tbody>
               </table></body></html>"#,
            rows.join("\n")
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 20).unwrap()
    }

    #[test]
    fn test_parse_events_list() {
        let html = events_page(&[
            event_row("e3", "UFC 301: Pantoja vs. Erceg", "May 04, 2024", "Rio de Janeiro, Brazil"),
            event_row("e2", "UFC 300: Pereira vs. Hill", "April 13, 2024", VEGAS),
            event_row("e1", "UFC Fight Night: Allen vs. Curtis 2", "April 06, 2024", VEGAS),
        ]);
        let events = parse_events_list(&html, today());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "UFC 300: Pereira vs. Hill");
        assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2024, 4, 6).unwrap());
        assert_eq!(events[0].link, "http://www.ufcstats.com/event-details/e2");
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let html = events_page(&[
            event_row("e2", "UFC 300: Pereira vs. Hill", "someday", VEGAS),
            event_row("e1", "UFC Fight Night: Allen vs. Curtis 2", "April 06, 2024", VEGAS),
        ]);
        let events = parse_events_list(&html, today());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].link, "http://www.ufcstats.com/event-details/e1");
    }

    #[test]
    fn test_empty_list() {
        assert!(parse_events_list(&events_page(&[]), today()).is_empty());
        assert!(parse_events_list("<html><body></body></html>", today()).is_empty());
    }
}
