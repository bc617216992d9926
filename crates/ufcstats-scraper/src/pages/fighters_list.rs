//! Fighters list for one letter (`/statistics/fighters?char=a&page=all`).

use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{attr, clean_text, select_child, selector};
use crate::records::fighters_list::LIST_COLUMNS;
use crate::records::FighterListing;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

static ROWS: Lazy<Selector> = Lazy::new(|| selector("tbody tr"));
static CELLS: Lazy<Selector> = Lazy::new(|| selector("td"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));

/// Parse one letter of the fighters list; malformed rows are logged and skipped
pub fn parse_fighters_list(html: &str) -> Vec<FighterListing> {
    let doc = Html::parse_document(html);

    let mut fighters = Vec::new();
    for (index, row) in doc.select(&ROWS).enumerate() {
        if clean_text(row).is_empty() {
            continue;
        }
        match parse_row(row) {
            Ok(fighter) => fighters.push(fighter),
            Err(e) => {
                warn!(row = index, error = %e, "Skipping fighters list row");
                debug!(row = %row.html(), "Skipped row markup");
            }
        }
    }
    fighters
}

fn parse_row(row: ElementRef) -> ScrapeResult<FighterListing> {
    let cells: Vec<_> = row.select(&CELLS).collect();
    if cells.len() != LIST_COLUMNS {
        return Err(ScrapeError::missing(format!(
            "fighters list columns (expected {}, found {})",
            LIST_COLUMNS,
            cells.len()
        )));
    }

    let anchor = select_child(cells[0], &ANCHOR, "fighter anchor")?;
    let link = attr(anchor, "href", "fighter anchor")?;
    let texts: Vec<String> = cells[..LIST_COLUMNS - 1].iter().map(|c| clean_text(*c)).collect();
    let current_champion = cells[LIST_COLUMNS - 1].select(&IMAGE).next().is_some();

    FighterListing::from_cells(link, &texts, current_champion)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn fighter_row(id: &str, first: &str, last: &str, champion: bool) -> String {
        let link = format!("http://www.ufcstats.com/fighter-details/{}", id);
        let linked = |text: &str| {
            format!(r#"<td><a href="{}" class="b-link b-link_style_black">{}</a></td>"#, link, text)
        };
        let belt = if champion {
            r#"<td><img src="http://www.ufcstats.com/static/belt.png"></td>"#
        } else {
            "<td></td>"
        };
        format!(
            r#"<tr class="b-statistics__table-row">{}{}{}
                 <td> 5' 11" </td><td> 155 lbs. </td><td> -- </td>
                 <td> Orthodox </td><td>10</td><td>2</td><td>0</td>{}</tr>"#,
            linked(first),
            linked(last),
            linked(""),
            belt
        )
    }

    pub fn fighters_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><table class="b-statistics__table">
                 <thead><tr><th>First</th><th>Last</th></tr></thead>
                 <tbody>
                   <tr class="b-statistics__table-row">
                     <td class="b-statistics__table-col_type_clear"></td>
                   </tr>
                   {}
                 </tbody>
               </table></body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_parse_fighters_list() {
        let html = fighters_page(&[
            fighter_row("f1", "Tom", "Aaron", false),
            fighter_row("f2", "Alex", "Pereira", true),
        ]);
        let fighters = parse_fighters_list(&html);
        assert_eq!(fighters.len(), 2);
        assert_eq!(fighters[0].full_name(), "Tom Aaron");
        assert_eq!(fighters[0].height, Some(71));
        assert_eq!(fighters[0].reach, None);
        assert!(!fighters[0].current_champion);
        assert!(fighters[1].current_champion);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let html = fighters_page(&[
            "<tr><td>Tom</td><td>Aaron</td></tr>".to_string(),
            fighter_row("f3", "", "", false),
            fighter_row("f2", "Alex", "Pereira", false),
        ]);
        let fighters = parse_fighters_list(&html);
        assert_eq!(fighters.len(), 1);
        assert_eq!(fighters[0].link, "http://www.ufcstats.com/fighter-details/f2");
    }
}
