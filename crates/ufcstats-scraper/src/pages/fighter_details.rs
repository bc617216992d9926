//! Fighter details page: header, personal information and career statistics.

use super::DetailsPage;
use crate::error::{ScrapeError, ScrapeResult};
use crate::html::{clean_text, select_exactly, select_one, selector, split_label, FieldMap};
use crate::records::fighter::{RawFighter, CAREER_LABELS, PERSONAL_LABELS};
use crate::records::FighterProfile;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use shared::EntityType;

static NAME: Lazy<Selector> = Lazy::new(|| selector("span.b-content__title-highlight"));
static RECORD: Lazy<Selector> = Lazy::new(|| selector("span.b-content__title-record"));
static NICKNAME: Lazy<Selector> = Lazy::new(|| selector("p.b-content__Nickname"));
static BOX_LIST: Lazy<Selector> = Lazy::new(|| selector("ul.b-list__box-list"));
static ITEMS: Lazy<Selector> = Lazy::new(|| selector("li"));
static CAREER_ITEMS: Lazy<Selector> = Lazy::new(|| selector("div.b-list__info-box-left li"));

pub struct FighterDetailsPage;

impl DetailsPage for FighterDetailsPage {
    type Record = FighterProfile;

    const ENTITY: EntityType = EntityType::Fighter;

    fn parse(link: &str, html: &str) -> ScrapeResult<FighterProfile> {
        parse_fighter(link, html)
    }
}

pub fn parse_fighter(link: &str, html: &str) -> ScrapeResult<FighterProfile> {
    let doc = Html::parse_document(html);

    let name = clean_text(select_one(&doc, &NAME, "fighter name")?);
    let record = clean_text(select_one(&doc, &RECORD, "fighter record")?);
    let nickname = doc.select(&NICKNAME).next().map(clean_text).unwrap_or_default();

    let mut personal_info = FieldMap::new("personal info", PERSONAL_LABELS);
    let list = select_one(&doc, &BOX_LIST, "personal info list")?;
    for item in select_exactly(list, &ITEMS, PERSONAL_LABELS.len(), "personal info items")? {
        let (label, value) = labeled(&clean_text(item), "personal info item")?;
        personal_info.insert(&label, value)?;
    }

    let mut career_stats = FieldMap::new("career statistics", CAREER_LABELS);
    for item in doc.select(&CAREER_ITEMS) {
        let text = clean_text(item);
        if text.is_empty() {
            continue;
        }
        let (label, value) = labeled(&text, "career statistics item")?;
        career_stats.insert(&label.replace('.', ""), value)?;
    }

    FighterProfile::from_raw(RawFighter {
        link: link.to_string(),
        name,
        nickname,
        record,
        personal_info,
        career_stats,
    })
}

fn labeled(text: &str, what: &str) -> ScrapeResult<(String, String)> {
    split_label(text).ok_or_else(|| ScrapeError::missing(format!("{}: {:?}", what, text)))
}
