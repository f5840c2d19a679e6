//! Listing extraction from a search results page.
//!
//! All knowledge of the source page's markup lives in this module: the CSS
//! anchors below and the timestamp text format. When the site changes its
//! layout, this is the only file that needs to follow.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{AppError, Result};

/// One search result as scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub title: String,
    /// Price text exactly as shown, currency symbol included.
    pub price: String,
    pub location: String,
    pub posted_at: Option<DateTime<Utc>>,
    /// May be relative to the source page, or empty when the anchor has no href.
    pub link: String,
}

// Create static selectors to avoid recompiling them each time
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul.rows li").expect("Failed to parse row selector")
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a.result-title").expect("Failed to parse title selector")
});

static PRICE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".result-info .result-price").expect("Failed to parse price selector")
});

static LOCATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".result-info .result-hood").expect("Failed to parse location selector")
});

static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("time.result-date").expect("Failed to parse time selector")
});

const TIME_ATTRIBUTE: &str = "title";

/// Layout of the time attribute once the weekday is dropped and a year is
/// prepended, e.g. `2024 02 Jan 04:15:05 PM`.
const TIME_FORMAT: &str = "%Y %d %b %I:%M:%S %p";

/// Extracts every listing on the page, in document order.
///
/// `now` supplies the year, which the page does not print. Missing fields
/// fall back to empty values; only a document with no content at all is an
/// error.
pub fn extract(html: &str, now: DateTime<Utc>) -> Result<Vec<ListingRecord>> {
    if html.trim().is_empty() {
        return Err(AppError::ParseError("empty document".to_string()));
    }

    let document = Html::parse_document(html);
    let records = document
        .select(&ROW_SELECTOR)
        .enumerate()
        .map(|(index, row)| extract_row(index, row, now))
        .collect();

    Ok(records)
}

fn extract_row(index: usize, row: ElementRef<'_>, now: DateTime<Utc>) -> ListingRecord {
    let anchor = row.select(&TITLE_SELECTOR).next();
    let title = anchor.map(element_text).unwrap_or_default();
    let link = anchor
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    let price = row
        .select(&PRICE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let location = row
        .select(&LOCATION_SELECTOR)
        .next()
        .map(|e| element_text(e).trim().to_string())
        .unwrap_or_default();

    let posted_at = match row
        .select(&TIME_SELECTOR)
        .next()
        .and_then(|t| t.value().attr(TIME_ATTRIBUTE))
    {
        Some(raw) => {
            let parsed = parse_posted_at(raw, now);
            if parsed.is_none() {
                debug!(row = index, raw, "Couldn't parse listing time");
            }
            parsed
        }
        None => {
            debug!(row = index, "Couldn't find listing time");
            None
        }
    };

    ListingRecord {
        title,
        price,
        location,
        posted_at,
        link,
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Parses text like `Tue 02 Jan 04:15:05 PM` into a UTC timestamp.
///
/// The weekday is ignored so a guessed year never invalidates the date. A
/// result more than a day ahead of `now` belongs to the previous year.
pub fn parse_posted_at(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut parts = raw.split_whitespace();
    let first = parts.next()?;
    let rest: Vec<&str> = if first.chars().all(|c| c.is_ascii_alphabetic()) {
        parts.collect()
    } else {
        std::iter::once(first).chain(parts).collect()
    };
    let rest = rest.join(" ");

    let at_year = |year: i32| {
        NaiveDateTime::parse_from_str(&format!("{} {}", year, rest), TIME_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    };

    let posted = at_year(now.year())?;
    if posted > now + Duration::days(1) {
        return at_year(now.year() - 1);
    }
    Some(posted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn row(title: &str, href: Option<&str>, price: &str, hood: &str, time: Option<&str>) -> String {
        let href = href.map(|h| format!(r#" href="{}""#, h)).unwrap_or_default();
        let time = time
            .map(|t| format!(r#"<time class="result-date" title="{}">Jun 1</time>"#, t))
            .unwrap_or_default();
        format!(
            r#"<li class="result-row">
                <p class="result-info">
                    {time}
                    <a class="result-title hdrlnk"{href}>{title}</a>
                    <span class="result-meta">
                        <span class="result-price">{price}</span>
                        <span class="result-hood"> {hood} </span>
                    </span>
                </p>
            </li>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<html><body><ul class="rows">{}</ul></body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn extracts_all_fields_in_document_order() {
        let html = page(&[
            row(
                "Road bike",
                Some("https://example.com/bik/1.html"),
                "$250",
                "(Downtown)",
                Some("Sat 01 Jun 04:15:05 PM"),
            ),
            row(
                "Kids bike",
                Some("/bik/2.html"),
                "$40",
                "(Uptown)",
                Some("Fri 31 May 09:00:00 AM"),
            ),
        ]);

        let records = extract(&html, now()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "Road bike");
        assert_eq!(records[0].price, "$250");
        assert_eq!(records[0].location, "(Downtown)");
        assert_eq!(records[0].link, "https://example.com/bik/1.html");
        assert_eq!(
            records[0].posted_at,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 16, 15, 5).unwrap())
        );

        assert_eq!(records[1].title, "Kids bike");
        assert_eq!(records[1].link, "/bik/2.html");
        assert_eq!(
            records[1].posted_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 31, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn title_never_carries_the_price() {
        let html = page(&[row("Tent", Some("/1"), "$90", "(Park)", None)]);
        let records = extract(&html, now()).unwrap();
        assert!(!records[0].title.contains("$90"));
    }

    #[test]
    fn missing_time_leaves_timestamp_unset() {
        let html = page(&[row("Lamp", Some("/lamp.html"), "$15", "(Eastside)", None)]);

        let records = extract(&html, now()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Lamp");
        assert_eq!(records[0].price, "$15");
        assert_eq!(records[0].location, "(Eastside)");
        assert_eq!(records[0].link, "/lamp.html");
        assert_eq!(records[0].posted_at, None);
    }

    #[test]
    fn missing_link_and_garbled_time_default_silently() {
        let html = page(&[row("Desk", None, "$60", "(Westside)", Some("sometime soon"))]);

        let records = extract(&html, now()).unwrap();
        assert_eq!(records[0].link, "");
        assert_eq!(records[0].posted_at, None);
        assert_eq!(records[0].title, "Desk");
    }

    #[test]
    fn page_without_results_yields_nothing() {
        let records = extract("<html><body><p>No results</p></body></html>", now()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn empty_document_is_a_parse_error() {
        assert!(matches!(extract("  \n ", now()), Err(AppError::ParseError(_))));
    }

    #[test]
    fn december_listing_scraped_in_january_uses_previous_year() {
        let january = Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap();
        let posted = parse_posted_at("Tue 31 Dec 11:30:00 PM", january);
        assert_eq!(posted, Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap()));
    }

    #[test]
    fn year_comes_from_scrape_time() {
        let later = Utc.with_ymd_and_hms(2031, 3, 20, 0, 0, 0).unwrap();
        let posted = parse_posted_at("Mon 03 Mar 10:00:00 AM", later).unwrap();
        assert_eq!(posted.year(), 2031);
    }
}
