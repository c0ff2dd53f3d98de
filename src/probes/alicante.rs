//! Alicante booking-page probe
//!
//! The Sant Joan d'Alacant sede electrónica lists its open days as anchor
//! links with a `DD/MM/YYYY - WEEKDAY` label. The whole page is fetched and
//! scraped; the probe answers whether the requested date is among the offered
//! ones, which keeps this page-level source behind the same per-date
//! capability as the API-backed targets.

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONNECTION, USER_AGENT};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use super::client::{ensure_success, ProbeClient};
use super::TargetProbe;
use crate::checker::dates;
use crate::config::AlicanteConfig;
use crate::models::{Slot, SlotCheck};
use crate::utils::error::ProbeError;
use crate::utils::normalize_whitespace;

const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

lazy_static! {
    static ref SLOT_LINK: Selector = Selector::parse("a").expect("Invalid CSS selector: a");

    /// Matches the "13/02/2026 - VIERNES" labels on the day-picker links
    static ref DATE_LABEL: Regex =
        Regex::new(r"^(\d{2}/\d{2}/\d{4}) - ").expect("Invalid date label pattern");
}

/// One offered day scraped from the booking page
#[derive(Debug, Clone, PartialEq, Eq)]
struct OfferedDay {
    date: NaiveDate,
    label: String,
}

/// Probe for the Alicante (Sant Joan d'Alacant) booking page
pub struct AlicanteProbe {
    client: ProbeClient,
    config: AlicanteConfig,
}

impl AlicanteProbe {
    pub fn new(config: AlicanteConfig) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config })
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        headers
    }
}

/// Extract the offered days from the booking page HTML
fn extract_offered_days(html: &str) -> Vec<OfferedDay> {
    let document = Html::parse_document(html);

    let mut offered = Vec::new();
    for anchor in document.select(&SLOT_LINK) {
        let label = normalize_whitespace(&anchor.text().collect::<String>());
        let Some(captures) = DATE_LABEL.captures(&label) else {
            continue;
        };
        let Some(date) = captures.get(1).and_then(|m| dates::parse_date(m.as_str())) else {
            continue;
        };
        offered.push(OfferedDay { date, label });
    }
    offered
}

#[async_trait]
impl TargetProbe for AlicanteProbe {
    fn name(&self) -> &str {
        "alicante"
    }

    async fn check(&self, date: NaiveDate) -> Result<SlotCheck, ProbeError> {
        debug!(date = %dates::format_date(date), "checking alicante slots");

        let response = self
            .client
            .get(&self.config.url, &[], self.build_headers())
            .await?;
        let response = ensure_success(response)?;

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Decode(e.to_string()))?;

        let slots: Vec<Slot> = extract_offered_days(&body)
            .into_iter()
            .filter(|day| day.date == date)
            .map(|day| Slot::new(day.label))
            .collect();

        if slots.is_empty() {
            Ok(SlotCheck::NotFound)
        } else {
            Ok(SlotCheck::Found(slots))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r##"<!DOCTYPE html>
<html>
<body>
  <div id="day-picker">
    <a href="#" onclick="selectDay(1)">13/02/2026 - VIERNES</a>
    <a href="#" onclick="selectDay(2)">16/02/2026 - LUNES</a>
    <a href="/help">Ayuda</a>
  </div>
</body>
</html>"##;

    #[test]
    fn test_extract_offered_days() {
        let offered = extract_offered_days(SAMPLE_PAGE);
        assert_eq!(offered.len(), 2);
        assert_eq!(offered[0].label, "13/02/2026 - VIERNES");
        assert_eq!(
            offered[0].date,
            NaiveDate::from_ymd_opt(2026, 2, 13).unwrap()
        );
        assert_eq!(offered[1].label, "16/02/2026 - LUNES");
    }

    #[test]
    fn test_extract_ignores_non_slot_links() {
        let offered = extract_offered_days("<a href=\"/\">Inicio</a>");
        assert!(offered.is_empty());
    }

    #[test]
    fn test_extract_handles_ragged_whitespace() {
        let html = "<a href=\"#\">\n  13/02/2026 - VIERNES\n</a>";
        let offered = extract_offered_days(html);
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].label, "13/02/2026 - VIERNES");
    }

    #[test]
    fn test_extract_skips_impossible_dates() {
        let offered = extract_offered_days("<a href=\"#\">31/02/2026 - LUNES</a>");
        assert!(offered.is_empty());
    }
}
