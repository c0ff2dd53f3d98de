//! Sede secondary-system probe
//!
//! The sede endpoint has no structured availability response. The probe
//! POSTs the configured form body and infers availability from the ABSENCE
//! of the portal's known "no appointments" phrase. That inference is a
//! low-confidence heuristic: a layout change or an unrecognized error page
//! can produce a false positive, so a hit is labelled as unverified and
//! should be confirmed by hand. Error-looking and expired-session pages are
//! reported as NotFound rather than guessed at.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

use super::client::ProbeClient;
use super::TargetProbe;
use crate::checker::dates;
use crate::config::SedeConfig;
use crate::models::{Slot, SlotCheck};
use crate::utils::error::ProbeError;

const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Phrase the portal shows when nothing is bookable
const NO_SLOTS_PHRASE: &str = "En este momento no hay citas disponibles";

/// Phrase the portal shows when the session is no longer valid
const SESSION_EXPIRED_PHRASE: &str = "su sesión ha caducado";

/// Probe for the sede secondary system
pub struct SedeProbe {
    client: ProbeClient,
    config: SedeConfig,
}

impl SedeProbe {
    pub fn new(config: SedeConfig) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config })
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers
    }

    /// Classify a response page. Only a missing negative phrase counts as a
    /// hit, and even that is unverified.
    fn classify(body: &str) -> SlotCheck {
        if body.contains(NO_SLOTS_PHRASE) {
            return SlotCheck::NotFound;
        }

        if body.contains(SESSION_EXPIRED_PHRASE) || body.contains("Error") {
            warn!("sede returned an error-looking page, treating as no slots");
            return SlotCheck::NotFound;
        }

        warn!("sede negative phrase missing, possible availability - verify manually");
        SlotCheck::Found(vec![Slot::new("possible availability (unverified)")])
    }
}

#[async_trait]
impl TargetProbe for SedeProbe {
    fn name(&self) -> &str {
        "sede"
    }

    async fn check(&self, date: NaiveDate) -> Result<SlotCheck, ProbeError> {
        debug!(date = %dates::format_date(date), "checking sede availability");

        let response = self
            .client
            .post_form(
                &self.config.url,
                self.build_headers(),
                self.config.body.clone(),
            )
            .await?;

        // The portal answers content pages with 4xx statuses at times;
        // anything below 500 is still inspected for the phrases.
        let status = response.status();
        if status.is_server_error() {
            return Err(ProbeError::ServerError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Decode(e.to_string()))?;

        Ok(Self::classify(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_phrase_means_not_found() {
        let body = "<html><body>En este momento no hay citas disponibles</body></html>";
        assert_eq!(SedeProbe::classify(body), SlotCheck::NotFound);
    }

    #[test]
    fn test_expired_session_means_not_found() {
        let body = "<html><body>Atención: su sesión ha caducado</body></html>";
        assert_eq!(SedeProbe::classify(body), SlotCheck::NotFound);
    }

    #[test]
    fn test_error_page_means_not_found() {
        let body = "<html><body>Error 500 - intente de nuevo</body></html>";
        assert_eq!(SedeProbe::classify(body), SlotCheck::NotFound);
    }

    #[test]
    fn test_missing_negative_phrase_is_unverified_hit() {
        let body = "<html><body>Seleccione una cita</body></html>";
        match SedeProbe::classify(body) {
            SlotCheck::Found(slots) => {
                assert_eq!(slots.len(), 1);
                assert!(slots[0].label.contains("unverified"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }
}
