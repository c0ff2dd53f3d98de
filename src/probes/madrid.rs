//! Madrid slot-lookup probe
//!
//! The Madrid portal exposes a JSON endpoint that returns the bookable hours
//! for one service, group and calendar date. The request carries the same
//! browser-like headers the booking frontend sends, plus a cache-busting
//! timestamp parameter.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONNECTION, REFERER, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::client::{ensure_success, ProbeClient};
use super::TargetProbe;
use crate::checker::dates;
use crate::config::MadridConfig;
use crate::models::{Slot, SlotCheck};
use crate::utils::error::ProbeError;

const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Slot-lookup response body
#[derive(Debug, Deserialize)]
struct HorasResponse {
    #[serde(default, rename = "valoresComboHoras")]
    valores_combo_horas: Vec<ComboHora>,
}

/// One bookable hour as the portal labels it
#[derive(Debug, Deserialize)]
struct ComboHora {
    #[serde(rename = "fechaAsString")]
    fecha_as_string: String,
}

/// Probe for the Madrid appointment portal
pub struct MadridProbe {
    client: ProbeClient,
    config: MadridConfig,
}

impl MadridProbe {
    pub fn new(config: MadridConfig) -> Result<Self, ProbeError> {
        let client = ProbeClient::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self { client, config })
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        if let Ok(referer) = HeaderValue::from_str(&self.config.booking_url) {
            headers.insert(REFERER, referer);
        }

        headers
    }
}

#[async_trait]
impl TargetProbe for MadridProbe {
    fn name(&self) -> &str {
        "madrid"
    }

    async fn check(&self, date: NaiveDate) -> Result<SlotCheck, ProbeError> {
        let date_str = dates::format_date(date);
        debug!(date = %date_str, "checking madrid slots");

        // Cache-busting timestamp, same shape the booking frontend sends
        let stamp = Utc::now().timestamp_millis().to_string();

        let query = [
            ("idServicio", self.config.id_servicio.as_str()),
            ("idGrupo", self.config.id_grupo.as_str()),
            ("dateStr", date_str.as_str()),
            ("tiempoCita", self.config.tiempo_cita.as_str()),
            ("_", stamp.as_str()),
        ];

        let response = self
            .client
            .get(&self.config.base_url, &query, self.build_headers())
            .await?;
        let response = ensure_success(response)?;

        let body: HorasResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Decode(e.to_string()))?;

        if body.valores_combo_horas.is_empty() {
            return Ok(SlotCheck::NotFound);
        }

        let slots = body
            .valores_combo_horas
            .into_iter()
            .map(|hora| Slot::new(hora.fecha_as_string))
            .collect();
        Ok(SlotCheck::Found(slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let json = r#"{"valoresComboHoras":[{"fechaAsString":"10:20"},{"fechaAsString":"10:40"}]}"#;
        let parsed: HorasResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.valores_combo_horas.len(), 2);
        assert_eq!(parsed.valores_combo_horas[0].fecha_as_string, "10:20");
    }

    #[test]
    fn test_response_parsing_missing_field() {
        // The portal omits the field entirely when nothing is bookable
        let parsed: HorasResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.valores_combo_horas.is_empty());
    }

    #[test]
    fn test_headers_include_ajax_marker() {
        let probe = MadridProbe::new(MadridConfig::default()).unwrap();
        let headers = probe.build_headers();

        assert_eq!(
            headers.get("x-requested-with").unwrap().to_str().unwrap(),
            "XMLHttpRequest"
        );
        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(REFERER));
    }
}
