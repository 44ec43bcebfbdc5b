//! Company registry lookup (ebarimt merchant service), best-effort.

use serde::{Deserialize, Serialize};

const MERCHANT_INFO_URL: &str = "http://info.ebarimt.mn/rest/merchant/info";

/// Company record as returned by the registry service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryCompany {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub found: String,
    #[serde(default)]
    pub vatpayer: String,
    #[serde(default)]
    pub citypayer: String,
    #[serde(default)]
    pub vatpayer_registered_date: String,
    #[serde(default)]
    pub last_receipt_date: String,
    #[serde(default)]
    pub receipt_found: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryClient {
    client: reqwest::Client,
}

impl RegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a company up by its state registry number. The registry is an
    /// enrichment source only, so any failure (network, decode, or an empty
    /// record) comes back as `None` rather than an error.
    pub async fn company_info(&self, registry_number: &str) -> Option<RegistryCompany> {
        let response = self
            .client
            .get(MERCHANT_INFO_URL)
            .query(&[("regno", registry_number)])
            .send()
            .await;

        let company: RegistryCompany = match response {
            Ok(response) => match response.json().await {
                Ok(company) => company,
                Err(err) => {
                    tracing::warn!("registry response decode failed: {err}");
                    return None;
                }
            },
            Err(err) => {
                tracing::warn!("registry request failed: {err}");
                return None;
            }
        };

        if company.name.is_empty() {
            return None;
        }
        Some(company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_payload_decodes_with_missing_fields() {
        let company: RegistryCompany = serde_json::from_str(
            r#"{"name": "Монос Фарм ХХК", "found": "true", "vatpayer": "true"}"#,
        )
        .unwrap();
        assert_eq!(company.name, "Монос Фарм ХХК");
        assert!(company.last_receipt_date.is_empty());
    }
}
