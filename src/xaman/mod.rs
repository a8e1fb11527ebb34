//! Adapter for the Xaman-style remote signing wallet.
//!
//! Two modes share one client. `stub` derives deterministic payload ids from
//! the transaction content and echoes caller-observed statuses, so the whole
//! signing round-trip is exercisable offline. `api` talks to the real payload
//! endpoint over HTTPS; every shape deviation in a response is an integration
//! error, never a panic. Neither mode ever touches escrow state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::Display;
use uuid::Uuid;

use crate::config::Settings;
use crate::idempotency::canonical_json;

/// Exception for signing-adapter failures; all map to 502 at the boundary
/// except the caller-input `xaman_observed_status_invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum XamanIntegrationError {
    XamanModeInvalid,
    XamanApiCredentialsMissing,
    XamanApiHttpError,
    XamanApiConnectionError,
    XamanApiInvalidJson,
    XamanApiInvalidResponse,
    XamanObservedStatusInvalid,
}

impl std::error::Error for XamanIntegrationError {}

/// Signing adapter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XamanMode {
    Stub,
    Api,
}

impl XamanMode {
    fn parse(raw: &str) -> Result<Self, XamanIntegrationError> {
        match raw {
            "stub" => Ok(XamanMode::Stub),
            "api" => Ok(XamanMode::Api),
            _ => Err(XamanIntegrationError::XamanModeInvalid),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            XamanMode::Stub => "stub",
            XamanMode::Api => "api",
        }
    }
}

/// Remote payload lifecycle as this system tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum XamanPayloadStatus {
    Open,
    Signed,
    Declined,
    Expired,
    Unknown,
}

/// A created sign request: what the promoter's wallet needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XamanSignRequest {
    pub payload_id: String,
    pub deep_link_url: String,
    pub qr_png_url: String,
    pub websocket_status_url: Option<String>,
    pub mode: String,
}

/// Observed payload status plus the transaction hash the wallet reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XamanPayloadStatusResult {
    pub payload_id: String,
    pub status: XamanPayloadStatus,
    pub tx_hash: Option<String>,
    pub mode: String,
}

/// Client for the signing wallet. Construction validates mode and, in api
/// mode, pins the request timeout.
pub struct XamanClient {
    mode: XamanMode,
    api_base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
    http: reqwest::Client,
}

impl XamanClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, XamanIntegrationError> {
        let mode = XamanMode::parse(&settings.xaman_mode)?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.xaman_timeout_seconds))
            .build()
            .map_err(|_| XamanIntegrationError::XamanApiConnectionError)?;
        Ok(Self {
            mode,
            api_base_url: settings.xaman_api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.xaman_api_key.clone(),
            api_secret: settings.xaman_api_secret.clone(),
            http,
        })
    }

    pub fn mode(&self) -> XamanMode {
        self.mode
    }

    /// Hand an unsigned transaction to the wallet and get back the sign
    /// request the client renders (deep link + QR).
    pub async fn create_sign_request(
        &self,
        tx_json: &Value,
        reference: &str,
    ) -> Result<XamanSignRequest, XamanIntegrationError> {
        match self.mode {
            XamanMode::Stub => Ok(self.create_stub_sign_request(tx_json, reference)),
            XamanMode::Api => {
                let (api_key, api_secret) = self.credentials()?;
                self.create_api_sign_request(tx_json, reference, api_key, api_secret)
                    .await
            }
        }
    }

    /// Retrieve the wallet-side status of a payload. In stub mode the caller's
    /// own observation is echoed back; in api mode the remote flags decide.
    pub async fn get_payload_status(
        &self,
        payload_id: &str,
        observed_status: Option<&str>,
        observed_tx_hash: Option<&str>,
    ) -> Result<XamanPayloadStatusResult, XamanIntegrationError> {
        match self.mode {
            XamanMode::Stub => {
                let status = match observed_status {
                    None => XamanPayloadStatus::Unknown,
                    Some(raw) => match raw.trim().to_lowercase().as_str() {
                        "open" => XamanPayloadStatus::Open,
                        "signed" => XamanPayloadStatus::Signed,
                        "declined" => XamanPayloadStatus::Declined,
                        "expired" => XamanPayloadStatus::Expired,
                        _ => return Err(XamanIntegrationError::XamanObservedStatusInvalid),
                    },
                };
                Ok(XamanPayloadStatusResult {
                    payload_id: payload_id.to_string(),
                    status,
                    tx_hash: observed_tx_hash.map(str::to_string),
                    mode: self.mode.as_str().to_string(),
                })
            }
            XamanMode::Api => {
                let (api_key, api_secret) = self.credentials()?;
                self.get_api_payload_status(payload_id, api_key, api_secret)
                    .await
            }
        }
    }

    fn credentials(&self) -> Result<(&str, &str), XamanIntegrationError> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) => Ok((key, secret)),
            _ => Err(XamanIntegrationError::XamanApiCredentialsMissing),
        }
    }

    fn create_stub_sign_request(&self, tx_json: &Value, reference: &str) -> XamanSignRequest {
        let serialized = canonical_json(tx_json);
        let payload_id = Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            format!("{reference}:{serialized}").as_bytes(),
        )
        .to_string();
        XamanSignRequest {
            deep_link_url: format!("xumm://payload/{payload_id}"),
            qr_png_url: format!("https://xumm.app/sign/{payload_id}/qr.png"),
            websocket_status_url: Some(format!("wss://xumm.app/sign/{payload_id}")),
            payload_id,
            mode: self.mode.as_str().to_string(),
        }
    }

    async fn create_api_sign_request(
        &self,
        tx_json: &Value,
        reference: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<XamanSignRequest, XamanIntegrationError> {
        let body = serde_json::json!({
            "txjson": tx_json,
            "options": {"submit": true},
            "custom_meta": {"identifier": reference},
        });
        let url = format!("{}/api/v1/platform/payload", self.api_base_url);
        tracing::debug!(reference, "creating xaman sign request");
        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .header("X-API-Key", api_key)
            .header("X-API-Secret", api_secret)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;
        if !response.status().is_success() {
            return Err(XamanIntegrationError::XamanApiHttpError);
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|_| XamanIntegrationError::XamanApiInvalidJson)?;

        let payload_id = require_str(&payload, "uuid")?;
        let next = payload
            .get("next")
            .and_then(Value::as_object)
            .ok_or(XamanIntegrationError::XamanApiInvalidResponse)?;
        let refs = payload
            .get("refs")
            .and_then(Value::as_object)
            .ok_or(XamanIntegrationError::XamanApiInvalidResponse)?;
        let deep_link_url = next
            .get("always")
            .and_then(Value::as_str)
            .ok_or(XamanIntegrationError::XamanApiInvalidResponse)?;
        let qr_png_url = refs
            .get("qr_png")
            .and_then(Value::as_str)
            .ok_or(XamanIntegrationError::XamanApiInvalidResponse)?;
        let websocket_status_url = match refs.get("websocket_status") {
            None | Some(Value::Null) => None,
            Some(Value::String(url)) => Some(url.clone()),
            Some(_) => return Err(XamanIntegrationError::XamanApiInvalidResponse),
        };

        Ok(XamanSignRequest {
            payload_id: payload_id.to_string(),
            deep_link_url: deep_link_url.to_string(),
            qr_png_url: qr_png_url.to_string(),
            websocket_status_url,
            mode: self.mode.as_str().to_string(),
        })
    }

    async fn get_api_payload_status(
        &self,
        payload_id: &str,
        api_key: &str,
        api_secret: &str,
    ) -> Result<XamanPayloadStatusResult, XamanIntegrationError> {
        let url = format!("{}/api/v1/platform/payload/{payload_id}", self.api_base_url);
        let response = self
            .http
            .get(&url)
            .header("X-API-Key", api_key)
            .header("X-API-Secret", api_secret)
            .send()
            .await
            .map_err(classify_transport_error)?;
        if !response.status().is_success() {
            return Err(XamanIntegrationError::XamanApiHttpError);
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|_| XamanIntegrationError::XamanApiInvalidJson)?;

        let meta = payload
            .get("meta")
            .and_then(Value::as_object)
            .ok_or(XamanIntegrationError::XamanApiInvalidResponse)?;
        let flag = |name: &str| -> Result<bool, XamanIntegrationError> {
            meta.get(name)
                .and_then(Value::as_bool)
                .ok_or(XamanIntegrationError::XamanApiInvalidResponse)
        };
        let signed = flag("signed")?;
        let cancelled = flag("cancelled")?;
        let expired = flag("expired")?;
        let resolved = flag("resolved")?;

        // Signed wins; a resolved-but-unsigned payload was rejected by the user.
        let status = if signed {
            XamanPayloadStatus::Signed
        } else if cancelled {
            XamanPayloadStatus::Declined
        } else if expired {
            XamanPayloadStatus::Expired
        } else if resolved {
            XamanPayloadStatus::Declined
        } else {
            XamanPayloadStatus::Open
        };

        let tx_hash = payload
            .get("response")
            .and_then(Value::as_object)
            .and_then(|response| response.get("txid"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(XamanPayloadStatusResult {
            payload_id: payload_id.to_string(),
            status,
            tx_hash,
            mode: self.mode.as_str().to_string(),
        })
    }
}

fn classify_transport_error(error: reqwest::Error) -> XamanIntegrationError {
    if error.is_timeout() || error.is_connect() {
        XamanIntegrationError::XamanApiConnectionError
    } else {
        XamanIntegrationError::XamanApiHttpError
    }
}

fn require_str<'a>(payload: &'a Value, key: &str) -> Result<&'a str, XamanIntegrationError> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .ok_or(XamanIntegrationError::XamanApiInvalidResponse)
}
