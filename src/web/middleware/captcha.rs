//! CAPTCHA verification for registration and login.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::CaptchaConfig;
use crate::web::error::ApiError;
use crate::FreshkartError;

/// Verifier transport errors.
#[derive(Error, Debug)]
#[error("captcha verifier error: {0}")]
pub struct CaptchaError(pub String);

/// Verifies a CAPTCHA response token.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Whether requests must carry a token at all.
    fn enabled(&self) -> bool {
        true
    }

    /// `Ok(false)` when the verifier rejected the token.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError>;
}

/// Accepts everything. Used when no secret is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCaptcha;

#[async_trait]
impl CaptchaVerifier for DisabledCaptcha {
    fn enabled(&self) -> bool {
        false
    }

    async fn verify(&self, _token: &str, _remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        Ok(true)
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Google reCAPTCHA `siteverify` client.
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: Url,
}

impl RecaptchaVerifier {
    pub fn new(secret: impl Into<String>, verify_url: &str) -> crate::Result<Self> {
        let verify_url = Url::parse(verify_url)
            .map_err(|e| FreshkartError::Config(format!("invalid captcha verify_url: {e}")))?;
        let client = Client::builder()
            .user_agent(concat!("freshkart/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FreshkartError::Config(format!("captcha client: {e}")))?;
        Ok(Self {
            client,
            secret: secret.into(),
            verify_url,
        })
    }

    /// Form body for `siteverify`. The secret stays out of the URL.
    fn form_params<'a>(
        &'a self,
        token: &'a str,
        remote_ip: Option<&'a str>,
    ) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            params.push(("remoteip", ip));
        }
        params
    }
}

impl std::fmt::Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecaptchaVerifier")
            .field("verify_url", &self.verify_url.as_str())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        let response = self
            .client
            .post(self.verify_url.clone())
            .form(&self.form_params(token, remote_ip))
            .send()
            .await
            .map_err(|e| CaptchaError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CaptchaError(format!("status {}", response.status())));
        }

        let body: SiteVerifyResponse = response
            .json()
            .await
            .map_err(|e| CaptchaError(e.to_string()))?;
        if !body.success {
            tracing::debug!(errors = ?body.error_codes, "CAPTCHA rejected");
        }
        Ok(body.success)
    }
}

/// Build the verifier for the configuration: reCAPTCHA when a secret is
/// set, otherwise disabled.
pub fn verifier_from_config(config: &CaptchaConfig) -> crate::Result<Box<dyn CaptchaVerifier>> {
    if config.secret.is_empty() {
        tracing::warn!("CAPTCHA secret not configured; CAPTCHA verification disabled");
        return Ok(Box::new(DisabledCaptcha));
    }
    Ok(Box::new(RecaptchaVerifier::new(
        config.secret.clone(),
        &config.verify_url,
    )?))
}

/// Check a request's CAPTCHA token.
pub async fn check_captcha(
    verifier: &dyn CaptchaVerifier,
    token: Option<&str>,
    remote_ip: Option<&str>,
) -> Result<(), ApiError> {
    if !verifier.enabled() {
        return Ok(());
    }

    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Please complete the CAPTCHA"))?;

    match verifier.verify(token, remote_ip).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiError::bad_request(
            "CAPTCHA verification failed. Please try again.",
        )),
        Err(e) => {
            tracing::error!("reCAPTCHA verification error: {}", e);
            Err(ApiError::internal("Server error during CAPTCHA verification"))
        }
    }
}
