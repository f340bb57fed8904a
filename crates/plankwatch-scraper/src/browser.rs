//! Stealth browser session over chromiumoxide.
//!
//! One [`StealthSession`] wraps one headless Chromium process plus one page.
//! The session is the unit of observable network identity: tearing it down
//! and launching a new one resets the TLS session, connection pool, and the
//! profile-controlled user agent/timezone/viewport. Adapters recycle sessions
//! every few regions for exactly this reason.

use std::time::Duration;

use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::emulation::SetTimezoneOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    self, ContinueRequestParams, EventRequestPaused, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, EventResponseReceived, GetResponseBodyParams, PostDataEntry, SetCookiesParams,
    SetUserAgentOverrideParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::ScrapeError;
use crate::profile::SessionProfile;

/// Body fragments that identify an anti-bot interstitial regardless of status.
const BLOCK_SIGNATURES: &[&str] = &[
    "access denied",
    "access to this page has been denied",
    "pardon our interruption",
    "verify you are a human",
    "request unsuccessful",
];

/// What a navigation observed about the final document.
#[derive(Debug, Clone)]
pub struct NavOutcome {
    pub status: Option<i64>,
    pub title: Option<String>,
}

/// Heuristic block detection: HTTP 403/429, an empty title, or a known error
/// string in the visible body text.
#[must_use]
pub(crate) fn looks_blocked(status: Option<i64>, title: Option<&str>, body: &str) -> bool {
    if matches!(status, Some(403 | 429)) {
        return true;
    }
    match title {
        None => return true,
        Some(t) if t.trim().is_empty() || t == "Error Page" => return true,
        Some(_) => {}
    }
    let body = body.to_lowercase();
    BLOCK_SIGNATURES.iter().any(|sig| body.contains(sig))
}

/// Reassembles a paused request's POST body from its base64-encoded post
/// data entries. Returns `None` when there are no entries, an entry has no
/// bytes, or the concatenation is not valid UTF-8; callers pass such
/// requests through unmodified.
pub(crate) fn assemble_post_data(entries: Option<&[PostDataEntry]>) -> Option<String> {
    let entries = entries?;
    if entries.is_empty() {
        return None;
    }
    let mut raw = Vec::new();
    for entry in entries {
        let bytes = entry.bytes.as_ref()?;
        let chunk = base64::engine::general_purpose::STANDARD
            .decode(bytes)
            .ok()?;
        raw.extend_from_slice(&chunk);
    }
    String::from_utf8(raw).ok()
}

/// A single stealth browser session: one Chromium process, one page.
pub struct StealthSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    nav_timeout: Duration,
    profile: SessionProfile,
}

impl StealthSession {
    /// Launches a headless browser configured with `profile` and applies the
    /// user-agent and timezone overrides to a fresh blank page.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Session`] if the browser config cannot be
    /// built, or [`ScrapeError::Browser`] on any CDP failure.
    pub async fn launch(
        profile: SessionProfile,
        nav_timeout: Duration,
    ) -> Result<Self, ScrapeError> {
        let (width, height) = profile.viewport;
        let config = BrowserConfig::builder()
            .headless_mode(HeadlessMode::New)
            .window_size(width, height)
            .request_timeout(nav_timeout)
            .arg(format!("--user-agent={}", profile.user_agent))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--mute-audio")
            .build()
            .map_err(ScrapeError::Session)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = ?e, "browser handler event error");
                }
            }
        });

        let page = browser.new_page("about:blank").await?;

        page.execute(SetUserAgentOverrideParams {
            user_agent: profile.user_agent.to_owned(),
            accept_language: Some("en-US,en;q=0.9".to_owned()),
            platform: None,
            user_agent_metadata: None,
        })
        .await?;
        page.execute(SetTimezoneOverrideParams::new(profile.timezone.to_owned()))
            .await?;

        Ok(Self {
            browser,
            handler_task,
            page,
            nav_timeout,
            profile,
        })
    }

    #[must_use]
    pub fn profile(&self) -> SessionProfile {
        self.profile
    }

    /// Seeds cookies for `domain` before the first navigation, so the site
    /// renders with the intended regional context on first paint.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Session`] for a malformed cookie,
    /// [`ScrapeError::Browser`] on CDP failure.
    pub async fn set_cookies(
        &self,
        domain: &str,
        cookies: &[(&str, String)],
    ) -> Result<(), ScrapeError> {
        let params: Vec<CookieParam> = cookies
            .iter()
            .map(|(name, value)| {
                CookieParam::builder()
                    .name((*name).to_owned())
                    .value(value.clone())
                    .domain(domain.to_owned())
                    .path("/".to_owned())
                    .build()
                    .map_err(ScrapeError::Session)
            })
            .collect::<Result<_, _>>()?;

        self.page.execute(SetCookiesParams::new(params)).await?;
        Ok(())
    }

    /// Navigates to `url` and classifies the outcome.
    ///
    /// The document status is observed through a response listener armed
    /// before the goto, because chromiumoxide's navigation result does not
    /// carry the HTTP status.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Blocked`] on 403/429 or a block-page signature.
    /// - [`ScrapeError::Navigation`] on timeout or any other CDP failure.
    pub async fn navigate(&self, url: &str) -> Result<NavOutcome, ScrapeError> {
        let mut events = self.page.event_listener::<EventResponseReceived>().await?;
        let document_url = url.to_owned();
        let status_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.response.url.starts_with(&document_url) {
                    return Some(event.response.status);
                }
            }
            None
        });

        let goto = tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await;
        match goto {
            Err(_) => {
                status_task.abort();
                return Err(ScrapeError::Navigation {
                    url: url.to_owned(),
                    reason: format!("timed out after {}s", self.nav_timeout.as_secs()),
                });
            }
            Ok(Err(e)) => {
                status_task.abort();
                return Err(ScrapeError::Navigation {
                    url: url.to_owned(),
                    reason: e.to_string(),
                });
            }
            Ok(Ok(_)) => {}
        }

        // The document response normally arrives before goto resolves; give
        // the listener a short grace period, then stop waiting.
        let status = match tokio::time::timeout(Duration::from_secs(2), status_task).await {
            Ok(Ok(status)) => status,
            _ => None,
        };

        let title = self.page.get_title().await.unwrap_or(None);
        let body = self.visible_text().await.unwrap_or_default();

        if looks_blocked(status, title.as_deref(), &body) {
            return Err(ScrapeError::Blocked {
                url: url.to_owned(),
                status,
                title,
            });
        }

        Ok(NavOutcome { status, title })
    }

    /// Evaluates a JS expression on the page and deserializes the result.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] on CDP failure, or
    /// [`ScrapeError::Deserialize`] if the script produced no JSON value.
    pub async fn evaluate_json(&self, expression: &str) -> Result<serde_json::Value, ScrapeError> {
        let result = self.page.evaluate(expression).await?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|source| ScrapeError::Deserialize {
                context: "page script result".to_owned(),
                source,
            })
    }

    /// Arms a JSON response capture for the first response whose URL contains
    /// `url_fragment`. Must be called *before* triggering the navigation that
    /// produces the response; fast servers answer before goto resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] if the event listener cannot be set up.
    pub async fn arm_response_capture(
        &self,
        url_fragment: &str,
    ) -> Result<ResponseCapture, ScrapeError> {
        let mut events = self.page.event_listener::<EventResponseReceived>().await?;
        let page = self.page.clone();
        let fragment = url_fragment.to_owned();
        let (tx, rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut captured = None;
            while let Some(event) = events.next().await {
                if !event.response.url.contains(&fragment) {
                    continue;
                }
                match page
                    .execute(GetResponseBodyParams::new(event.request_id.clone()))
                    .await
                {
                    Ok(body) => {
                        let raw: Vec<u8> = if body.base64_encoded {
                            base64::engine::general_purpose::STANDARD
                                .decode(&body.body)
                                .unwrap_or_default()
                        } else {
                            body.body.clone().into_bytes()
                        };
                        match serde_json::from_slice::<serde_json::Value>(&raw) {
                            Ok(value) => captured = Some(value),
                            Err(e) => {
                                tracing::debug!(error = %e, url = %event.response.url,
                                    "captured response is not JSON, skipping");
                                continue;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "could not read response body");
                    }
                }
                break;
            }
            if let Some(value) = captured {
                let _ = tx.send(value);
            }
        });

        Ok(ResponseCapture { rx, task })
    }

    /// Installs a request interceptor that rewrites the POST body of requests
    /// whose URL contains `url_fragment`. `rewrite` returns `None` to pass a
    /// body through untouched. All other intercepted requests continue as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Browser`] if interception cannot be enabled.
    pub async fn install_body_rewriter<F>(
        &self,
        url_fragment: &str,
        rewrite: F,
    ) -> Result<JoinHandle<()>, ScrapeError>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.page
            .execute(
                fetch::EnableParams::builder()
                    .pattern(RequestPattern {
                        url_pattern: Some(format!("*{url_fragment}*")),
                        resource_type: None,
                        request_stage: Some(RequestStage::Request),
                    })
                    .build(),
            )
            .await?;

        let mut events = self.page.event_listener::<EventRequestPaused>().await?;
        let page = self.page.clone();
        let fragment = url_fragment.to_owned();

        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let mut params = ContinueRequestParams::new(event.request_id.clone());
                if event.request.url.contains(&fragment) {
                    if let Some(body) =
                        assemble_post_data(event.request.post_data_entries.as_deref())
                            .and_then(|body| rewrite(&body))
                    {
                        // Fetch.continueRequest takes the override base64-encoded.
                        let encoded =
                            base64::engine::general_purpose::STANDARD.encode(body.as_bytes());
                        params.post_data = Some(chromiumoxide_types::Binary::from(encoded));
                    }
                }
                if let Err(e) = page.execute(params).await {
                    tracing::debug!(error = %e, "continueRequest failed, stopping interceptor");
                    break;
                }
            }
        });

        Ok(task)
    }

    /// Concatenated visible body text, for block-signature checks.
    async fn visible_text(&self) -> Result<String, ScrapeError> {
        let result = self
            .page
            .evaluate("document.body ? document.body.innerText.slice(0, 4000) : ''")
            .await?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    /// Tears the session down, ending the Chromium process. Dropping without
    /// closing leaks the child process until the handler task is aborted.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!(error = %e, "browser close failed");
        }
        self.handler_task.abort();
    }
}

/// One-shot receiver for a captured JSON response body.
pub struct ResponseCapture {
    rx: oneshot::Receiver<serde_json::Value>,
    task: JoinHandle<()>,
}

impl ResponseCapture {
    /// Waits up to `timeout` for the captured response. The capture task is
    /// not cancelled by navigation completing, only by this timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MissingResponse`] if nothing matching was
    /// captured in time.
    pub async fn wait(
        self,
        timeout: Duration,
        context: &str,
    ) -> Result<serde_json::Value, ScrapeError> {
        let result = tokio::time::timeout(timeout, self.rx).await;
        self.task.abort();
        match result {
            Ok(Ok(value)) => Ok(value),
            _ => Err(ScrapeError::MissingResponse {
                context: context.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_403_is_blocked() {
        assert!(looks_blocked(Some(403), Some("Home"), "welcome"));
    }

    #[test]
    fn status_429_is_blocked() {
        assert!(looks_blocked(Some(429), Some("Home"), "welcome"));
    }

    #[test]
    fn empty_title_is_blocked() {
        assert!(looks_blocked(Some(200), Some(""), "anything"));
        assert!(looks_blocked(Some(200), None, "anything"));
    }

    #[test]
    fn error_page_title_is_blocked() {
        assert!(looks_blocked(Some(200), Some("Error Page"), ""));
    }

    #[test]
    fn block_signature_in_body_is_blocked() {
        assert!(looks_blocked(
            Some(200),
            Some("Just a moment"),
            "Pardon Our Interruption - verifying your browser"
        ));
    }

    #[test]
    fn normal_page_is_not_blocked() {
        assert!(!looks_blocked(
            Some(200),
            Some("Hardwood Flooring - The Home Depot"),
            "Shop solid hardwood flooring"
        ));
    }

    #[test]
    fn missing_status_alone_is_not_blocked() {
        // Status capture can miss the document response; title/body decide.
        assert!(!looks_blocked(None, Some("Hardwood"), "catalog"));
    }

    fn encoded_entry(text: &str) -> PostDataEntry {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
        PostDataEntry::builder().bytes(encoded).build()
    }

    #[test]
    fn post_data_reassembles_across_entries() {
        let entries = [encoded_entry(r#"{"variables":"#), encoded_entry("{}}")];
        assert_eq!(
            assemble_post_data(Some(&entries)).as_deref(),
            Some(r#"{"variables":{}}"#)
        );
    }

    #[test]
    fn missing_or_invalid_post_data_yields_none() {
        assert_eq!(assemble_post_data(None), None);
        assert_eq!(assemble_post_data(Some(&[])), None);

        let no_bytes = PostDataEntry::builder().build();
        assert_eq!(assemble_post_data(Some(&[no_bytes])), None);

        let not_base64 = PostDataEntry::builder()
            .bytes("not base64!!".to_owned())
            .build();
        assert_eq!(assemble_post_data(Some(&[not_base64])), None);
    }

    #[test]
    fn script_result_error_carries_its_context() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ScrapeError::Deserialize {
            context: "page script result".to_owned(),
            source,
        };
        assert!(err.to_string().contains("page script result"));
        assert!(!err.is_blocked());
    }
}
