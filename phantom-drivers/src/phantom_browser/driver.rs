use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use fantoccini::ClientBuilder;
use phantom_common::{PhantomError, Result};
use phantom_config::{Browser, WebDriverConfig};
use phantom_cursor::human::human_delay;
use serde_json::{json, Value};
use tracing::info;
use url::Url;
use webdriver::capabilities::Capabilities;

use super::page::WebDriverPage;

/// A connected WebDriver session.
pub struct PhantomDriver {
    page: Arc<WebDriverPage>,
    settings: WebDriverConfig,
}

/// Capabilities requesting the configured browser, headless or not.
pub fn capabilities(settings: &WebDriverConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    match settings.browser {
        Browser::Chrome => {
            let mut args = vec![json!("--window-size=1280,800")];
            if settings.headless {
                args.push(json!("--headless=new"));
                args.push(json!("--disable-gpu"));
            }
            caps.insert("browserName".into(), json!("chrome"));
            caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
        }
        Browser::Firefox => {
            let args: Vec<Value> = if settings.headless {
                vec![json!("-headless")]
            } else {
                Vec::new()
            };
            caps.insert("browserName".into(), json!("firefox"));
            caps.insert("moz:firefoxOptions".into(), json!({ "args": args }));
        }
    }
    caps
}

impl PhantomDriver {
    /// Connect to the WebDriver service at `settings.url`.
    pub async fn connect(settings: &WebDriverConfig) -> Result<Self> {
        let endpoint = Url::parse(&settings.url)
            .map_err(|e| PhantomError::Config(format!("invalid webdriver url `{}`: {e}", settings.url)))?;

        let mut builder = ClientBuilder::native();
        let connecting = builder
            .capabilities(capabilities(settings))
            .connect(endpoint.as_str());
        let client = tokio::time::timeout(
            Duration::from_secs(settings.connect_timeout_secs),
            connecting,
        )
        .await
        .map_err(|_| PhantomError::Timeout)?
        .map_err(|e| anyhow!("webdriver session failed: {e}"))?;

        info!(
            target: "browser.driver",
            url = %endpoint,
            browser = ?settings.browser,
            headless = settings.headless,
            "webdriver session established"
        );

        Ok(Self {
            page: Arc::new(WebDriverPage::new(client)),
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &WebDriverConfig {
        &self.settings
    }

    /// The page handle to build a cursor on.
    pub fn page(&self) -> Arc<WebDriverPage> {
        Arc::clone(&self.page)
    }

    /// Navigate after a short human pause.
    pub async fn goto(&self, url: &str) -> Result<Arc<WebDriverPage>> {
        let target =
            Url::parse(url).map_err(|e| PhantomError::Config(format!("invalid url `{url}`: {e}")))?;
        human_delay(300, 1200).await;
        self.page
            .client()
            .goto(target.as_str())
            .await
            .map_err(|e| anyhow!("navigation to {target} failed: {e}"))?;
        info!(target: "browser.driver", url = %target, "navigated");
        Ok(self.page())
    }

    /// End the browser session.
    pub async fn close(self) -> Result<()> {
        self.page
            .client()
            .clone()
            .close()
            .await
            .map_err(|e| anyhow!("closing session failed: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_chrome_gets_headless_args() {
        let caps = capabilities(&WebDriverConfig::default());
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless=new")));
        assert_eq!(caps["browserName"], json!("chrome"));
    }

    #[test]
    fn headed_firefox_has_no_headless_flag() {
        let settings = WebDriverConfig {
            browser: Browser::Firefox,
            headless: false,
            ..WebDriverConfig::default()
        };
        let caps = capabilities(&settings);
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!([]));
        assert!(!caps.contains_key("goog:chromeOptions"));
    }

    #[tokio::test]
    async fn malformed_url_is_a_config_error() {
        let settings = WebDriverConfig {
            url: "not a url".into(),
            ..WebDriverConfig::default()
        };
        let err = PhantomDriver::connect(&settings).await.err().unwrap();
        assert!(matches!(err, PhantomError::Config(_)));
    }
}
