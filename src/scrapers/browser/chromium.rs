//! Chrome DevTools (chromiumoxide) implementation of the page session.

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tracing::{debug, info};

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
#[cfg(feature = "browser")]
use chromiumoxide::Element;
#[cfg(feature = "browser")]
use chromiumoxide::error::CdpError;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;

use super::{BrowserEngineConfig, PageSession, SessionLauncher};
#[cfg(feature = "browser")]
use super::{ElementRef, Interaction};
use crate::error::SessionError;

/// Visible when it has a layout box and is not hidden by style.
#[cfg(feature = "browser")]
const IS_VISIBLE_JS: &str = r#"
function() {
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden') {
        return false;
    }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 || rect.height > 0;
}
"#;

/// Launches Chrome (or attaches to a remote one) and opens pages in it.
pub struct ChromiumLauncher {
    config: BrowserEngineConfig,
}

impl ChromiumLauncher {
    /// Common Chrome executable paths to check.
    #[cfg(feature = "browser")]
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    /// Chrome command-line arguments for a local launch.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--disable-blink-features=AutomationControlled",
            "--disable-infobars",
            "--disable-dev-shm-usage",
            "--no-first-run",
            "--no-default-browser-check",
            "--disable-background-networking",
            "--disable-sync",
            "--disable-translate",
            "--no-sandbox",
            "--disable-gpu",
            // Keep Chrome's own logging off the terminal
            "--disable-logging",
            "--log-level=3",
            "--silent-debugger-extension-api",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if self.config.disable_images {
            args.push("--blink-settings=imagesEnabled=false".to_string());
        }

        if let Some(ref proxy) = self.config.proxy {
            args.push(format!("--proxy-server={}", proxy));
        }

        args.extend(self.config.chrome_args.iter().cloned());
        args
    }
}

#[cfg(feature = "browser")]
impl ChromiumLauncher {
    /// Find the Chrome executable: configured path, well-known paths, then `PATH`.
    fn find_chrome(&self) -> Result<PathBuf, SessionError> {
        if let Some(ref path) = self.config.chrome_path {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(SessionError::Launch(format!(
                "Configured Chrome executable not found: {}",
                path.display()
            )));
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(SessionError::Launch(
            "Chrome/Chromium not found. Install it or set browser.chrome_path".to_string(),
        ))
    }

    /// Launch a local browser, or attach to `remote_url` when configured.
    async fn start(&self) -> Result<(Browser, JoinHandle<()>, bool), SessionError> {
        if let Some(ref remote_url) = self.config.remote_url {
            let (browser, handler) = self.connect_remote(remote_url).await?;
            return Ok((browser, handler, true));
        }

        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = self.find_chrome()?;
        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        for arg in self.launch_args() {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| SessionError::Launch(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle, false))
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&self, url: &str) -> Result<(Browser, JoinHandle<()>), SessionError> {
        info!("Connecting to remote browser at {}", url);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .timeout(Duration::from_secs(self.config.timeout))
            .send()
            .await
            .map_err(|e| SessionError::Launch(format!("Remote browser unreachable: {}", e)))?
            .json()
            .await
            .map_err(|e| SessionError::Launch(format!("Bad browser version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SessionError::Launch("No webSocketDebuggerUrl in response".to_string())
            })?;

        debug!("Connecting to WebSocket: {}", ws_url);

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| SessionError::Launch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, url: &str) -> Result<Box<dyn PageSession>, SessionError> {
        let (browser, handler, remote) = self.start().await?;
        let mut session = ChromiumSession {
            browser,
            page: None,
            handler,
            remote,
        };

        match session
            .open(url, Duration::from_secs(self.config.timeout))
            .await
        {
            Ok(()) => Ok(Box::new(session)),
            Err(e) => {
                session.close().await;
                Err(e)
            }
        }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, _url: &str) -> Result<Box<dyn PageSession>, SessionError> {
        Err(SessionError::Unavailable)
    }
}

/// One results page in a launched (or attached) browser.
#[cfg(feature = "browser")]
struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
    /// Attached to someone else's browser: close our tab, leave the process alone.
    remote: bool,
}

#[cfg(feature = "browser")]
impl ChromiumSession {
    async fn open(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        info!("Navigating to {}", url);

        let page = tokio::time::timeout(timeout, self.browser.new_page(url))
            .await
            .map_err(|_| SessionError::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {}s", timeout.as_secs()),
            })?
            .map_err(|e| SessionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page, SessionError> {
        self.page
            .as_ref()
            .ok_or_else(|| SessionError::Command("no page open".to_string()))
    }

    async fn element(&self, element: &ElementRef) -> Result<Element, SessionError> {
        let mut found = self
            .page()?
            .find_elements(element.selector.as_str())
            .await
            .map_err(command_error)?;

        if element.index >= found.len() {
            return Err(SessionError::Command(format!(
                "no match #{} for {}",
                element.index, element.selector
            )));
        }
        Ok(found.swap_remove(element.index))
    }

    async fn mouse_event(
        &self,
        kind: DispatchMouseEventType,
        (x, y): (f64, f64),
        button: Option<MouseButton>,
    ) -> Result<(), SessionError> {
        let mut builder = DispatchMouseEventParams::builder().r#type(kind).x(x).y(y);
        if let Some(button) = button {
            builder = builder.button(button).click_count(1);
        }
        let params = builder.build().map_err(SessionError::Command)?;

        self.page()?
            .execute(params)
            .await
            .map_err(command_error)?;
        Ok(())
    }

    async fn right_click(&self, element: &Element) -> Result<(), SessionError> {
        element.scroll_into_view().await.map_err(command_error)?;
        let point = element.clickable_point().await.map_err(command_error)?;
        let point = (point.x, point.y);

        self.mouse_event(DispatchMouseEventType::MouseMoved, point, None)
            .await?;
        self.mouse_event(
            DispatchMouseEventType::MousePressed,
            point,
            Some(MouseButton::Right),
        )
        .await?;
        self.mouse_event(
            DispatchMouseEventType::MouseReleased,
            point,
            Some(MouseButton::Right),
        )
        .await
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageSession for ChromiumSession {
    async fn locate(&mut self, selector: &str) -> Result<Vec<ElementRef>, SessionError> {
        let found = self
            .page()?
            .find_elements(selector)
            .await
            .map_err(command_error)?;
        Ok(ElementRef::all(selector, found.len()))
    }

    async fn is_visible(&mut self, element: &ElementRef) -> Result<bool, SessionError> {
        let el = self.element(element).await?;
        let returns = el
            .call_js_fn(IS_VISIBLE_JS, false)
            .await
            .map_err(command_error)?;
        Ok(returns
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    async fn read_attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let el = self.element(element).await?;
        el.attribute(name).await.map_err(command_error)
    }

    async fn interact(
        &mut self,
        element: &ElementRef,
        interaction: Interaction,
    ) -> Result<(), SessionError> {
        let el = self.element(element).await?;
        debug!("{:?} on {} #{}", interaction, element.selector, element.index);

        match interaction {
            Interaction::HoverClick => {
                el.hover().await.map_err(command_error)?;
                el.click().await.map_err(command_error)?;
            }
            Interaction::ContextClick => {
                self.right_click(&el).await?;
            }
            Interaction::PressEnd => {
                el.press_key("End").await.map_err(command_error)?;
            }
        }
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        if !self.remote {
            if let Err(e) = self.browser.close().await {
                debug!("Failed to close browser: {}", e);
            }
            let _ = self.browser.wait().await;
        }

        self.handler.abort();
    }
}

#[cfg(feature = "browser")]
fn command_error(e: CdpError) -> SessionError {
    SessionError::Command(e.to_string())
}
