use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserSettings;
use crate::error::AppError;

/// Snapshot of a loaded page, taken before the browser goes away.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub title: Option<String>,
    pub html: String,
}

impl FetchedPage {
    /// Fails when the site answered with its "not found" page.
    pub fn ensure_found(&self, not_found_title: &str) -> Result<(), AppError> {
        if self.title.as_deref() == Some(not_found_title) {
            return Err(AppError::PageNotFound {
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}

/// Loads one page per call.
#[async_trait]
pub trait PageFetcher: Send {
    async fn fetch(&mut self, url: &str) -> Result<FetchedPage, AppError>;
}

/// Kills any running browser, then loads the page in a fresh headless
/// instance that is torn down before returning.
pub struct ChromeFetcher {
    settings: BrowserSettings,
}

impl ChromeFetcher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch(&mut self, url: &str) -> Result<FetchedPage, AppError> {
        kill_running_browser(&self.settings.process_name).await;

        let session = BrowserSession::launch(self.settings.headless)
            .await
            .map_err(|e| AppError::Browser(format!("{e:#}")))?;
        let page = session.load(url).await;
        session.close().await;
        page
    }
}

/// Forceful kill command for the current platform.
fn kill_command(process_name: &str) -> (&'static str, Vec<&str>) {
    if cfg!(windows) {
        ("taskkill", vec!["/F", "/T", "/IM", process_name])
    } else {
        ("pkill", vec!["-KILL", process_name])
    }
}

/// Best effort: a missing process or a missing kill command is not an error.
async fn kill_running_browser(process_name: &str) {
    let (program, args) = kill_command(process_name);
    let output = Command::new(program).args(&args).output().await;

    match output {
        Ok(out) if out.status.success() => info!("Killed running {} processes", process_name),
        Ok(_) => debug!("No running {} process", process_name),
        Err(e) => warn!("Could not run process killer for {}: {}", process_name, e),
    }
}

/// One browser process plus the task driving its CDP connection.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(headless: bool) -> Result<Self> {
        debug!("Launching browser (headless: {})", headless);

        let mut config = BrowserConfig::builder();
        if !headless {
            config = config.with_head();
        }
        config = config.window_size(1920, 1080);

        let browser_config = config
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    debug!("Browser handler error: {:?}", e);
                }
            }
        });

        Ok(Self { browser, handler })
    }

    async fn load(&self, url: &str) -> Result<FetchedPage, AppError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::Browser(e.to_string()))?;

        info!("Loading {}", url);
        page.goto(url).await.map_err(|e| unreachable(url, e))?;

        let title = page.get_title().await.map_err(|e| unreachable(url, e))?;
        let html = page.content().await.map_err(|e| unreachable(url, e))?;

        Ok(FetchedPage {
            url: url.to_string(),
            title,
            html,
        })
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Failed to wait for browser exit: {}", e);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

fn unreachable(url: &str, e: CdpError) -> AppError {
    AppError::Unreachable {
        url: url.to_string(),
        reason: e.to_string(),
    }
}
