use crate::config::{Credentials, FetchConfig};
use crate::crawl::{Crawl, CrawlTarget};
use crate::inventory::Inventory;
use crate::login;
use crate::surface::BrowserSurface;
use crate::types::RunReport;
use crate::Result;
use std::path::PathBuf;

/// Session facade over one browser and one local inventory.
///
/// A client wraps any [`BrowserSurface`] implementation; production code
/// hands it a [`WebDriverSurface`](crate::WebDriverSurface), tests hand it a
/// fake.
///
/// # Examples
///
/// ```rust,no_run
/// use bpm_fetch::{BpmClient, Credentials, FetchConfig, Inventory, WebDriverSurface};
/// use std::path::PathBuf;
/// use thirtyfour::{DesiredCapabilities, WebDriver};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let driver = WebDriver::new("http://localhost:4444", DesiredCapabilities::firefox()).await?;
///     let config = FetchConfig::default();
///     let inventory = Inventory::build(&[PathBuf::from("/music")], &config.separator)?;
///     let mut client = BpmClient::new(WebDriverSurface::new(driver), config, inventory)?;
///
///     client.login(&Credentials::new("user", "password")?).await?;
///     let report = client.download_new_releases(None, Some(3)).await?;
///     println!("{}", report.summary());
///
///     client.into_surface().quit().await?;
///     Ok(())
/// }
/// ```
pub struct BpmClient<B: BrowserSurface> {
    surface: B,
    config: FetchConfig,
    inventory: Inventory,
    username: Option<String>,
}

impl<B: BrowserSurface> BpmClient<B> {
    /// Create a client. The configuration is validated up front.
    pub fn new(surface: B, config: FetchConfig, inventory: Inventory) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            surface,
            config,
            inventory,
            username: None,
        })
    }

    /// Authenticate the browser session.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        login::login(&self.surface, credentials, &self.config).await?;
        self.username = Some(credentials.username().to_string());
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Re-scan the local inventory from scratch. The index is otherwise
    /// immutable for the lifetime of the client.
    pub fn refresh_inventory(&mut self, paths: &[PathBuf]) -> Result<()> {
        self.inventory = Inventory::build(paths, &self.config.separator)?;
        log::info!("inventory refreshed: {} titles", self.inventory.len());
        Ok(())
    }

    /// Walk the account's download-history list.
    pub async fn download_history(&self, limit: Option<u32>) -> Result<RunReport> {
        self.crawl(CrawlTarget::download_history(&self.config), limit)
            .await
    }

    /// Walk the new-releases grid, optionally narrowed to a genre segment.
    pub async fn download_new_releases(
        &self,
        genre: Option<&str>,
        limit: Option<u32>,
    ) -> Result<RunReport> {
        self.crawl(CrawlTarget::new_releases(&self.config, genre), limit)
            .await
    }

    /// Walk the exclusives grid.
    pub async fn download_exclusives(&self, limit: Option<u32>) -> Result<RunReport> {
        self.crawl(CrawlTarget::exclusives(&self.config), limit).await
    }

    /// Walk an arbitrary genre page under the application origin.
    pub async fn download_genre(&self, url: &str, limit: Option<u32>) -> Result<RunReport> {
        self.crawl(CrawlTarget::genre(&self.config, url)?, limit).await
    }

    async fn crawl(&self, target: CrawlTarget, limit: Option<u32>) -> Result<RunReport> {
        Crawl::new(&self.surface, &self.inventory, &self.config, target)
            .run(limit)
            .await
    }

    /// Hand the surface back, e.g. to shut the browser down cleanly.
    pub fn into_surface(self) -> B {
        self.surface
    }
}
