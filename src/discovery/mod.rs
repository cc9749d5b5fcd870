//! Per-repository discovery of direct download URLs.
//!
//! Every repository publishes its files through a different HTML layout. A
//! [`Site`] names one of the supported layouts and implements [`SiteLayout`];
//! [`Discovery`] drives the layout against the live pages and memoizes the
//! result.

pub mod sites;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use scraper::Html;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{Error, Result};
use crate::registry::Repository;

/// Site-specific knowledge of where download links live.
///
/// Both methods are required; a repository without an intermediate level
/// returns `None` from [`find_intermediate_pages`](Self::find_intermediate_pages).
pub trait SiteLayout: Send + Sync {
    /// Inspects the landing page and returns the secondary listing pages to
    /// visit, or `None` if the landing page already carries the download links.
    fn find_intermediate_pages(&self, entry: &Url, page: &Html) -> Option<Vec<String>>;

    /// Extracts the file download links of one page. Relative links are
    /// allowed; they are resolved against the page they came from.
    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String>;
}

/// The supported dataset repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Site {
    /// Common Crawl hyperlink graph.
    CommonCrawl,
    /// DBLP bibliography.
    Dblp,
    /// 11th DIMACS implementation challenge.
    Dimacs11,
    /// 9th DIMACS implementation challenge.
    Dimacs9,
    /// Internet Archive DOI urls.
    Doi,
    /// GroupLens HetRec 2011.
    Hetrec,
    /// KONECT network collection.
    Konect,
    /// Laboratory for Web Algorithmics.
    Lalg,
    /// GroupLens MovieLens.
    MovieLens,
    /// NBER patent citations.
    Nber,
    /// Network Repository.
    NetworkRepository,
    /// Mark Newman's network data.
    Newman,
    /// Stanford Large Network Dataset Collection.
    Snap,
    /// SuiteSparse matrix collection.
    SparseMatrix,
}

impl Site {
    /// Every supported site, in id order.
    pub const ALL: [Self; 14] = [
        Self::CommonCrawl,
        Self::Dblp,
        Self::Dimacs11,
        Self::Dimacs9,
        Self::Doi,
        Self::Hetrec,
        Self::Konect,
        Self::Lalg,
        Self::MovieLens,
        Self::Nber,
        Self::NetworkRepository,
        Self::Newman,
        Self::Snap,
        Self::SparseMatrix,
    ];

    /// Short identifier used in the registry file and on the command line.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::CommonCrawl => "ccrawl",
            Self::Dblp => "dblp",
            Self::Dimacs11 => "dimacs11",
            Self::Dimacs9 => "dimacs9",
            Self::Doi => "doi",
            Self::Hetrec => "hetrec",
            Self::Konect => "kone",
            Self::Lalg => "lalg",
            Self::MovieLens => "mvlens",
            Self::Nber => "nber",
            Self::NetworkRepository => "netr",
            Self::Newman => "small",
            Self::Snap => "snap",
            Self::SparseMatrix => "spmx",
        }
    }

    fn layout(self) -> &'static dyn SiteLayout {
        match self {
            Self::CommonCrawl => &sites::CommonCrawl,
            Self::Dblp => &sites::Dblp,
            Self::Dimacs11 => &sites::Dimacs11,
            Self::Dimacs9 => &sites::Dimacs9,
            Self::Doi => &sites::Doi,
            Self::Hetrec => &sites::Hetrec,
            Self::Konect => &sites::Konect,
            Self::Lalg => &sites::Lalg,
            Self::MovieLens => &sites::MovieLens,
            Self::Nber => &sites::Nber,
            Self::NetworkRepository => &sites::NetworkRepository,
            Self::Newman => &sites::Newman,
            Self::Snap => &sites::Snap,
            Self::SparseMatrix => &sites::SparseMatrix,
        }
    }
}

impl SiteLayout for Site {
    fn find_intermediate_pages(&self, entry: &Url, page: &Html) -> Option<Vec<String>> {
        self.layout().find_intermediate_pages(entry, page)
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        self.layout().extract_download_links(entry, page)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Site {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|site| site.id() == s)
            .ok_or_else(|| Error::UnknownRepository(s.to_string()))
    }
}

/// The memoized output of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredUrls {
    urls: BTreeSet<String>,
    failed_pages: Vec<String>,
}

impl DiscoveredUrls {
    /// Iterates the download URLs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Number of distinct download URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns true if no download URL was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Intermediate pages that could not be loaded and were skipped.
    #[must_use]
    pub fn failed_pages(&self) -> &[String] {
        &self.failed_pages
    }

    /// Resolves `links` against `base` and adds the ones that form valid URLs.
    fn extend_resolved(&mut self, base: &Url, links: Vec<String>) {
        for link in links {
            match base.join(&link) {
                Ok(url) => {
                    self.urls.insert(url.into());
                }
                Err(e) => log::debug!("Dropping unresolvable link {link:?}: {e}"),
            }
        }
    }
}

/// Fetches a page and returns its body, treating non-2xx statuses as errors.
async fn fetch_page(client: &reqwest::Client, url: &Url) -> Result<String> {
    let body = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// Discovers and caches the download URLs of one repository.
pub struct Discovery {
    repository: Repository,
    client: reqwest::Client,
    discovered: OnceCell<DiscoveredUrls>,
}

impl Discovery {
    /// Creates a discovery for `repository` using the given HTTP client.
    #[must_use]
    pub fn new(repository: Repository, client: reqwest::Client) -> Self {
        Self {
            repository,
            client,
            discovered: OnceCell::new(),
        }
    }

    /// Returns the repository being discovered.
    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Returns the download URLs, crawling the repository on the first call.
    ///
    /// Once a crawl succeeds its result is kept for the lifetime of this
    /// value, even when it is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the landing page cannot be fetched. A failed crawl
    /// is not cached, so the next call tries again.
    pub async fn discover(&self) -> Result<&DiscoveredUrls> {
        self.discovered.get_or_try_init(|| self.crawl()).await
    }

    async fn crawl(&self) -> Result<DiscoveredUrls> {
        let entry = &self.repository.entry_url;
        let site = self.repository.site;
        log::info!("Getting urls for {} from {entry}", self.repository.name);

        let landing = fetch_page(&self.client, entry).await?;
        let (intermediate, landing_links) = {
            let page = Html::parse_document(&landing);
            match site.find_intermediate_pages(entry, &page) {
                Some(pages) if !pages.is_empty() => (pages, Vec::new()),
                _ => (Vec::new(), site.extract_download_links(entry, &page)),
            }
        };

        let mut discovered = DiscoveredUrls::default();
        discovered.extend_resolved(entry, landing_links);

        for page_url in intermediate {
            let url = match entry.join(&page_url) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("Skipping intermediate page {page_url}: {e}");
                    discovered.failed_pages.push(page_url);
                    continue;
                }
            };
            match fetch_page(&self.client, &url).await {
                Ok(body) => {
                    let links = {
                        let page = Html::parse_document(&body);
                        site.extract_download_links(entry, &page)
                    };
                    log::debug!("{url}: {} link(s)", links.len());
                    discovered.extend_resolved(&url, links);
                }
                Err(e) => {
                    log::warn!("Skipping intermediate page {url}: {e}");
                    discovered.failed_pages.push(page_url);
                }
            }
        }

        log::info!(
            "Found {} download url(s) for {}",
            discovered.len(),
            self.repository.name
        );
        Ok(discovered)
    }
}
