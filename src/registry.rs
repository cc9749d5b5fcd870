//! Repository registry loaded from a JSON file.
//!
//! The file maps repository ids to their entry page:
//!
//! ```json
//! { "snap": { "site_url": "https://snap.stanford.edu/data/index.html" } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use url::Url;

use crate::discovery::Site;
use crate::error::{Error, Result};

/// A configured dataset repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Repository id, also used as the output sub-directory name.
    pub name: String,
    /// Landing page of the repository.
    pub entry_url: Url,
    /// Layout used to discover download links.
    pub site: Site,
}

impl Repository {
    /// Creates a repository named after its site.
    #[must_use]
    pub fn new(site: Site, entry_url: Url) -> Self {
        Self {
            name: site.id().to_string(),
            entry_url,
            site,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    site_url: String,
}

/// The set of repositories available for download, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    repositories: BTreeMap<Site, Repository>,
}

impl Registry {
    /// Loads the registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// holds an invalid `site_url`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parses the registry from JSON text. Entries whose id does not name a
    /// supported site are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or holds an invalid
    /// `site_url`.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, RegistryEntry> = serde_json::from_str(json)?;
        let mut repositories = BTreeMap::new();

        for (id, entry) in entries {
            let Ok(site) = id.parse::<Site>() else {
                log::warn!("Ignoring unsupported repository {id:?} in registry");
                continue;
            };
            let entry_url = Url::parse(&entry.site_url).map_err(|source| Error::InvalidUrl {
                url: entry.site_url.clone(),
                source,
            })?;
            repositories.insert(site, Repository::new(site, entry_url));
        }

        Ok(Self { repositories })
    }

    /// Looks up a configured repository by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRepository`] if the id is not a supported site
    /// or is missing from the registry.
    pub fn get(&self, id: &str) -> Result<&Repository> {
        let site: Site = id.parse()?;
        self.repositories
            .get(&site)
            .ok_or_else(|| Error::UnknownRepository(id.to_string()))
    }

    /// Iterates all configured repositories in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Repository> {
        self.repositories.values()
    }

    /// Number of configured repositories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    /// Returns true if no repository is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
