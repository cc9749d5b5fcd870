//! Link-extraction rules for each supported repository.
//!
//! Every layout is a unit struct implementing [`SiteLayout`]. The rules only
//! look at `href` attributes; anchors without one are ignored.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::SiteLayout;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static TABLE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("table a[href]"));
static LIST: LazyLock<Selector> = LazyLock::new(|| selector("ul"));
static KONECT_LINK: LazyLock<Selector> = LazyLock::new(|| selector("table#sort1 a[href]"));
static LALG_INDEX_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("table.tablesorter a[href]"));
static LALG_DATASET_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("table.dataset a[href]"));
static SNAP_INDEX_LINK: LazyLock<Selector> = LazyLock::new(|| selector("table#datatab2 a[href]"));
static SNAP_DATASET_LINK: LazyLock<Selector> = LazyLock::new(|| selector("table#datatab a[href]"));

/// Only the first links of each LAW dataset page are the graph files; the
/// rest are properties and offsets.
pub const LALG_LINKS_PER_DATASET: usize = 2;

const DBLP_URL: &str = "http://kdl.cs.umass.edu/databases/dblp-data.xml.gz";
const DOI_URL: &str = "https://archive.org/compress/doi-urls/formats=COMMA-SEPARATED%20VALUES%20GZ&file=/doi-urls.zip";

fn href(element: ElementRef<'_>) -> Option<&str> {
    element.value().attr("href")
}

/// `href` values of every element of `page` matching `selector`.
fn page_hrefs<'a>(page: &'a Html, selector: &'a Selector) -> impl Iterator<Item = &'a str> + 'a {
    page.select(selector).filter_map(href)
}

/// `href` values of the links inside the first element matching `container`.
fn first_container_hrefs<'a>(page: &'a Html, container: &Selector) -> Vec<&'a str> {
    page.select(container)
        .next()
        .map(|element| element.select(&ANY_LINK).filter_map(href).collect())
        .unwrap_or_default()
}

/// `scheme://host[:port]` of the entry URL.
fn origin(entry: &Url) -> String {
    entry.origin().ascii_serialization()
}

/// Drops the last `count` `/`-separated pieces of the entry URL.
pub(crate) fn strip_segments(entry: &str, count: usize) -> String {
    let pieces: Vec<&str> = entry.split('/').collect();
    pieces[..pieces.len().saturating_sub(count)].join("/")
}

/// Relative link that does not point elsewhere on the page.
fn is_local_relative(href: &str) -> bool {
    !href.contains("http") && !href.contains('#')
}

/// Common Crawl hyperlink graph tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonCrawl;

impl SiteLayout for CommonCrawl {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, _entry: &Url, page: &Html) -> Vec<String> {
        page_hrefs(page, &TABLE_LINK)
            .filter(|href| href.contains("gz"))
            .map(str::to_string)
            .collect()
    }
}

/// DBLP bibliography dump, a single well-known file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dblp;

impl SiteLayout for Dblp {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, _entry: &Url, _page: &Html) -> Vec<String> {
        vec![DBLP_URL.to_string()]
    }
}

/// 11th DIMACS implementation challenge instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimacs11;

impl SiteLayout for Dimacs11 {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        let origin = origin(entry);
        page_hrefs(page, &ANY_LINK)
            .filter(|href| href.contains("instances"))
            .map(|href| format!("{origin}/{}", href.trim_start_matches('/')))
            .collect()
    }
}

/// 9th DIMACS implementation challenge (shortest paths) road networks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimacs9;

impl SiteLayout for Dimacs9 {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        let origin = origin(entry);
        page_hrefs(page, &ANY_LINK)
            .filter(|href| href.contains("data") && href.contains('.'))
            .map(|href| format!("{origin}/challenge9/{}", href.trim_start_matches('/')))
            .collect()
    }
}

/// Internet Archive DOI url dump, a single well-known file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Doi;

impl SiteLayout for Doi {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, _entry: &Url, _page: &Html) -> Vec<String> {
        vec![DOI_URL.to_string()]
    }
}

/// Zip archives linked from anywhere on the page (HetRec, MovieLens).
fn zip_links(page: &Html) -> Vec<String> {
    page_hrefs(page, &ANY_LINK)
        .filter(|href| href.contains("zip"))
        .map(str::to_string)
        .collect()
}

/// GroupLens HetRec 2011 datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hetrec;

impl SiteLayout for Hetrec {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, _entry: &Url, page: &Html) -> Vec<String> {
        zip_links(page)
    }
}

/// KONECT network collection download table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Konect;

impl SiteLayout for Konect {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        let base = strip_segments(entry.as_str(), 1);
        page_hrefs(page, &KONECT_LINK)
            .filter(|href| is_local_relative(href) && href.contains("tsv/"))
            .map(|href| format!("{base}/{href}"))
            .collect()
    }
}

/// Laboratory for Web Algorithmics: an index table linking one page per dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lalg;

impl SiteLayout for Lalg {
    fn find_intermediate_pages(&self, entry: &Url, page: &Html) -> Option<Vec<String>> {
        let origin = origin(entry);
        Some(
            page_hrefs(page, &LALG_INDEX_LINK)
                .map(|href| format!("{origin}/{}", href.trim_start_matches('/')))
                .collect(),
        )
    }

    fn extract_download_links(&self, _entry: &Url, page: &Html) -> Vec<String> {
        page_hrefs(page, &LALG_DATASET_LINK)
            .take(LALG_LINKS_PER_DATASET)
            .map(str::to_string)
            .collect()
    }
}

/// GroupLens MovieLens datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieLens;

impl SiteLayout for MovieLens {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, _entry: &Url, page: &Html) -> Vec<String> {
        zip_links(page)
    }
}

/// NBER patent citation data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nber;

impl SiteLayout for Nber {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        let base = strip_segments(entry.as_str(), 2);
        page_hrefs(page, &TABLE_LINK)
            .filter(|href| href.contains("zip"))
            .map(|href| format!("{base}{href}"))
            .collect()
    }
}

/// Network Repository listing, everything in the first table except page links.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkRepository;

impl SiteLayout for NetworkRepository {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, _entry: &Url, page: &Html) -> Vec<String> {
        first_container_hrefs(page, &TABLE)
            .into_iter()
            .filter(|href| !href.contains("php"))
            .map(str::to_string)
            .collect()
    }
}

/// Mark Newman's network data page.
#[derive(Debug, Clone, Copy, Default)]
pub struct Newman;

impl SiteLayout for Newman {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        first_container_hrefs(page, &LIST)
            .into_iter()
            .filter(|href| href.contains("zip"))
            .map(|href| format!("{entry}{href}"))
            .collect()
    }
}

/// Stanford Large Network Dataset Collection: a category table linking one
/// page per dataset, each with its own file table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snap;

impl SiteLayout for Snap {
    fn find_intermediate_pages(&self, entry: &Url, page: &Html) -> Option<Vec<String>> {
        let base = strip_segments(entry.as_str(), 1);
        Some(
            page_hrefs(page, &SNAP_INDEX_LINK)
                .filter(|href| is_local_relative(href))
                .map(|href| format!("{base}/{href}"))
                .collect(),
        )
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        let base = strip_segments(entry.as_str(), 1);
        page_hrefs(page, &SNAP_DATASET_LINK)
            .map(|href| format!("{base}/{}", href.replace("../data/", "")))
            .collect()
    }
}

/// SuiteSparse (University of Florida) matrix collection, Matrix Market files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseMatrix;

impl SiteLayout for SparseMatrix {
    fn find_intermediate_pages(&self, _entry: &Url, _page: &Html) -> Option<Vec<String>> {
        None
    }

    fn extract_download_links(&self, entry: &Url, page: &Html) -> Vec<String> {
        let base = strip_segments(entry.as_str(), 2);
        page_hrefs(page, &ANY_LINK)
            .filter(|href| href.contains("/MM/"))
            .map(|href| format!("{base}{}", href.replace("..", "")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn leaf(layout: &dyn SiteLayout, entry_url: &str, html: &str) -> Vec<String> {
        let page = Html::parse_document(html);
        let entry = entry(entry_url);
        assert_eq!(layout.find_intermediate_pages(&entry, &page), None);
        layout.extract_download_links(&entry, &page)
    }

    #[test]
    fn strip_segments_drops_trailing_pieces() {
        assert_eq!(
            strip_segments("http://host/a/b/page.html", 1),
            "http://host/a/b"
        );
        assert_eq!(strip_segments("http://nber.org/patents/", 2), "http://nber.org");
        assert_eq!(strip_segments("a", 3), "");
    }

    #[test]
    fn common_crawl_keeps_compressed_table_links() {
        let html = r#"<table>
            <tr><td><a href="a.gz">a</a></td></tr>
            <tr><td><a href="b.txt">b</a></td></tr>
        </table>
        <a href="outside.gz">not in a table</a>"#;
        assert_eq!(
            leaf(&CommonCrawl, "http://example.org/graph/", html),
            vec!["a.gz"]
        );
    }

    #[test]
    fn fixed_url_sites_ignore_the_page() {
        let html = r#"<a href="something.gz">x</a>"#;
        assert_eq!(leaf(&Dblp, "http://kdl.cs.umass.edu/", html), vec![DBLP_URL]);
        assert_eq!(leaf(&Doi, "https://archive.org/details/doi-urls", html), vec![DOI_URL]);
    }

    #[test]
    fn dimacs11_resolves_instances_against_host() {
        let html = r#"<a href="data/instances/clustering/a.graph.bz2">a</a>
            <a href="/instances/b.graph.bz2">b</a>
            <a href="contact.html">c</a>
            <a>no href</a>"#;
        assert_eq!(
            leaf(&Dimacs11, "http://dimacs11.zib.de:8080/downloads.html", html),
            vec![
                "http://dimacs11.zib.de:8080/data/instances/clustering/a.graph.bz2",
                "http://dimacs11.zib.de:8080/instances/b.graph.bz2",
            ]
        );
    }

    #[test]
    fn dimacs9_requires_data_and_extension() {
        let html = r#"<a href="data/USA-road-d/USA-road-d.NY.gr.gz">ny</a>
            <a href="data/">listing</a>
            <a href="download.shtml">self</a>"#;
        assert_eq!(
            leaf(&Dimacs9, "http://www.dis.uniroma1.it/challenge9/download.shtml", html),
            vec!["http://www.dis.uniroma1.it/challenge9/data/USA-road-d/USA-road-d.NY.gr.gz"]
        );
    }

    #[test]
    fn grouplens_sites_keep_zip_links() {
        let html = r#"<p><a href="http://files.grouplens.org/datasets/hetrec2011/hetrec2011-delicious-2k.zip">d</a></p>
            <p><a href="/readme.txt">readme</a></p>"#;
        let expected = vec!["http://files.grouplens.org/datasets/hetrec2011/hetrec2011-delicious-2k.zip"];
        assert_eq!(leaf(&Hetrec, "https://grouplens.org/datasets/hetrec-2011/", html), expected);
        assert_eq!(leaf(&MovieLens, "https://grouplens.org/datasets/movielens/", html), expected);
    }

    #[test]
    fn konect_keeps_relative_tsv_links_in_sort_table() {
        let html = r##"<table id="sort1">
            <tr><td><a href="tsv/moreno_zebra.tar.bz2">zebra</a></td></tr>
            <tr><td><a href="http://mirror/tsv/x.tar.bz2">abs</a></td></tr>
            <tr><td><a href="#tsv/top">anchor</a></td></tr>
            <tr><td><a href="networks/zebra">info</a></td></tr>
        </table>
        <table id="other"><tr><td><a href="tsv/ignored.tar.bz2">x</a></td></tr></table>"##;
        assert_eq!(
            leaf(&Konect, "http://konect.uni-koblenz.de/downloads/", html),
            vec!["http://konect.uni-koblenz.de/downloads/tsv/moreno_zebra.tar.bz2"]
        );
    }

    #[test]
    fn lalg_index_and_dataset_pages() {
        let entry = entry("http://law.di.unimi.it/datasets.php");
        let index = Html::parse_document(
            r#"<table class="tablesorter">
                <tr><td><a href="webdata/cnr-2000/">cnr</a></td></tr>
                <tr><td><a href="webdata/eu-2005/">eu</a></td></tr>
            </table>"#,
        );
        assert_eq!(
            Lalg.find_intermediate_pages(&entry, &index),
            Some(vec![
                "http://law.di.unimi.it/webdata/cnr-2000/".to_string(),
                "http://law.di.unimi.it/webdata/eu-2005/".to_string(),
            ])
        );

        let dataset = Html::parse_document(
            r#"<table class="dataset">
                <tr><td><a href="cnr-2000.graph">graph</a></td>
                    <td><a href="cnr-2000.properties">properties</a></td>
                    <td><a href="cnr-2000.offsets">offsets</a></td></tr>
            </table>"#,
        );
        assert_eq!(
            Lalg.extract_download_links(&entry, &dataset),
            vec!["cnr-2000.graph", "cnr-2000.properties"]
        );
    }

    #[test]
    fn nber_prefixes_site_root() {
        let html = r#"<table><tr>
            <td><a href="/patents/acite75_99.zip">cites</a></td>
            <td><a href="/patents/readme.txt">readme</a></td>
        </tr></table>"#;
        assert_eq!(
            leaf(&Nber, "http://nber.org/patents/", html),
            vec!["http://nber.org/patents/acite75_99.zip"]
        );
    }

    #[test]
    fn network_repository_uses_first_table_only() {
        let html = r#"<table>
            <tr><td><a href="http://nrvis.com/download/data/bio/bio-yeast.zip">yeast</a></td>
                <td><a href="bio-yeast.php">info</a></td></tr>
        </table>
        <table><tr><td><a href="http://nrvis.com/second.zip">second</a></td></tr></table>"#;
        assert_eq!(
            leaf(&NetworkRepository, "http://networkrepository.com/networks.php", html),
            vec!["http://nrvis.com/download/data/bio/bio-yeast.zip"]
        );
    }

    #[test]
    fn newman_uses_first_list_only() {
        let html = r#"<ul>
            <li><a href="karate.zip">karate</a></li>
            <li><a href="karate.txt">notes</a></li>
        </ul>
        <ul><li><a href="other.zip">other</a></li></ul>"#;
        assert_eq!(
            leaf(&Newman, "http://www-personal.umich.edu/~mejn/netdata/", html),
            vec!["http://www-personal.umich.edu/~mejn/netdata/karate.zip"]
        );
    }

    #[test]
    fn snap_index_and_dataset_pages() {
        let entry = entry("https://snap.stanford.edu/data/index.html");
        let index = Html::parse_document(
            r##"<table id="datatab2">
                <tr><td><a href="ego-Facebook.html">fb</a></td></tr>
                <tr><td><a href="https://elsewhere.org/x.html">ext</a></td></tr>
                <tr><td><a href="#social">anchor</a></td></tr>
            </table>"##,
        );
        assert_eq!(
            Snap.find_intermediate_pages(&entry, &index),
            Some(vec!["https://snap.stanford.edu/data/ego-Facebook.html".to_string()])
        );

        let dataset = Html::parse_document(
            r#"<table id="datatab">
                <tr><td><a href="facebook.tar.gz">tar</a></td></tr>
                <tr><td><a href="../data/facebook_combined.txt.gz">combined</a></td></tr>
            </table>"#,
        );
        assert_eq!(
            Snap.extract_download_links(&entry, &dataset),
            vec![
                "https://snap.stanford.edu/data/facebook.tar.gz",
                "https://snap.stanford.edu/data/facebook_combined.txt.gz",
            ]
        );
    }

    #[test]
    fn sparse_matrix_rewrites_parent_segments() {
        let html = r#"<table><tr>
            <td><a href="../MM/HB/1138_bus.tar.gz">MM</a></td>
            <td><a href="../mat/HB/1138_bus.mat">mat</a></td>
        </tr></table>
        <p><a href="../MM/Boeing/bcsstk.tar.gz">outside a table</a></p>"#;
        assert_eq!(
            leaf(
                &SparseMatrix,
                "https://www.cise.ufl.edu/research/sparse/matrices/list_by_id.html",
                html,
            ),
            vec![
                "https://www.cise.ufl.edu/research/sparse/MM/HB/1138_bus.tar.gz",
                "https://www.cise.ufl.edu/research/sparse/MM/Boeing/bcsstk.tar.gz",
            ]
        );
    }

    #[test]
    fn empty_leaf_page_is_not_an_error() {
        let html = "<html><body><p>maintenance</p></body></html>";
        assert!(leaf(&CommonCrawl, "http://example.org/", html).is_empty());
        assert!(leaf(&Konect, "http://example.org/downloads/", html).is_empty());
        assert!(leaf(&NetworkRepository, "http://example.org/", html).is_empty());
        assert!(leaf(&Newman, "http://example.org/", html).is_empty());
    }
}
