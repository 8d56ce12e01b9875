//! Project configuration. A site is rooted at the directory containing
//! `quern.yaml`; the project file names the site while the directory layout
//! is conventional: `posts/` for sources, `theme/` for layouts, `static/`
//! for files copied verbatim into the output.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// The site author, used for the Atom feed's feed-level author.
#[derive(Debug, Deserialize, Clone)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// The `quern.yaml` project file. Unknown keys are rejected, like the
/// front-matter record: a typo'd key fails the build instead of silently
/// doing nothing.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    /// The base URL the site is deployed under.
    pub site_root: Url,

    /// The site title, used for the feed.
    pub title: String,

    #[serde(default)]
    pub author: Option<Author>,

    /// The layout the index page renders through.
    #[serde(default = "default_index_layout")]
    pub index_layout: String,

    /// The output file name of the index page.
    #[serde(default = "default_index_page")]
    pub index_page: String,
}

fn default_index_layout() -> String {
    String::from("index")
}

fn default_index_page() -> String {
    String::from("index.html")
}

/// Fully-resolved build configuration.
pub struct Config {
    pub title: String,
    pub author: Option<Author>,
    pub site_root: Url,
    pub index_layout: String,
    pub index_page: String,
    pub posts_source_directory: PathBuf,
    pub theme_directory: PathBuf,
    pub static_source_directory: PathBuf,
    pub root_output_directory: PathBuf,
}

impl Config {
    /// Finds `quern.yaml` in `dir` or the nearest ancestor directory and
    /// loads the configuration from it.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join("quern.yaml");
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `quern.yaml` in any parent directory"
                )),
            }
        }
    }

    /// Loads the configuration from a project file path. The project root is
    /// the file's parent directory.
    pub fn from_project_file(
        path: &Path,
        output_directory: &Path,
    ) -> Result<Config> {
        let file = std::fs::File::open(path).map_err(|e| {
            anyhow!("Opening project file `{}`: {}", path.display(), e)
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|e| {
            anyhow!("Parsing project file `{}`: {}", path.display(), e)
        })?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;

        Ok(Config {
            title: project.title,
            author: project.author,
            site_root: ensure_trailing_slash(project.site_root),
            index_layout: project.index_layout,
            index_page: project.index_page,
            posts_source_directory: project_root.join("posts"),
            theme_directory: project_root.join("theme"),
            static_source_directory: project_root.join("static"),
            root_output_directory: output_directory.to_owned(),
        })
    }
}

// `Url::join` treats a path without a trailing slash as a file name and
// drops it, so the site root must always end in `/` for routes to append.
fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_project_file() -> Result<()> {
        let config = Config::from_project_file(
            Path::new("./testdata/quern.yaml"),
            Path::new("/tmp/out"),
        )?;
        assert_eq!(config.title, "Example Blog");
        assert_eq!(config.site_root.as_str(), "https://example.org/blog/");
        assert_eq!(
            config.posts_source_directory,
            PathBuf::from("./testdata/posts")
        );
        assert_eq!(config.theme_directory, PathBuf::from("./testdata/theme"));
        assert_eq!(config.index_layout, "index");
        assert_eq!(config.index_page, "index.html");
        assert_eq!(config.author.unwrap().name, "Alice");
        Ok(())
    }

    #[test]
    fn test_index_page_key() -> Result<()> {
        let config = Config::from_project_file(
            Path::new("./testdata/custom/quern.yaml"),
            Path::new("/tmp/out"),
        )?;
        assert_eq!(config.index_page, "listing.html");
        assert_eq!(config.index_layout, "listing");
        Ok(())
    }

    #[test]
    fn test_unknown_project_key_fails() {
        let err = serde_yaml::from_str::<Project>(
            "site_root: https://example.org/\ntitle: X\nindex_pag: oops.html",
        )
        .unwrap_err();
        assert!(err.to_string().contains("index_pag"));
    }

    #[test]
    fn test_from_directory_walks_up() -> Result<()> {
        let config = Config::from_directory(
            Path::new("./testdata/posts"),
            Path::new("/tmp/out"),
        )?;
        assert_eq!(config.title, "Example Blog");
        Ok(())
    }

    #[test]
    fn test_ensure_trailing_slash() {
        let url = Url::parse("https://example.org/blog").unwrap();
        assert_eq!(
            ensure_trailing_slash(url).as_str(),
            "https://example.org/blog/"
        );
    }
}
