//! Defines the [`Parser`] and [`Error`] types and the logic for parsing
//! [`Post`]s from the file system into memory. Front-matter is deserialized
//! into a typed record: required keys (`title`, `layout`) fail the build
//! loudly when missing, optional keys (`permalink`, `description`,
//! `authors`, `reviewers`) have explicit defaults.

use std::{
    fmt,
    fs::{read_dir, File},
    path::Path,
};

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::{markdown, post::Post};

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `site_root` is the base URL of the site. Post URLs are
    /// `{site_root}/{route}`.
    site_root: &'a Url,

    /// `output_directory` is the root output directory. Post pages land at
    /// `{output_directory}/{route}`.
    output_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(site_root: &'a Url, output_directory: &'a Path) -> Parser<'a> {
        Parser {
            site_root,
            output_directory,
        }
    }

    /// Searches `source_directory` for post files (extension = `.md`) and
    /// returns a list of [`Post`] objects sorted by date (most recent
    /// first). Each post file must be structured as follows:
    ///
    /// 1. A file name matching `YYYY-MM-DD-{slug}.md`
    /// 2. Initial front-matter fence (`---`)
    /// 3. YAML front-matter with keys `layout`, `title`, and optionally
    ///    `permalink`, `description`, `authors`, and `reviewers`
    /// 4. Terminal front-matter fence (`---`)
    /// 5. Markdown body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// layout: post
    /// title: Hello, world!
    /// authors: [Alice]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        const MARKDOWN_EXTENSION: &str = ".md";

        let mut posts = Vec::new();
        for result in read_dir(source_directory)? {
            let entry = result?;
            let os_file_name = entry.file_name();
            let file_name = os_file_name.to_string_lossy();
            if file_name.ends_with(MARKDOWN_EXTENSION) {
                posts.push(self.parse_file(&file_name, &entry.path())?);
                debug!(file = %file_name, "parsed post");
            }
        }

        // Newest first; ties break by descending slug so the ordering is
        // deterministic across file systems.
        posts.sort_by(|a, b| (b.date, &b.slug).cmp(&(a.date, &a.slug)));
        Ok(posts)
    }

    fn parse_file(&self, file_name: &str, full_path: &Path) -> Result<Post> {
        use std::io::Read;
        let mut contents = String::new();
        File::open(full_path)?.read_to_string(&mut contents)?;
        self.parse_source(file_name, &contents)
    }

    /// Parses a single [`Post`] from its source file name and contents. The
    /// date and slug come from the file name; everything else comes from the
    /// front-matter and body.
    pub fn parse_source(&self, file_name: &str, input: &str) -> Result<Post> {
        match self._parse_source(file_name, input) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", file_name),
                Box::new(e),
            )),
        }
    }

    fn _parse_source(&self, file_name: &str, input: &str) -> Result<Post> {
        const MARKDOWN_EXTENSION: &str = ".md";
        let base_name = file_name.trim_end_matches(MARKDOWN_EXTENSION);
        let (date, slug) = date_and_slug(base_name)?;

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter =
            serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        if frontmatter.title.is_empty() {
            return Err(Error::EmptyTitle);
        }

        let route = match &frontmatter.permalink {
            Some(permalink) => normalize_route(permalink)?,
            None => format!("posts/{}.html", slug),
        };

        let mut post = Post {
            title: frontmatter.title,
            date,
            url: self.site_root.join(&route)?,
            file_path: self.output_directory.join(&route),
            route,
            slug,
            description: frontmatter.description,
            authors: frontmatter.authors,
            reviewers: frontmatter.reviewers,
            layout: frontmatter.layout,
            body: String::new(),
        };

        markdown::to_html(&mut post.body, &input[body_start..]);
        Ok(post)
    }
}

/// The typed front-matter record. Unknown keys are rejected so a typo'd
/// optional key fails the build instead of silently disappearing.
#[derive(Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct Frontmatter {
    /// The name of the theme layout that wraps the post page.
    pub layout: String,

    /// The title of the post.
    pub title: String,

    /// The output path relative to the site root. Defaults to
    /// `posts/{slug}.html` when absent.
    #[serde(default)]
    pub permalink: Option<String>,

    /// The listing snippet. May contain inline markup.
    #[serde(default)]
    pub description: String,

    /// The post's authors, in order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// The post's reviewers. `None` when the key is absent.
    #[serde(default)]
    pub reviewers: Option<Vec<String>>,
}

fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    match input[FENCE.len()..].find("---") {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => Ok((
            FENCE.len(),                        // yaml_start
            FENCE.len() + offset,               // yaml_stop
            FENCE.len() + offset + FENCE.len(), // body_start
        )),
    }
}

/// Splits a `YYYY-MM-DD-{slug}` base name into its date and slugified slug.
fn date_and_slug(base_name: &str) -> Result<(NaiveDate, String)> {
    const DATE_LEN: usize = "0000-00-00".len();
    let undated =
        || Error::UndatedFileName(base_name.to_owned());
    if base_name.len() <= DATE_LEN || !base_name.is_char_boundary(DATE_LEN) {
        return Err(undated());
    }
    let (prefix, rest) = base_name.split_at(DATE_LEN);
    let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .map_err(|_| undated())?;
    let rest = rest.strip_prefix('-').ok_or_else(|| undated())?;
    if rest.is_empty() {
        return Err(undated());
    }
    Ok((date, slug::slugify(rest)))
}

// Routes are site-root-relative: a leading `/` is dropped, and a trailing
// `/` means "directory route", which resolves to an index.html inside it.
// A permalink that normalizes to nothing (`/`, the empty string) would
// alias the output root itself, so it is rejected here where the error can
// still name the offending post.
fn normalize_route(permalink: &str) -> Result<String> {
    let trimmed = permalink.trim_start_matches('/');
    let route = match trimmed.ends_with('/') {
        true => format!("{}index.html", trimmed),
        false => trimmed.to_owned(),
    };
    match route.is_empty() {
        true => Err(Error::EmptyPermalink(permalink.to_owned())),
        false => Ok(route),
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting front-matter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal front-matter
    /// fence (`---` i.e., the starting fence was found but the ending one
    /// was missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the front-matter as YAML.
    /// This includes missing required keys (`title`, `layout`) and unknown
    /// keys.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the front-matter `title` is present but empty.
    EmptyTitle,

    /// Returned when a source file name is missing its `YYYY-MM-DD-` date
    /// prefix or has nothing after it.
    UndatedFileName(String),

    /// Returned when a front-matter `permalink` normalizes to an empty
    /// route (e.g. `/`), which would alias the output root.
    EmptyPermalink(String),

    /// Returned when there is a problem joining the post route onto the
    /// site root URL.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::EmptyTitle => write!(f, "Post `title` must be non-empty"),
            Error::UndatedFileName(name) => write!(
                f,
                "File name `{}` must match `YYYY-MM-DD-slug.md`",
                name
            ),
            Error::EmptyPermalink(permalink) => write!(
                f,
                "Permalink `{}` does not name an output file",
                permalink
            ),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::EmptyTitle => None,
            Error::UndatedFileName(_) => None,
            Error::EmptyPermalink(_) => None,
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
