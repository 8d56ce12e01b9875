//! Defines the [`Post`] type and its conversions into template values. The
//! author/reviewer byline formatting lives here because it is a fixed display
//! contract (each name is suffixed with `;`), not a presentation choice left
//! to the theme.

use chrono::NaiveDate;
use gtmpl::Value;
use std::path::PathBuf;
use url::Url;

/// A single blog post, parsed from a Markdown source file with YAML
/// front-matter. Optional front-matter keys are explicit optionals on this
/// record rather than dynamic lookups, so a missing key can never surface as
/// a runtime "missing key" error in a template.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post title. Required and non-empty; an empty title fails the
    /// build during parsing.
    pub title: String,

    /// The publication date, taken from the source file name
    /// (`YYYY-MM-DD-slug.md`). Used for ordering and display only.
    pub date: NaiveDate,

    /// The slug portion of the source file name (everything after the date
    /// prefix, slugified).
    pub slug: String,

    /// The permalink: the output path relative to the site root. Taken from
    /// the front-matter `permalink` key when present, otherwise derived from
    /// the slug as `posts/{slug}.html`.
    pub route: String,

    /// The absolute URL of the rendered page (site root joined with
    /// [`Post::route`]).
    pub url: Url,

    /// The output file location, mirroring [`Post::route`] under the output
    /// directory.
    pub file_path: PathBuf,

    /// The listing snippet. May contain inline markup; it is passed through
    /// to the index page verbatim.
    pub description: String,

    /// The post's authors, in front-matter order. A missing `authors` key
    /// yields an empty vector.
    pub authors: Vec<String>,

    /// The post's reviewers. `None` when the front-matter key is absent;
    /// absence (or an empty list) suppresses the reviewers line entirely.
    pub reviewers: Option<Vec<String>>,

    /// The name of the theme layout that wraps this post's page.
    pub layout: String,

    /// The post body, already converted from Markdown to HTML.
    pub body: String,
}

impl Post {
    /// The authors line for listings: `By:` followed by each author name
    /// suffixed with `;` (e.g. `By: Alice; Bob;`). Returns `None` when the
    /// post has no authors, in which case the line is omitted.
    pub fn byline(&self) -> Option<String> {
        match self.authors.is_empty() {
            true => None,
            false => Some(join_names("By:", &self.authors)),
        }
    }

    /// The reviewers line for listings, in the same format as
    /// [`Post::byline`] but prefixed with `Reviewers:`. Returns `None` when
    /// the `reviewers` key was absent or the list is empty.
    pub fn reviewers_line(&self) -> Option<String> {
        match &self.reviewers {
            Some(names) if !names.is_empty() => {
                Some(join_names("Reviewers:", names))
            }
            _ => None,
        }
    }

    /// Converts the post into the [`Value`] rendered on its own page. The
    /// result is a [`Value::Object`] with fields `title`, `date`, `url`,
    /// `description`, `byline`, `reviewers_line`, and `body`.
    pub fn to_value(&self) -> Value {
        let mut m = self.common_fields();
        m.insert("body".to_owned(), Value::String(self.body.clone()));
        Value::Object(m)
    }

    /// Converts the post into the [`Value`] for one index listing entry.
    /// Identical to [`Post::to_value`] minus the body.
    pub fn summarize(&self) -> Value {
        Value::Object(self.common_fields())
    }

    fn common_fields(&self) -> std::collections::HashMap<String, Value> {
        let mut m = std::collections::HashMap::new();
        m.insert("title".to_owned(), Value::String(self.title.clone()));
        m.insert(
            "date".to_owned(),
            Value::String(self.date.format("%Y-%m-%d").to_string()),
        );
        m.insert("url".to_owned(), Value::String(self.url.to_string()));
        m.insert(
            "description".to_owned(),
            Value::String(self.description.clone()),
        );
        m.insert("byline".to_owned(), option_to_value(self.byline()));
        m.insert(
            "reviewers_line".to_owned(),
            option_to_value(self.reviewers_line()),
        );
        m
    }
}

/// Converts an optional string into a [`Value`]: `None` becomes
/// [`Value::Nil`], which is falsy in `{{if}}` blocks, so absent lines
/// disappear from the output rather than rendering empty.
fn option_to_value(opt: Option<String>) -> Value {
    match opt {
        Some(s) => Value::String(s),
        None => Value::Nil,
    }
}

// The trailing `;` after every name (rather than a separator between names)
// is a literal formatting contract carried over from the site this replaced.
fn join_names(prefix: &str, names: &[String]) -> String {
    let mut line = String::from(prefix);
    for name in names {
        line.push(' ');
        line.push_str(name);
        line.push(';');
    }
    line
}
