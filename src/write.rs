//! Responsible for templating and writing HTML pages to disk from [`Post`]
//! sources: one index page listing every post plus one page per post. The
//! index renders every post it is given, unconditionally and in input order;
//! there is no filtering or pagination.

use crate::post::Post;
use crate::theme::{self, Theme};
use gtmpl::{Template, Value};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Renders [`Post`]s through theme layouts and writes the results to disk.
pub struct Writer<'a> {
    /// The theme whose layouts pages are rendered through. Post pages use
    /// the layout named in their front-matter; the index page uses
    /// `index_layout`.
    pub theme: &'a Theme,

    /// The name of the layout for the index page.
    pub index_layout: &'a str,

    /// The output location of the index page.
    pub index_path: &'a Path,

    /// The URL of the site's home page. Made available to every layout,
    /// typically as the destination for the site-header link.
    pub home_page: &'a Url,
}

impl Writer<'_> {
    /// Renders the index listing for `posts` into `w`: exactly one entry per
    /// post, in the given order.
    pub fn render_index<W: io::Write>(
        &self,
        posts: &[Post],
        w: &mut W,
    ) -> Result<()> {
        self.index_page(posts)?.render(w, self.home_page)
    }

    /// Renders the page for `posts[i]` into `w`, embedding the post body in
    /// the layout named by its front-matter. The surrounding slice provides
    /// the prev/next navigation URLs. Rendering is idempotent: the same
    /// input produces byte-identical output.
    pub fn render_post<W: io::Write>(
        &self,
        posts: &[Post],
        i: usize,
        w: &mut W,
    ) -> Result<()> {
        self.post_page(posts, i)?.render(w, self.home_page)
    }

    /// Templates the index page and every post page and writes them to
    /// disk, creating parent directories as needed.
    pub fn write_pages(&self, posts: &[Post]) -> Result<()> {
        use std::collections::HashSet;
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut write_page = |page: Page| -> Result<()> {
            let dir = page.file_path.parent().unwrap(); // pages always have a dir
            if seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir)?;
            }
            let mut file = std::fs::File::create(&page.file_path)?;
            page.render(&mut file, self.home_page)?;
            debug!(path = %page.file_path.display(), "wrote page");
            Ok(())
        };

        write_page(self.index_page(posts)?)?;
        for i in 0..posts.len() {
            write_page(self.post_page(posts, i)?)?;
        }
        Ok(())
    }

    fn index_page(&self, posts: &[Post]) -> Result<Page> {
        Ok(Page {
            item: Value::Array(posts.iter().map(Post::summarize).collect()),
            file_path: self.index_path.to_owned(),
            prev: None,
            next: None,
            template: self.theme.layout(self.index_layout)?,
        })
    }

    fn post_page(&self, posts: &[Post], i: usize) -> Result<Page> {
        let post = &posts[i];
        Ok(Page {
            item: post.to_value(),
            file_path: post.file_path.clone(),
            prev: match i < 1 {
                true => None,
                false => Some(posts[i - 1].url.clone()),
            },
            next: match i >= posts.len() - 1 {
                true => None,
                false => Some(posts[i + 1].url.clone()),
            },
            template: self.theme.layout(&post.layout)?,
        })
    }
}

/// An object representing an output HTML file. A [`Page`] can be converted
/// to a [`Value`] and thus rendered in a layout via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page: a post object for post pages, an array of
    /// listing entries for the index page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous (newer) post, if any.
    prev: Option<Url>,

    /// The URL for the next (older) post, if any.
    next: Option<Url>,

    /// The layout with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a
    /// [`Value::Object`] with fields `item`, `prev`, `next`, and
    /// `home_page`.
    fn to_value(&self, home_page: &Url) -> Value {
        use std::collections::HashMap;

        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        m.insert(
            "home_page".to_owned(),
            Value::String(home_page.to_string()),
        );
        Value::Object(m)
    }

    fn render<W: io::Write>(&self, w: &mut W, home_page: &Url) -> Result<()> {
        let context = gtmpl::Context::from(self.to_value(home_page))?;
        self.template.execute(w, &context)?;
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error resolving a layout.
    Theme(theme::Error),

    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<theme::Error> for Error {
    /// Converts a [`theme::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for layout lookups.
    fn from(err: theme::Error) -> Error {
        Error::Theme(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Theme(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Theme(err) => Some(err),
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    const INDEX_LAYOUT: &str = r#"{{range .item}}<article><a href="{{.url}}">{{.title}}</a>{{if .byline}}<p>{{.byline}}</p>{{end}}<p class="description">{{.description}}</p>{{if .reviewers_line}}<p>{{.reviewers_line}}</p>{{end}}</article>{{end}}"#;

    const POST_LAYOUT: &str = r#"<html><head><title>{{.item.title}}</title></head><body><a href="{{.home_page}}">Home</a><h1>{{.item.title}}</h1>{{if .item.byline}}<p>{{.item.byline}}</p>{{end}}{{.item.body}}{{if .prev}}<a href="{{.prev}}">newer</a>{{end}}{{if .next}}<a href="{{.next}}">older</a>{{end}}</body></html>"#;

    fn theme() -> Theme {
        Theme::from_sources(vec![
            ("index", INDEX_LAYOUT),
            ("post", POST_LAYOUT),
        ])
        .unwrap()
    }

    fn post(
        title: &str,
        day: u32,
        authors: Vec<&str>,
        reviewers: Option<Vec<&str>>,
    ) -> Post {
        let slug = slug::slugify(title);
        Post {
            title: title.to_owned(),
            date: NaiveDate::from_ymd(2022, 2, day),
            route: format!("posts/{}.html", slug),
            url: Url::parse(&format!(
                "https://example.org/posts/{}.html",
                slug
            ))
            .unwrap(),
            file_path: PathBuf::from(format!("/tmp/out/posts/{}.html", slug)),
            slug,
            description: format!("About {}.", title),
            authors: authors.into_iter().map(String::from).collect(),
            reviewers: reviewers
                .map(|r| r.into_iter().map(String::from).collect()),
            layout: String::from("post"),
            body: format!("<p>{} body</p>\n", title),
        }
    }

    fn render_index(posts: &[Post]) -> String {
        let theme = theme();
        let home_page = Url::parse("https://example.org/").unwrap();
        let writer = Writer {
            theme: &theme,
            index_layout: "index",
            index_path: Path::new("/tmp/out/index.html"),
            home_page: &home_page,
        };
        let mut out = Vec::new();
        writer.render_index(posts, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_index_one_entry_per_post_in_order() {
        let posts = vec![
            post("Third", 22, vec!["Alice"], None),
            post("Second", 21, vec!["Alice"], None),
            post("First", 20, vec!["Alice"], None),
        ];
        let out = render_index(&posts);
        assert_eq!(out.matches("<article>").count(), posts.len());
        let third = out.find(">Third</a>").unwrap();
        let second = out.find(">Second</a>").unwrap();
        let first = out.find(">First</a>").unwrap();
        assert!(third < second && second < first);
    }

    #[test]
    fn test_index_entry_contents() {
        let posts = vec![post(
            "X",
            20,
            vec!["Adrien Zinger"],
            Some(vec!["Yvan Sraka"]),
        )];
        let out = render_index(&posts);
        assert!(out.contains(">X</a>"));
        assert!(out.contains("By: Adrien Zinger;"));
        assert!(out.contains("Reviewers: Yvan Sraka;"));
    }

    #[test]
    fn test_index_no_reviewers_line_when_absent() {
        let out = render_index(&[post("X", 20, vec!["Alice"], None)]);
        assert!(!out.contains("Reviewers"));
    }

    #[test]
    fn test_index_no_reviewers_line_when_empty() {
        let out = render_index(&[post("X", 20, vec!["Alice"], Some(vec![]))]);
        assert!(!out.contains("Reviewers"));
    }

    #[test]
    fn test_index_multiple_authors_each_suffixed() {
        let out = render_index(&[post("X", 20, vec!["Alice", "Bob"], None)]);
        assert!(out.contains("By: Alice; Bob;"));
    }

    #[test]
    fn test_index_raw_description_markup() {
        let mut p = post("X", 20, vec!["Alice"], None);
        p.description = String::from("Uses <code>recv</code> timeouts.");
        let out = render_index(&[p]);
        assert!(out.contains("Uses <code>recv</code> timeouts."));
    }

    #[test]
    fn test_render_post_embeds_body_in_layout() {
        let theme = theme();
        let home_page = Url::parse("https://example.org/").unwrap();
        let writer = Writer {
            theme: &theme,
            index_layout: "index",
            index_path: Path::new("/tmp/out/index.html"),
            home_page: &home_page,
        };
        let posts = vec![post("X", 20, vec!["Alice"], None)];
        let mut out = Vec::new();
        writer.render_post(&posts, 0, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("<h1>X</h1>"));
        assert!(out.contains("<p>X body</p>"));
        assert!(out.contains(r#"<a href="https://example.org/">Home</a>"#));
    }

    #[test]
    fn test_render_post_idempotent() {
        let theme = theme();
        let home_page = Url::parse("https://example.org/").unwrap();
        let writer = Writer {
            theme: &theme,
            index_layout: "index",
            index_path: Path::new("/tmp/out/index.html"),
            home_page: &home_page,
        };
        let posts = vec![post("X", 20, vec!["Alice"], None)];
        let mut first = Vec::new();
        let mut second = Vec::new();
        writer.render_post(&posts, 0, &mut first).unwrap();
        writer.render_post(&posts, 0, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_post_navigation_urls() {
        let theme = theme();
        let home_page = Url::parse("https://example.org/").unwrap();
        let writer = Writer {
            theme: &theme,
            index_layout: "index",
            index_path: Path::new("/tmp/out/index.html"),
            home_page: &home_page,
        };
        let posts = vec![
            post("Newest", 22, vec!["Alice"], None),
            post("Middle", 21, vec!["Alice"], None),
            post("Oldest", 20, vec!["Alice"], None),
        ];

        let mut out = Vec::new();
        writer.render_post(&posts, 1, &mut out).unwrap();
        let middle = String::from_utf8(out).unwrap();
        assert!(middle.contains("posts/newest.html"));
        assert!(middle.contains("posts/oldest.html"));

        let mut out = Vec::new();
        writer.render_post(&posts, 0, &mut out).unwrap();
        let newest = String::from_utf8(out).unwrap();
        assert!(!newest.contains(">newer</a>"));
        assert!(newest.contains(">older</a>"));
    }

    #[test]
    fn test_unknown_layout_fails() {
        let theme = theme();
        let home_page = Url::parse("https://example.org/").unwrap();
        let writer = Writer {
            theme: &theme,
            index_layout: "index",
            index_path: Path::new("/tmp/out/index.html"),
            home_page: &home_page,
        };
        let mut p = post("X", 20, vec!["Alice"], None);
        p.layout = String::from("missing");
        let posts = vec![p];
        let mut out = Vec::new();
        assert!(matches!(
            writer.render_post(&posts, 0, &mut out),
            Err(Error::Theme(theme::Error::UnknownLayout(name)))
                if name == "missing"
        ));
    }
}
