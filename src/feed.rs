//! Support for creating an Atom feed from a list of posts.

use crate::config::Author;
use crate::post::Post;
use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person};
use chrono::{FixedOffset, NaiveTime, TimeZone, Utc};
use std::fmt;
use std::io::Write;
use url::Url;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`]. This function
/// takes ownership of the provided [`FeedConfig`].
pub fn write_feed<W: Write>(
    config: FeedConfig,
    posts: &[Post],
    w: W,
) -> Result<()> {
    feed(config, posts).write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[Post]) -> Feed {
    use std::collections::HashMap;
    Feed {
        entries: feed_entries(posts),
        title: config.title,
        id: config.id,
        updated: FixedOffset::east(0)
            .from_utc_datetime(&Utc::now().naive_utc()),
        authors: site_authors(config.author),
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        extensions: HashMap::new(),
        namespaces: HashMap::new(),
        links: vec![Link {
            href: config.home_page.to_string(),
            rel: "alternate".to_string(),
            title: None,
            hreflang: None,
            mime_type: None,
            length: None,
        }],
    }
}

fn feed_entries(posts: &[Post]) -> Vec<Entry> {
    use std::collections::HashMap;
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        // Post dates carry no time-of-day, so entries are pinned to
        // midnight UTC.
        let date = FixedOffset::east(0).from_utc_datetime(
            &post.date.and_time(NaiveTime::from_hms(0, 0, 0)),
        );

        entries.push(Entry {
            id: post.url.to_string(),
            title: post.title.clone(),
            updated: date,
            authors: post_authors(post),
            links: vec![Link {
                href: post.url.to_string(),
                rel: "alternate".to_owned(),
                title: None,
                mime_type: None,
                hreflang: None,
                length: None,
            }],
            rights: None,
            summary: Some(post.description.clone()),
            categories: Vec::new(),
            contributors: Vec::new(),
            published: Some(date),
            source: None,
            content: None,
            extensions: HashMap::new(),
        })
    }
    entries
}

fn post_authors(post: &Post) -> Vec<Person> {
    post.authors
        .iter()
        .map(|name| Person {
            name: name.clone(),
            email: None,
            uri: None,
        })
        .collect()
}

fn site_authors(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            uri: None,
        }],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn post(title: &str, day: u32) -> Post {
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
            description: String::from("A post."),
            authors: vec![String::from("Alice")],
            reviewers: None,
            layout: String::from("post"),
            body: String::from("<p>body</p>"),
        }
    }

    #[test]
    fn test_feed_entry_per_post() {
        let config = FeedConfig {
            title: String::from("Example"),
            id: String::from("https://example.org/"),
            author: None,
            home_page: Url::parse("https://example.org/").unwrap(),
        };
        let posts = vec![post("First", 20), post("Second", 21)];
        let feed = feed(config, &posts);
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "First");
        assert_eq!(feed.entries[0].authors[0].name, "Alice");
        assert_eq!(
            feed.entries[0].id,
            "https://example.org/posts/first.html"
        );
    }
}
