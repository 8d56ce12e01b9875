//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output site: parsing the posts
//! ([`crate::parser`]), loading the theme ([`crate::theme`]), rendering the
//! index and post pages ([`crate::write`]), copying the static source
//! directory into the output, and generating the Atom feed.

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::theme::{Error as ThemeError, Theme};
use crate::write::{Error as WriteError, Writer};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Builds the site from a [`Config`] object. Each invocation is a one-shot
/// deterministic transformation: the previous output is removed and replaced
/// wholesale, so a build never observes stale pages.
pub fn build_site(config: Config) -> Result<()> {
    let post_parser =
        PostParser::new(&config.site_root, &config.root_output_directory);

    info!(
        directory = %config.posts_source_directory.display(),
        "parsing posts"
    );
    let posts = post_parser.parse_posts(&config.posts_source_directory)?;
    info!(count = posts.len(), "parsed posts");

    let theme = Theme::load(&config.theme_directory)?;

    // Blow away the old output directory so removed posts don't linger as
    // stale pages.
    rmdir(&config.root_output_directory)?;

    let index_path = config.root_output_directory.join(&config.index_page);
    let writer = Writer {
        theme: &theme,
        index_layout: &config.index_layout,
        index_path: &index_path,
        home_page: &config.site_root,
    };
    writer.write_pages(&posts)?;
    info!(count = posts.len() + 1, "wrote pages");

    // copy static directory, if the project has one
    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.root_output_directory.join("static"),
        )?;
    }

    // create the atom feed
    write_feed(
        FeedConfig {
            title: config.title,
            id: config.site_root.to_string(),
            author: config.author,
            home_page: config.site_root.clone(),
        },
        &posts,
        File::create(config.root_output_directory.join("feed.atom"))?,
    )?;
    info!(
        directory = %config.root_output_directory.display(),
        "build finished"
    );

    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in walkdir::WalkDir::new(src) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// loading the theme, writing pages, cleaning the output directory, writing
/// the feed, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors loading or resolving theme layouts.
    Theme(ThemeError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for I/O problems while copying static files.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Theme(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Feed(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Theme(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<ThemeError> for Error {
    /// Converts [`ThemeError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ThemeError) -> Error {
        Error::Theme(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
