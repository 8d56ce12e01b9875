//! Loads the theme: a directory of named layout templates. A layout is an
//! `{name}.html` file in Go-template syntax; front-matter `layout` keys and
//! the configured index layout resolve against the loaded table by name.

use gtmpl::Template;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The set of layout templates for a site, keyed by layout name (the file
/// stem of the template file).
pub struct Theme {
    layouts: HashMap<String, Template>,
}

impl Theme {
    /// Loads every `*.html` file in `dir` as a layout template named after
    /// its file stem.
    pub fn load(dir: &Path) -> Result<Theme> {
        const TEMPLATE_EXTENSION: &str = ".html";

        let mut layouts = HashMap::new();
        for result in std::fs::read_dir(dir).map_err(|err| {
            Error::OpenTemplateFile {
                path: dir.to_owned(),
                err,
            }
        })? {
            let entry = result?;
            let os_file_name = entry.file_name();
            let file_name = os_file_name.to_string_lossy();
            if !file_name.ends_with(TEMPLATE_EXTENSION) {
                continue;
            }
            let name = file_name.trim_end_matches(TEMPLATE_EXTENSION);

            use std::io::Read;
            let mut contents = String::new();
            std::fs::File::open(entry.path())
                .map_err(|err| Error::OpenTemplateFile {
                    path: entry.path(),
                    err,
                })?
                .read_to_string(&mut contents)?;
            layouts.insert(name.to_owned(), parse_layout(name, &contents)?);
        }
        Ok(Theme { layouts })
    }

    /// Builds a theme from in-memory `(name, source)` pairs. Used by tests
    /// and useful for embedding a fallback theme.
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Theme> {
        let mut layouts = HashMap::new();
        for (name, source) in sources {
            layouts.insert(name.to_owned(), parse_layout(name, source)?);
        }
        Ok(Theme { layouts })
    }

    /// Resolves a layout by name. An unresolvable layout is an authoring
    /// error and fails the build.
    pub fn layout(&self, name: &str) -> Result<&Template> {
        self.layouts
            .get(name)
            .ok_or_else(|| Error::UnknownLayout(name.to_owned()))
    }
}

fn parse_layout(name: &str, source: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(source).map_err(|err| Error::ParseTemplate {
        name: name.to_owned(),
        err,
    })?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or resolving theme layouts.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post or the configuration names a layout the theme
    /// doesn't define.
    UnknownLayout(String),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate { name: String, err: String },

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownLayout(name) => {
                write!(f, "Unknown layout `{}`", name)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { name, err } => {
                write!(f, "Parsing layout `{}`: {}", name, err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::UnknownLayout(_) => None,
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate { .. } => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_sources_and_lookup() -> Result<()> {
        let theme =
            Theme::from_sources(vec![("post", "<main>{{.item.body}}</main>")])?;
        assert!(theme.layout("post").is_ok());
        assert!(matches!(
            theme.layout("missing"),
            Err(Error::UnknownLayout(name)) if name == "missing"
        ));
        Ok(())
    }

    #[test]
    fn test_parse_error_names_layout() {
        match Theme::from_sources(vec![("broken", "{{range")]) {
            Err(Error::ParseTemplate { name, .. }) => {
                assert_eq!(name, "broken")
            }
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected a parse error"),
        }
    }

    #[test]
    fn test_load_from_directory() -> Result<()> {
        let theme = Theme::load(Path::new("./testdata/theme/"))?;
        assert!(theme.layout("post").is_ok());
        assert!(theme.layout("index").is_ok());
        Ok(())
    }
}
