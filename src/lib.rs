//! The library code for the `quern` static blog generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::parser`])
//! 2. Converting the posts into output files on disk ([`crate::write`])
//!
//! A post source file is a Markdown document with a `---`-fenced YAML
//! front-matter block. The front-matter is deserialized into a strongly-typed
//! record (see [`crate::post::Post`]): `title` and `layout` are required,
//! while `permalink`, `description`, `authors`, and `reviewers` are explicit
//! optionals with well-defined defaults. The publication date comes from the
//! file name (`YYYY-MM-DD-slug.md`), and posts are ordered newest-first.
//!
//! The second step renders two kinds of pages through the theme's layout
//! templates ([`crate::theme`]): a single index page listing every post, and
//! one page per post embedding the converted body. Rendering is a pure
//! function of the post collection; each build is a one-shot deterministic
//! transformation from input files to output files.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod theme;
pub mod write;
