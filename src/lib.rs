//! The library code for the `portalgen` game portal generator. A build can be
//! broken down into two distinct steps:
//!
//! 1. Parsing game records from the XML feeds on disk ([`crate::parser`])
//! 2. Converting the records into output files on disk ([`crate::write`])
//!
//! Parsing comes in two flavors. The lenient parser ([`crate::lenient`])
//! pattern-matches `<item>` blocks and never fails; the strict parser
//! ([`crate::strict`]) requires well-formed XML and understands both RSS feeds
//! and the simpler `<game>` dialect.
//!
//! Writing renders one page per game and locale through a Handlebars template
//! ([`crate::template`]) and one JSON index per locale ([`crate::index`]).
//! Each locale also gets a listing page per category ([`crate::category`]),
//! and the whole site an optional sitemap ([`crate::sitemap`]).
//!
//! Independently of the build, [`crate::navbar`] patches the navigation bar,
//! tracking ID and header script of pages that are already on disk.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod category;
pub mod config;
pub mod game;
pub mod index;
pub mod lenient;
pub mod navbar;
pub mod parser;
pub mod sitemap;
pub mod slug;
pub mod strict;
pub mod template;
pub mod write;
