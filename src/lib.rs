//! Core library for the locale-sheet-sync command line application.
//!
//! Locale files hold one nested JSON tree per language; translators work on
//! a single sheet with one row per dotted key and one column per language.
//! [`flatten`] converts between the two shapes, [`aggregate`] merges the
//! languages into rows, [`reconcile`] diffs those rows against the sheet, and
//! [`sync`] runs the export and import pipelines over the adapters in [`io`].

pub mod aggregate;
pub mod auth;
pub mod config;
pub mod error;
pub mod flatten;
pub mod io;
pub mod model;
pub mod reconcile;
pub mod sync;

pub use error::{Result, ToolError};
