//! # twinform-core
//!
//! A structural serialization engine with two human-readable text formats
//! sharing one value model and one type-directed binder.
//!
//! - **Bracketed** ([`bracketed`]): compact, JSON-like `{"k":[1,2]}` text.
//! - **Indented** ([`indented`]): YAML-like `key: value` blocks with `- `
//!   list markers; reference cycles are broken by rendering `null`.
//!
//! Typed values cross into text through the [`Value`] tree:
//! `ToValue` then `render` on the way out, `parse` then `FromValue` on the way in.
//! Records opt in with the [`record!`] macro.
//!
//! ## Quick start
//!
//! ```rust
//! use twinform_core::{record, Format};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//!     hobbies: Vec<String>,
//! }
//!
//! record!(Person { name as "Name", age as "Age", hobbies as "Hobbies" });
//!
//! let ada = Person { name: "Ada".into(), age: 36, hobbies: vec!["chess".into()] };
//!
//! let json = Format::Bracketed.serialize(&ada).unwrap();
//! assert_eq!(json, r#"{"Name":"Ada","Age":36,"Hobbies":["chess"]}"#);
//!
//! let yaml = Format::Indented.serialize(&ada).unwrap();
//! assert_eq!(yaml, "Name: Ada\nAge: 36\nHobbies:\n  - chess");
//!
//! let back: Person = Format::Indented.deserialize(&yaml).unwrap();
//! assert_eq!(back, ada);
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the shared `Value` tree
//! - [`binder`]: `ToValue` / `FromValue`, record field tables, cycle policy
//! - [`bracketed`]: compact bracketed codec
//! - [`indented`]: indentation codec
//! - [`dates`]: per-codec date/time text forms
//! - [`error`]: error taxonomy

pub mod binder;
pub mod bracketed;
pub mod dates;
pub mod error;
mod escape;
pub mod indented;
pub mod value;

use std::fmt;
use std::str::FromStr;

pub use binder::{FromValue, ToValue};
pub use error::{Error, Result};
pub use value::Value;

/// The two text formats, for callers that pick one at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bracketed,
    Indented,
}

impl Format {
    pub fn serialize<T: ToValue + ?Sized>(self, value: &T) -> Result<String> {
        match self {
            Format::Bracketed => bracketed::to_string(value),
            Format::Indented => indented::to_string(value),
        }
    }

    pub fn deserialize<T: FromValue>(self, text: &str) -> Result<T> {
        match self {
            Format::Bracketed => bracketed::from_str(text),
            Format::Indented => indented::from_str(text),
        }
    }

    pub fn render(self, value: &Value) -> String {
        match self {
            Format::Bracketed => bracketed::render(value),
            Format::Indented => indented::render(value),
        }
    }

    pub fn parse(self, text: &str) -> Result<Value> {
        match self {
            Format::Bracketed => bracketed::parse(text),
            Format::Indented => indented::parse(text),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Bracketed => "bracketed",
            Format::Indented => "indented",
        })
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bracketed" | "json" => Ok(Format::Bracketed),
            "indented" | "yaml" => Ok(Format::Indented),
            other => Err(Error::InvalidInput(format!(
                "unknown format '{other}' (expected bracketed or indented)"
            ))),
        }
    }
}
