//! Version catalog lookup and resolution
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────▶│  Resolver   │◀────│  Specifier  │
//! │   (fetch)   │     │  (select)   │     │   (parse)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Dotted    │
//!                     │(version cmp)│
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Fetches the JSON list of published versions
//! - [`dotted`]: Dotted numeric versions and their precedence
//! - [`resolver`]: Picks one catalog entry for a requested version
//! - [`specifier`]: Grammar for exact versions, wildcards and comparisons

pub mod catalog;
pub mod dotted;
pub mod resolver;
pub mod specifier;
