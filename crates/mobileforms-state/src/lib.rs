//! Mobileforms State
//!
//! [`FormState`] is the single source of truth for one form instance: the
//! active [`FormDefinition`], the current [`FieldValues`], and the `read_only`
//! and `loaded` flags.
//!
//! ```text
//!   new() ──► set_definition ──► mark_loaded ──► apply_change / Overwrite
//!  (empty)     (loaded=false)     (loaded=true)     (renderer edits, populate)
//!                   ▲                                      │
//!                   └──────────── set_definition ◄─────────┘
//! ```
//!
//! Before load only [`WriteMode::Merge`] writes are accepted; after load only
//! [`WriteMode::Overwrite`] writes and renderer changes are.
//!
//! [`FormDefinition`]: mobileforms_schema::FormDefinition
//! [`FieldValues`]: mobileforms_schema::FieldValues

mod coerce;
mod error;
mod state;

pub use coerce::coerce_change;
pub use error::StateError;
pub use state::{FormState, WriteMode};
