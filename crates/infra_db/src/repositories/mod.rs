//! Repository implementations
//!
//! Each repository owns the row types for its tables and the mapping to and
//! from the domain aggregates. Mutations on versioned aggregates are guarded
//! with `WHERE version = $n`; zero affected rows is distinguished into
//! not-found versus stale-version.

pub mod policy;
pub mod claims;
pub mod users;
pub mod audit;
