//! Scope rules - pluggable per-language name visibility
//!
//! The resolver never branches on a language tag; everything language-specific
//! about lexical scoping is answered by a [`ScopeStrategy`].

pub mod strategy;

pub use strategy::{ConstructorStyle, ModuleScopes, NestedScopes, ScopeStrategies, ScopeStrategy};
