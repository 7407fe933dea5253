//! Symbol alias resolution (raw exchange tickers → canonical symbols).

pub mod resolver;
pub mod shared;

pub use resolver::{AliasEntry, SymbolResolver, DEFAULT_ALIAS_LIMIT, DEFAULT_QUOTE_SUFFIX};
pub use shared::SharedResolver;
