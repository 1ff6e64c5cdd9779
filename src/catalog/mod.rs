//! Creature catalog: reference data and listing queries.

mod creature;
mod query;

pub use creature::{BaseStats, Creature, Locale, LocalizedNames};
pub use query::{
    CreatureFilter, CreatureQuery, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, Page, PageMeta, Pagination,
    SortDirection, SortField, SortOrder, SortParseError,
};
