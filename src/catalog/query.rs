//! Catalog listing: filtering, sorting and pagination.

use std::str::FromStr;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::EnumString;
use tracing::instrument;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Sortable catalog fields, named the way clients address them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, strum::Display)]
pub enum SortField {
    /// Catalog number.
    #[strum(serialize = "id")]
    Id,
    /// French name.
    #[strum(serialize = "name.french")]
    NameFrench,
    /// English name.
    #[strum(serialize = "name.english")]
    NameEnglish,
    /// Base HP.
    #[strum(serialize = "base.HP")]
    Hp,
    /// Base attack.
    #[strum(serialize = "base.Attack")]
    Attack,
    /// Base defense.
    #[strum(serialize = "base.Defense")]
    Defense,
    /// Base special attack.
    #[strum(serialize = "base.SpecialAttack")]
    SpecialAttack,
    /// Base special defense.
    #[strum(serialize = "base.SpecialDefense")]
    SpecialDefense,
    /// Base speed.
    #[strum(serialize = "base.Speed")]
    Speed,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A parsed `sort` parameter such as `-base.HP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct SortOrder {
    field: SortField,
    direction: SortDirection,
}

/// The `sort` parameter named an unknown field.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Unknown sort field '{}'", field)]
pub struct SortParseError {
    /// The rejected field name.
    pub field: String,
}

impl FromStr for SortOrder {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (direction, name) = match s.strip_prefix('-') {
            Some(rest) => (SortDirection::Descending, rest),
            None => (SortDirection::Ascending, s),
        };
        let field = SortField::from_str(name).map_err(|_| SortParseError {
            field: name.to_string(),
        })?;
        Ok(Self { field, direction })
    }
}

/// Restricts which creatures a listing returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct CreatureFilter {
    creature_type: Option<String>,
    name: Option<String>,
}

impl CreatureFilter {
    /// Creates a filter. Blank values are treated as absent.
    #[instrument]
    pub fn new(creature_type: Option<String>, name: Option<String>) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            creature_type: non_blank(creature_type),
            name: non_blank(name),
        }
    }

    /// Filter that matches one type tag exactly.
    pub fn by_type(creature_type: impl Into<String>) -> Self {
        Self::new(Some(creature_type.into()), None)
    }
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

impl Pagination {
    /// Creates a window, falling back to page 1 and the default limit for
    /// missing or non-positive values.
    #[instrument]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    /// Number of rows skipped before this page. Saturates for pages far past
    /// the end, which then read as empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A complete listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct CreatureQuery {
    filter: CreatureFilter,
    sort: Option<SortOrder>,
    pagination: Pagination,
}

impl CreatureQuery {
    /// Creates a listing request.
    pub fn new(filter: CreatureFilter, sort: Option<SortOrder>, pagination: Pagination) -> Self {
        Self {
            filter,
            sort,
            pagination,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    total: i64,
    page: i64,
    limit: i64,
    total_pages: i64,
    has_next_page: bool,
    has_prev_page: bool,
}

impl PageMeta {
    /// Computes metadata for `pagination` over `total` matching rows.
    #[instrument]
    pub fn new(total: i64, pagination: &Pagination) -> Self {
        let limit = pagination.limit;
        let page = pagination.page;
        let total_pages = (total + limit - 1) / limit;
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct Page<T> {
    meta: PageMeta,
    data: Vec<T>,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(meta: PageMeta, data: Vec<T>) -> Self {
        Self { meta, data }
    }

    /// Consumes the page, returning its items.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}
