//! Filter token -> sort order policy.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    DiscountRate,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Single-field sort applied to a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Client-selectable listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterToken {
    DiscountRateDesc,
    PriceAsc,
    PriceDesc,
}

impl FilterToken {
    pub const ALL: [FilterToken; 3] = [
        FilterToken::DiscountRateDesc,
        FilterToken::PriceAsc,
        FilterToken::PriceDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterToken::DiscountRateDesc => "discountRate_desc",
            FilterToken::PriceAsc => "price_asc",
            FilterToken::PriceDesc => "price_desc",
        }
    }

    pub fn sort_spec(self) -> SortSpec {
        match self {
            FilterToken::DiscountRateDesc => {
                SortSpec::new(SortField::DiscountRate, SortDirection::Desc)
            }
            FilterToken::PriceAsc => SortSpec::new(SortField::Price, SortDirection::Asc),
            FilterToken::PriceDesc => SortSpec::new(SortField::Price, SortDirection::Desc),
        }
    }
}

/// The token did not name a known listing order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown category filter: {token}")]
pub struct InvalidFilterError {
    pub token: String,
}

impl FromStr for FilterToken {
    type Err = InvalidFilterError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterToken::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| InvalidFilterError { token: s.to_string() })
    }
}

/// Resolve a filter token into the sort it selects.
pub fn resolve_sort(token: &str) -> Result<SortSpec, InvalidFilterError> {
    token.parse::<FilterToken>().map(FilterToken::sort_spec)
}
