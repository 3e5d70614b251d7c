//! Predicate composition for product listings.
//!
//! Everything here is pure. Stores fold a [`Condition`] into their native
//! filter representation.

use serde::{Deserialize, Serialize};

use dealwatch_core::{CategoryId, ProductId};

/// Whether out-of-stock products may appear in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StockVisibility {
    #[default]
    ShowAll,
    HideOutOfStock,
}

impl StockVisibility {
    /// Coerce the raw `includeOutOfStock` query value.
    ///
    /// Only the exact literal `"false"` hides out-of-stock rows; anything else,
    /// including a missing parameter or `"0"`, shows everything. Clients have
    /// come to rely on this, but it is almost certainly not what was intended.
    pub fn from_query_flag(raw: Option<&str>) -> Self {
        match raw {
            Some("false") => StockVisibility::HideOutOfStock,
            _ => StockVisibility::ShowAll,
        }
    }
}

/// A single clause of a product filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Product is linked to the category with this name.
    InCategory(String),
    /// Product is linked to at least one of these categories.
    InAnyCategory(Vec<CategoryId>),
    StockStatus { out_of_stock: bool },
    DiscountNotNull,
    DiscountNotZero,
    /// Product id differs from this one.
    Excludes(ProductId),
}

/// Conjunction of predicates. An empty condition matches every product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Condition {
    clauses: Vec<Predicate>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.clauses.push(predicate);
        self
    }

    /// Add the "in stock" clause when out-of-stock rows must be hidden.
    pub fn with_stock_visibility(self, stock: StockVisibility) -> Self {
        match stock {
            StockVisibility::HideOutOfStock => {
                self.and(Predicate::StockStatus { out_of_stock: false })
            }
            StockVisibility::ShowAll => self,
        }
    }

    pub fn clauses(&self) -> &[Predicate] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn contains(&self, predicate: &Predicate) -> bool {
        self.clauses.contains(predicate)
    }
}

/// Base filter for every category-scoped listing.
///
/// Products without a discount rate never appear in category listings,
/// whatever the stock visibility.
pub fn build_condition(category_name: &str, stock: StockVisibility) -> Condition {
    Condition::new()
        .and(Predicate::InCategory(category_name.to_string()))
        .and(Predicate::DiscountNotNull)
        .with_stock_visibility(stock)
}

/// Filter for the top-discount listing.
pub fn top_discount_condition() -> Condition {
    Condition::new()
        .and(Predicate::DiscountNotZero)
        .and(Predicate::DiscountNotNull)
        .and(Predicate::StockStatus { out_of_stock: false })
}

/// Filter for products similar to `source`: sharing a category, discounted,
/// in stock, and not `source` itself.
pub fn similar_condition(source: ProductId, categories: Vec<CategoryId>) -> Condition {
    Condition::new()
        .and(Predicate::InAnyCategory(categories))
        .and(Predicate::Excludes(source))
        .and(Predicate::DiscountNotNull)
        .and(Predicate::StockStatus { out_of_stock: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn category_condition_always_requires_a_discount() {
        let cond = build_condition("shoes", StockVisibility::ShowAll);
        assert_eq!(
            cond.clauses(),
            &[Predicate::InCategory("shoes".to_string()), Predicate::DiscountNotNull]
        );
    }

    #[test]
    fn hiding_out_of_stock_adds_one_clause() {
        let cond = build_condition("shoes", StockVisibility::HideOutOfStock);
        assert_eq!(cond.clauses().len(), 3);
        assert!(cond.contains(&Predicate::StockStatus { out_of_stock: false }));
    }

    #[test]
    fn only_literal_false_hides_out_of_stock() {
        assert_eq!(
            StockVisibility::from_query_flag(Some("false")),
            StockVisibility::HideOutOfStock
        );
        for raw in [None, Some("true"), Some("False"), Some("0"), Some(""), Some("no")] {
            assert_eq!(StockVisibility::from_query_flag(raw), StockVisibility::ShowAll);
        }
    }

    #[test]
    fn top_discount_excludes_zero_null_and_out_of_stock() {
        let cond = top_discount_condition();
        assert!(cond.contains(&Predicate::DiscountNotZero));
        assert!(cond.contains(&Predicate::DiscountNotNull));
        assert!(cond.contains(&Predicate::StockStatus { out_of_stock: false }));
    }

    #[test]
    fn empty_condition_has_no_clauses() {
        assert!(Condition::new().is_empty());
        assert!(Condition::new().with_stock_visibility(StockVisibility::ShowAll).is_empty());
    }

    proptest! {
        #[test]
        fn composer_clauses_follow_visibility(name in "[a-z]{1,12}", hide in any::<bool>()) {
            let stock = if hide {
                StockVisibility::HideOutOfStock
            } else {
                StockVisibility::ShowAll
            };
            let cond = build_condition(&name, stock);

            prop_assert!(cond.contains(&Predicate::InCategory(name.clone())));
            prop_assert!(cond.contains(&Predicate::DiscountNotNull));
            prop_assert_eq!(cond.contains(&Predicate::StockStatus { out_of_stock: false }), hide);
        }
    }
}
