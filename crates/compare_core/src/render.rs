use crate::{ProductEntry, ResultSet};

pub const NO_RESULTS_NOTICE: &str = "No results found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    /// The result set has no stores.
    NoResults,
    Stores(Vec<StoreView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreView {
    pub label: String,
    pub href: String,
    pub products: Vec<ProductLink>,
}

/// A clickable product label; opens in a new viewing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLink {
    pub label: String,
    pub href: String,
}

/// Turns a result set into a browsable tree.
///
/// Products without a link are left out. Missing currency, price or title
/// render as empty text.
pub fn render_results(results: &ResultSet) -> ResultsView {
    if results.is_empty() {
        return ResultsView::NoResults;
    }

    let stores = results
        .stores()
        .map(|(store, products)| StoreView {
            label: store.to_string(),
            href: store.to_string(),
            products: products.values().filter_map(product_link).collect(),
        })
        .collect();
    ResultsView::Stores(stores)
}

fn product_link(entry: &ProductEntry) -> Option<ProductLink> {
    let href = entry.link.as_deref().filter(|link| !link.is_empty())?;
    let label = format!(
        "{}{} {}",
        entry.currency.as_deref().unwrap_or_default(),
        entry.sale_price.as_deref().unwrap_or_default(),
        entry.title.as_deref().unwrap_or_default(),
    );
    Some(ProductLink {
        label,
        href: href.to_string(),
    })
}
