use indexmap::IndexMap;

/// One product found in a store. Every field may be missing on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub currency: Option<String>,
    pub sale_price: Option<String>,
}

/// Products of one store keyed by product id, in server order.
pub type StoreProducts = IndexMap<String, ProductEntry>;

/// Search findings: store id -> product id -> product.
///
/// Store ids double as display label and link target. Insertion order is
/// kept so the rendered tree follows the server's ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    stores: IndexMap<String, StoreProducts>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a store with no products yet, keeping its position if present.
    pub fn insert_store(&mut self, store: impl Into<String>) -> &mut StoreProducts {
        self.stores.entry(store.into()).or_default()
    }

    pub fn insert_product(
        &mut self,
        store: impl Into<String>,
        product_id: impl Into<String>,
        entry: ProductEntry,
    ) {
        self.insert_store(store).insert(product_id.into(), entry);
    }

    pub fn stores(&self) -> impl Iterator<Item = (&str, &StoreProducts)> {
        self.stores
            .iter()
            .map(|(store, products)| (store.as_str(), products))
    }

    pub fn store(&self, store: &str) -> Option<&StoreProducts> {
        self.stores.get(store)
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
