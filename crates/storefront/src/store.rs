//! Session/cart store - single source of truth for client-side state.
//!
//! Holds the shopping cart, the authenticated user, transient UI flags,
//! and the product listing with its filtered projection. Views read and
//! mutate it directly; no network calls originate here.
//!
//! The store is constructor-injected rather than a process-wide
//! singleton so tests can instantiate isolated instances. It clones
//! cheaply (`Arc` inner) and every multi-field update happens under a
//! single write lock, so readers never observe a partial update.

use std::sync::Arc;

use parking_lot::RwLock;
use prism_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Product, User};

/// One cart entry, keyed by product id + selected color + selected size.
///
/// Carries a denormalized product snapshot captured at add-time so the
/// cart stays renderable even if the catalog changes underneath it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
}

impl CartItem {
    fn matches_key(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        size: Option<&str>,
    ) -> bool {
        self.product_id == *product_id
            && self.selected_color.as_deref() == color
            && self.selected_size.as_deref() == size
    }
}

#[derive(Debug, Default)]
struct SessionState {
    cart: Vec<CartItem>,
    user: Option<User>,
    cart_open: bool,
    mobile_menu_open: bool,
    search_query: String,
    products: Vec<Product>,
    filtered_products: Vec<Product>,
}

/// The shared client-side state container.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add a product to the cart.
    ///
    /// Merges into an existing line with the same (product id, color,
    /// size) key by summing quantities; otherwise appends a new line
    /// with a snapshot of the product taken now. A zero quantity is a
    /// no-op; cart lines always carry a quantity of at least one.
    pub fn add_to_cart(
        &self,
        product: &Product,
        quantity: u32,
        color: Option<String>,
        size: Option<String>,
    ) {
        if quantity == 0 {
            return;
        }
        let mut state = self.inner.write();
        if let Some(line) = state
            .cart
            .iter_mut()
            .find(|line| line.matches_key(&product.id, color.as_deref(), size.as_deref()))
        {
            line.quantity += quantity;
            return;
        }
        state.cart.push(CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity,
            selected_color: color,
            selected_size: size,
        });
    }

    /// Remove every cart line whose product id matches.
    ///
    /// Note this is id-only while add keys on (id, color, size): all
    /// color/size variants of the product go at once. Use
    /// [`Self::remove_variant`] for variant-precise removal.
    pub fn remove_from_cart(&self, product_id: &ProductId) {
        let mut state = self.inner.write();
        state.cart.retain(|line| line.product_id != *product_id);
    }

    /// Remove a single (product id, color, size) line.
    pub fn remove_variant(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        size: Option<&str>,
    ) {
        let mut state = self.inner.write();
        state
            .cart
            .retain(|line| !line.matches_key(product_id, color, size));
    }

    /// Overwrite the quantity on every line matching the product id.
    ///
    /// A quantity of zero or below removes the line(s). Setting a
    /// quantity for an id not in the cart is a no-op.
    pub fn set_quantity(&self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let quantity = quantity as u32;
        let mut state = self.inner.write();
        for line in state
            .cart
            .iter_mut()
            .filter(|line| line.product_id == *product_id)
        {
            line.quantity = quantity;
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear_cart(&self) {
        self.inner.write().cart.clear();
    }

    /// Snapshot of the current cart lines.
    #[must_use]
    pub fn cart(&self) -> Vec<CartItem> {
        self.inner.read().cart.clone()
    }

    /// Sum of price x quantity over all lines, recomputed per call.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.inner
            .read()
            .cart
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Sum of quantities over all lines, recomputed per call.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.inner.read().cart.iter().map(|line| line.quantity).sum()
    }

    // =========================================================================
    // User
    // =========================================================================

    /// Set or clear the authenticated user.
    pub fn set_user(&self, user: Option<User>) {
        self.inner.write().user = user;
    }

    /// The authenticated user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.read().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().user.is_some()
    }

    // =========================================================================
    // UI state
    // =========================================================================

    pub fn set_cart_open(&self, open: bool) {
        self.inner.write().cart_open = open;
    }

    #[must_use]
    pub fn is_cart_open(&self) -> bool {
        self.inner.read().cart_open
    }

    pub fn set_mobile_menu_open(&self, open: bool) {
        self.inner.write().mobile_menu_open = open;
    }

    #[must_use]
    pub fn is_mobile_menu_open(&self) -> bool {
        self.inner.read().mobile_menu_open
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.inner.write().search_query = query.into();
    }

    #[must_use]
    pub fn search_query(&self) -> String {
        self.inner.read().search_query.clone()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Replace the catalog and reset the filtered view to the full list.
    pub fn set_products(&self, products: Vec<Product>) {
        let mut state = self.inner.write();
        state.filtered_products = products.clone();
        state.products = products;
    }

    /// The full unfiltered catalog.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.inner.read().products.clone()
    }

    /// The current filtered projection.
    #[must_use]
    pub fn filtered_products(&self) -> Vec<Product> {
        self.inner.read().filtered_products.clone()
    }

    /// Recompute the filtered view from the full catalog.
    ///
    /// Applies the stored free-text search (case-insensitive substring
    /// over name + description), then category equality, then price
    /// bounds. Each filter is optional; filters are not cumulative
    /// across calls - every call starts from the full product set.
    pub fn filter_products(
        &self,
        category: Option<&str>,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    ) {
        let mut state = self.inner.write();
        let query = state.search_query.to_lowercase();

        let filtered = state
            .products
            .iter()
            .filter(|product| {
                if !query.is_empty()
                    && !product.name.to_lowercase().contains(&query)
                    && !product.description.to_lowercase().contains(&query)
                {
                    return false;
                }
                if let Some(category) = category
                    && product.category != category
                {
                    return false;
                }
                if let Some(min) = min_price
                    && product.price < min
                {
                    return false;
                }
                if let Some(max) = max_price
                    && product.price > max
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        state.filtered_products = filtered;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price,
            image: format!("/images/{id}.jpg"),
            description: format!("Description for {id}"),
            category: "general".to_string(),
            rating: 4.5,
            reviews: 10,
            in_stock: true,
            colors: None,
            sizes: None,
        }
    }

    #[test]
    fn test_add_merges_identical_composite_key() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));

        store.add_to_cart(&p1, 1, Some("red".to_string()), None);
        store.add_to_cart(&p1, 2, Some("red".to_string()), None);

        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 3);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));

        store.add_to_cart(&p1, 0, None, None);
        assert!(store.cart().is_empty());

        store.add_to_cart(&p1, 2, None, None);
        store.add_to_cart(&p1, 0, None, None);
        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 2);
    }

    #[test]
    fn test_add_distinct_variants_create_distinct_lines() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));

        store.add_to_cart(&p1, 1, Some("red".to_string()), None);
        store.add_to_cart(&p1, 1, Some("blue".to_string()), None);

        assert_eq!(store.cart().len(), 2);
    }

    #[test]
    fn test_cart_total_and_count() {
        let store = SessionStore::new();
        store.add_to_cart(&product("p1", d("10")), 2, None, None);
        store.add_to_cart(&product("p2", d("5")), 1, None, None);

        assert_eq!(store.cart_total(), d("25"));
        assert_eq!(store.cart_count(), 3);
    }

    #[test]
    fn test_total_fresh_after_interleaved_mutations() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));
        let p2 = product("p2", d("7.50"));

        store.add_to_cart(&p1, 2, None, None);
        store.add_to_cart(&p2, 3, None, None);
        assert_eq!(store.cart_total(), d("42.50"));

        store.set_quantity(&p1.id, 1);
        assert_eq!(store.cart_total(), d("32.50"));

        store.remove_from_cart(&p2.id);
        assert_eq!(store.cart_total(), d("10"));
        assert_eq!(store.cart_count(), 1);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));

        store.add_to_cart(&p1, 2, None, None);
        store.set_quantity(&p1.id, 0);
        assert!(store.cart().is_empty());

        store.add_to_cart(&p1, 2, None, None);
        store.set_quantity(&p1.id, -3);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_id_is_noop() {
        let store = SessionStore::new();
        store.add_to_cart(&product("p1", d("10")), 1, None, None);

        store.set_quantity(&ProductId::new("missing"), 5);

        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 1);
    }

    #[test]
    fn test_remove_is_id_only_across_variants() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));

        store.add_to_cart(&p1, 1, Some("red".to_string()), None);
        store.add_to_cart(&p1, 1, Some("blue".to_string()), None);
        store.remove_from_cart(&p1.id);

        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_remove_variant_leaves_other_variants() {
        let store = SessionStore::new();
        let p1 = product("p1", d("10"));

        store.add_to_cart(&p1, 1, Some("red".to_string()), None);
        store.add_to_cart(&p1, 1, Some("blue".to_string()), None);
        store.remove_variant(&p1.id, Some("red"), None);

        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].selected_color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_clear_cart() {
        let store = SessionStore::new();
        store.add_to_cart(&product("p1", d("10")), 2, None, None);
        store.clear_cart();
        assert!(store.cart().is_empty());
        assert_eq!(store.cart_count(), 0);
    }

    #[test]
    fn test_set_products_resets_filtered_view() {
        let store = SessionStore::new();
        let products = vec![product("p1", d("10")), product("p2", d("20"))];

        store.set_products(products.clone());
        assert_eq!(store.filtered_products(), products);
    }

    #[test]
    fn test_filter_no_args_empty_search_returns_full_list() {
        let store = SessionStore::new();
        let products = vec![product("p1", d("10")), product("p2", d("20"))];
        store.set_products(products.clone());

        store.filter_products(None, None, None);
        assert_eq!(store.filtered_products(), products);
    }

    #[test]
    fn test_filters_recompute_from_full_base_set() {
        let store = SessionStore::new();
        let mut electronics = product("p1", d("10"));
        electronics.category = "electronics".to_string();
        let clothing = product("p2", d("20"));
        store.set_products(vec![electronics, clothing]);

        store.filter_products(Some("electronics"), None, None);
        assert_eq!(store.filtered_products().len(), 1);

        // A later call with no category restores the full list; filters
        // are not cumulative across calls.
        store.filter_products(None, None, None);
        assert_eq!(store.filtered_products().len(), 2);
    }

    #[test]
    fn test_filter_search_is_case_insensitive_substring() {
        let store = SessionStore::new();
        let mut widget = product("p1", d("10"));
        widget.name = "Super Widget".to_string();
        let mut gadget = product("p2", d("20"));
        gadget.name = "Gadget".to_string();
        gadget.description = "contains widget inside".to_string();
        let other = product("p3", d("30"));
        store.set_products(vec![widget, gadget, other]);

        store.set_search_query("WIDGET");
        store.filter_products(None, None, None);

        // Matches name on p1 and description on p2.
        assert_eq!(store.filtered_products().len(), 2);
    }

    #[test]
    fn test_filter_price_bounds_compose() {
        let store = SessionStore::new();
        store.set_products(vec![
            product("p1", d("5")),
            product("p2", d("15")),
            product("p3", d("25")),
        ]);

        store.filter_products(None, Some(d("10")), Some(d("20")));

        let filtered = store.filtered_products();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, ProductId::new("p2"));
    }

    #[test]
    fn test_user_state() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());

        store.set_user(Some(User {
            id: prism_core::UserId::new(1001),
            name: "Demo".to_string(),
            email: "demo@example.com".to_string(),
            avatar: None,
            is_admin: false,
        }));
        assert!(store.is_authenticated());

        store.set_user(None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_ui_flags() {
        let store = SessionStore::new();
        assert!(!store.is_cart_open());
        store.set_cart_open(true);
        assert!(store.is_cart_open());

        store.set_mobile_menu_open(true);
        assert!(store.is_mobile_menu_open());

        store.set_search_query("shoes");
        assert_eq!(store.search_query(), "shoes");
    }
}
