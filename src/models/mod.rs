//! Storefront entity descriptors
//!
//! Each submodule exposes a `descriptor` factory plus the entity's
//! association declarations.

pub mod category;
pub mod order;
pub mod order_line;
pub mod product;
pub mod user;

use crate::registry::DescriptorFactory;

pub const PRODUCT: &str = "Product";
pub const CATEGORY: &str = "Category";
pub const ORDER: &str = "Order";
pub const ORDER_LINE: &str = "OrderLine";
pub const USER: &str = "User";

/// Registration order used by [`ModelRegistry::storefront`](crate::registry::ModelRegistry::storefront)
pub const DESCRIPTORS: &[(&str, DescriptorFactory)] = &[
    (PRODUCT, product::descriptor),
    (CATEGORY, category::descriptor),
    (ORDER, order::descriptor),
    (ORDER_LINE, order_line::descriptor),
    (USER, user::descriptor),
];
