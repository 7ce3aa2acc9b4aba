// Endpoint pattern tables for credential policy decisions

use once_cell::sync::Lazy;
use regex::Regex;

/// Admin back-office namespace, always protected
pub(super) const ADMIN_PREFIX: &str = "/api/admin/";

/// Variant image uploads are served unauthenticated even though the
/// /api/products prefix overlaps protected mutation routes
pub(super) static VARIANT_IMAGE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/products/\d+/variants/\d+/images").unwrap());

pub(super) static STORE_STATUS_UPDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/stores/\d+/update-status").unwrap());

pub(super) static STORE_DETAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/stores/\d+$").unwrap());

pub(super) static STORE_PRODUCTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/api/stores/\d+/products").unwrap());

/// Store-owner management endpoints (substring match)
pub(super) const SELLER_PATHS: &[&str] = &[
    "/api/stores/my-stores",
    "/api/store-orders/",
    "/api/stores/user/",
    "/api/stores/visitors/stats",
    "/api/stores/seller/",
    "/api/seller-products/",
    "/api/seller/products/",
    "/api/products/store/",
    "/api/products/create",
    "/api/products/update",
    "/api/products/delete",
];

/// Paths that force a token even when a public prefix also matches.
/// Checked before the public table: some mutation routes share a root with
/// public listing routes.
pub(super) const NEEDS_TOKEN_PATHS: &[&str] = &[
    "/api/stores/applications/me",
    "/api/stores/applications",
    "/verify-purchase",
    "/helpful",
    "/wishlist",
    "/users/me",
    "/profile",
    "/orders",
    "/cart",
    "/address",
    "/store-orders",
    "/stores/my-stores",
    "/stores/user",
    "/seller-products",
    "/api/products/create",
    "/api/products/update",
    "/api/products/delete",
];

/// Endpoints reachable without a session (path prefix match)
pub(super) const PUBLIC_PREFIXES: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/store-login",
    "/api/auth/refresh-token",
    "/api/verification/login",
    "/api/verification/register",
    "/api/verification/verify-email",
    "/api/verification/verify-email-change",
    "/api/verification/verify-current-email",
    "/api/verification/resend-registration",
    "/api/verification/check-status",
    "/api/categories",
    "/api/brands",
    "/api/products",
    "/api/products/list",
    "/api/products/featured",
    "/api/products/bestsellers",
    "/api/products/new",
    "/api/products/search",
    "/api/products/category/",
    "/api/products/brand/",
    "/api/files/products",
    "/api/files/common",
    "/api/files",
    "/api/stores",
    "/api/stores/popular",
    "/api/stores/search",
    "/api/stores/search/products/featured",
    "/api/stores/category/",
    "/api/stores/product-category/",
];
