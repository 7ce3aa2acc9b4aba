// Endpoint credential policy
// Ordered rule groups, first match wins. Admin and seller namespaces are
// decided before the generic needs-token/public tables so broad prefixes
// cannot shadow them.

mod tables;

use reqwest::{Method, Url};

use tables::{
    ADMIN_PREFIX, NEEDS_TOKEN_PATHS, PUBLIC_PREFIXES, SELLER_PATHS, STORE_DETAIL, STORE_PRODUCTS,
    STORE_STATUS_UPDATE, VARIANT_IMAGE_PATH,
};

/// Credential policy for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No bearer token attached
    Public,
    /// Bearer token attached when available
    Protected,
    /// Admin back-office call, token always attached
    AdminProtected,
    /// Store-owner call, token always attached
    SellerProtected,
}

impl Access {
    pub fn requires_token(self) -> bool {
        !matches!(self, Access::Public)
    }
}

/// Decide the credential policy for a request
pub fn classify(url: &Url, method: &Method) -> Access {
    let path = url.path();

    if path.starts_with(ADMIN_PREFIX) {
        tracing::debug!(%path, "admin endpoint, token required");
        return Access::AdminProtected;
    }

    if VARIANT_IMAGE_PATH.is_match(path) {
        tracing::debug!(%path, "variant image endpoint, public");
        return Access::Public;
    }

    if SELLER_PATHS.iter().any(|p| path.contains(p)) {
        tracing::debug!(%path, "seller endpoint, token required");
        return Access::SellerProtected;
    }

    if path.starts_with("/api/stores/") {
        if let Some(access) = classify_store_path(path, method) {
            return access;
        }
    }

    if NEEDS_TOKEN_PATHS.iter().any(|p| path.contains(p)) {
        tracing::debug!(%path, "needs-token override, token required");
        return Access::Protected;
    }

    if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        tracing::debug!(%path, "public endpoint");
        return Access::Public;
    }

    // Unknown endpoints require a token
    tracing::debug!(%path, "unmatched endpoint, defaulting to protected");
    Access::Protected
}

/// Store namespace rules: status updates and id-level mutations are
/// protected, detail GETs and product listings are public. Returns None to
/// fall through to the generic tables.
fn classify_store_path(path: &str, method: &Method) -> Option<Access> {
    if STORE_STATUS_UPDATE.is_match(path) {
        return Some(Access::Protected);
    }

    if STORE_DETAIL.is_match(path) {
        if *method == Method::PUT || *method == Method::DELETE {
            return Some(Access::Protected);
        }
        if *method == Method::GET {
            return Some(Access::Public);
        }
        return None;
    }

    if STORE_PRODUCTS.is_match(path) {
        return Some(Access::Public);
    }

    None
}
