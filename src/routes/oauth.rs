// SPDX-License-Identifier: MIT

//! Shopify OAuth install and callback routes.
//!
//! Install stashes a random state nonce in the server-side session and sends
//! the merchant to Shopify's authorization page. The callback verifies the
//! state and the HMAC signature, exchanges the authorization code for an
//! access token, persists it, registers the shop/update webhook, and lands
//! the merchant on the dashboard.

use axum::{
    extract::{Query, RawQuery, State},
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::services::session::SESSION_COOKIE;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Scopes requested at install time.
const OAUTH_SCOPES: &str = "read_products,write_products";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/shop/install", get(install))
        .route("/api/shop/callback", get(callback))
}

/// Query parameters for starting the install flow.
#[derive(Deserialize)]
pub struct InstallParams {
    #[serde(default)]
    shop: Option<String>,
}

/// Begin OAuth install - redirect to Shopify authorization.
async fn install(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<InstallParams>,
) -> Result<(CookieJar, Redirect)> {
    let shop = params
        .shop
        .as_deref()
        .filter(|s| is_valid_shop_domain(s))
        .ok_or_else(|| {
            AppError::Validation("Missing or malformed 'shop' query parameter".to_string())
        })?;

    // Single-use anti-forgery nonce, parked server-side and keyed by a
    // session cookie so the callback can correlate the browser.
    let (session_id, oauth_state) = state.sessions.create_state()?;

    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    let install_url = format!(
        "https://{}/admin/oauth/authorize?\
         client_id={}&\
         scope={}&\
         redirect_uri={}&\
         state={}",
        shop,
        state.config.shopify_api_key,
        OAUTH_SCOPES,
        urlencoding::encode(&state.config.shopify_redirect_uri),
        oauth_state
    );

    tracing::info!(shop, "Starting OAuth install, redirecting to Shopify");

    Ok((jar.add(cookie), Redirect::temporary(&install_url)))
}

/// Query parameters Shopify sends to the OAuth redirect target.
///
/// Every field is optional at the extractor level so that an incomplete
/// callback still reaches the handler and gets the usual JSON error body
/// instead of axum's bare rejection.
#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    shop: Option<String>,
    #[serde(default)]
    hmac: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

/// OAuth callback - verify, exchange code for a token, persist, register webhook.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    RawQuery(raw_query): RawQuery,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let shop = params
        .shop
        .as_deref()
        .filter(|s| is_valid_shop_domain(s))
        .ok_or_else(|| {
            AppError::Validation("Missing or malformed 'shop' query parameter".to_string())
        })?;

    // 1. Anti-forgery check: the state must match the one parked in the
    //    session at install time. The session entry is consumed either way.
    let supplied_state = params
        .state
        .as_deref()
        .ok_or_else(|| AppError::Forbidden("Missing 'state' query parameter".to_string()))?;

    let stored_state = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.take_state(cookie.value()))
        .ok_or_else(|| AppError::Forbidden("No install session for this browser".to_string()))?;

    if !constant_time_eq(supplied_state, &stored_state) {
        return Err(AppError::Forbidden("OAuth state mismatch".to_string()));
    }

    // 2. Signature check over everything Shopify sent except the hmac itself.
    let supplied_hmac = params
        .hmac
        .as_deref()
        .ok_or_else(|| AppError::Validation("Missing 'hmac' query parameter".to_string()))?;

    let raw_query = raw_query.unwrap_or_default();
    if !verify_hmac(&raw_query, supplied_hmac, &state.config.shopify_api_secret) {
        return Err(AppError::BadRequest("HMAC validation failed".to_string()));
    }

    // 3. Exchange the temporary code for a permanent access token.
    let code = params
        .code
        .as_deref()
        .ok_or_else(|| AppError::Validation("Missing 'code' query parameter".to_string()))?;

    let access_token = state.shopify.exchange_code(shop, code).await?;

    // 4. Persist the token, creating the record on first install.
    let record = state.db.upsert_shop_token(shop, &access_token).await?;

    // 5. Register the shop/update webhook. A failure here leaves the shop
    //    installed but unsubscribed; the token persist is not rolled back.
    if let Err(e) = state.shopify.register_webhook(shop, &access_token).await {
        tracing::warn!(shop, error = %e, "Webhook registration failed after install");
    }

    tracing::info!(shop = %record.shop_id, shop_record_id = %record.id, "OAuth install complete");

    // 6. Session is done; drop the cookie and land on the dashboard.
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    let dashboard_url = format!(
        "{}/dashboard?shop={}",
        state.config.app_url,
        urlencoding::encode(shop)
    );

    Ok((jar, Redirect::temporary(&dashboard_url)))
}

/// Basic shape check on the shop domain before it is interpolated into URLs.
fn is_valid_shop_domain(shop: &str) -> bool {
    !shop.is_empty()
        && shop.contains('.')
        && !shop.starts_with(['.', '-'])
        && shop
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Compute the hex HMAC-SHA256 digest of a message.
fn compute_hmac(message: &str, secret: &str) -> String {
    // HMAC-SHA256 accepts keys of any length, so this cannot fail
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify the Shopify callback signature.
///
/// The digest covers every query parameter except `hmac`, in the order they
/// arrived, re-serialized as `key=value` pairs joined with `&`.
fn verify_hmac(raw_query: &str, supplied_hmac: &str, secret: &str) -> bool {
    let message = canonical_message(raw_query);
    let expected = compute_hmac(&message, secret);
    constant_time_eq(&expected, &supplied_hmac.to_ascii_lowercase())
}

/// Rebuild the signable query string, dropping the `hmac` parameter while
/// preserving the order of everything else.
fn canonical_message(raw_query: &str) -> String {
    raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key == "hmac" {
                return None;
            }
            let key = urlencoding::decode(key).ok()?;
            let value = urlencoding::decode(value).ok()?;
            Some(format!(
                "{}={}",
                urlencoding::encode(&key),
                urlencoding::encode(&value)
            ))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Constant-time string comparison for signatures and state nonces.
fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
