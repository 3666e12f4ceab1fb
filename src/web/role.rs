//! Caller role resolution.
//!
//! The gate only needs to know whether a caller is an administrator. How that
//! is established belongs to the host; [`TokenRoleResolver`] is the default,
//! matching a bearer token or cookie against the configured admin tokens.

use crate::core::gate::CallerRole;
use axum::http::{HeaderMap, header};
use std::collections::HashSet;

/// Name of the cookie that may carry an admin token
pub const ADMIN_COOKIE: &str = "maintenance_admin";

/// Decides the role of the caller behind a request.
pub trait RoleResolver: Send + Sync {
    /// Inspects request headers and classifies the caller.
    fn resolve(&self, headers: &HeaderMap) -> CallerRole;
}

/// Treats callers presenting a known token as administrators.
#[derive(Debug, Clone, Default)]
pub struct TokenRoleResolver {
    tokens: HashSet<String>,
}

impl TokenRoleResolver {
    /// Builds a resolver from the configured tokens. Empty tokens are ignored.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.is_empty())
            .collect();
        Self { tokens }
    }

    fn bearer_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(str::trim)
    }

    fn cookie_tokens(headers: &HeaderMap) -> impl Iterator<Item = &str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == ADMIN_COOKIE).then_some(value)
            })
    }
}

impl RoleResolver for TokenRoleResolver {
    fn resolve(&self, headers: &HeaderMap) -> CallerRole {
        let presented = Self::bearer_token(headers)
            .into_iter()
            .chain(Self::cookie_tokens(headers));

        for token in presented {
            if self.tokens.contains(token) {
                return CallerRole::Administrator;
            }
        }
        CallerRole::Visitor
    }
}
