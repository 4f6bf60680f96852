use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use crate::errors::AdminError;
use crate::utils::{extract_real_ip, SecureString};

/// Request gatekeeping for the admin API: IP allowlist and bearer token
#[derive(Clone)]
pub struct SecurityValidator {
    allowed_ips: HashSet<IpAddr>,
    trusted_proxies: HashSet<IpAddr>,
    api_token: Option<SecureString>,
}

fn parse_ips(ips: Vec<String>, what: &str) -> Result<HashSet<IpAddr>, AdminError> {
    ips.into_iter()
        .map(|ip_str| {
            ip_str
                .parse()
                .map_err(|_| AdminError::Config(format!("Invalid {what} IP address: {ip_str}")))
        })
        .collect()
}

impl SecurityValidator {
    pub fn new(allowed_ips: Vec<String>, api_token: Option<String>) -> Result<Self, AdminError> {
        let ips = parse_ips(allowed_ips, "allowed")?;

        let api_token = match api_token {
            Some(token) if token.trim().is_empty() => {
                return Err(AdminError::Config("API token cannot be empty".to_string()))
            }
            Some(token) => Some(SecureString::new(token)),
            None => None,
        };

        Ok(Self {
            allowed_ips: ips,
            trusted_proxies: HashSet::new(),
            api_token,
        })
    }

    /// Peers whose forwarding headers name the real client
    pub fn with_trusted_proxies(mut self, proxies: Vec<String>) -> Result<Self, AdminError> {
        self.trusted_proxies = parse_ips(proxies, "trusted proxy")?;
        Ok(self)
    }

    pub fn client_ip(&self, headers: &HeaderMap, peer: &SocketAddr) -> IpAddr {
        extract_real_ip(headers, peer, &self.trusted_proxies)
    }

    pub fn requires_token(&self) -> bool {
        self.api_token.is_some()
    }

    pub fn validate_ip(&self, ip: &IpAddr) -> Result<(), AdminError> {
        // If no IPs configured, allow all
        if self.allowed_ips.is_empty() {
            return Ok(());
        }

        if !self.allowed_ips.contains(ip) {
            return Err(AdminError::Unauthorized(format!(
                "IP address {ip} is not allowed"
            )));
        }

        Ok(())
    }

    /// Check the `Authorization: Bearer` header when a token is configured
    pub fn validate_token(&self, headers: &HeaderMap) -> Result<(), AdminError> {
        let Some(expected) = &self.api_token else {
            return Ok(());
        };

        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AdminError::Unauthorized("missing bearer token".to_string()))?;

        if !expected.secure_eq_bytes(presented.trim().as_bytes()) {
            return Err(AdminError::Unauthorized("invalid bearer token".to_string()));
        }

        Ok(())
    }

    /// Apply both checks to one request
    pub fn authorize(&self, ip: &IpAddr, headers: &HeaderMap) -> Result<(), AdminError> {
        self.validate_ip(ip)?;
        self.validate_token(headers)
    }
}
