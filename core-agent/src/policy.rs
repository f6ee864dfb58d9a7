//! Which requests the agent intercepts.

use bridge_traits::{CacheKey, FetchRequest};
use url::{Origin, Url};

/// Interception eligibility: GET requests to the app origin or to an
/// allow-listed host.
#[derive(Debug, Clone)]
pub struct InterceptPolicy {
    origin: Origin,
    allowed_hosts: Vec<String>,
}

/// Why a request was or was not intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    SameOrigin,
    AllowedHost,
    /// Non-GET requests are never cached
    MethodNotCacheable,
    ForeignHost,
    /// The URL could not be parsed
    Unparseable,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::SameOrigin | Eligibility::AllowedHost)
    }
}

impl InterceptPolicy {
    pub fn new(app_origin: &Url, allowed_hosts: Vec<String>) -> Self {
        Self {
            origin: app_origin.origin(),
            allowed_hosts,
        }
    }

    pub fn classify(&self, request: &FetchRequest) -> Eligibility {
        if !CacheKey::from(request).is_cacheable() {
            return Eligibility::MethodNotCacheable;
        }

        let Ok(url) = Url::parse(&request.url) else {
            return Eligibility::Unparseable;
        };

        if url.origin() == self.origin {
            return Eligibility::SameOrigin;
        }

        // Substring match, so "unpkg.com" also admits "cdn.unpkg.com".
        match url.host_str() {
            Some(host) if self.allowed_hosts.iter().any(|allowed| host.contains(allowed.as_str())) => {
                Eligibility::AllowedHost
            }
            _ => Eligibility::ForeignHost,
        }
    }

    pub fn should_intercept(&self, request: &FetchRequest) -> bool {
        self.classify(request).is_eligible()
    }

    /// Whether a window URL contains the app origin, used to find existing windows.
    pub fn is_app_url(&self, url: &str) -> bool {
        self.origin.is_tuple() && url.contains(self.origin.ascii_serialization().as_str())
    }
}
