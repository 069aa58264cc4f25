//! The closed set of supported identity providers.
//!
//! Each provider is a capability row: where its spec lives, the document
//! format, how its paths group, and which authentication strategy its API
//! expects. Provider-specific behavior stays in this table instead of being
//! scattered through the pipeline.

use crate::constants;
use crate::spec::SpecFormat;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Okta (JSON spec, SSWS token auth)
    Okta,
    /// SailPoint IdentityNow (YAML spec, client-credentials auth)
    IdentityNow,
    /// SailPoint IdentityIQ (YAML spec, basic auth)
    Iiq,
}

impl Provider {
    pub const ALL: [Self; 3] = [Self::Okta, Self::IdentityNow, Self::Iiq];

    /// Human-facing label used by selection surfaces and status lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Okta => "Okta (JSON)",
            Self::IdentityNow => "SailPoint IdentityNow (YAML)",
            Self::Iiq => "Sailpoint IIQ (YAML)",
        }
    }

    /// Directory name for this provider's responses inside a session.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Okta => "Okta",
            Self::IdentityNow => "IdentityNow",
            Self::Iiq => "IIQ",
        }
    }

    #[must_use]
    pub const fn spec_format(self) -> SpecFormat {
        match self {
            Self::Okta => SpecFormat::Json,
            Self::IdentityNow | Self::Iiq => SpecFormat::Yaml,
        }
    }

    /// Environment variable holding this provider's spec URL.
    #[must_use]
    pub const fn spec_url_env(self) -> &'static str {
        match self {
            Self::Okta => constants::ENV_OKTA_SPEC,
            Self::IdentityNow => constants::ENV_IDENTITY_NOW_SPEC,
            Self::Iiq => constants::ENV_IIQ_SPEC,
        }
    }

    #[must_use]
    pub fn spec_url(self) -> Option<String> {
        std::env::var(self.spec_url_env())
            .ok()
            .filter(|url| !url.is_empty())
    }

    /// Literal prefix stripped from paths before deriving the group key, so
    /// grouping reflects the resource name rather than the version marker.
    #[must_use]
    pub const fn group_prefix(self) -> Option<&'static str> {
        match self {
            Self::Okta => Some(constants::OKTA_VERSION_PREFIX),
            Self::IdentityNow | Self::Iiq => None,
        }
    }

    /// Restores the callable form of a path that may have been displayed
    /// without its version prefix. Okta endpoints are always invoked under
    /// `/api/v1`.
    #[must_use]
    pub fn canonical_endpoint(self, path: &str) -> String {
        match self {
            Self::Okta if !path.starts_with("/api/v1") => format!("/api/v1{path}"),
            _ => path.to_string(),
        }
    }
}
