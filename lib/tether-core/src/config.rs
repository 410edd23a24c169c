//! Client configuration types.

use std::time::Duration;

use crate::QueryEncoder;
use crate::query::DEFAULT_MULTI_VALUE_SUFFIX;

/// Configuration for a client, or for a single request.
///
/// Immutable once attached; per-request overrides are separate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout handed to the transport.
    pub timeout: Duration,
    /// Suffix appended to repeated query keys.
    pub multi_value_suffix: String,
    /// Keep cookies across calls. `HyperTransport` honours it; other transports may not.
    pub should_set_cookies: bool,
    /// Deliver the early response and skip the transport when an interceptor halts.
    pub should_halt_on_protocol_skip: bool,
    /// Attach an error to 4xx/5xx responses.
    pub treat_non_success_status_as_error: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            multi_value_suffix: DEFAULT_MULTI_VALUE_SUFFIX.to_string(),
            should_set_cookies: false,
            should_halt_on_protocol_skip: false,
            treat_non_success_status_as_error: false,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Query encoder using this configuration's multi-value suffix.
    #[must_use]
    pub fn query_encoder(&self) -> QueryEncoder {
        QueryEncoder::new(self.multi_value_suffix.as_str())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    multi_value_suffix: Option<String>,
    should_set_cookies: Option<bool>,
    should_halt_on_protocol_skip: Option<bool>,
    treat_non_success_status_as_error: Option<bool>,
}

impl ClientConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the multi-value suffix.
    #[must_use]
    pub fn multi_value_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.multi_value_suffix = Some(suffix.into());
        self
    }

    /// Set the cookie hint.
    #[must_use]
    pub const fn should_set_cookies(mut self, enabled: bool) -> Self {
        self.should_set_cookies = Some(enabled);
        self
    }

    /// Set whether an interceptor halt skips the transport.
    #[must_use]
    pub const fn should_halt_on_protocol_skip(mut self, enabled: bool) -> Self {
        self.should_halt_on_protocol_skip = Some(enabled);
        self
    }

    /// Set whether 4xx/5xx responses carry an error.
    #[must_use]
    pub const fn treat_non_success_status_as_error(mut self, enabled: bool) -> Self {
        self.treat_non_success_status_as_error = Some(enabled);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            multi_value_suffix: self
                .multi_value_suffix
                .unwrap_or(defaults.multi_value_suffix),
            should_set_cookies: self
                .should_set_cookies
                .unwrap_or(defaults.should_set_cookies),
            should_halt_on_protocol_skip: self
                .should_halt_on_protocol_skip
                .unwrap_or(defaults.should_halt_on_protocol_skip),
            treat_non_success_status_as_error: self
                .treat_non_success_status_as_error
                .unwrap_or(defaults.treat_non_success_status_as_error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.multi_value_suffix, "[]");
        assert!(!config.should_set_cookies);
        assert!(!config.should_halt_on_protocol_skip);
        assert!(!config.treat_non_success_status_as_error);
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_secs(5))
            .multi_value_suffix("")
            .should_halt_on_protocol_skip(true)
            .treat_non_success_status_as_error(true)
            .build();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.multi_value_suffix, "");
        assert!(!config.should_set_cookies);
        assert!(config.should_halt_on_protocol_skip);
        assert!(config.treat_non_success_status_as_error);
    }

    #[test]
    fn query_encoder_uses_suffix() {
        let config = ClientConfig::builder().multi_value_suffix("[]").build();
        assert_eq!(config.query_encoder().multi_value_suffix(), "[]");
    }
}
