/// API credential pair used for Basic auth on the REST channel
#[derive(Clone, Debug, Default)]
pub struct ApiCredentials {
    pub username: String,
    pub password: String,
}

/// Web-console credentials, required only for UI workflows
#[derive(Clone, Debug, Default)]
pub struct UiCredentials {
    pub username: String,
    pub password: String,
    /// Base32 shared secret for the time-based one-time code
    pub otp_secret: String,
}

/// Credential bundle
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub api: ApiCredentials,
    /// Additional API passwords for key rotation; index 0 is always
    /// `api.password`, these follow as indices 1..N
    pub extra_api_keys: Vec<String>,
    pub ui: Option<UiCredentials>,
}

/// Per-object "application link id" path parameters needed to deep-link
/// into transaction pages
#[derive(Clone, Debug, Default)]
pub struct AppLinkIds {
    pub credit_notes: String,
    pub sales_orders: String,
}

/// Key rotation settings; the counter collaborator is passed to the client
/// separately and is never owned by the configuration
#[derive(Clone, Debug)]
pub struct KeyRotationOptions {
    pub enabled: bool,
    /// A key whose call count has reached this value is skipped
    pub cutoff: u64,
}

impl Default for KeyRotationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            cutoff: DEFAULT_KEY_CUTOFF,
        }
    }
}

/// The vendor allows 5000 calls per key per day; leave headroom
pub const DEFAULT_KEY_CUTOFF: u64 = 4900;

/// Optional behavior switches
#[derive(Clone, Debug)]
pub struct Cin7Options {
    /// Run the browser without a window
    pub headless: bool,
    pub app_link_ids: AppLinkIds,
    pub key_rotation: Option<KeyRotationOptions>,
}

impl Default for Cin7Options {
    fn default() -> Self {
        Self {
            headless: true,
            app_link_ids: AppLinkIds::default(),
            key_rotation: None,
        }
    }
}

/// Client configuration
#[derive(Clone, Debug, Default)]
pub struct Cin7Config {
    pub auth: AuthConfig,
    pub options: Cin7Options,
}

impl Cin7Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            auth: AuthConfig {
                api: ApiCredentials {
                    username: std::env::var("CIN7_API_USERNAME").unwrap_or_default(),
                    password: std::env::var("CIN7_API_PASSWORD").unwrap_or_default(),
                },
                extra_api_keys: std::env::var("CIN7_EXTRA_API_KEYS")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
                ui: match (
                    std::env::var("CIN7_UI_USERNAME"),
                    std::env::var("CIN7_UI_PASSWORD"),
                    std::env::var("CIN7_UI_OTP_SECRET"),
                ) {
                    (Ok(username), Ok(password), Ok(otp_secret)) => Some(UiCredentials {
                        username,
                        password,
                        otp_secret,
                    }),
                    _ => None,
                },
            },
            options: Cin7Options {
                headless: std::env::var("CIN7_HEADLESS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default.options.headless),
                app_link_ids: AppLinkIds {
                    credit_notes: std::env::var("CIN7_CREDIT_NOTES_APP_LINK_ID")
                        .unwrap_or_default(),
                    sales_orders: std::env::var("CIN7_SALES_ORDERS_APP_LINK_ID")
                        .unwrap_or_default(),
                },
                key_rotation: std::env::var("CIN7_KEY_ROTATION_CUTOFF")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(|cutoff| KeyRotationOptions {
                        enabled: true,
                        cutoff,
                    }),
            },
        }
    }

    /// Every API password in rotation order; index 0 is the primary one
    pub fn api_keys(&self) -> Vec<&str> {
        std::iter::once(self.auth.api.password.as_str())
            .chain(self.auth.extra_api_keys.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_keys_start_with_primary_password() {
        let config = Cin7Config {
            auth: AuthConfig {
                api: ApiCredentials {
                    username: "user".into(),
                    password: "primary".into(),
                },
                extra_api_keys: vec!["second".into(), "third".into()],
                ui: None,
            },
            ..Default::default()
        };
        assert_eq!(config.api_keys(), vec!["primary", "second", "third"]);
    }

    #[test]
    fn defaults_are_headless_with_no_rotation() {
        let config = Cin7Config::default();
        assert!(config.options.headless);
        assert!(config.options.key_rotation.is_none());
    }
}
