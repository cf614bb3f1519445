//! The catalog of recognized secret names.
//!
//! Every secret the service knows about has a [`SecretId`]. Whether a secret
//! is loaded is data on its [`SecretDescriptor`], not a matter of which ids
//! exist, so optional integrations can be switched on from configuration.

use std::str::FromStr;

/// Generates [`SecretId`] with its environment variable names.
macro_rules! secret_ids {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// A recognized secret. Each id is read from the environment variable
        /// of the same name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum SecretId {
            $($variant),+
        }

        impl SecretId {
            /// Every recognized id in catalog order.
            pub const ALL: &'static [SecretId] = &[$(SecretId::$variant),+];

            /// The environment variable holding this secret.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(SecretId::$variant => $name),+
                }
            }
        }
    };
}

secret_ids! {
    ApiSecret => "API_SECRET",
    SupabaseKey => "SUPABASE_KEY",
    SupabasePassword => "SUPABASE_PASSWORD",
    OpenaiApiKey => "OPENAI_API_KEY",
    AnthropicApiKey => "ANTHROPIC_API_KEY",
    GeminiApiKey => "GEMINI_API_KEY",
    PerplexityApiKey => "PERPLEXITY_API_KEY",
    FirecrawlApiKey => "FIRECRAWL_API_KEY",
    MailgunKey => "MAILGUN_KEY",
    StripeApiKey => "STRIPE_APIKEY",
    StripeWebhookSecret => "STRIPE_WEBHOOKSECRET",
    TwilioAuthToken => "TWILIO_AUTH_TOKEN",
    TwilioSid => "TWILIO_SID",
    TwilioVerifySid => "TWILIO_VERIFY_SID",
    DreamKey => "DREAM_KEY",
    NewsApiKey => "NEWS_API_KEY",
    GiphyKey => "REACT_APP_GIPHY_KEY",
    TwitterApiKeyJson => "TWITTER_API_KEY_JSON",
    DestinyApiKey => "DESTINY_API_KEY",
    FbAccessToken => "FB_ACCESS_TOKEN",
    GeodbApiKey => "GEODB_API_KEY",
    SportsdbKey => "SPORTSDB_KEY",
    SchedulerAuthPassword => "SCHEDULER_AUTH_PASSWORD",
}

impl std::fmt::Display for SecretId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SecretId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown secret: {}", trimmed))
    }
}

/// What a secret is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretGroup {
    Core,
    /// Superseded by DATABASE_URL
    Database,
    Ai,
    Email,
    Payments,
    PhoneVerification,
    Misc,
    Scheduler,
}

impl SecretGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Database => "database",
            Self::Ai => "ai",
            Self::Email => "email",
            Self::Payments => "payments",
            Self::PhoneVerification => "phone-verification",
            Self::Misc => "misc",
            Self::Scheduler => "scheduler",
        }
    }
}

impl std::fmt::Display for SecretGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretDescriptor {
    pub id: SecretId,
    pub group: SecretGroup,
    /// Loaded when no explicit ids are requested
    pub enabled: bool,
    /// The service cannot start without it
    pub required: bool,
}

const fn entry(id: SecretId, group: SecretGroup, enabled: bool) -> SecretDescriptor {
    SecretDescriptor {
        id,
        group,
        enabled,
        required: false,
    }
}

/// Default catalog: only the API secret and the scheduler password are on.
pub const DEFAULT_SECRETS: &[SecretDescriptor] = &[
    SecretDescriptor {
        id: SecretId::ApiSecret,
        group: SecretGroup::Core,
        enabled: true,
        required: true,
    },
    entry(SecretId::SupabaseKey, SecretGroup::Database, false),
    entry(SecretId::SupabasePassword, SecretGroup::Database, false),
    entry(SecretId::OpenaiApiKey, SecretGroup::Ai, false),
    entry(SecretId::AnthropicApiKey, SecretGroup::Ai, false),
    entry(SecretId::GeminiApiKey, SecretGroup::Ai, false),
    entry(SecretId::PerplexityApiKey, SecretGroup::Ai, false),
    entry(SecretId::FirecrawlApiKey, SecretGroup::Ai, false),
    entry(SecretId::MailgunKey, SecretGroup::Email, false),
    entry(SecretId::StripeApiKey, SecretGroup::Payments, false),
    entry(SecretId::StripeWebhookSecret, SecretGroup::Payments, false),
    entry(SecretId::TwilioAuthToken, SecretGroup::PhoneVerification, false),
    entry(SecretId::TwilioSid, SecretGroup::PhoneVerification, false),
    entry(SecretId::TwilioVerifySid, SecretGroup::PhoneVerification, false),
    entry(SecretId::DreamKey, SecretGroup::Misc, false),
    entry(SecretId::NewsApiKey, SecretGroup::Misc, false),
    entry(SecretId::GiphyKey, SecretGroup::Misc, false),
    entry(SecretId::TwitterApiKeyJson, SecretGroup::Misc, false),
    entry(SecretId::DestinyApiKey, SecretGroup::Misc, false),
    entry(SecretId::FbAccessToken, SecretGroup::Misc, false),
    entry(SecretId::GeodbApiKey, SecretGroup::Misc, false),
    entry(SecretId::SportsdbKey, SecretGroup::Misc, false),
    entry(SecretId::SchedulerAuthPassword, SecretGroup::Scheduler, true),
];

/// The ordered set of recognized secrets and their enablement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretCatalog {
    entries: Vec<SecretDescriptor>,
}

impl Default for SecretCatalog {
    fn default() -> Self {
        Self {
            entries: DEFAULT_SECRETS.to_vec(),
        }
    }
}

impl SecretCatalog {
    /// Default catalog with `ids` additionally enabled.
    pub fn with_enabled(ids: impl IntoIterator<Item = SecretId>) -> Self {
        let mut catalog = Self::default();
        for id in ids {
            catalog.set_enabled(id, true);
        }
        catalog
    }

    pub fn set_enabled(&mut self, id: SecretId, enabled: bool) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, id: SecretId) -> bool {
        self.entries.iter().any(|e| e.id == id && e.enabled)
    }

    /// Enabled ids in catalog order.
    pub fn enabled_ids(&self) -> Vec<SecretId> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.id)
            .collect()
    }

    pub fn required_ids(&self) -> Vec<SecretId> {
        self.entries
            .iter()
            .filter(|e| e.enabled && e.required)
            .map(|e| e.id)
            .collect()
    }

    /// The group `id` belongs to.
    pub fn group_of(&self, id: SecretId) -> Option<SecretGroup> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.group)
    }

    /// Ids in `group`, in catalog order.
    pub fn ids_in_group(&self, group: SecretGroup) -> Vec<SecretId> {
        self.entries
            .iter()
            .filter(|e| e.group == group)
            .map(|e| e.id)
            .collect()
    }

    pub fn descriptors(&self) -> &[SecretDescriptor] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enabled_ids() {
        let catalog = SecretCatalog::default();
        assert_eq!(
            catalog.enabled_ids(),
            vec![SecretId::ApiSecret, SecretId::SchedulerAuthPassword]
        );
        assert_eq!(catalog.required_ids(), vec![SecretId::ApiSecret]);
    }

    #[test]
    fn test_catalog_covers_every_id_once() {
        let catalog = SecretCatalog::default();
        assert_eq!(catalog.descriptors().len(), SecretId::ALL.len());
        for id in SecretId::ALL {
            assert_eq!(
                catalog.descriptors().iter().filter(|e| e.id == *id).count(),
                1,
                "{} should appear once",
                id
            );
        }
    }

    #[test]
    fn test_with_enabled_keeps_catalog_order() {
        let catalog = SecretCatalog::with_enabled([SecretId::StripeApiKey, SecretId::MailgunKey]);
        assert_eq!(
            catalog.enabled_ids(),
            vec![
                SecretId::ApiSecret,
                SecretId::MailgunKey,
                SecretId::StripeApiKey,
                SecretId::SchedulerAuthPassword,
            ]
        );
    }

    #[test]
    fn test_disable_default_entry() {
        let mut catalog = SecretCatalog::default();
        catalog.set_enabled(SecretId::SchedulerAuthPassword, false);
        assert!(!catalog.is_enabled(SecretId::SchedulerAuthPassword));
        assert_eq!(catalog.enabled_ids(), vec![SecretId::ApiSecret]);
    }

    #[test]
    fn test_groups() {
        let catalog = SecretCatalog::default();
        assert_eq!(catalog.group_of(SecretId::ApiSecret), Some(SecretGroup::Core));
        assert_eq!(
            catalog.group_of(SecretId::TwilioVerifySid),
            Some(SecretGroup::PhoneVerification)
        );
        assert_eq!(
            catalog.ids_in_group(SecretGroup::Payments),
            vec![SecretId::StripeApiKey, SecretId::StripeWebhookSecret]
        );
        assert_eq!(SecretGroup::PhoneVerification.to_string(), "phone-verification");
    }

    #[test]
    fn test_secret_id_from_str() {
        assert_eq!("API_SECRET".parse::<SecretId>(), Ok(SecretId::ApiSecret));
        assert_eq!(
            " stripe_webhooksecret ".parse::<SecretId>(),
            Ok(SecretId::StripeWebhookSecret)
        );
        assert!("NOT_A_SECRET".parse::<SecretId>().is_err());
    }

    #[test]
    fn test_secret_id_display_is_env_name() {
        assert_eq!(SecretId::GiphyKey.to_string(), "REACT_APP_GIPHY_KEY");
    }
}
