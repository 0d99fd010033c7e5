//! Environment-sourced settings.
//!
//! Layering (later wins):
//! 1. [`Settings::default`]
//! 2. Raw environment variables (`AITABLE_API_URL`, `PORT`, ...), matched
//!    case-insensitively against the field names.
//!
//! Required values are checked after extraction so that a blank variable is
//! reported the same way as an unset one.

use std::fmt;

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROFILE_COLLECTION: &str = "user";

/// Environment variables read by [`Settings::figment`].
pub const ENV_KEYS: [&str; 8] = [
    "AITABLE_API_URL",
    "PATCH_URL",
    "AITABLE_TOKEN",
    "FIREBASE_SERVICE_ACCOUNT_BASE64",
    "PORT",
    "PROFILE_COLLECTION",
    "FIREBASE_AUTH_EMULATOR_HOST",
    "FIRESTORE_EMULATOR_HOST",
];

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Records endpoint of the source table (`GET`).
    #[serde(deserialize_with = "scalar_string")]
    pub aitable_api_url: String,
    /// Records endpoint used for write-back (`PATCH`).
    #[serde(deserialize_with = "scalar_string")]
    pub patch_url: String,
    #[serde(deserialize_with = "scalar_string")]
    pub aitable_token: String,
    /// Base64-encoded Firebase service-account JSON.
    #[serde(deserialize_with = "scalar_string")]
    pub firebase_service_account_base64: String,
    pub port: u16,
    #[serde(deserialize_with = "scalar_string")]
    pub profile_collection: String,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub firebase_auth_emulator_host: Option<String>,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub firestore_emulator_host: Option<String>,
}

// Env values are parsed before extraction, so `AITABLE_TOKEN=123456` arrives
// as a number and `PROFILE_COLLECTION=true` as a bool. String settings take
// any scalar and keep its text.
struct ScalarText(String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;

        impl de::Visitor<'_> for Visitor {
            type Value = ScalarText;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ScalarText, E> {
                Ok(ScalarText(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ScalarText, E> {
                Ok(ScalarText(v.to_string()))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    ScalarText::deserialize(deserializer).map(|text| text.0)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<ScalarText>::deserialize(deserializer).map(|text| text.map(|t| t.0))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            aitable_api_url: String::new(),
            patch_url: String::new(),
            aitable_token: String::new(),
            firebase_service_account_base64: String::new(),
            port: DEFAULT_PORT,
            profile_collection: DEFAULT_PROFILE_COLLECTION.to_string(),
            firebase_auth_emulator_host: None,
            firestore_emulator_host: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("aitable_api_url", &self.aitable_api_url)
            .field("patch_url", &self.patch_url)
            .field("aitable_token", &"<redacted>")
            .field("firebase_service_account_base64", &"<redacted>")
            .field("port", &self.port)
            .field("profile_collection", &self.profile_collection)
            .field("firebase_auth_emulator_host", &self.firebase_auth_emulator_host)
            .field("firestore_emulator_host", &self.firestore_emulator_host)
            .finish()
    }
}

impl Settings {
    /// Defaults merged with the process environment.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Env::raw().only(&ENV_KEYS))
    }

    /// Load and validate settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Extract and validate settings from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let mut settings: Settings = figment.extract().map_err(Box::new)?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    fn normalize(&mut self) {
        for host in [
            &mut self.firebase_auth_emulator_host,
            &mut self.firestore_emulator_host,
        ] {
            if host.as_deref().is_some_and(|h| h.trim().is_empty()) {
                *host = None;
            }
        }
        if self.profile_collection.trim().is_empty() {
            self.profile_collection = DEFAULT_PROFILE_COLLECTION.to_string();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("AITABLE_API_URL", &self.aitable_api_url),
            ("PATCH_URL", &self.patch_url),
            ("AITABLE_TOKEN", &self.aitable_token),
            (
                "FIREBASE_SERVICE_ACCOUNT_BASE64",
                &self.firebase_service_account_base64,
            ),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let settings = Settings {
            aitable_token: "tok-secret".into(),
            firebase_service_account_base64: "c2VjcmV0".into(),
            ..Settings::default()
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("tok-secret"));
        assert!(!rendered.contains("c2VjcmV0"));
    }

    #[test]
    fn defaults_fail_validation_on_first_required_key() {
        let err = Settings::from_figment(
            Figment::new().merge(Serialized::defaults(Settings::default())),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AITABLE_API_URL")), "got: {err}");
    }
}
