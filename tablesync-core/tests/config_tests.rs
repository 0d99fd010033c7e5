//! Settings loading from the environment, isolated with `figment::Jail`.

use figment::Jail;
use tablesync_core::{config::DEFAULT_PORT, ConfigError, Settings};

fn set_required(jail: &mut Jail) {
    jail.set_env("AITABLE_API_URL", "https://aitable.test/fusion/v1/datasheets/dst1/records");
    jail.set_env("PATCH_URL", "https://aitable.test/fusion/v1/datasheets/dst1/records");
    jail.set_env("AITABLE_TOKEN", "uskTOKEN");
    jail.set_env("FIREBASE_SERVICE_ACCOUNT_BASE64", "e30=");
}

#[test]
fn loads_required_values_and_defaults() {
    Jail::expect_with(|jail| {
        set_required(jail);
        let settings = Settings::from_env().expect("settings");
        assert_eq!(settings.aitable_token, "uskTOKEN");
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.profile_collection, "user");
        assert!(settings.firebase_auth_emulator_host.is_none());
        assert!(settings.firestore_emulator_host.is_none());
        Ok(())
    });
}

#[test]
fn port_and_collection_are_overridable() {
    Jail::expect_with(|jail| {
        set_required(jail);
        jail.set_env("PORT", "8088");
        jail.set_env("PROFILE_COLLECTION", "members");
        jail.set_env("FIRESTORE_EMULATOR_HOST", "127.0.0.1:8080");
        let settings = Settings::from_env().expect("settings");
        assert_eq!(settings.port, 8088);
        assert_eq!(settings.profile_collection, "members");
        assert_eq!(
            settings.firestore_emulator_host.as_deref(),
            Some("127.0.0.1:8080")
        );
        Ok(())
    });
}

#[test]
fn blank_required_value_is_reported_by_name() {
    Jail::expect_with(|jail| {
        set_required(jail);
        jail.set_env("AITABLE_TOKEN", "   ");
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AITABLE_TOKEN")), "got: {err}");
        assert!(err.to_string().contains("AITABLE_TOKEN"));
        Ok(())
    });
}

#[test]
fn unset_patch_url_is_missing() {
    Jail::expect_with(|jail| {
        jail.set_env("AITABLE_API_URL", "https://aitable.test/records");
        jail.set_env("AITABLE_TOKEN", "uskTOKEN");
        jail.set_env("FIREBASE_SERVICE_ACCOUNT_BASE64", "e30=");
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PATCH_URL")), "got: {err}");
        Ok(())
    });
}

#[test]
fn invalid_port_is_a_figment_error() {
    Jail::expect_with(|jail| {
        set_required(jail);
        jail.set_env("PORT", "not-a-port");
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)), "got: {err}");
        Ok(())
    });
}

#[test]
fn blank_emulator_host_is_ignored() {
    Jail::expect_with(|jail| {
        set_required(jail);
        jail.set_env("FIREBASE_AUTH_EMULATOR_HOST", "");
        let settings = Settings::from_env().expect("settings");
        assert!(settings.firebase_auth_emulator_host.is_none());
        Ok(())
    });
}

#[test]
fn numeric_token_and_collection_load_as_text() {
    Jail::expect_with(|jail| {
        set_required(jail);
        jail.set_env("AITABLE_TOKEN", "123456");
        jail.set_env("PROFILE_COLLECTION", "2024");
        jail.set_env("FIRESTORE_EMULATOR_HOST", "8080");
        let settings = Settings::from_env().expect("settings");
        assert_eq!(settings.aitable_token, "123456");
        assert_eq!(settings.profile_collection, "2024");
        assert_eq!(settings.firestore_emulator_host.as_deref(), Some("8080"));
        Ok(())
    });
}

#[test]
fn boolean_looking_token_loads_as_text() {
    Jail::expect_with(|jail| {
        set_required(jail);
        jail.set_env("AITABLE_TOKEN", "true");
        let settings = Settings::from_env().expect("settings");
        assert_eq!(settings.aitable_token, "true");
        Ok(())
    });
}
