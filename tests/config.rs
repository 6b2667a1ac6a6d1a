// ABOUTME: Integration tests for service configuration parsing.
// ABOUTME: Tests YAML defaults, overrides, and validation errors.

use eikona::config::*;

mod parsing {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ServiceConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.wildcard_group, DEFAULT_WILDCARD_GROUP);
        assert_eq!(config.capabilities.share_own, "/api/image/share");
        assert_eq!(config.capabilities.share_received, "/api/image/shareReceived");
        assert_eq!(config.capabilities.terminate_own, "/api/image/terminate");
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
wildcard_group: everyone

capabilities:
  share_own: /permissions/image/share
  share_received: /permissions/image/reshare
  terminate_own: /permissions/image/terminate
"#;
        let config = ServiceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.wildcard_group, "everyone");
        assert_eq!(config.capabilities.share_own, "/permissions/image/share");
        assert_eq!(
            config.capabilities.share_received,
            "/permissions/image/reshare"
        );
        assert_eq!(
            config.capabilities.terminate_own,
            "/permissions/image/terminate"
        );
    }

    #[test]
    fn partial_capabilities_keep_other_defaults() {
        let yaml = r#"
capabilities:
  terminate_own: /custom/terminate
"#;
        let config = ServiceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.capabilities.terminate_own, "/custom/terminate");
        assert_eq!(config.capabilities.share_own, "/api/image/share");
        assert_eq!(config.wildcard_group, DEFAULT_WILDCARD_GROUP);
    }

    #[test]
    fn unknown_field_returns_error() {
        let yaml = r#"
wildcard_group: everyone
wildcard: typo
"#;
        let err = ServiceConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("wildcard"));
    }

    #[test]
    fn empty_wildcard_group_returns_error() {
        let err = ServiceConfig::from_yaml("wildcard_group: \"\"").unwrap_err();
        assert!(err.to_string().contains("wildcard_group"));
    }

    #[test]
    fn empty_capability_key_returns_error() {
        let yaml = r#"
capabilities:
  share_own: ""
"#;
        let err = ServiceConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("capability"));
    }
}

mod loading {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_a_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wildcard_group: everyone").unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.wildcard_group, "everyone");
        assert_eq!(config.capabilities, CapabilityKeys::default());
    }

    #[test]
    fn missing_file_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServiceConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, eikona::error::Error::Io(_)));
    }
}
