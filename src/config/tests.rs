#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.email, "noreply@example.com");
        assert!(config.default_registry.is_none());
        assert!(config.registries.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
namespace = "dev"
default_registry = "https://index.docker.io/v1/"

[registries."ghcr.io"]
username = "me"
password = "token"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.email, "noreply@example.com");
        assert_eq!(config.namespace.as_deref(), Some("dev"));

        let entries = config.registry_entries();
        assert_eq!(entries["ghcr.io"].username.as_deref(), Some("me"));
        assert_eq!(entries["ghcr.io"].password.as_deref(), Some("token"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_docker_io_table_matches_default_registry() {
        use crate::auth::{CredentialResolver, StaticCredentialSource};
        use crate::reference::{extract_registry_host, StaticDefaultRegistry};

        let config: Config = toml::from_str(
            r#"
[registries."docker.io"]
username = "hub"
password = "secret"
"#,
        )
        .unwrap();

        let source = StaticCredentialSource::new(config.registry_entries());
        let registry = StaticDefaultRegistry::default();
        for image in ["nginx", "docker.io/library/nginx"] {
            let host = extract_registry_host(image, &registry).unwrap();
            let credentials = CredentialResolver::new(&source).resolve(&host, true).unwrap();
            assert_eq!(credentials.username, "hub");
            assert_eq!(credentials.secret, "secret");
        }
    }
}
