/// Registry address constants
pub mod registry {
    /// Docker Hub index server, the default registry when a daemon can't be asked
    pub const INDEX_SERVER: &str = "https://index.docker.io/v1/";

    /// Hostnames that all refer to Docker Hub
    pub const DOCKER_HUB_ALIASES: &[&str] = &[
        "docker.io",
        "index.docker.io",
        "registry-1.docker.io",
        "hub.docker.com",
    ];

    /// Explicit registry segment that has no dot or port
    pub const LOCALHOST: &str = "localhost";
}

/// Kubernetes secret constants
pub mod secret {
    /// Secret type consumed by the kubelet for image pulls
    pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";

    /// Data key holding the docker config json document
    pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

    /// Email written into payloads when none is configured
    pub const DEFAULT_EMAIL: &str = "noreply@example.com";
}

/// Test image naming constants
pub mod image {
    /// Basename of the publicly pullable test image
    pub const PUBLIC_TEST_IMAGE: &str = "public-test-image";

    /// Basename of the test image that needs a pull secret
    pub const PRIVATE_TEST_IMAGE: &str = "private-test-image";

    /// Repository prefix used for GitHub Container Registry test images
    pub const GITHUB_TEST_REPOSITORY: &str = "ghcr.io/imjasonh/pullsecret/";
}
