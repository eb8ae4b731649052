/// Build information captured at compile time by `build.rs`
pub struct BuildInfo;

impl BuildInfo {
    /// Get the package version from Cargo.toml
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Get the build timestamp in YYYYMMDD.HHMMSS format
    pub fn build_timestamp() -> &'static str {
        env!("BUILD_TIMESTAMP")
    }

    /// Get the short git commit hash (first 7 characters)
    pub fn git_hash_short() -> &'static str {
        env!("GIT_HASH_SHORT")
    }

    /// Get the target platform (arch-os)
    pub fn target_platform() -> &'static str {
        env!("TARGET_PLATFORM")
    }

    /// Get the build profile (debug/release)
    pub fn build_profile() -> &'static str {
        env!("BUILD_PROFILE")
    }

    /// Long version string shown by `labelkit --version`
    pub const LONG_VERSION: &'static str = concat!(
        env!("CARGO_PKG_VERSION"),
        "\nBuild: ",
        env!("BUILD_TIMESTAMP"),
        "\nCommit: ",
        env!("GIT_HASH_SHORT"),
        "\nPlatform: ",
        env!("TARGET_PLATFORM"),
        "\nProfile: ",
        env!("BUILD_PROFILE"),
    );

    /// One-line summary logged at startup
    pub fn display_version() -> String {
        format!(
            "{} ({}, {}, {} {})",
            Self::version(),
            Self::build_timestamp(),
            Self::git_hash_short(),
            Self::target_platform(),
            Self::build_profile()
        )
    }
}
