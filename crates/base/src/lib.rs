pub mod consts;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use directories::ProjectDirs;

pub const PROJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub static PROJECT_SEMVER: LazyLock<semver::Version> = LazyLock::new(|| {
    semver::Version::parse(PROJECT_VERSION).unwrap_or(semver::Version {
        major: 0,
        minor: 0,
        patch: 0,
        pre: semver::Prerelease::EMPTY,
        build: semver::BuildMetadata::EMPTY,
    })
});

pub const PROJECT_NAME: &str = "vigil";

pub const CLI_PROGRAM_NAME: &str = "vigil";
pub const CLI_CONFIG_NAME: &str = "config.yaml";

pub static PROJECT_CONFIG_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .map_or_else(|| PathBuf::from(format!(".{PROJECT_NAME}")), |dirs| {
            dirs.config_dir().to_path_buf()
        })
});

#[must_use]
pub fn fallback_project_config_directories() -> Vec<PathBuf> {
    let Some(user_dirs) = directories::UserDirs::new() else {
        return Vec::new();
    };
    vec![
        [user_dirs.home_dir(), Path::new(".config"), Path::new(PROJECT_NAME)].iter().collect(),
        [user_dirs.home_dir(), Path::new(&format!(".{PROJECT_NAME}"))].iter().collect(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_semver_matches_package_version() {
        assert_eq!(PROJECT_SEMVER.to_string(), PROJECT_VERSION);
    }

    #[test]
    fn test_fallback_directories_end_with_project_name() {
        for dir in fallback_project_config_directories() {
            let name = dir.file_name().and_then(|name| name.to_str()).unwrap_or_default();
            assert!(name.ends_with(PROJECT_NAME), "unexpected directory {}", dir.display());
        }
    }
}
