use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "`Cargo.toml` not found in {}, please ensure that the source directory is set correctly",
        .0.display()
    )]
    ManifestNotFound(PathBuf),

    #[error("failed to parse {}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse settings file {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cargo not found, did you install rust? https://www.rust-lang.org/tools/install")]
    CargoNotFound,

    #[error("rustup not found, did you install rust? https://www.rust-lang.org/tools/install")]
    RustupNotFound,

    #[error("`cargo --version` failed:\n{0}")]
    CargoProbeFailed(String),

    #[error("`rustup target list` failed:\n{0}")]
    RustupProbeFailed(String),

    #[error("failed to install cargo-ndk:\n{0}")]
    HelperInstallFailed(String),

    #[error("failed to install targets {}:\n{output}", .targets.join(", "))]
    TargetInstallFailed { targets: Vec<String>, output: String },

    #[error("no known ABI in filter [{}], nothing to build", .filter.join(", "))]
    NoTargets { filter: Vec<String> },

    #[error("cargo-ndk failed to run, please check the error message: {0}")]
    CompileFailed(String),

    #[error("cargo clean failed: {0}")]
    CleanFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
