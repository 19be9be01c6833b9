use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cargo::{CompileRequest, DEFAULT_PLATFORM, variant_format};
use crate::error::{Error, Result};
use crate::manifest::{self, CargoToml};
use crate::meta::resolve_targets;

/// Looked up in the project directory when no settings file is given.
pub const SETTINGS_FILE: &str = "cargondk.toml";

/// Build settings, as read from `cargondk.toml`.
///
/// Relative `source` and `build-dir` are resolved against the project
/// directory, `manifest-path` against `source`, and `output` against
/// `build-dir`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub source: PathBuf,
    pub manifest_path: PathBuf,
    /// May contain `{variant}` and `{Variant}`.
    pub output: String,
    pub build_dir: PathBuf,
    pub platform: u8,
    pub environment: BTreeMap<String, String>,
    pub args: Vec<String>,
    pub abi_filters: Vec<String>,
    pub clean_target: bool,
    /// Issue the compile even when no filter entry names a known ABI.
    pub allow_empty_targets: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: "src/main/rust".into(),
            manifest_path: "Cargo.toml".into(),
            output: "intermediates/merged_native_libs/{variant}/merge{Variant}NativeLibs/out/lib"
                .into(),
            build_dir: "build".into(),
            platform: DEFAULT_PLATFORM,
            environment: BTreeMap::new(),
            args: Vec::new(),
            abi_filters: Vec::new(),
            clean_target: false,
            allow_empty_targets: false,
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

impl Settings {
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `explicit` if given. Otherwise reads `cargondk.toml` from
    /// `project_dir` when present, and falls back to the defaults.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => resolve(project_dir, path),
            None => {
                let path = project_dir.join(SETTINGS_FILE);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let text = std::fs::read_to_string(&path)?;
        Self::parse(&path, &text)
    }

    pub fn source_dir(&self, project_dir: &Path) -> PathBuf {
        resolve(project_dir, &self.source)
    }

    pub fn output_dir(&self, project_dir: &Path, variant: &str) -> PathBuf {
        let build_dir = resolve(project_dir, &self.build_dir);
        resolve(&build_dir, Path::new(&variant_format(&self.output, variant)))
    }

    /// Builds the request for `variant` and the parsed manifest.
    ///
    /// Fails before anything is spawned when the manifest is missing, or when
    /// no known ABI is selected and `allow-empty-targets` is off.
    pub fn compile_request(
        &self,
        project_dir: &Path,
        variant: &str,
    ) -> Result<(CompileRequest, CargoToml)> {
        let source_dir = self.source_dir(project_dir);
        let manifest_path = manifest::locate(&source_dir, &self.manifest_path)?;
        let cargo_toml = CargoToml::read(&manifest_path)?;

        let targets = resolve_targets(self.abi_filters.as_slice());
        if targets.is_empty() && !self.allow_empty_targets {
            return Err(Error::NoTargets {
                filter: self.abi_filters.clone(),
            });
        }

        let request = CompileRequest {
            variant: variant.to_string(),
            targets,
            output_dir: self.output_dir(project_dir, variant),
            source_dir,
            manifest_path,
            platform: self.platform,
            args: self.args.clone(),
            environment: self.environment.clone(),
        };

        Ok((request, cargo_toml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::Target;

    const MANIFEST: &str = "[package]\nname = \"rust_native\"\nversion = \"0.1.0\"\nedition = \"2024\"\n\n[lib]\ncrate-type = [\"cdylib\"]\n";

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src/main/rust");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("Cargo.toml"), MANIFEST).unwrap();
        dir
    }

    #[test]
    fn defaults_match_android_layout() {
        let settings = Settings::default();
        assert_eq!(settings.platform, 21);
        assert!(!settings.clean_target);
        assert_eq!(
            settings.output_dir(Path::new("/app"), "debug"),
            Path::new("/app/build/intermediates/merged_native_libs/debug/mergeDebugNativeLibs/out/lib")
        );
    }

    #[test]
    fn parses_partial_file() {
        let text = r#"
platform = 24
abi-filters = ["arm64-v8a"]
args = ["--link-libcxx-shared"]
clean-target = true

[environment]
CARGO_NDK_LINK_BUILTINS = "1"
"#;
        let settings = Settings::parse(Path::new("cargondk.toml"), text).unwrap();
        assert_eq!(settings.platform, 24);
        assert_eq!(settings.abi_filters, ["arm64-v8a"]);
        assert_eq!(settings.args, ["--link-libcxx-shared"]);
        assert!(settings.clean_target);
        assert_eq!(settings.environment["CARGO_NDK_LINK_BUILTINS"], "1");
        assert_eq!(settings.source, Path::new("src/main/rust"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Settings::parse(Path::new("cargondk.toml"), "platfrom = 21").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        // The toml detail lives only in the source chain.
        assert_eq!(err.to_string(), "failed to parse settings file cargondk.toml");
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("unknown field `platfrom`"));
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path(), None).unwrap(), Settings::default());
    }

    #[test]
    fn load_reads_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "platform = 30\n").unwrap();
        assert_eq!(Settings::load(dir.path(), None).unwrap().platform, 30);
    }

    #[test]
    fn absolute_output_is_kept() {
        let settings = Settings {
            output: "/tmp/jniLibs/{variant}".into(),
            ..Settings::default()
        };
        assert_eq!(
            settings.output_dir(Path::new("/app"), "release"),
            Path::new("/tmp/jniLibs/release")
        );
    }

    #[test]
    fn request_resolves_paths_and_targets() {
        let dir = project();
        let settings = Settings {
            abi_filters: vec!["x86".into(), "mips".into(), "arm64-v8a".into()],
            ..Settings::default()
        };
        let (request, cargo_toml) = settings.compile_request(dir.path(), "release").unwrap();

        assert_eq!(request.targets, [Target::Arm64V8a, Target::X86]);
        assert!(request.manifest_path.is_absolute());
        assert!(request.source_dir.ends_with("src/main/rust"));
        assert!(request
            .output_dir
            .ends_with("build/intermediates/merged_native_libs/release/mergeReleaseNativeLibs/out/lib"));
        assert_eq!(cargo_toml.package.name, "rust_native");
    }

    #[test]
    fn missing_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::default()
            .compile_request(dir.path(), "debug")
            .unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound(_)));
    }

    #[test]
    fn no_known_abi_is_an_error_unless_allowed() {
        let dir = project();
        let mut settings = Settings {
            abi_filters: vec!["mips".into()],
            ..Settings::default()
        };
        let err = settings.compile_request(dir.path(), "debug").unwrap_err();
        assert!(matches!(err, Error::NoTargets { .. }));

        settings.allow_empty_targets = true;
        let (request, _) = settings.compile_request(dir.path(), "debug").unwrap();
        assert!(request.targets.is_empty());
    }
}
