use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::exec::Invocation;
use crate::meta::Target;

pub const DEFAULT_PLATFORM: u8 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Debug,
    Release,
}

impl Profile {
    /// `release` builds with `--release`; every other variant name is a debug build.
    pub fn from_variant(variant: &str) -> Self {
        if variant == "release" {
            Profile::Release
        } else {
            Profile::Debug
        }
    }

    fn build_args(self) -> &'static [&'static str] {
        match self {
            Profile::Debug => &["build"],
            Profile::Release => &["build", "--release"],
        }
    }
}

/// Substitutes `{variant}` with `variant` and `{Variant}` with its capitalized form.
pub fn variant_format(template: &str, variant: &str) -> String {
    let mut chars = variant.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    template
        .replace("{variant}", variant)
        .replace("{Variant}", &capitalized)
}

/// Everything needed to compile one build variant.
///
/// Two requests running at the same time must not share `output_dir`.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub variant: String,
    pub targets: Vec<Target>,
    pub source_dir: PathBuf,
    /// Absolute.
    pub manifest_path: PathBuf,
    pub output_dir: PathBuf,
    pub platform: u8,
    /// Passed to `cargo ndk` before the build subcommand.
    pub args: Vec<String>,
    pub environment: BTreeMap<String, String>,
}

impl CompileRequest {
    pub fn profile(&self) -> Profile {
        Profile::from_variant(&self.variant)
    }
}

/// The single `cargo ndk ... build` invocation that produces every target.
pub fn compile_invocation(request: &CompileRequest) -> Invocation {
    let mut cmd = Invocation::new("cargo").arg("ndk");

    for target in &request.targets {
        cmd = cmd.arg("--target").arg(target.triple());
    }

    cmd = cmd
        .arg("--output-dir")
        .arg(&request.output_dir)
        .arg("--platform")
        .arg(request.platform.to_string())
        .arg("--manifest-path")
        .arg(&request.manifest_path);

    cmd = cmd.args(&request.args).args(request.profile().build_args());

    for (key, value) in &request.environment {
        cmd = cmd.env(key, value);
    }

    cmd.current_dir(&request.source_dir)
}

pub fn clean_invocation(source_dir: &Path) -> Invocation {
    Invocation::new("cargo").arg("clean").current_dir(source_dir)
}
