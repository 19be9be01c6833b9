//! Checks that `cargo`, `cargo-ndk` and the Android rustup targets are
//! available, installing what can be installed.
//!
//! Nothing here is cached: toolchains change between builds, so every call
//! asks again.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::exec::{Exec, Invocation, Probe, probe};
use crate::meta::Target;
use crate::shell::Shell;

pub fn cargo_version() -> Invocation {
    Invocation::new("cargo").arg("--version")
}

pub fn cargo_ndk_version() -> Invocation {
    Invocation::new("cargo").args(["ndk", "--version"])
}

pub fn cargo_ndk_install() -> Invocation {
    Invocation::new("cargo").args(["install", "cargo-ndk"])
}

pub fn rustup_target_list() -> Invocation {
    Invocation::new("rustup").args(["target", "list"])
}

pub fn rustup_target_add<'a>(triples: impl IntoIterator<Item = &'a str>) -> Invocation {
    Invocation::new("rustup").args(["target", "add"]).args(triples)
}

/// Makes sure `cargo` runs and `cargo ndk` is installed.
///
/// A missing or failing `cargo` is fatal. A missing `cargo-ndk` is installed once with
/// `cargo install`.
pub fn ensure_compiler_ready<E: Exec + ?Sized>(exec: &mut E, shell: &mut Shell) -> Result<()> {
    match probe(exec, &cargo_version()) {
        Probe::Ready(out) => {
            shell.verbose(|shell| {
                shell.status_with_color(
                    "Found",
                    String::from_utf8_lossy(&out.stdout).trim(),
                    termcolor::Color::Cyan,
                )
            })?;
        }
        Probe::Missing => return Err(Error::CargoNotFound),
        Probe::ProbeFailed(reason) => return Err(Error::CargoProbeFailed(reason)),
    }

    match probe(exec, &cargo_ndk_version()) {
        Probe::Ready(out) => {
            shell.verbose(|shell| {
                shell.status_with_color(
                    "Found",
                    String::from_utf8_lossy(&out.stdout).trim(),
                    termcolor::Color::Cyan,
                )
            })?;
        }
        failed => {
            if let Probe::ProbeFailed(reason) = &failed {
                shell.verbose(|shell| shell.note(format!("`cargo ndk --version` failed: {reason}")))?;
            }
            shell.status("Installing", "cargo-ndk")?;
            let install = cargo_ndk_install();
            let out = exec
                .stream(&install)
                .map_err(|e| Error::HelperInstallFailed(format!("`{install}`: {e}")))?;
            if !out.success() {
                return Err(Error::HelperInstallFailed(out.stderr_lossy()));
            }
        }
    }

    Ok(())
}

/// Triples that `rustup target list` reports as `(installed)`.
pub fn parse_installed_targets(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter_map(|line| line.trim().strip_suffix("(installed)"))
        .map(|triple| triple.trim().to_string())
        .filter(|triple| !triple.is_empty())
        .collect()
}

/// Required targets whose triple is not installed, in `required` order.
pub fn missing_targets(required: &[Target], installed: &BTreeSet<String>) -> Vec<Target> {
    required
        .iter()
        .copied()
        .filter(|t| !installed.contains(t.triple()))
        .collect()
}

/// Installs, in a single `rustup target add`, every target in `required` that
/// is not already installed.
pub fn ensure_toolchain_ready<E: Exec + ?Sized>(
    exec: &mut E,
    shell: &mut Shell,
    required: &[Target],
) -> Result<()> {
    let listing = match probe(exec, &rustup_target_list()) {
        Probe::Ready(out) => out.combined(),
        Probe::Missing => return Err(Error::RustupNotFound),
        Probe::ProbeFailed(reason) => return Err(Error::RustupProbeFailed(reason)),
    };

    let installed = parse_installed_targets(&listing);
    let missing = missing_targets(required, &installed);
    if missing.is_empty() {
        return Ok(());
    }

    let triples = missing.iter().map(|t| t.triple()).collect::<Vec<_>>();
    shell.status("Installing", format!("missing targets: {}", triples.join(", ")))?;
    shell.note(format!(
        "if this is slow, you can run `rustup target add {}` manually",
        triples.join(" ")
    ))?;

    let add = rustup_target_add(triples.iter().copied());
    let failed = |output| Error::TargetInstallFailed {
        targets: triples.iter().map(|t| t.to_string()).collect(),
        output,
    };
    let out = exec
        .stream(&add)
        .map_err(|e| failed(format!("`{add}`: {e}")))?;
    if !out.success() {
        return Err(failed(out.stderr_lossy()));
    }

    Ok(())
}
