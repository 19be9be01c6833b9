//! The two entry points a host build calls: [`compile`] and [`clean`].
//!
//! Both are synchronous and stop at the first fatal error. Nothing is retried.

use std::path::Path;

use crate::cargo::{CompileRequest, clean_invocation, compile_invocation};
use crate::error::{Error, Result};
use crate::exec::Exec;
use crate::manifest::CargoToml;
use crate::shell::Shell;
use crate::toolchain::{ensure_compiler_ready, ensure_toolchain_ready};

/// Warns when the manifest will not produce a library Android can load.
pub fn check_manifest(shell: &mut Shell, cargo_toml: &CargoToml) -> Result<()> {
    if !cargo_toml.builds_cdylib() {
        shell.warn(format!(
            "`{}` does not list `cdylib` in `[lib] crate-type`, no shared library will be produced",
            cargo_toml.package.name
        ))?;
        shell.note("add `crate-type = [\"cdylib\"]` under `[lib]` in Cargo.toml")?;
    }
    Ok(())
}

/// Checks the toolchain, then runs `cargo ndk` once for every target in `request`.
pub fn compile<E: Exec + ?Sized>(
    exec: &mut E,
    shell: &mut Shell,
    request: &CompileRequest,
) -> Result<()> {
    ensure_compiler_ready(exec, shell)?;
    ensure_toolchain_ready(exec, shell, &request.targets)?;

    std::fs::create_dir_all(&request.output_dir)?;

    let invocation = compile_invocation(request);
    shell.status(
        "Compiling",
        format!(
            "{} [{}]",
            request.variant,
            request
                .targets
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    )?;
    shell.status("Running", format!("`{invocation}`"))?;
    shell.very_verbose(|shell| {
        for (key, value) in &request.environment {
            shell.status_with_color("Env", format!("{key}={value}"), termcolor::Color::Cyan)?;
        }
        Ok(())
    })?;

    let out = exec
        .stream(&invocation)
        .map_err(|e| Error::CompileFailed(e.to_string()))?;
    if !out.success() {
        return Err(Error::CompileFailed(out.stderr_lossy()));
    }

    Ok(())
}

/// Runs `cargo clean` in `source_dir` when `clean_target` is set; otherwise does nothing.
pub fn clean<E: Exec + ?Sized>(
    exec: &mut E,
    shell: &mut Shell,
    source_dir: &Path,
    clean_target: bool,
) -> Result<()> {
    if !clean_target {
        shell.verbose(|shell| shell.note("clean-target is off, leaving cargo's target directory"))?;
        return Ok(());
    }

    let invocation = clean_invocation(source_dir);
    shell.status("Cleaning", source_dir.display())?;
    shell.verbose(|shell| shell.status("Running", format!("`{invocation}`")))?;

    let out = exec
        .stream(&invocation)
        .map_err(|e| Error::CleanFailed(e.to_string()))?;
    if !out.success() {
        return Err(Error::CleanFailed(out.stderr_lossy()));
    }

    Ok(())
}
