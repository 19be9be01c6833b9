use std::{env, path::PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{
    config::Settings,
    shell::{Shell, Verbosity},
};

pub mod clean;
pub mod compile;
pub mod plan;

#[derive(Debug, Parser)]
#[command(
    name = "cargondk",
    version,
    about = "Compiles a Rust library for an Android build variant using cargo-ndk"
)]
struct Cli {
    /// Use verbose output (-vv very verbose)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Do not print cargondk status messages
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, value_name = "WHEN", global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the native libraries for one variant
    Compile(compile::CompileArgs),
    /// Run `cargo clean` in the Rust source directory if clean-target is set
    Clean(clean::CleanArgs),
    /// Print the targets and the cargo-ndk command for a variant without running anything
    Plan(plan::PlanArgs),
}

/// Where the project lives and which settings file to read.
#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Android module directory [default: current directory]
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Settings file [default: <project-dir>/cargondk.toml if present]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Rust source directory, relative to the project directory
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,
}

impl ProjectArgs {
    fn project_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dunce::canonicalize(dir)?),
            None => Ok(env::current_dir()?),
        }
    }

    /// Loads the settings file and applies the command line on top of it.
    fn settings(&self) -> anyhow::Result<(PathBuf, Settings)> {
        let project_dir = self.project_dir()?;
        let mut settings = Settings::load(&project_dir, self.config.as_deref())?;
        if let Some(source) = &self.source {
            settings.source = source.clone();
        }
        Ok((project_dir, settings))
    }
}

/// Options that shape a compile request.
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Build variant name, e.g. debug or release
    #[arg(long)]
    variant: String,

    /// ABI to build (repeatable). Unknown ABIs are ignored [default: all]
    #[arg(long = "abi", value_name = "ABI")]
    abi_filters: Vec<String>,

    /// Path to Cargo.toml, relative to the source directory
    #[arg(long, value_name = "PATH")]
    manifest_path: Option<PathBuf>,

    /// Output directory template; `{variant}` and `{Variant}` are substituted
    #[arg(long, value_name = "TEMPLATE")]
    output: Option<String>,

    /// Build directory that a relative output is resolved against
    #[arg(long, value_name = "DIR")]
    build_dir: Option<PathBuf>,

    /// Platform (also known as API level)
    #[arg(long, env = "CARGO_NDK_PLATFORM")]
    platform: Option<u8>,

    /// Extra environment variable for cargo-ndk (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    environment: Vec<(String, String)>,

    /// Run cargo-ndk even if no requested ABI is known
    #[arg(long)]
    allow_empty_targets: bool,

    /// Arguments passed to cargo-ndk before `build`
    #[arg(last = true)]
    cargo_ndk_args: Vec<String>,
}

impl BuildArgs {
    fn apply(&self, settings: &mut Settings) {
        if !self.abi_filters.is_empty() {
            settings.abi_filters = self.abi_filters.clone();
        }
        if let Some(manifest_path) = &self.manifest_path {
            settings.manifest_path = manifest_path.clone();
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(build_dir) = &self.build_dir {
            settings.build_dir = build_dir.clone();
        }
        if let Some(platform) = self.platform {
            settings.platform = platform;
        }
        settings
            .environment
            .extend(self.environment.iter().cloned());
        settings.args.extend(self.cargo_ndk_args.iter().cloned());
        settings.allow_empty_targets |= self.allow_empty_targets;
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid KEY=VALUE: no `=` found in `{s}`")),
    }
}

fn verbosity(cli: &Cli) -> Verbosity {
    if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        }
    }
}

pub fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let mut shell = Shell::new();
    shell.set_verbosity(verbosity(&cli));
    shell.set_color_choice(cli.color.as_deref())?;

    let result = match &cli.command {
        Command::Compile(args) => compile::run(&mut shell, args),
        Command::Clean(args) => clean::run(&mut shell, args),
        Command::Plan(args) => plan::run(&mut shell, args),
    };

    if let Err(e) = result {
        shell.error(format!("{e:#}"))?;
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn key_val_parsing() {
        assert_eq!(
            parse_key_val("CARGO_NDK_LINK_BUILTINS=1"),
            Ok(("CARGO_NDK_LINK_BUILTINS".into(), "1".into()))
        );
        assert_eq!(parse_key_val("A=b=c"), Ok(("A".into(), "b=c".into())));
        assert!(parse_key_val("NOVALUE").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn compile_args_override_settings() {
        let cli = parse(&[
            "cargondk",
            "compile",
            "--variant",
            "release",
            "--abi",
            "x86",
            "--abi",
            "arm64-v8a",
            "--platform",
            "26",
            "--env",
            "K=V",
            "--",
            "--link-builtins",
        ]);
        let Command::Compile(args) = cli.command else {
            panic!("expected compile");
        };

        let mut settings = Settings {
            args: vec!["--link-libcxx-shared".into()],
            ..Settings::default()
        };
        args.build.apply(&mut settings);

        assert_eq!(args.build.variant, "release");
        assert_eq!(settings.abi_filters, ["x86", "arm64-v8a"]);
        assert_eq!(settings.platform, 26);
        assert_eq!(settings.environment["K"], "V");
        assert_eq!(settings.args, ["--link-libcxx-shared", "--link-builtins"]);
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(verbosity(&parse(&["cargondk", "-q", "clean"])), Verbosity::Quiet);
        assert_eq!(verbosity(&parse(&["cargondk", "clean", "-vv"])), Verbosity::VeryVerbose);
        assert_eq!(verbosity(&parse(&["cargondk", "clean"])), Verbosity::Normal);
    }

    #[test]
    fn variant_is_required() {
        assert!(Cli::try_parse_from(["cargondk", "compile"]).is_err());
    }
}
