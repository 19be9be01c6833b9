use clap::Args;

use crate::{
    cli::{BuildArgs, ProjectArgs},
    exec::SystemExec,
    pipeline,
    shell::Shell,
};

#[derive(Debug, Clone, Args)]
pub struct CompileArgs {
    #[command(flatten)]
    pub(crate) project: ProjectArgs,

    #[command(flatten)]
    pub(crate) build: BuildArgs,
}

pub fn run(shell: &mut Shell, args: &CompileArgs) -> anyhow::Result<()> {
    let (project_dir, mut settings) = args.project.settings()?;
    args.build.apply(&mut settings);

    let (request, cargo_toml) = settings.compile_request(&project_dir, &args.build.variant)?;

    shell.verbose(|shell| {
        shell.status_with_color(
            "Manifest",
            format!(
                "{} v{} ({})",
                cargo_toml.package.name,
                cargo_toml.package.version,
                request.manifest_path.display()
            ),
            termcolor::Color::Cyan,
        )
    })?;
    pipeline::check_manifest(shell, &cargo_toml)?;

    pipeline::compile(&mut SystemExec, shell, &request)?;

    shell.status(
        "Finished",
        format!(
            "`{}` native libraries in {}",
            args.build.variant,
            request.output_dir.display()
        ),
    )?;
    Ok(())
}
