use std::io::Write;

use clap::Args;

use crate::{
    cargo::{Profile, compile_invocation},
    cli::{BuildArgs, ProjectArgs},
    pipeline,
    shell::Shell,
};

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub(crate) project: ProjectArgs,

    #[command(flatten)]
    pub(crate) build: BuildArgs,

    /// Print output in JSON format
    #[arg(long)]
    pub(crate) json: bool,
}

pub fn run(shell: &mut Shell, args: &PlanArgs) -> anyhow::Result<()> {
    let (project_dir, mut settings) = args.project.settings()?;
    args.build.apply(&mut settings);

    let (request, cargo_toml) = settings.compile_request(&project_dir, &args.build.variant)?;
    pipeline::check_manifest(shell, &cargo_toml)?;
    let invocation = compile_invocation(&request);

    if args.json {
        let plan = serde_json::json!({
            "variant": request.variant,
            "release": request.profile() == Profile::Release,
            "package": cargo_toml.package.name,
            "targets": request
                .targets
                .iter()
                .map(|t| serde_json::json!({ "abi": t.abi(), "triple": t.triple() }))
                .collect::<Vec<_>>(),
            "manifestPath": request.manifest_path.display().to_string(),
            "outputDir": request.output_dir.display().to_string(),
            "workingDir": request.source_dir.display().to_string(),
            "environment": request.environment,
            "command": std::iter::once(invocation.program.to_string_lossy().into_owned())
                .chain(invocation.args_lossy())
                .collect::<Vec<_>>(),
        });
        writeln!(shell.out(), "{}", serde_json::to_string_pretty(&plan)?)?;
    } else {
        let out = shell.out();
        for target in &request.targets {
            writeln!(out, "{} ({})", target, target.triple())?;
        }
        writeln!(out)?;
        writeln!(out, "# in {}", request.source_dir.display())?;
        for (key, value) in &request.environment {
            writeln!(out, "export {key}={value:?}")?;
        }
        writeln!(out, "{invocation}")?;
    }

    Ok(())
}
