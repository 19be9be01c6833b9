use clap::Args;

use crate::{cli::ProjectArgs, exec::SystemExec, pipeline, shell::Shell};

#[derive(Debug, Clone, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub(crate) project: ProjectArgs,

    /// Also run `cargo clean`, regardless of the settings file
    #[arg(long)]
    pub(crate) clean_target: bool,
}

pub fn run(shell: &mut Shell, args: &CleanArgs) -> anyhow::Result<()> {
    let (project_dir, settings) = args.project.settings()?;
    let clean_target = settings.clean_target || args.clean_target;

    pipeline::clean(
        &mut SystemExec,
        shell,
        &settings.source_dir(&project_dir),
        clean_target,
    )?;
    Ok(())
}
