mod cli;
mod report;

use anyhow::Context;
use log::debug;
use takesplit_core::{export_project, ExportConfig, ExportSummary};

use crate::cli::{build_cli, Invocation, Targets};
use crate::report::{summary_line, TerminalReporter};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    let Invocation {
        targets: Targets {
            projects,
            output_dir,
        },
        dry_run,
        package_extension,
    } = Invocation::from_matches(&matches)?;

    let config = ExportConfig::builder(&output_dir)
        .dry_run(dry_run)
        .package_extension(&package_extension)
        .build();

    debug!(
        "exporting {} project(s) into '{}' (dry run: {dry_run})",
        projects.len(),
        output_dir.display()
    );

    let mut reporter = TerminalReporter::new();
    let mut total = ExportSummary::default();
    let mut exported = 0usize;
    let mut skipped = 0usize;

    for project in &projects {
        if !project.exists() {
            reporter.eprintln(format!("Project not found: {}", project.display()));
            skipped += 1;
            continue;
        }

        let result = export_project(project, &config, &mut reporter)
            .with_context(|| format!("skipping project '{}'", project.display()));
        match result {
            Ok(summary) => {
                total.merge(&summary);
                exported += 1;
            }
            Err(err) => {
                reporter.eprintln(format!("{err:#}"));
                skipped += 1;
            }
        }
    }

    reporter.finish();
    println!("{}", summary_line(&total, exported, skipped, dry_run));

    Ok(())
}
