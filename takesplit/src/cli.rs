use std::path::PathBuf;

use anyhow::anyhow;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use takesplit_core::DEFAULT_PACKAGE_EXTENSION;

/// Projects to export and the directory receiving every take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Targets {
    pub projects: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl Targets {
    /// Split positional paths: the last one is the output directory, all
    /// others are projects. Returns `None` unless there are at least two.
    pub fn from_paths(mut paths: Vec<PathBuf>) -> Option<Self> {
        if paths.len() < 2 {
            return None;
        }
        let output_dir = paths.pop()?;
        Some(Self {
            projects: paths,
            output_dir,
        })
    }
}

/// Everything a batch run needs from the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub targets: Targets,
    pub dry_run: bool,
    pub package_extension: String,
}

impl Invocation {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let paths: Vec<PathBuf> = matches
            .get_many::<PathBuf>("paths")
            .ok_or_else(|| anyhow!("expected project paths and an output directory"))?
            .cloned()
            .collect();
        let targets = Targets::from_paths(paths)
            .ok_or_else(|| anyhow!("expected at least one project and an output directory"))?;
        let package_extension = matches
            .get_one::<String>("package-ext")
            .cloned()
            .ok_or_else(|| anyhow!("missing project package extension"))?;

        Ok(Self {
            targets,
            dry_run: matches.get_flag("dry-run"),
            package_extension,
        })
    }
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Export overdub takes from Logic projects")
        .long_about(
            "Export overdub takes from Logic projects.\n\n\
             Each project's reference track (a file named with COMP, ROUGH or the \
             project name) sets the take length. Every other recording in the \
             project's Media folder is cut into takes of that length, written as \
             <project>_<file>_Take<N>.wav into the output directory.",
        )
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("List the takes that would be exported without writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("package-ext")
                .long("package-ext")
                .value_name("EXT")
                .help("Project package extension stripped from project names")
                .default_value(DEFAULT_PACKAGE_EXTENSION),
        )
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .help("One or more project directories followed by the output directory")
                .required(true)
                .num_args(2..)
                .value_parser(value_parser!(PathBuf)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn last_path_is_the_output_directory() {
        let matches = build_cli()
            .try_get_matches_from(["takesplit", "A.logicx", "B.logicx", "out"])
            .unwrap();
        let paths = matches
            .get_many::<PathBuf>("paths")
            .unwrap()
            .cloned()
            .collect();

        let targets = Targets::from_paths(paths).unwrap();
        assert_eq!(
            targets.projects,
            [PathBuf::from("A.logicx"), PathBuf::from("B.logicx")]
        );
        assert_eq!(targets.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn rejects_a_single_path() {
        assert!(build_cli()
            .try_get_matches_from(["takesplit", "A.logicx"])
            .is_err());
        assert!(Targets::from_paths(vec![PathBuf::from("A.logicx")]).is_none());
    }

    #[test]
    fn defaults_to_logic_packages() {
        let matches = build_cli()
            .try_get_matches_from(["takesplit", "A.logicx", "out"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("package-ext").map(String::as_str),
            Some("logicx")
        );
        assert!(!matches.get_flag("dry-run"));
    }

    #[test]
    fn invocation_collects_every_setting() {
        let matches = build_cli()
            .try_get_matches_from([
                "takesplit",
                "--dry-run",
                "--package-ext",
                "band",
                "A.band",
                "out",
            ])
            .unwrap();

        let invocation = Invocation::from_matches(&matches).unwrap();
        assert!(invocation.dry_run);
        assert_eq!(invocation.package_extension, "band");
        assert_eq!(invocation.targets.projects, [PathBuf::from("A.band")]);
        assert_eq!(invocation.targets.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn invocation_without_paths_is_an_error() {
        let matches = Command::new("takesplit")
            .arg(Arg::new("dry-run").long("dry-run").action(ArgAction::SetTrue))
            .arg(Arg::new("package-ext").long("package-ext"))
            .arg(Arg::new("paths").num_args(0..).value_parser(value_parser!(PathBuf)))
            .try_get_matches_from(["takesplit"])
            .unwrap();

        let err = Invocation::from_matches(&matches).unwrap_err();
        assert!(err.to_string().contains("output directory"), "{err}");
    }
}
