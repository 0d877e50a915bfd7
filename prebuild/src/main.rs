//! Noble prebuild CLI entrypoint.
//!
//! This binary builds the native addon for the selected runtime/ABI targets
//! and packages each build into a versioned `.tar.gz` under `prebuilds/`.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use noble_prebuild::cli::Cli;
use noble_prebuild::config::PrebuildConfig;
use noble_prebuild::error::{PrebuildError, Result};
use noble_prebuild::invoker::PrebuildInvoker;
use noble_prebuild::naming::ArchiveNaming;
use noble_prebuild::package::PackageInfo;
use noble_prebuild::pipeline::{Pipeline, PipelineSettings, TargetPolicy, TargetReport};
use noble_prebuild::target::{BuildTarget, MANIFEST, enumerate};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let project_root = resolve_project_root(cli.project_root.clone())?;
    let mut config = PrebuildConfig::load(&project_root, cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let policy = config.filter_policy();
    if cli.list_targets {
        for entry in MANIFEST {
            let marker = if policy.matches(&entry.target) { "*" } else { " " };
            write_line(
                stdout,
                format!("{marker} {} ({} {})", entry.target, entry.target.runtime, entry.version),
            );
        }
        return Ok(());
    }

    let targets = enumerate(MANIFEST, &policy);
    let package = PackageInfo::load_from_root(&project_root)?;
    let naming = ArchiveNaming::for_package(config.output_dir.clone(), &package)
        .with_scope(config.scope.clone())
        .rooted_at(&project_root);
    let settings = PipelineSettings {
        files: config.files.clone(),
        target_policy: TargetPolicy::from_all_targets(config.all_targets),
        compression_level: config.compression_level,
        ..PipelineSettings::new(project_root.clone(), naming)
    };
    let invoker = PrebuildInvoker::new(config.tool.clone())
        .with_extra_args(config.tool_args.clone())
        .with_working_dir(project_root)
        .with_timeout(config.build_timeout());
    let pipeline = Pipeline::new(&invoker, settings);

    if cli.dry_run {
        print_plan(&pipeline, &invoker, &targets, stdout);
        return Ok(());
    }

    info!(
        "{} of {} known targets selected for {} v{}",
        targets.len(),
        MANIFEST.len(),
        package.name,
        package.version
    );
    let reports = pipeline.run(&targets)?;
    log_summary(&reports);
    Ok(())
}

/// Uses the current directory unless a project root was given.
fn resolve_project_root(explicit: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| {
        PrebuildError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("current directory is not valid UTF-8: {}", path.display()),
        ))
    })
}

fn print_plan(
    pipeline: &Pipeline<'_>,
    invoker: &PrebuildInvoker,
    targets: &[BuildTarget],
    stdout: &mut dyn Write,
) {
    let root: &Utf8Path = &pipeline.settings().project_root;
    write_line(stdout, format!("Dry run in {root} - no files will be modified"));
    for planned in pipeline.plan(targets) {
        write_line(
            stdout,
            format!(
                "  {} {} -> {}",
                invoker.program(),
                invoker.args_for(&planned.target).join(" "),
                planned.output_path
            ),
        );
    }
}

fn log_summary(reports: &[TargetReport]) {
    let archived = reports.iter().filter(|r| r.archived()).count();
    info!(
        "packaged {archived} of {} processed target(s)",
        reports.len()
    );
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(out, "{message}").is_err() {
        // Output is best-effort.
    }
}
