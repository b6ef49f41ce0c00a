mod config;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use rescomp_codegen::{CodeGenerator, EmitOptions, Target};
use rescomp_preprocess::{default_registry_dir, InterpreterTable, Registry};
use rescomp_tree::{ResourceNode, ResourceTree};

use crate::config::CompilerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "resource_compiler",
    about = "Compile a directory tree into statically embeddable resources"
)]
#[command(version)]
struct Cli {
    /// Directory to embed (defaults to current directory)
    #[arg(default_value = ".")]
    dir_path: PathBuf,
    /// Output file, `-` for stdout (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Preprocessor directory (defaults to `rc` next to the executable)
    #[arg(long)]
    rc_dir: Option<PathBuf>,
    /// Output language: cpp or rust
    #[arg(short, long)]
    target: Option<Target>,
    /// Namespace (C++) or module (Rust) wrapping the generated code
    #[arg(long)]
    namespace: Option<String>,
    /// Macro (C++) or cargo feature (Rust) that compiles the data in
    #[arg(long)]
    guard: Option<String>,
    /// Payload bytes per output row
    #[arg(long)]
    row_width: Option<usize>,
    /// Preprocessor threads, 0 for one per CPU
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Config file (defaults to ./rescomp.config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Log every visited entry
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
    /// Print the resolved tree to stderr instead of emitting code
    #[arg(long)]
    list: bool,
}

/// Options after merging flags, config file and defaults.
#[derive(Debug)]
struct Settings {
    rc_dir: Option<PathBuf>,
    interpreters: InterpreterTable,
    emit: EmitOptions,
    jobs: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = ["resource_compiler", "rescomp_preprocess", "rescomp_tree", "rescomp_codegen"]
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn resolve_settings(cli: &Cli, config: CompilerConfig) -> Settings {
    let target = cli.target.or(config.target).unwrap_or_default();
    let defaults = EmitOptions::for_target(target);
    let emit = EmitOptions {
        target,
        namespace: cli
            .namespace
            .clone()
            .or(config.namespace)
            .unwrap_or(defaults.namespace),
        guard: cli.guard.clone().or(config.guard).unwrap_or(defaults.guard),
        row_width: cli.row_width.or(config.row_width).unwrap_or(defaults.row_width),
    };

    let interpreters = config
        .interpreters
        .into_iter()
        .fold(InterpreterTable::builtin(), |table, (ext, program)| {
            table.with_override(ext, program)
        });

    let jobs = match cli.jobs.or(config.jobs).unwrap_or(1) {
        0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    };

    Settings {
        rc_dir: cli.rc_dir.clone().or(config.rc_dir).or_else(default_registry_dir),
        interpreters,
        emit,
        jobs,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;
    let config = CompilerConfig::discover(cli.config.as_deref(), &cwd)?;
    let settings = resolve_settings(cli, config);
    log::debug!("settings: {settings:?}");

    let generator = CodeGenerator::new(settings.emit.clone()).context("Invalid output options")?;

    let registry = match &settings.rc_dir {
        Some(dir) => Registry::load(dir, &settings.interpreters).with_context(|| {
            format!("Failed to load preprocessors from '{}'", dir.display())
        })?,
        None => {
            log::warn!("cannot locate the preprocessor directory, embedding files as is");
            Registry::empty()
        }
    };

    let built = if settings.jobs > 1 {
        ResourceTree::build_parallel(&cli.dir_path, &registry, settings.jobs)
    } else {
        ResourceTree::build(&cli.dir_path, &registry)
    };
    let tree = built.with_context(|| {
        format!("Failed to compile resources from '{}'", cli.dir_path.display())
    })?;

    if cli.list {
        print_listing(&tree);
        return Ok(());
    }

    let rendered = generator.generate(&tree).context("Failed to render resources")?;
    let destination = write_output(cli.output.as_deref(), &rendered)?;

    if !cli.quiet {
        eprintln!(
            "{} Embedded {} file(s) and {} directorie(s), {} payload bytes as {} -> {}",
            "✓".green().bold(),
            tree.file_count(),
            tree.dir_count(),
            tree.total_payload_bytes(),
            settings.emit.target,
            destination,
        );
        if !tree.skipped().is_empty() {
            eprintln!(
                "{} Skipped {} entr(ies) that are neither files nor directories",
                "⚠".yellow().bold(),
                tree.skipped().len(),
            );
        }
    }
    Ok(())
}

/// Write the artifact to stdout or replace `output` atomically. Returns a
/// description of where it went.
fn write_output(output: Option<&Path>, rendered: &str) -> Result<String> {
    let path = match output {
        Some(path) if path != Path::new("-") => path,
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
            return Ok("stdout".to_string());
        }
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create a temporary file in '{}'", dir.display()))?;
    tmp.write_all(rendered.as_bytes())
        .with_context(|| format!("Failed to write '{}'", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;

    Ok(path.display().to_string())
}

fn print_listing(tree: &ResourceTree) {
    eprintln!("{}", "Resources".bold().underline());
    for (node, depth) in listing_order(tree) {
        let pad = "  ".repeat(depth + 1);
        if node.is_dir() {
            eprintln!(
                "{pad}{} {}",
                format!("{}/", node.basename()).blue().bold(),
                format!("({} entries)", node.size()).dimmed()
            );
        } else {
            eprintln!(
                "{pad}{} {}",
                node.basename(),
                format!("({} bytes)", node.size()).dimmed()
            );
        }
    }
    eprintln!();
    eprintln!(
        "  {} file(s), {} directorie(s), {} payload bytes",
        tree.file_count(),
        tree.dir_count(),
        tree.total_payload_bytes(),
    );
}

/// Pre-order from the root with nesting depth, children in path order.
fn listing_order(tree: &ResourceTree) -> Vec<(&ResourceNode, usize)> {
    let mut order = Vec::with_capacity(tree.len());
    let mut stack = vec![(tree.root(), 0)];
    while let Some((node, depth)) = stack.pop() {
        order.push((node, depth));
        let children: Vec<&ResourceNode> = tree.children(node).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
    }
    order
}
