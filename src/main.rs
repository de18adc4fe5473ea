//! docprep — rewrite docstring directives embedded in generated HTML (or
//! pre-HTML source) into formatted markup.
//!
//! Recognizes `@param`, `@type`, `@return`, `@rtype`, and `@raises` (or the
//! `:`-prefixed equivalents) and replaces each with HTML, passing everything
//! else through verbatim. Two modes:
//!
//! - **stdin mode**: `docprep < documented.html > rewritten.html`
//! - **file mode**: `docprep -o out docs/*.html`, optionally running an
//!   external documentation generator over each rewritten file via
//!   `--generate`.

mod error;
mod patterns;
mod rewrite;
mod runner;

use anyhow::{bail, Context, Result};
use clap::Parser;
use patterns::{Lead, OutputMode};
use rewrite::{rewrite_to_string, Options, Rewriter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "docprep",
    about = "Rewrite @param/@type/@return/@rtype/@raises directives into HTML markup"
)]
struct Cli {
    /// Input files (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given, unless --generate is used)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Directive lead character: '@' or ':'
    #[arg(short = 'd', long, default_value = "@")]
    delimiter: String,

    /// Output mode: span wraps each directive in a highlight span,
    /// linebreak preserves indentation and closes with a break token
    #[arg(short = 'm', long, default_value = "span")]
    mode: String,

    /// Irregularity policy: raise, warn, ignore
    #[arg(long, default_value = "raise")]
    irregular: String,

    /// Require a type directive for every parameter
    #[arg(long)]
    typecheck: bool,

    /// Documentation generator to run over each rewritten file
    #[arg(long)]
    generate: Option<String>,

    /// Target directory for generated HTML (defaults to the source file's directory)
    #[arg(long)]
    html_dir: Option<PathBuf>,

    /// Extra arguments passed through to the generator
    #[arg(last = true)]
    generator_args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let opts = build_options(&cli)?;

    if cli.files.is_empty() {
        if cli.generate.is_some() {
            bail!("--generate requires input files");
        }
        // stdin mode — filter stdin to stdout
        return stdin_mode(&opts);
    }

    file_mode(&cli, &opts)
}

/// Map CLI strings onto the typed rewrite configuration.
fn build_options(cli: &Cli) -> Result<Options> {
    let mut chars = cli.delimiter.chars();
    let lead = match (chars.next(), chars.next()) {
        (Some(c), None) => Lead::from_char(c)?,
        _ => bail!(
            "delimiter must be a single character, got {:?}",
            cli.delimiter
        ),
    };
    let mode = OutputMode::from_name(&cli.mode)?;
    let (raise_on_irregularity, warn_on_irregularity) = match cli.irregular.as_str() {
        "raise" => (true, false),
        "warn" => (false, true),
        "ignore" => (false, false),
        other => bail!("unknown irregularity policy: {other}. Use raise, warn, or ignore"),
    };
    Ok(Options {
        lead,
        mode,
        raise_on_irregularity,
        warn_on_irregularity,
        require_type: cli.typecheck,
    })
}

fn stdin_mode(opts: &Options) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut rewriter = Rewriter::new(opts, stdout.lock());
    rewriter
        .rewrite(stdin.lock())
        .context("failed to rewrite stdin")?;
    Ok(())
}

/// file mode: rewrite each input, write results to the output directory
/// and/or hand them to the documentation generator.
fn file_mode(cli: &Cli, opts: &Options) -> Result<()> {
    let input_files = expand_globs(&cli.files)?;
    if input_files.is_empty() {
        bail!("no input files");
    }

    let generator = cli.generate.as_ref().map(|command| runner::Generator {
        command: command.clone(),
        html_dir: cli.html_dir.clone(),
        extra_args: cli.generator_args.clone(),
    });

    let output_dir = cli.output.as_deref();
    if output_dir.is_none() && generator.is_none() {
        bail!("--output is required when files are given");
    }
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }

    for path in &input_files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let rewritten = rewrite_to_string(&content, opts)
            .with_context(|| format!("failed to rewrite {}", path.display()))?;

        if let Some(dir) = output_dir {
            let name = path
                .file_name()
                .with_context(|| format!("input path has no file name: {}", path.display()))?;
            let out_path = dir.join(name);
            fs::write(&out_path, &rewritten)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
        }
        if let Some(ref generator) = generator {
            runner::run(generator, path, &rewritten)?;
        }
    }

    Ok(())
}

/// File extensions recognized when scanning a bare directory.
const SUPPORTED_EXTENSIONS: &[&str] = &["html", "htm", "py"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directory: scan for supported extensions (non-recursive)
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() {
                    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
                        if SUPPORTED_EXTENSIONS.contains(&ext) {
                            files.push(p);
                        }
                    }
                }
            }
            continue;
        }
        // Try as glob
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}
