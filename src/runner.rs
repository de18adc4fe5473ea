//! External documentation-generator invocation.
//!
//! The generator is an opaque collaborator: it receives the rewritten source
//! as a file path plus a target output directory, and its exit code decides
//! the fate of the whole run. The rewritten text is staged as a temporary
//! file in the source file's own directory so relative imports keep
//! resolving; the staged file is removed on every exit path.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct Generator {
    /// Generator executable, e.g. `pdoc`.
    pub command: String,
    /// Target directory for the generated HTML. Defaults to the source
    /// file's directory.
    pub html_dir: Option<PathBuf>,
    /// Caller-supplied arguments passed through verbatim.
    pub extra_args: Vec<String>,
}

/// Stage `rewritten` next to `source` and run the generator over it.
pub fn run(generator: &Generator, source: &Path, rewritten: &str) -> Result<()> {
    let dir = source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let suffix = match source.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => String::new(),
    };

    let mut staged = tempfile::Builder::new()
        .prefix("docprep_")
        .suffix(&suffix)
        .tempfile_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    staged
        .write_all(rewritten.as_bytes())
        .context("failed to stage rewritten source")?;
    staged.flush()?;

    let args = generator_args(
        &generator.extra_args,
        generator.html_dir.as_deref(),
        dir,
        staged.path(),
    );
    let status = Command::new(&generator.command)
        .args(&args)
        .status()
        .with_context(|| format!("failed to run generator: {}", generator.command))?;
    if !status.success() {
        bail!("generator {} exited with {}", generator.command, status);
    }
    Ok(())
}

/// Build the generator argument list: caller args pass through, `--html` and
/// `--html-dir` are ensured, and the staged input path goes last.
fn generator_args(
    extra: &[String],
    html_dir: Option<&Path>,
    default_dir: &Path,
    input: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = extra.iter().map(OsString::from).collect();
    if !extra.iter().any(|a| a == "--html-dir") {
        args.push("--html-dir".into());
        args.push(html_dir.unwrap_or(default_dir).as_os_str().to_os_string());
    }
    if !extra.iter().any(|a| a == "--html") {
        args.insert(0, "--html".into());
    }
    args.push(input.as_os_str().to_os_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn ensures_html_and_html_dir() {
        let args = generator_args(&[], None, Path::new("src"), Path::new("src/staged.py"));
        assert_eq!(
            strings(&args),
            vec!["--html", "--html-dir", "src", "src/staged.py"]
        );
    }

    #[test]
    fn explicit_html_dir_wins_over_default() {
        let args = generator_args(
            &[],
            Some(Path::new("docs/html")),
            Path::new("src"),
            Path::new("src/staged.py"),
        );
        assert_eq!(
            strings(&args),
            vec!["--html", "--html-dir", "docs/html", "src/staged.py"]
        );
    }

    #[test]
    fn caller_args_pass_through_unduplicated() {
        let extra = vec![
            "--html".to_string(),
            "--html-dir".to_string(),
            "out".to_string(),
        ];
        let args = generator_args(&extra, None, Path::new("."), Path::new("staged.py"));
        assert_eq!(strings(&args), vec!["--html", "--html-dir", "out", "staged.py"]);
    }

    #[test]
    fn input_path_goes_last() {
        let extra = vec!["--overwrite".to_string()];
        let args = generator_args(&extra, None, Path::new("."), Path::new("staged.py"));
        assert_eq!(strings(&args).last().unwrap(), "staged.py");
    }
}
