//! Directive rewriter — single-pass line scanner with cross-line state.
//!
//! Pulls lines from the input one at a time, offers each to the directive
//! recognizers in priority order (param, type, return, rtype, raises), and
//! writes transformed markup. A parameter's type may arrive on a later line,
//! and a description may continue across lines until the next directive or
//! blank line, so the rewriter keeps at most one open parameter and one open
//! return between lines and finalizes them on every exit path.

use crate::error::{Irregularity, RewriteError};
use crate::patterns::{DirectivePatterns, Lead, OutputMode, SPAN_OPEN};
use std::io::{BufRead, Write};

/// Rewrite configuration.
pub struct Options {
    pub lead: Lead,
    pub mode: OutputMode,
    /// Abort the whole parse on the first irregularity.
    pub raise_on_irregularity: bool,
    /// Print irregularities to stderr. Ignored while raise mode is on.
    pub warn_on_irregularity: bool,
    /// Treat a parameter without a type directive as an irregularity.
    pub require_type: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            lead: Lead::default(),
            mode: OutputMode::default(),
            raise_on_irregularity: true,
            warn_on_irregularity: false,
            require_type: false,
        }
    }
}

/// Parameter directive whose type has not been seen yet.
struct OpenParam {
    name: String,
    description: String,
}

/// Return directive whose description is still accumulating.
struct OpenReturn {
    description: String,
}

/// Whether a recognizer consumed the line.
#[derive(Debug, PartialEq, Eq)]
enum Handle {
    Handled,
    NotHandled,
}

/// One rewriter instance per parse invocation; the open specs live here and
/// nowhere else.
pub struct Rewriter<W: Write> {
    patterns: DirectivePatterns,
    raise_on_irregularity: bool,
    warn_on_irregularity: bool,
    require_type: bool,
    out: W,
    open_param: Option<OpenParam>,
    open_return: Option<OpenReturn>,
    line: usize,
}

impl<W: Write> Rewriter<W> {
    pub fn new(opts: &Options, out: W) -> Self {
        Rewriter {
            patterns: DirectivePatterns::new(opts.lead, opts.mode),
            raise_on_irregularity: opts.raise_on_irregularity,
            warn_on_irregularity: opts.warn_on_irregularity,
            require_type: opts.require_type,
            out,
            open_param: None,
            open_return: None,
            line: 0,
        }
    }

    /// Scan `input` line by line and write the transformed text.
    ///
    /// Any directive still open when the scan stops — normally or through an
    /// error — is finalized and flushed before this returns, so no directive
    /// is ever silently dropped.
    pub fn rewrite<R: BufRead>(&mut self, input: R) -> Result<(), RewriteError> {
        let scanned = self.scan(input);
        let finished = self.finish();
        scanned.and(finished)
    }

    fn scan<R: BufRead>(&mut self, input: R) -> Result<(), RewriteError> {
        for line in input.lines() {
            let line = line?;
            self.process_line(&line)?;
        }
        Ok(())
    }

    fn process_line(&mut self, raw: &str) -> Result<(), RewriteError> {
        self.line += 1;
        // Span mode normalizes every line by trimming it; line-break mode
        // preserves lines verbatim.
        let line = match self.patterns.mode() {
            OutputMode::Span => raw.trim(),
            OutputMode::LineBreak => raw,
        };

        if self.check_param(line)? == Handle::Handled {
            return Ok(());
        }
        if self.check_type(line)? == Handle::Handled {
            return Ok(());
        }
        if self.check_return(line)? == Handle::Handled {
            return Ok(());
        }
        if self.check_return_type(line)? == Handle::Handled {
            return Ok(());
        }
        if self.check_raises(line)? == Handle::Handled {
            return Ok(());
        }

        // A blank line ends whatever directive is open.
        if self.patterns.is_blank(line) {
            self.finish()?;
            writeln!(self.out, "{line}")?;
            return Ok(());
        }

        // Otherwise the line either continues an open description or passes
        // through untouched.
        let text = self.patterns.continuation_text(line);
        if let Some(param) = self.open_param.as_mut() {
            extend(&mut param.description, text);
            return Ok(());
        }
        if let Some(ret) = self.open_return.as_mut() {
            extend(&mut ret.description, text);
            return Ok(());
        }
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn check_param(&mut self, line: &str) -> Result<Handle, RewriteError> {
        let Some(m) = self.patterns.match_param(line) else {
            return Ok(Handle::NotHandled);
        };
        // A new directive closes an accumulating return; a parameter still
        // waiting for its type is policy-checked and closed first.
        self.close_return()?;
        self.close_param()?;
        let opening = format!("<b>{}</b> ", m.name);
        self.write_opening(&m.indent, &opening)?;
        self.open_param = Some(OpenParam {
            name: m.name,
            description: m.description,
        });
        Ok(Handle::Handled)
    }

    fn check_type(&mut self, line: &str) -> Result<Handle, RewriteError> {
        let Some(m) = self.patterns.match_type(line) else {
            return Ok(Handle::NotHandled);
        };
        let Some(open) = self.open_param.take() else {
            self.notify(Irregularity::TypeWithoutParameter { line: self.line })?;
            return Ok(Handle::NotHandled);
        };
        if m.target != open.name {
            let param = open.name.clone();
            self.open_param = Some(open);
            self.notify(Irregularity::NameMismatch {
                param,
                target: m.target,
                line: self.line,
            })?;
            return Ok(Handle::NotHandled);
        }
        write!(self.out, "(<i>{}</i>): ", m.description)?;
        self.write_close(&open.description)?;
        Ok(Handle::Handled)
    }

    fn check_return(&mut self, line: &str) -> Result<Handle, RewriteError> {
        let Some(m) = self.patterns.match_return(line) else {
            return Ok(Handle::NotHandled);
        };
        self.close_param()?;
        if self.open_return.is_some() {
            self.notify(Irregularity::DuplicateReturn { line: self.line })?;
            self.close_return()?;
        }
        self.write_opening(&m.indent, "<b>returns:</b> ")?;
        self.open_return = Some(OpenReturn {
            description: m.description,
        });
        Ok(Handle::Handled)
    }

    fn check_return_type(&mut self, line: &str) -> Result<Handle, RewriteError> {
        let Some(m) = self.patterns.match_return_type(line) else {
            return Ok(Handle::NotHandled);
        };
        self.close_param()?;
        self.close_return()?;
        self.write_opening(&m.indent, "<b>return type:</b> ")?;
        self.write_close(&m.description)?;
        Ok(Handle::Handled)
    }

    fn check_raises(&mut self, line: &str) -> Result<Handle, RewriteError> {
        let Some(m) = self.patterns.match_raises(line) else {
            return Ok(Handle::NotHandled);
        };
        self.close_param()?;
        self.close_return()?;
        self.write_opening(&m.indent, "<b>raises:</b> ")?;
        self.write_close(&m.description)?;
        Ok(Handle::Handled)
    }

    /// Close any open directive. Runs at directive transitions, on blank
    /// lines, and unconditionally at end of input.
    fn finish(&mut self) -> Result<(), RewriteError> {
        let param = self.close_param();
        let ret = self.close_return();
        param.and(ret)
    }

    fn close_param(&mut self) -> Result<(), RewriteError> {
        let Some(open) = self.open_param.take() else {
            return Ok(());
        };
        let policy = if self.require_type {
            self.notify(Irregularity::MissingType {
                name: open.name.clone(),
                line: self.line,
            })
        } else {
            Ok(())
        };
        // The accumulated text is flushed even when the policy check failed,
        // so an aborting parse never leaves a half-open output line.
        self.write_close(&open.description)?;
        policy
    }

    fn close_return(&mut self) -> Result<(), RewriteError> {
        let Some(open) = self.open_return.take() else {
            return Ok(());
        };
        self.write_close(&open.description)?;
        Ok(())
    }

    /// Write the mode-dependent lead-in for a directive, without a newline.
    fn write_opening(&mut self, indent: &str, text: &str) -> Result<(), RewriteError> {
        match self.patterns.mode() {
            OutputMode::Span => write!(self.out, "{SPAN_OPEN}{text}")?,
            OutputMode::LineBreak => write!(self.out, "{indent}{text}")?,
        }
        Ok(())
    }

    /// Write `description` plus the closing token and a newline, unless the
    /// description already ends with the closing token.
    fn write_close(&mut self, description: &str) -> Result<(), RewriteError> {
        let close = self.patterns.close_token();
        if description.ends_with(close) {
            writeln!(self.out, "{description}")?;
        } else {
            writeln!(self.out, "{description}{close}")?;
        }
        Ok(())
    }

    /// Single notification point for every irregularity: raise, warn to
    /// stderr, or stay silent.
    fn notify(&mut self, irregularity: Irregularity) -> Result<(), RewriteError> {
        if self.raise_on_irregularity {
            return Err(irregularity.into());
        }
        if self.warn_on_irregularity {
            eprintln!("warning: {irregularity}");
        }
        Ok(())
    }
}

/// Append a continuation line to an accumulating description, normalizing
/// whitespace at the join point.
fn extend(description: &mut String, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(text);
}

/// Rewrite `input` in one pass and return the transformed text.
pub fn rewrite_to_string(input: &str, opts: &Options) -> Result<String, RewriteError> {
    let mut out = Vec::new();
    Rewriter::new(opts, &mut out).rewrite(input.as_bytes())?;
    String::from_utf8(out).map_err(|e| {
        RewriteError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
