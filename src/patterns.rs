//! Directive recognizer configuration.
//!
//! Holds the compiled match rules for the five directive kinds
//! (param, type, return, rtype, raises), keyed by the directive lead
//! character and the output mode. The rewriter in [`crate::rewrite`]
//! owns all cross-line state; this module only classifies single lines.

use crate::error::RewriteError;
use regex::Regex;

/// Fixed opening wrapper emitted in span mode.
pub const SPAN_OPEN: &str = "<span class=\"sd\">        ";
/// Closing token in span mode.
pub const SPAN_CLOSE: &str = "</span>";
/// Closing token in line-break mode.
pub const LINE_BREAK: &str = "</br>";

/// The character that prefixes every directive keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lead {
    Colon,
    #[default]
    At,
}

impl Lead {
    /// Only `':'` and `'@'` are legal lead characters.
    pub fn from_char(c: char) -> Result<Self, RewriteError> {
        match c {
            ':' => Ok(Lead::Colon),
            '@' => Ok(Lead::At),
            other => Err(RewriteError::InvalidLead(other)),
        }
    }

    fn as_char(self) -> char {
        match self {
            Lead::Colon => ':',
            Lead::At => '@',
        }
    }
}

/// Output formatting profile.
///
/// `Span` wraps each emitted directive in a `<span class="sd">` markup span
/// with fixed leading indentation; `LineBreak` preserves caller indentation
/// and closes each directive with a `</br>` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Span,
    LineBreak,
}

impl OutputMode {
    pub fn from_name(name: &str) -> Result<Self, RewriteError> {
        match name {
            "span" => Ok(OutputMode::Span),
            "linebreak" => Ok(OutputMode::LineBreak),
            other => Err(RewriteError::InvalidMode(other.to_string())),
        }
    }
}

/// Captured fields of a parameter directive line.
#[derive(Debug, PartialEq, Eq)]
pub struct ParamMatch {
    pub indent: String,
    pub name: String,
    pub description: String,
}

/// Captured fields of a type directive line.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeMatch {
    #[allow(dead_code)]
    pub indent: String,
    pub target: String,
    pub description: String,
}

/// Captured fields of a return, rtype, or raises directive line.
#[derive(Debug, PartialEq, Eq)]
pub struct TailMatch {
    pub indent: String,
    pub description: String,
}

/// Compiled recognizers for one (lead, mode) configuration.
pub struct DirectivePatterns {
    mode: OutputMode,
    blank: Regex,
    span_inner: Regex,
    param: Regex,
    ty: Regex,
    ret: Regex,
    rtype: Regex,
    raises: Regex,
}

impl DirectivePatterns {
    pub fn new(lead: Lead, mode: OutputMode) -> Self {
        let l = lead.as_char();
        match mode {
            // Anchored on the enclosing markup span; descriptions stop at `<`.
            OutputMode::Span => DirectivePatterns {
                mode,
                blank: compile(r"^[ \t]*$"),
                span_inner: compile(r#"^<span class="sd">(.*)</span>$"#),
                param: compile(&format!(
                    r#"^<span class="sd">[ ]*{l}param([^:]*):([^<]*)</span>$"#
                )),
                ty: compile(&format!(
                    r#"^<span class="sd">[ ]*{l}type([^:]*):([^<]*)</span>$"#
                )),
                ret: compile(&format!(
                    r#"^<span class="sd">[ ]*{l}return(?:s)?(?:[: ][ ]*([^<]*))?</span>$"#
                )),
                rtype: compile(&format!(
                    r#"^<span class="sd">[ ]*{l}rtype(?:[: ][ ]*([^<]*))?</span>$"#
                )),
                raises: compile(&format!(
                    r#"^<span class="sd">[ ]*{l}raise(?:s|d)?(?:[: ][ ]*([^<]*))?</span>$"#
                )),
            },
            // Anchored on start of line; leading indentation is captured and
            // preserved in the output.
            OutputMode::LineBreak => DirectivePatterns {
                mode,
                blank: compile(r"^[ \t]*$"),
                span_inner: compile(r#"^<span class="sd">(.*)</span>$"#),
                param: compile(&format!(r"^([ \t]*){l}param([^:]*):(.*)$")),
                ty: compile(&format!(r"^([ \t]*){l}type([^:]*):(.*)$")),
                ret: compile(&format!(r"^([ \t]*){l}return(?:s)?(?:[: ][ ]*(.*))?$")),
                rtype: compile(&format!(r"^([ \t]*){l}rtype(?:[: ][ ]*(.*))?$")),
                raises: compile(&format!(r"^([ \t]*){l}raise(?:s|d)?(?:[: ][ ]*(.*))?$")),
            },
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Token that closes an emitted directive in this mode.
    pub fn close_token(&self) -> &'static str {
        match self.mode {
            OutputMode::Span => SPAN_CLOSE,
            OutputMode::LineBreak => LINE_BREAK,
        }
    }

    pub fn is_blank(&self, line: &str) -> bool {
        self.blank.is_match(line)
    }

    /// Text a non-directive line contributes to an open multi-line
    /// description. In span mode the enclosing markup span is unwrapped so
    /// a description split across spans joins to the same text as its
    /// single-line equivalent.
    pub fn continuation_text<'a>(&self, line: &'a str) -> &'a str {
        match self.mode {
            OutputMode::Span => self
                .span_inner
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map_or(line, |m| m.as_str()),
            OutputMode::LineBreak => line,
        }
    }

    pub fn match_param(&self, line: &str) -> Option<ParamMatch> {
        let caps = self.param.captures(line)?;
        Some(match self.mode {
            OutputMode::Span => ParamMatch {
                indent: String::new(),
                name: caps[1].trim().to_string(),
                description: caps[2].trim().to_string(),
            },
            OutputMode::LineBreak => ParamMatch {
                indent: caps[1].to_string(),
                name: caps[2].trim().to_string(),
                description: caps[3].trim().to_string(),
            },
        })
    }

    pub fn match_type(&self, line: &str) -> Option<TypeMatch> {
        let caps = self.ty.captures(line)?;
        Some(match self.mode {
            OutputMode::Span => TypeMatch {
                indent: String::new(),
                target: caps[1].trim().to_string(),
                description: caps[2].trim().to_string(),
            },
            OutputMode::LineBreak => TypeMatch {
                indent: caps[1].to_string(),
                target: caps[2].trim().to_string(),
                description: caps[3].trim().to_string(),
            },
        })
    }

    pub fn match_return(&self, line: &str) -> Option<TailMatch> {
        self.tail(&self.ret, line)
    }

    pub fn match_return_type(&self, line: &str) -> Option<TailMatch> {
        self.tail(&self.rtype, line)
    }

    pub fn match_raises(&self, line: &str) -> Option<TailMatch> {
        self.tail(&self.raises, line)
    }

    /// Shared extraction for the keyword-only directives, whose description
    /// capture is optional (a bare `@return` is legal).
    fn tail(&self, re: &Regex, line: &str) -> Option<TailMatch> {
        let caps = re.captures(line)?;
        Some(match self.mode {
            OutputMode::Span => TailMatch {
                indent: String::new(),
                description: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            },
            OutputMode::LineBreak => TailMatch {
                indent: caps[1].to_string(),
                description: caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            },
        })
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("directive pattern template is valid")
}
