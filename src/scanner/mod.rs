use crate::directives::{Action, DirectiveDescriptor, DirectiveRegistry};
use crate::engine::TransformError;
use regex::Regex;

/// Line separator convention of a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSeparator {
    Lf,
    CrLf,
}

impl LineSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSeparator::Lf => "\n",
            LineSeparator::CrLf => "\r\n",
        }
    }

    /// CRLF if the text uses it anywhere, LF otherwise
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineSeparator::CrLf
        } else {
            LineSeparator::Lf
        }
    }
}

/// A recognized directive on a line
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// ID of the family that recognized the keyword
    pub descriptor: &'static str,
    pub keyword: String,
    /// Raw text after the keyword, comment closer removed
    pub argument: String,
    pub action: Action,
}

/// One input line, tagged with its directive if it has one
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedLine<'a> {
    /// Line number (1-based)
    pub number: usize,
    pub text: &'a str,
    pub directive: Option<Directive>,
}

impl TaggedLine<'_> {
    pub fn is_directive(&self) -> bool {
        self.directive.is_some()
    }
}

/// Result of scanning a whole source text
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedSource<'a> {
    pub lines: Vec<TaggedLine<'a>>,
    pub separator: LineSeparator,
    /// Whether the text ended with a line separator
    pub trailing_separator: bool,
}

impl ScannedSource<'_> {
    pub fn directive_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_directive()).count()
    }
}

/// Recognizes comment-wrapped directives such as `// #if DEV` or `<!-- #endif -->`
#[derive(Debug, Clone)]
pub struct LineScanner {
    directive_regex: Regex,
}

impl LineScanner {
    /// Create a new line scanner
    pub fn new() -> Self {
        // optional comment opener, `#keyword`, optional argument, optional comment closer
        let directive_regex = Regex::new(
            r"^\s*(?:(?://+|/\*+|<!--|--|;+|#)\s*)?#([A-Za-z]+)\b(.*?)\s*(?:\*+/|-->)?\s*$",
        )
        .expect("Invalid directive regex");

        Self { directive_regex }
    }

    /// Split a text into lines without their separators
    pub fn split_lines(text: &str) -> (Vec<&str>, LineSeparator, bool) {
        let separator = LineSeparator::detect(text);
        if text.is_empty() {
            return (Vec::new(), separator, false);
        }

        let trailing = text.ends_with('\n');
        let body = if trailing { &text[..text.len() - 1] } else { text };
        let lines = body
            .split('\n')
            .map(|line| match separator {
                LineSeparator::CrLf => line.strip_suffix('\r').unwrap_or(line),
                LineSeparator::Lf => line,
            })
            .collect();

        (lines, separator, trailing)
    }

    /// Match a single line against the registered directive families
    pub fn match_line<'l, 'r>(
        &self,
        line: &'l str,
        registry: &'r DirectiveRegistry,
    ) -> Option<(&'r dyn DirectiveDescriptor, &'l str, &'l str)> {
        let captures = self.directive_regex.captures(line)?;
        let keyword = captures.get(1)?.as_str();
        let argument = captures.get(2).map(|m| m.as_str().trim()).unwrap_or("");

        let descriptor = registry.find(keyword)?;
        Some((descriptor, keyword, argument))
    }

    /// Tag every line of `text`; fails on the first directive whose argument does not parse
    pub fn scan<'a>(
        &self,
        text: &'a str,
        file: &str,
        registry: &DirectiveRegistry,
    ) -> Result<ScannedSource<'a>, TransformError> {
        let (raw_lines, separator, trailing_separator) = Self::split_lines(text);
        let mut lines = Vec::with_capacity(raw_lines.len());

        for (idx, line) in raw_lines.into_iter().enumerate() {
            let number = idx + 1;
            let directive = match self.match_line(line, registry) {
                Some((descriptor, keyword, argument)) => {
                    let action = descriptor.parse(keyword, argument).map_err(|source| {
                        TransformError::InvalidDirective {
                            file: file.to_string(),
                            line: number,
                            text: line.trim().to_string(),
                            source,
                        }
                    })?;
                    Some(Directive {
                        descriptor: descriptor.id(),
                        keyword: keyword.to_string(),
                        argument: argument.to_string(),
                        action,
                    })
                }
                None => None,
            };

            lines.push(TaggedLine {
                number,
                text: line,
                directive,
            });
        }

        Ok(ScannedSource {
            lines,
            separator,
            trailing_separator,
        })
    }
}

impl Default for LineScanner {
    fn default() -> Self {
        Self::new()
    }
}
