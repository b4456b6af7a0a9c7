use eyre::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Decides which files get transformed, from include/exclude glob patterns.
///
/// `*` matches within one path segment, `**` across segments, `?` one character.
/// Patterns without a `/` match the file name at any depth.
#[derive(Debug, Clone)]
pub struct PathFilter {
    cwd: PathBuf,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl PathFilter {
    /// Build a filter; an empty include list includes everything
    pub fn new<S: AsRef<str>>(cwd: impl Into<PathBuf>, include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            cwd: cwd.into(),
            include: compile_all(include)?,
            exclude: compile_all(exclude)?,
        })
    }

    /// Filter that accepts every file
    pub fn allow_all() -> Self {
        Self {
            cwd: PathBuf::from("."),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Check if a file should be transformed
    pub fn matches(&self, path: &Path) -> bool {
        let relative = self.relative(path);

        if self.exclude.iter().any(|re| re.is_match(&relative)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|re| re.is_match(&relative))
    }

    /// Path relative to the working directory, with `/` separators
    fn relative(&self, path: &Path) -> String {
        let path = path.strip_prefix(&self.cwd).unwrap_or(path);
        let text = path.to_string_lossy().replace('\\', "/");
        text.trim_start_matches("./").to_string()
    }
}

fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Regex::new(&glob_to_regex(p)).with_context(|| format!("Invalid path pattern: {}", p))
        })
        .collect()
}

/// Translate a glob pattern into an anchored regex
fn glob_to_regex(pattern: &str) -> String {
    let pattern = pattern.trim_start_matches("./");
    let pattern = if pattern.contains('/') {
        pattern.to_string()
    } else {
        format!("**/{}", pattern)
    };

    let mut regex = String::from("^");
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    regex.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    regex.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    regex.push('$');
    regex
}
