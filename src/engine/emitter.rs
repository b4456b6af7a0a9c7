use crate::scanner::ScannedSource;

/// Render the surviving lines.
///
/// With `preserve_line_numbers` every input line yields exactly one output line
/// (removed lines become empty); otherwise removed lines are dropped. The source's
/// separator convention and trailing separator are kept.
pub fn emit(source: &ScannedSource<'_>, verdicts: &[bool], preserve_line_numbers: bool) -> String {
    debug_assert_eq!(source.lines.len(), verdicts.len());

    let kept: Vec<&str> = source
        .lines
        .iter()
        .zip(verdicts)
        .filter_map(|(line, active)| match (*active, preserve_line_numbers) {
            (true, _) => Some(line.text),
            (false, true) => Some(""),
            (false, false) => None,
        })
        .collect();

    let separator = source.separator.as_str();
    let mut output = kept.join(separator);
    if source.trailing_separator && !kept.is_empty() {
        output.push_str(separator);
    }
    output
}
