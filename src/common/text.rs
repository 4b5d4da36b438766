//! Text helpers used when synthesizing source edits

/// Leading whitespace of the line containing `offset`.
pub fn indentation_at(source: &str, offset: usize) -> &str {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let rest = &source[line_start..];
    let width = rest
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(rest.len());
    &rest[..width]
}

/// The newline sequence the file predominantly uses.
pub fn detect_newline(source: &str) -> &'static str {
    if source.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// One level of indentation as used by the file, defaulting to four spaces.
pub fn indent_unit(source: &str) -> String {
    let smallest = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start().len()])
        .filter(|ws| !ws.is_empty())
        .min_by_key(|ws| ws.len());

    match smallest {
        Some(ws) if ws.starts_with('\t') => "\t".to_string(),
        Some(ws) => ws.to_string(),
        None => "    ".to_string(),
    }
}

/// Whether `offset` is the first non-whitespace position on its line.
pub fn is_line_start(source: &str, offset: usize) -> bool {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..offset].trim().is_empty()
}
