use crate::ArtifactFormat;

const MAX_NAME_LEN: usize = 80;

/// Pulls the `filename` parameter out of a `Content-Disposition` header.
/// The result is sanitized; `None` means there was nothing usable.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"'))
    })?;
    let cleaned = sanitize(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// File name to save an artifact under: the service's suggestion if it
/// survives sanitizing, else the format's default name.
pub fn artifact_filename(suggested: Option<&str>, format: ArtifactFormat) -> String {
    suggested
        .map(sanitize)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format.default_file_name().to_string())
}

/// Keeps only the last path component and replaces characters that are not
/// allowed in Windows file names.
fn sanitize(input: &str) -> String {
    let last = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let mut cleaned = String::with_capacity(last.len());
    let mut prev_underscore = false;
    for c in last.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        cleaned.push(c);
    }
    let mut cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]).to_string();
    if cleaned.len() > MAX_NAME_LEN {
        let mut end = MAX_NAME_LEN;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    let stem = cleaned.split('.').next().unwrap_or_default();
    if is_reserved_windows_name(stem) {
        cleaned.insert(stem.len(), '_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{artifact_filename, filename_from_disposition};
    use crate::ArtifactFormat;

    #[test]
    fn reads_plain_and_quoted_filename() {
        assert_eq!(
            filename_from_disposition("attachment; filename=cheatsheet.md"),
            Some("cheatsheet.md".to_string())
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; FILENAME="notes.pdf""#),
            Some("notes.pdf".to_string())
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[test]
    fn strips_directories() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"../../etc/passwd\""),
            Some("passwd".to_string())
        );
        assert_eq!(
            artifact_filename(Some("C:\\temp\\sheet.json"), ArtifactFormat::Json),
            "sheet.json"
        );
    }

    #[test]
    fn falls_back_to_format_default() {
        assert_eq!(artifact_filename(None, ArtifactFormat::Pdf), "cheatsheet.pdf");
        assert_eq!(
            artifact_filename(Some("..."), ArtifactFormat::Markdown),
            "cheatsheet.md"
        );
    }

    #[test]
    fn patches_reserved_names_and_forbidden_chars() {
        assert_eq!(artifact_filename(Some("CON.md"), ArtifactFormat::Markdown), "CON_.md");
        assert_eq!(
            artifact_filename(Some("a::b?.md"), ArtifactFormat::Markdown),
            "a_b_.md"
        );
    }
}
