//! `Content-Disposition` parameter parsing for downloaded results.

use percent_encoding::percent_decode_str;

/// Name used when the server marks the body as an attachment without a usable filename.
pub const ATTACHMENT_FALLBACK_NAME: &str = "compressed_file";

/// Split a header value on `;`, ignoring separators inside quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in header.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        let inner = &value[1..value.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else {
                out.push(c);
            }
        }
        return out;
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].to_string();
    }
    // Unbalanced quote, e.g. `filename="abc` from a truncated header.
    value.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Decode an RFC 5987 ext-value (`UTF-8''na%C3%AFve.pdf`).
fn decode_ext_value(value: &str) -> Option<String> {
    let value = unquote(value);
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let encoded = pieces.next()?;

    let bytes = percent_decode_str(encoded);
    if charset.eq_ignore_ascii_case("utf-8") {
        Some(bytes.decode_utf8_lossy().into_owned())
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        // Latin-1 bytes are the first 256 code points.
        Some(bytes.map(char::from).collect())
    } else {
        None
    }
}

/// Extract the `filename` parameter from a `Content-Disposition` value.
///
/// `filename*` wins over `filename` when both are present and decodable.
/// Surrounding quotes are removed from the result.
pub fn filename_param(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header).into_iter().skip(1) {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        match name.trim().to_ascii_lowercase().as_str() {
            "filename" if plain.is_none() => plain = Some(unquote(value)),
            "filename*" if extended.is_none() => extended = decode_ext_value(value),
            _ => {}
        }
    }

    extended.or(plain).filter(|name| !name.is_empty())
}

/// Pick the name the downloaded result is saved under.
///
/// An `attachment` disposition supplies the name (or [`ATTACHMENT_FALLBACK_NAME`]
/// when it has none). Without one, the original name gets a `compressed_` prefix.
pub fn download_filename(header: Option<&str>, original_name: &str) -> String {
    match header {
        Some(value) if value.to_ascii_lowercase().contains("attachment") => {
            filename_param(value).unwrap_or_else(|| ATTACHMENT_FALLBACK_NAME.to_string())
        }
        _ => format!("compressed_{}", original_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        assert_eq!(
            download_filename(Some(r#"attachment; filename="out.pdf""#), "doc.pdf"),
            "out.pdf"
        );
    }

    #[test]
    fn unquoted_filename() {
        assert_eq!(
            download_filename(Some("attachment; filename=sample.jpg_compressed.jpg"), "a.jpg"),
            "sample.jpg_compressed.jpg"
        );
    }

    #[test]
    fn single_quoted_filename() {
        assert_eq!(
            filename_param("attachment; filename='out.png'").as_deref(),
            Some("out.png")
        );
    }

    #[test]
    fn missing_header_synthesizes_name() {
        assert_eq!(download_filename(None, "doc.pdf"), "compressed_doc.pdf");
    }

    #[test]
    fn inline_disposition_synthesizes_name() {
        assert_eq!(
            download_filename(Some(r#"inline; filename="view.pdf""#), "doc.pdf"),
            "compressed_doc.pdf"
        );
    }

    #[test]
    fn attachment_without_filename_uses_fallback() {
        assert_eq!(download_filename(Some("attachment"), "doc.pdf"), "compressed_file");
        assert_eq!(
            download_filename(Some(r#"attachment; filename="""#), "doc.pdf"),
            "compressed_file"
        );
    }

    #[test]
    fn semicolon_inside_quotes() {
        assert_eq!(
            filename_param(r#"attachment; filename="a;b.pdf"; size=10"#).as_deref(),
            Some("a;b.pdf")
        );
    }

    #[test]
    fn escaped_quote_inside_value() {
        assert_eq!(
            filename_param(r#"attachment; filename="say \"hi\".pdf""#).as_deref(),
            Some(r#"say "hi".pdf"#)
        );
    }

    #[test]
    fn extended_filename_is_preferred() {
        let header = r#"attachment; filename="naive.pdf"; filename*=UTF-8''na%C3%AFve.pdf"#;
        assert_eq!(filename_param(header).as_deref(), Some("naïve.pdf"));
    }

    #[test]
    fn parameter_names_are_case_insensitive() {
        assert_eq!(
            filename_param("Attachment; FileName=Report.PDF").as_deref(),
            Some("Report.PDF")
        );
    }

    #[test]
    fn unbalanced_quote_is_stripped() {
        assert_eq!(
            filename_param(r#"attachment; filename="abc"#).as_deref(),
            Some("abc")
        );
        assert_eq!(
            filename_param("attachment; filename=abc.pdf'").as_deref(),
            Some("abc.pdf")
        );
    }

    #[test]
    fn latin1_extended_filename() {
        assert_eq!(
            filename_param("attachment; filename*=iso-8859-1''caf%E9.pdf").as_deref(),
            Some("café.pdf")
        );
    }
}
