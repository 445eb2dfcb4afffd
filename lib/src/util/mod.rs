mod macros;
mod path_ext;

pub use path_ext::*;
pub use macros::*;

use std::borrow::Cow;
use std::path::Path;

/// Convert spaces to hyphens. Remove characters that aren't alphanumerics,
/// underscores, or hyphens. Convert to lowercase. Also strip leading and
/// trailing whitespace.
pub fn slugify(string: &str) -> String {
    let mut output = String::with_capacity(string.len());

    let mut need_dash = false;
    for ch in string.chars() {
        if ch.is_whitespace() || ch.is_control() {
            need_dash = !output.is_empty();
            continue;
        }

        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => {
                    if need_dash {
                        output.push('-');
                        need_dash = false;
                    }

                    output.push(b.to_ascii_lowercase() as char);
                }
                _ => {
                    // All runs of characters that aren't alphanumeric or `_`
                    // collapse into one `-`.
                    need_dash = !output.is_empty();
                }
            }
        }
    }

    output
}

/// Replaces every `\r\n` in `input` with `\n`.
///
/// ```rust
/// use mkpage::util::normalize_newlines;
///
/// assert_eq!(normalize_newlines("a\r\nb\r\n"), "a\nb\n");
/// assert_eq!(normalize_newlines("a\rb"), "a\rb");
/// ```
pub fn normalize_newlines(input: &str) -> Cow<'_, str> {
    match memchr::memmem::find(input.as_bytes(), b"\r\n") {
        Some(_) => Cow::Owned(input.replace("\r\n", "\n")),
        None => Cow::Borrowed(input),
    }
}

/// Escapes `&`, `<`, `>`, `"`, and `'` so that `input` is safe to use as HTML
/// text or as a quoted attribute value.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    let needs_escape = |b: &u8| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\'');
    let Some(first) = input.bytes().position(|b| needs_escape(&b)) else {
        return Cow::Borrowed(input);
    };

    let mut output = String::with_capacity(input.len() + 16);
    output.push_str(&input[..first]);
    for ch in input[first..].chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }

    Cow::Owned(output)
}

/// Computes the path to `target` as seen from the document at `source`.
///
/// Both paths are relative to the same site root. The result climbs out of
/// every directory `source` lives in and then descends into `target`.
///
/// ```rust
/// use mkpage::util::relative_doc_path;
///
/// assert_eq!(relative_doc_path("index.html", "css/site.css"), "css/site.css");
/// assert_eq!(relative_doc_path("docs/index.html", "css/site.css"), "../css/site.css");
/// assert_eq!(relative_doc_path("docs/chapter-01/lesson-02.html", "css/site.css"),
///     "../../css/site.css");
///
/// assert_eq!(relative_doc_path("docs/a/b.html", "."), "../../");
/// assert_eq!(relative_doc_path("docs/a/b.html", "/css/site.css"), "../../css/site.css");
/// assert_eq!(relative_doc_path("./docs/b.html", "./css/site.css"), "../css/site.css");
/// ```
pub fn relative_doc_path<S: AsRef<Path>>(source: S, target: &str) -> String {
    let depth = source.as_ref().parent().map_or(0, |dir| dir.depth());
    let target = target.trim_start_matches("./").trim_start_matches('/');

    let mut output = "../".repeat(depth);
    match target {
        "" | "." => {
            if output.is_empty() {
                output.push_str("./");
            }
        }
        _ => output.push_str(target),
    }

    output
}

/// Shortens `input` to at most `max` characters for use in messages.
pub fn abbreviate(input: &str, max: usize) -> Cow<'_, str> {
    match input.char_indices().nth(max) {
        Some((i, _)) => Cow::Owned(format!("{}...", &input[..i])),
        None => Cow::Borrowed(input),
    }
}

#[cfg(test)]
mod util_tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("My Test String!!!1!1"), "my-test-string-1-1");
        assert_eq!(slugify("test\nit   now!"), "test-it-now");
        assert_eq!(slugify("  --test_-_cool- -  "), "test_-_cool");
        assert_eq!(slugify("Æúű--cool?"), "aeuu-cool");
        assert_eq!(slugify("You & Me"), "you-me");
        assert_eq!(slugify("INT. HOUSE - DAY"), "int-house-day");
        assert_eq!(slugify("line\none\ttwo\r\nthree"), "line-one-two-three");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("short", 10), "short");
        assert_eq!(abbreviate("a longer string", 8), "a longer...");
    }
}
