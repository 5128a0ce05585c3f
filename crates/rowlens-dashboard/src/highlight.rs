//! Search term highlighting over rendered cell markup.
//!
//! Only text between tags is touched. Type labels and expand buttons are
//! skipped entirely, and attribute values are never rewritten.

use rowlens_core::html::{escape_html, unescape_html};
use rowlens_core::viewer::HIGHLIGHT_MIN_CHARS;

const HIGHLIGHT_OPEN: &str = r#"<span class="rowlens-search-highlight">"#;
const HIGHLIGHT_CLOSE: &str = "</span>";

/// Elements whose text is never highlighted.
const SKIP_CLASSES: [&str; 2] = ["rowlens-data-type", "rowlens-expand-btn"];

const VOID_ELEMENTS: [&str; 6] = ["br", "hr", "img", "input", "meta", "wbr"];

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Wrap case-insensitive matches of `term` in `html` with highlight spans.
///
/// Terms shorter than two characters leave the markup unchanged.
pub fn highlight(html: &str, term: &str) -> String {
    if term.chars().count() < HIGHLIGHT_MIN_CHARS {
        return html.to_string();
    }
    let needle: Vec<char> = term.chars().map(fold).collect();

    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut skip_depth = 0usize;

    while !rest.is_empty() {
        if rest.starts_with('<') {
            let Some(end) = rest.find('>').map(|i| i + 1) else {
                out.push_str(rest);
                break;
            };
            let tag = &rest[..end];
            out.push_str(tag);
            rest = &rest[end..];

            let closing = tag.starts_with("</");
            let opens = !closing && !tag.ends_with("/>") && !is_void(tag);
            if skip_depth > 0 {
                if closing {
                    skip_depth -= 1;
                } else if opens {
                    skip_depth += 1;
                }
            } else if opens && has_skip_class(tag) {
                skip_depth = 1;
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            let text = &rest[..end];
            if skip_depth > 0 {
                out.push_str(text);
            } else {
                highlight_text(text, &needle, &mut out);
            }
            rest = &rest[end..];
        }
    }
    out
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name(tag).as_str())
}

fn has_skip_class(tag: &str) -> bool {
    let Some(start) = tag.find("class=\"").map(|i| i + "class=\"".len()) else {
        return false;
    };
    let classes = &tag[start..];
    let classes = &classes[..classes.find('"').unwrap_or(classes.len())];
    classes
        .split_whitespace()
        .any(|class| SKIP_CLASSES.contains(&class))
}

/// Highlight one escaped text run, appending the result to `out`.
fn highlight_text(escaped: &str, needle: &[char], out: &mut String) {
    let plain = unescape_html(escaped);
    let chars: Vec<char> = plain.chars().collect();
    let n = needle.len();

    let mut pending = String::new();
    let mut matched = false;
    let mut i = 0;
    while i < chars.len() {
        let hit = i + n <= chars.len()
            && chars[i..i + n]
                .iter()
                .zip(needle)
                .all(|(c, t)| fold(*c) == *t);
        if hit {
            matched = true;
            out.push_str(&escape_html(&pending));
            pending.clear();
            let found: String = chars[i..i + n].iter().collect();
            out.push_str(HIGHLIGHT_OPEN);
            out.push_str(&escape_html(&found));
            out.push_str(HIGHLIGHT_CLOSE);
            i += n;
        } else {
            pending.push(chars[i]);
            i += 1;
        }
    }

    if matched {
        out.push_str(&escape_html(&pending));
    } else {
        out.push_str(escaped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_matches_case_insensitively() {
        assert_eq!(
            highlight("Hello World, hello", "HELLO"),
            r#"<span class="rowlens-search-highlight">Hello</span> World, <span class="rowlens-search-highlight">hello</span>"#
        );
    }

    #[test]
    fn short_terms_are_ignored() {
        assert_eq!(highlight("a cat", "a"), "a cat");
    }

    #[test]
    fn attributes_are_untouched() {
        let html = r#"<div class="rowlens-cell-content" title="admin">admin</div>"#;
        assert_eq!(
            highlight(html, "admin"),
            r#"<div class="rowlens-cell-content" title="admin"><span class="rowlens-search-highlight">admin</span></div>"#
        );
    }

    #[test]
    fn type_labels_and_buttons_are_skipped() {
        let html = concat!(
            r#"<span class="rowlens-json-data"><span class="rowlens-data-type">[JSON Array: 2 items]</span> "#,
            r#"<span class="rowlens-data-preview">[1, 2]</span></span>"#,
            r#"<button class="rowlens-expand-btn" data-raw="x">Expand</button>"#
        );
        let out = highlight(html, "array");
        assert!(!out.contains("rowlens-search-highlight"));

        let out = highlight(html, "expand");
        assert!(!out.contains("rowlens-search-highlight"));
    }

    #[test]
    fn entities_match_their_characters() {
        assert_eq!(
            highlight("Tom &amp; Jerry", "m & j"),
            r#"To<span class="rowlens-search-highlight">m &amp; J</span>erry"#
        );
    }

    #[test]
    fn entity_text_is_not_matched_as_markup() {
        assert_eq!(highlight("a &lt; b", "lt"), "a &lt; b");
    }
}
