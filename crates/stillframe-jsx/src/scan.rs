//! Textual scanning primitives shared by the extractor, converter and attribute parser.
//!
//! Everything here works on byte offsets returned by searches for ASCII
//! delimiters, so every offset handed back is a valid `str` boundary.

/// End of an opening tag found by [`find_tag_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEnd {
    /// Offset just past the closing `>`
    pub end: usize,

    /// Offset where the attribute text stops (the `/` of `/>` or the `>`)
    pub attrs_end: usize,

    /// Whether the tag was written `<Tag ... />`
    pub self_closing: bool,
}

/// Find the `>` that ends the tag starting at `start` (which must point at `<`).
///
/// Quoted attribute strings and `{...}` expressions are skipped, so
/// `onClick={() => go()}` does not end the tag early.
pub fn find_tag_end(s: &str, start: usize) -> Option<TagEnd> {
    let bytes = s.as_bytes();
    let mut i = start + 1;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                let close = s[i + 1..].find(quote as char)?;
                i += close + 2;
            }
            b'{' => {
                i = skip_braces(s, i)?;
            }
            b'>' => {
                let before = s[..i].trim_end();
                let self_closing = before.len() > start + 1 && before.ends_with('/');
                let attrs_end = if self_closing { before.len() - 1 } else { i };
                return Some(TagEnd {
                    end: i + 1,
                    attrs_end,
                    self_closing,
                });
            }
            _ => i += 1,
        }
    }

    None
}

/// Offset just past the `}` that closes the `{` at `open`.
///
/// Tracks nesting and skips string and template literals. Used for attribute
/// expressions only; child expression containers end at the first `}`.
pub fn skip_braces(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}

/// Whether `rest` (starting at `<`) opens a tag named `tag`.
///
/// The name must be followed by whitespace, `>` or `/`, so `<TagExtra>` does
/// not count as `<Tag`. An empty `tag` stands for the `<>` fragment opener.
pub fn opens_tag(rest: &str, tag: &str) -> bool {
    if tag.is_empty() {
        return rest.starts_with("<>");
    }

    let Some(after) = rest.strip_prefix('<').and_then(|r| r.strip_prefix(tag)) else {
        return false;
    };

    matches!(after.chars().next(), Some(c) if c.is_whitespace() || c == '>' || c == '/')
}

/// The literal closing tag for `tag` (`</>` for fragments).
pub fn closing_tag(tag: &str) -> String {
    format!("</{tag}>")
}

/// Find the matching `</tag>` in `text`, which starts right after the opening tag.
///
/// Depth starts at 1. Same-name openers increment it unless they are
/// self-closing, each `</tag>` decrements it, and the offset of the close that
/// brings it to 0 is returned. `None` means the input ended first.
pub fn scan_balanced(text: &str, tag: &str) -> Option<usize> {
    let close = closing_tag(tag);
    let mut depth = 1usize;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('<') {
        let at = pos + offset;
        let rest = &text[at..];

        if rest.starts_with(&close) {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
            pos = at + close.len();
        } else if opens_tag(rest, tag) {
            match find_tag_end(text, at) {
                Some(end) => {
                    if !end.self_closing {
                        depth += 1;
                    }
                    pos = end.end;
                }
                None => {
                    depth += 1;
                    pos = at + 1;
                }
            }
        } else {
            pos = at + 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_tag_end() {
        let s = r#"<div className="a">x</div>"#;
        let end = find_tag_end(s, 0).unwrap();

        assert_eq!(&s[..end.end], r#"<div className="a">"#);
        assert_eq!(&s[4..end.attrs_end], r#" className="a""#);
        assert!(!end.self_closing);
    }

    #[test]
    fn finds_self_closing_tag_end() {
        let s = r#"<img src="a.png" />rest"#;
        let end = find_tag_end(s, 0).unwrap();

        assert!(end.self_closing);
        assert_eq!(&s[end.end..], "rest");
        assert_eq!(&s[4..end.attrs_end], r#" src="a.png" "#);
    }

    #[test]
    fn skips_arrow_inside_expression() {
        let s = "<button onClick={() => go()}>Go</button>";
        let end = find_tag_end(s, 0).unwrap();

        assert_eq!(&s[end.end..], "Go</button>");
    }

    #[test]
    fn skips_gt_inside_quotes() {
        let s = r#"<a title="1 > 0">x</a>"#;
        let end = find_tag_end(s, 0).unwrap();

        assert_eq!(&s[end.end..], "x</a>");
    }

    #[test]
    fn unterminated_tag_has_no_end() {
        assert_eq!(find_tag_end("<div className=\"a\"", 0), None);
    }

    #[test]
    fn skip_braces_handles_nesting() {
        let s = "{{ color: 'red' }} after";
        assert_eq!(&s[skip_braces(s, 0).unwrap()..], " after");
    }

    #[test]
    fn skip_braces_ignores_braces_in_strings() {
        let s = "{'}'} after";
        assert_eq!(&s[skip_braces(s, 0).unwrap()..], " after");
    }

    #[test]
    fn opens_tag_requires_name_boundary() {
        assert!(opens_tag("<div>", "div"));
        assert!(opens_tag("<div className=\"x\">", "div"));
        assert!(opens_tag("<div/>", "div"));
        assert!(!opens_tag("<divider>", "div"));
        assert!(!opens_tag("</div>", "div"));
        assert!(opens_tag("<>", ""));
    }

    #[test]
    fn balanced_scan_handles_same_name_nesting() {
        let text = "<div>x</div><div>y</div></div>tail";
        let close = scan_balanced(text, "div").unwrap();

        assert_eq!(&text[close..], "</div>tail");
    }

    #[test]
    fn balanced_scan_ignores_prefixed_names() {
        let text = "<Card>a</Card><CardBody>b</CardBody></Card>";
        let close = scan_balanced("<CardBody>b</CardBody></Card>", "Card").unwrap();

        assert_eq!(close, "<CardBody>b</CardBody>".len());
        assert!(scan_balanced(text, "Card").is_some());
    }

    #[test]
    fn balanced_scan_skips_self_closing_openers() {
        let text = "<div /><div/>x</div>";
        assert_eq!(scan_balanced(text, "div"), Some("<div /><div/>x".len()));
    }

    #[test]
    fn balanced_scan_reports_truncated_input() {
        assert_eq!(scan_balanced("<div>x</div>", "div"), None);
        assert_eq!(scan_balanced("", "div"), None);
    }

    #[test]
    fn balanced_scan_handles_fragments() {
        let text = "<>a</>b</>";
        assert_eq!(scan_balanced(text, ""), Some("<>a</>b".len()));
    }
}
