//! Finalizer
//!
//! Global whitespace normalization run over the assembled body text. Fenced
//! code blocks are located once and left untouched by the line-break
//! promotion; their language tags may be replaced from per-document hints.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConvertError, Result};
use crate::options::HardBreak;

const NBSP: &str = "&nbsp;";

static TRAILING_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +\n").expect("valid regex"));
static NBSP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\**(?:&nbsp;)+\**\n").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n\n+").expect("valid regex"));
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```([^`\n]*)\n.*?```").expect("valid regex"));

/// Normalize the converted body
///
/// `hints`, when given, must hold one language tag per fenced code block in
/// order of appearance.
pub fn finalize(text: &str, hard_break: HardBreak, hints: Option<&[String]>) -> Result<String> {
    let txt = text
        .replace('\u{a0}', NBSP)
        .replace('\t', "    ")
        .replace('\u{feff}', "");
    let txt = isolated_nbsp_to_space(&txt);
    let txt = TRAILING_SPACES.replace_all(&txt, "\n");
    let txt = NBSP_LINE.replace_all(&txt, "\n\n");
    let txt = BLANK_LINES.replace_all(&txt, "\n\n");
    // Leading space keeps indentation-only lines from becoming code
    let txt = txt.replace("\n&nbsp;", "\n &nbsp;");
    let txt = apply_hints(&txt, hints)?;
    let txt = promote_breaks(&txt, hard_break.marker());

    Ok(format!("{}\n", txt.trim()))
}

/// Number of fenced code blocks in a text
pub fn count_code_blocks(text: &str) -> usize {
    FENCE.find_iter(text).count()
}

// `&nbsp;` is kept in a line-leading run, before another `&nbsp;` and as an
// empty table cell; anywhere else it is a plain space
fn isolated_nbsp_to_space(txt: &str) -> String {
    let mut out = String::with_capacity(txt.len());
    for line in txt.split_inclusive('\n') {
        let body = line.trim_start_matches(NBSP);
        out.push_str(&line[..line.len() - body.len()]);

        let mut rest = body;
        while let Some(pos) = rest.find(NBSP) {
            out.push_str(&rest[..pos]);
            rest = &rest[pos + NBSP.len()..];
            let kept = rest.starts_with(NBSP) || rest.starts_with('|');
            out.push_str(if kept { NBSP } else { " " });
        }
        out.push_str(rest);
    }
    out
}

fn apply_hints(txt: &str, hints: Option<&[String]>) -> Result<String> {
    let Some(hints) = hints else {
        return Ok(txt.to_string());
    };
    let langs: Vec<Range<usize>> = FENCE
        .captures_iter(txt)
        .filter_map(|c| c.get(1).map(|m| m.range()))
        .collect();
    if langs.len() != hints.len() {
        return Err(ConvertError::CodeHintMismatch {
            expected: hints.len(),
            found: langs.len(),
        });
    }

    let mut out = String::with_capacity(txt.len());
    let mut last = 0;
    for (range, lang) in langs.iter().zip(hints) {
        out.push_str(&txt[last..range.start]);
        out.push_str(lang);
        last = range.end;
    }
    out.push_str(&txt[last..]);
    Ok(out)
}

fn starts_with_ordered_marker(line: &str) -> bool {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    digits > 0 && line[digits..].starts_with(". ")
}

// `newline` indexes into a segment without code, so a line break at either
// end of the segment borders a fence and is never promoted
fn needs_break(segment: &str, newline: usize) -> bool {
    if !segment[..newline].chars().next_back().is_some_and(|c| !c.is_whitespace()) {
        return false;
    }
    let rest = &segment[newline + 1..];
    if rest.starts_with('\n') || rest.trim().is_empty() {
        return false;
    }
    let line = rest.trim_start_matches(' ');
    !(line.starts_with(['|', '-', ':', '>']) || starts_with_ordered_marker(line))
}

fn promote_segment(segment: &str, marker: &str, out: &mut String) {
    let mut last = 0;
    for (i, _) in segment.match_indices('\n') {
        if needs_break(segment, i) {
            out.push_str(&segment[last..i]);
            out.push_str(marker);
            last = i;
        }
    }
    out.push_str(&segment[last..]);
}

/// Insert the hard-break marker before single line breaks outside code
fn promote_breaks(txt: &str, marker: &str) -> String {
    let mut out = String::with_capacity(txt.len());
    let mut last = 0;
    for fence in FENCE.find_iter(txt) {
        promote_segment(&txt[last..fence.start()], marker, &mut out);
        out.push_str(fence.as_str());
        last = fence.end();
    }
    promote_segment(&txt[last..], marker, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(text: &str) -> String {
        finalize(text, HardBreak::Backslash, None).unwrap()
    }

    #[test]
    fn test_single_breaks_promoted() {
        assert_eq!(run("one\ntwo\n\nthree"), "one\\\ntwo\n\nthree\n");
        let html = finalize("one\ntwo", HardBreak::Html, None).unwrap();
        assert_eq!(html, "one<br>\ntwo\n");
    }

    #[test]
    fn test_no_break_before_block_markers() {
        assert_eq!(run("a\n- b\n- c"), "a\n- b\n- c\n");
        assert_eq!(run("|a|\n|---|"), "|a|\n|---|\n");
        assert_eq!(run("term\n: def"), "term\n: def\n");
        assert_eq!(run("> quote\n> more"), "> quote\n> more\n");
        assert_eq!(run("x\n1. first"), "x\n1. first\n");
        assert_eq!(run("x\n1999 was"), "x\\\n1999 was\n");
    }

    #[test]
    fn test_blank_lines_collapsed() {
        assert_eq!(run("\n\na\n\n\n\nb\n\n\n"), "a\n\nb\n");
    }

    #[test]
    fn test_trailing_spaces_removed() {
        assert_eq!(run("a   \n\nb"), "a\n\nb\n");
    }

    #[test]
    fn test_nbsp_handling() {
        assert_eq!(run("a\u{a0}b"), "a b\n");
        assert_eq!(run("a\n\n\u{a0}\u{a0}indented"), "a\n\n &nbsp;&nbsp;indented\n");
        assert_eq!(run("a\n\u{a0}\u{a0}\nb"), "a\n\nb\n");
    }

    #[test]
    fn test_nbsp_inside_line_is_space() {
        assert_eq!(run("a\u{a0}sun"), "a sun\n");
        assert_eq!(run("a\u{a0}moon and\u{a0}pear"), "a moon and pear\n");
        assert_eq!(run("wide\u{a0}\u{a0}gap"), "wide&nbsp; gap\n");
        assert_eq!(run("|a|\u{a0}|"), "|a|&nbsp;|\n");
    }

    #[test]
    fn test_nbsp_at_line_start_kept() {
        assert_eq!(run("a\n\n\u{a0}word"), "a\n\n &nbsp;word\n");
        assert_eq!(run("\u{a0}sun"), "&nbsp;sun\n");
    }

    #[test]
    fn test_bom_and_tabs() {
        assert_eq!(run("\u{feff}a\tb"), "a    b\n");
    }

    #[test]
    fn test_code_blocks_untouched() {
        let text = "intro\n\n```bash\nls\ncd /\n```\n\nend";
        assert_eq!(run(text), "intro\n\n```bash\nls\ncd /\n```\n\nend\n");
    }

    #[test]
    fn test_no_break_around_fences() {
        let text = "- ```bash\nx = 1\n```\nafter\nmore";
        assert_eq!(run(text), "- ```bash\nx = 1\n```\nafter\\\nmore\n");
        assert_eq!(run("intro\n```bash\nls\n```"), "intro\n```bash\nls\n```\n");
    }

    #[test]
    fn test_hints_substitute_languages() {
        let text = "```bash\nprint(1)\n```\n\n```\nx\n```";
        let hints = vec!["python".to_string(), "text".to_string()];
        let out = finalize(text, HardBreak::Backslash, Some(&hints)).unwrap();
        assert_eq!(out, "```python\nprint(1)\n```\n\n```text\nx\n```\n");
    }

    #[test]
    fn test_hint_count_mismatch_is_fatal() {
        let hints = vec!["python".to_string()];
        let err = finalize("no code here", HardBreak::Backslash, Some(&hints)).unwrap_err();
        assert_eq!(err, ConvertError::CodeHintMismatch { expected: 1, found: 0 });
    }

    #[test]
    fn test_count_code_blocks() {
        assert_eq!(count_code_blocks("```bash\na\n```\ntext\n```\nb\n```"), 2);
    }

    proptest! {
        #[test]
        fn code_block_newlines_preserved(
            lines in proptest::collection::vec("[a-z][a-z ()=]{0,8}[a-z)]", 2..6),
            before in "[a-z]{1,8}",
            after in "[a-z]{1,8}",
            gap_before in "\n{1,2}",
            gap_after in "\n{1,2}",
        ) {
            let code = lines.join("\n");
            let text = format!("{before}{gap_before}```bash\n{code}\n```{gap_after}{after}");
            let out = finalize(&text, HardBreak::Backslash, None).unwrap();
            let expected = format!("```bash\n{code}\n```\n");
            prop_assert!(out.contains(&expected));
            prop_assert!(!out.contains("```\\"));
        }
    }
}
