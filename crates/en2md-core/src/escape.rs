//! Escaping of characters that collide with Markdown syntax

/// Characters that are backslash-escaped in plain text
pub const RESERVED: &str = "<>$*`-_";

/// Prefix every reserved character with a backslash
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if RESERVED.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Remove the backslash in front of reserved characters
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && RESERVED.contains(next)
        {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a_b *c*"), "a\\_b \\*c\\*");
        assert_eq!(escape("<tag> $5 -x `y`"), "\\<tag\\> \\$5 \\-x \\`y\\`");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_unescape_leaves_other_backslashes() {
        assert_eq!(unescape("C:\\dir\\_file"), "C:\\dir_file");
        assert_eq!(unescape("\\\\"), "\\\\");
    }

    proptest! {
        #[test]
        fn unescape_reverses_escape(s in "[<>$*`_a-z -]{0,40}") {
            prop_assert_eq!(unescape(&escape(&s)), s);
        }
    }
}
