use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

// best effort: a lone `<` survives
pub fn sanitize(text: &str) -> Cow<'_, str> {
    TAG.replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        assert_eq!(sanitize("<b>hi</b>"), "hi");
        assert_eq!(sanitize("a<script>x</script>b"), "axb");
        assert_eq!(sanitize("<i>42</i>"), "42");
    }

    #[test]
    fn leaves_plain_text_borrowed() {
        let out = sanitize("plain");
        assert_eq!(out, "plain");
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn attributes_and_multiline_tags() {
        assert_eq!(sanitize("<a href=\"x\"\n onclick=y>link</a>"), "link");
    }

    #[test]
    fn unmatched_angle_brackets_survive() {
        assert_eq!(sanitize("1 < 2 and 3 > 2"), "1  2");
        assert_eq!(sanitize("x < 5"), "x < 5");
        assert_eq!(sanitize("a > b"), "a > b");
    }
}
