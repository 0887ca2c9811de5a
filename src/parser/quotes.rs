/// Whether `prefix` ends inside a string literal.
///
/// Counts `"` and `'` that are not escaped by an odd run of backslashes. An
/// odd count means an open literal. This is a heuristic, not a lexer: it does
/// not track which quote opened the literal or skip comments.
pub fn inside_string(prefix: &str) -> bool {
    let mut quotes = 0usize;
    let mut backslashes = 0usize;

    for ch in prefix.chars() {
        match ch {
            '\\' => {
                backslashes += 1;
                continue;
            }
            '"' | '\'' if backslashes % 2 == 0 => quotes += 1,
            _ => {}
        }
        backslashes = 0;
    }

    quotes % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::inside_string;

    #[test]
    fn balanced_quotes_are_outside() {
        assert!(!inside_string("var x = \"a\"; "));
        assert!(!inside_string(""));
    }

    #[test]
    fn open_literal_is_inside() {
        assert!(inside_string("var x = \""));
        assert!(inside_string("eval('"));
    }

    #[test]
    fn escaped_quotes_do_not_count() {
        assert!(inside_string(r#"var x = "a\"b"#));
        assert!(!inside_string(r#"var x = "a\\" + "#));
    }
}
