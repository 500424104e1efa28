// Lexer tests: boundary rules, string mode, comments, and the
// lossless-split invariant

#[cfg(test)]
mod tests {
    use crate::lexer::{lex_line, RawToken};

    fn texts(line: &str) -> Vec<String> {
        lex_line(line).into_iter().map(|t| t.text).collect()
    }

    /// Concatenating a line's token texts must reproduce the line
    fn assert_round_trip(line: &str) {
        let joined: String = texts(line).concat();
        assert_eq!(joined, line, "lossless split broken for {:?}", line);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(lex_line(""), Vec::<RawToken>::new());
    }

    #[test]
    fn test_simple_assignment() {
        assert_eq!(texts("x = 5"), vec!["x", " ", "=", " ", "5"]);
    }

    #[test]
    fn test_whitespace_runs_stay_together() {
        assert_eq!(texts("a   b"), vec!["a", "   ", "b"]);
    }

    #[test]
    fn test_punctuation_never_coalesces() {
        assert_eq!(texts("))"), vec![")", ")"]);
        assert_eq!(texts("foo()"), vec!["foo", "(", ")"]);
    }

    #[test]
    fn test_string_token_includes_quotes() {
        assert_eq!(
            texts("msg = \"hi there\""),
            vec!["msg", " ", "=", " ", "\"hi there\""]
        );
    }

    #[test]
    fn test_string_swallows_punctuation_and_spaces() {
        assert_eq!(
            texts("say(\"a, (b) = c\")"),
            vec!["say", "(", "\"a, (b) = c\"", ")"]
        );
    }

    #[test]
    fn test_adjacent_string_and_marker() {
        assert_eq!(
            texts("scr_gettext(\"greeting\"@3)"),
            vec!["scr_gettext", "(", "\"greeting\"", "@3", ")"]
        );
    }

    #[test]
    fn test_unterminated_string_closes_at_eol() {
        assert_eq!(texts("x = \"oops"), vec!["x", " ", "=", " ", "\"oops"]);
    }

    #[test]
    fn test_comment_swallows_rest_of_line() {
        assert_eq!(
            texts("x = 1 // rest (of) \"line\""),
            vec!["x", " ", "=", " ", "1", " ", "// rest (of) \"line\""]
        );
    }

    #[test]
    fn test_comment_only_line() {
        assert_eq!(texts("// all comment"), vec!["// all comment"]);
    }

    #[test]
    fn test_slashes_inside_identifier_are_not_comments() {
        // the comment marker only triggers as its own pending token
        assert_eq!(texts("a//b"), vec!["a//b"]);
    }

    #[test]
    fn test_quote_splits_identifier() {
        assert_eq!(texts("a\"b\"c"), vec!["a", "\"b\"", "c"]);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let line = "if (x > 3.5) { y = \"z\" } // tail";
        let tokens = lex_line(line);
        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.start, expected_start);
            assert_eq!(&line[token.start..token.end], token.text);
            expected_start = token.end;
        }
        assert_eq!(expected_start, line.len());
    }

    #[test]
    fn test_round_trip_assorted_lines() {
        let lines = [
            "",
            "   ",
            "if (global.flag == 1)",
            "x = scr_gettext(\"greeting\"@3)",
            "obj.y = 10.25",
            "draw_text(32, 48, \"score: \" + string(score))",
            "// nothing but comment",
            "weird\"unterminated",
            "s = \"\"",
            "a[3] = b[c[4]]",
        ];
        for line in lines {
            assert_round_trip(line);
        }
    }

    #[test]
    fn test_lexing_is_idempotent() {
        let line = "with (obj_door) { if locked { scr_gettext(\"msg\"@7) } }";
        assert_eq!(lex_line(line), lex_line(line));
    }

    #[test]
    fn test_empty_string_token() {
        assert_eq!(texts("s = \"\""), vec!["s", " ", "=", " ", "\"\""]);
    }

    #[test]
    fn test_decimal_number_splits_on_dot() {
        // the dot is punctuation, so a decimal literal arrives in pieces
        assert_eq!(texts("3.5"), vec!["3", ".", "5"]);
    }
}
