/// Characters that force token boundaries and never coalesce with each
/// other
const SPECIAL: [char; 12] = ['.', ',', ')', '(', '[', ']', '>', '<', ':', ';', '=', '"'];

fn is_special(c: char) -> bool {
    SPECIAL.contains(&c)
}

/// One raw token of a decompiled line
///
/// `start` and `end` are byte offsets into the line. Tokens are ordered
/// and contiguous: concatenating the texts of a line's tokens gives back
/// the line exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Split one line of decompiled text into raw tokens
///
/// Single left-to-right scan. Boundaries are forced by a change of
/// whitespace class, a change of punctuation class, two adjacent
/// punctuation characters, or a quote. A pending `//` swallows the rest
/// of the line; a quote toggles string mode, inside which no boundaries
/// apply. An unterminated string closes at end of line.
pub fn lex_line(line: &str) -> Vec<RawToken> {
    let mut tokens = Vec::new();
    let mut tok = String::new();
    let mut tok_start = 0;
    let mut reading_string = false;

    for (i, ch) in line.char_indices() {
        if tok == "//" {
            tok.push_str(&line[i..]);
            tokens.push(RawToken {
                text: std::mem::take(&mut tok),
                start: tok_start,
                end: line.len(),
            });
            break;
        }
        if !reading_string {
            if let Some(last) = tok.chars().next_back() {
                if ch.is_whitespace() != last.is_whitespace()
                    || is_special(ch) != is_special(last)
                    || (is_special(ch) && is_special(last))
                    || ch == '"'
                {
                    tokens.push(RawToken {
                        text: std::mem::take(&mut tok),
                        start: tok_start,
                        end: i,
                    });
                    tok_start = i;
                }
            }
        }
        tok.push(ch);
        if ch == '"' {
            if reading_string {
                let end = i + ch.len_utf8();
                tokens.push(RawToken {
                    text: std::mem::take(&mut tok),
                    start: tok_start,
                    end,
                });
                tok_start = end;
            }
            reading_string = !reading_string;
        }
    }

    if !tok.is_empty() {
        tokens.push(RawToken {
            text: tok,
            start: tok_start,
            end: line.len(),
        });
    }

    tokens
}
