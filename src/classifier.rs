use crate::assets::{AssetKind, GameData, Reference};
use crate::gettext::GettextTable;
use crate::lexer::{lex_line, RawToken};
use indexmap::IndexMap;

/// Control-flow keywords, rendered bold
const KEYWORDS: [&str; 7] = ["if", "else", "return", "break", "continue", "while", "with"];

/// Literal-like keywords
const LITERAL_KEYWORDS: [&str; 7] = ["self", "global", "local", "other", "noone", "true", "false"];

/// Above this line count, classification is skipped and the raw text is
/// shown instead
pub const MAX_HIGHLIGHT_LINES: usize = 5000;

/// Numeric literals strictly above this read like packed color values
pub const COLOR_LITERAL_MIN: i64 = 0x0005_0000;

/// The function whose calls are resolved through the localization table
pub const GETTEXT_FUNCTION: &str = "scr_gettext";

/// Semantic class of one decompiled-text token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    LiteralKeyword,
    Str,
    Comment,
    Number,
    Function,
    /// Internal string-index marker (`@` and digits); not displayed,
    /// it retargets the token before it
    Marker,
    Plain,
}

/// One way an ambiguous numeric literal can be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A valid index into an asset table
    Asset(AssetKind, usize),
    /// A packed color value; not navigable
    Color(u32),
    /// The literal itself; not navigable, always listed last
    Number(i64),
}

impl Candidate {
    /// The navigable reference for this reading, if there is one
    pub fn reference(&self) -> Option<Reference> {
        match self {
            Candidate::Asset(kind, index) => Some(Reference::Asset(*kind, *index)),
            _ => None,
        }
    }
}

/// A raw token plus its classification
///
/// At most one resolved reference; a token with candidates leaves the
/// reference unset and the consumer picks an interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub class: TokenClass,
    pub reference: Option<Reference>,
    pub candidates: Vec<Candidate>,
}

/// One trailing comment entry, rendered after the line's tokens as
/// `key = display`
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub key: String,
    pub display: String,
    pub target: Reference,
}

/// A fully classified line with its trailing annotations
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine {
    pub tokens: Vec<ClassifiedToken>,
    pub annotations: Vec<Annotation>,
}

/// Lookup context for classification
pub struct ClassifyEnv<'a> {
    pub data: &'a GameData,
    pub gettext: Option<&'a GettextTable>,
}

/// A rendered decompilation, either fully classified or raw text for
/// oversized dumps
#[derive(Debug, Clone, PartialEq)]
pub enum DecompiledView {
    Classified(Vec<ClassifiedLine>),
    Raw(String),
}

/// Classify a whole decompiled dump, line by line
pub fn classify_text(text: &str, env: &ClassifyEnv) -> DecompiledView {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() > MAX_HIGHLIGHT_LINES {
        return DecompiledView::Raw(text.to_string());
    }
    DecompiledView::Classified(
        lines
            .iter()
            .map(|line| classify_line(&lex_line(line), env))
            .collect(),
    )
}

/// Classify one line's tokens, left to right, first matching rule wins
pub fn classify_line(tokens: &[RawToken], env: &ClassifyEnv) -> ClassifiedLine {
    let mut out: Vec<ClassifiedToken> = Vec::with_capacity(tokens.len());
    // ordered so trailing comments come out in first-registered order
    let mut used_refs: IndexMap<String, Reference> = IndexMap::new();

    for (i, raw) in tokens.iter().enumerate() {
        let text = raw.text.as_str();
        let mut class = TokenClass::Plain;
        let mut reference = None;
        let mut candidates = Vec::new();

        if KEYWORDS.contains(&text) {
            class = TokenClass::Keyword;
        } else if LITERAL_KEYWORDS.contains(&text) {
            class = TokenClass::LiteralKeyword;
        } else if text.starts_with('"') {
            class = TokenClass::Str;
        } else if text.starts_with("//") {
            class = TokenClass::Comment;
        } else if text.starts_with('@') {
            // marks the preceding token as a string-table entry; a
            // malformed marker stays plain
            if let Some(index) = string_index(text) {
                class = TokenClass::Marker;
                if let Some(prev) = out.last_mut() {
                    prev.reference = Some(Reference::StringEntry(index));
                }
            }
        } else if env.data.has_function(text) {
            class = TokenClass::Function;
            reference = Some(Reference::Function(text.to_string()));
            if text == GETTEXT_FUNCTION {
                if let Some(table) = env.gettext {
                    register_gettext_use(tokens, i, table, env.data, &mut used_refs);
                }
            }
        } else if text.starts_with(|c: char| c.is_ascii_digit()) {
            if let Ok(id) = text.parse::<i64>() {
                class = TokenClass::Number;
                candidates = numeric_candidates(id, env.data);
            }
        }

        out.push(ClassifiedToken {
            text: raw.text.clone(),
            start: raw.start,
            end: raw.end,
            class,
            reference,
            candidates,
        });

        // member-access heuristic: `<int> . name` reads the integer as a
        // game-object id. Purely textual, so a decimal literal's dot can
        // trigger it too.
        if text == "." && i >= 1 {
            if let Ok(id) = tokens[i - 1].text.parse::<i64>() {
                if id >= 0 && (id as usize) < env.data.game_objects.len() {
                    used_refs
                        .entry(tokens[i - 1].text.clone())
                        .or_insert(Reference::Asset(AssetKind::GameObject, id as usize));
                }
            }
        }
    }

    let annotations = used_refs
        .into_iter()
        .filter_map(|(key, target)| {
            env.data.describe(&target).map(|display| Annotation {
                key,
                display,
                target,
            })
        })
        .collect();

    ClassifiedLine {
        tokens: out,
        annotations,
    }
}

/// Parse an `@<digits>` marker token
fn string_index(text: &str) -> Option<usize> {
    let digits = text.strip_prefix('@')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Record a `scr_gettext("<key>"@<n>)` use for trailing-comment output
///
/// The four tokens after the callee must have exactly that shape; each
/// key registers at most once per line.
fn register_gettext_use(
    tokens: &[RawToken],
    i: usize,
    table: &GettextTable,
    data: &GameData,
    used_refs: &mut IndexMap<String, Reference>,
) {
    let (Some(open), Some(key_tok), Some(marker), Some(close)) = (
        tokens.get(i + 1),
        tokens.get(i + 2),
        tokens.get(i + 3),
        tokens.get(i + 4),
    ) else {
        return;
    };
    if open.text != "("
        || !key_tok.text.starts_with('"')
        || !marker.text.starts_with('@')
        || close.text != ")"
    {
        return;
    }
    if key_tok.text.len() < 2 {
        return;
    }
    let key = &key_tok.text[1..key_tok.text.len() - 1];
    if used_refs.contains_key(key) {
        return;
    }
    let Some(index) = table.get(key) else {
        return;
    };
    if data.string(index).is_some() {
        used_refs.insert(key.to_string(), Reference::StringEntry(index));
    }
}

/// Interpretations of a numeric literal against every asset table, in
/// fixed probe order, ending with the plain-number reading
fn numeric_candidates(id: i64, data: &GameData) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    if id >= 0 {
        let index = id as usize;
        for kind in AssetKind::PROBE_ORDER {
            if index < data.table(kind).len() {
                candidates.push(Candidate::Asset(kind, index));
            }
        }
    }
    if id > COLOR_LITERAL_MIN {
        candidates.push(Candidate::Color(id as u32));
    }
    candidates.push(Candidate::Number(id));
    candidates
}
