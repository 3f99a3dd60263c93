pub const EXACT_MATCH_SCORE: f64 = 1.0;
pub const NORMALIZED_MATCH_SCORE: f64 = 0.95;
pub const CONTRACTION_MATCH_SCORE: f64 = 0.9;
/// Edit-distance ratios below this are reported as no similarity.
pub const EDIT_RATIO_FLOOR: f64 = 0.7;
pub const EDIT_SIMILARITY_SCALE: f64 = 0.8;
/// Highest value edit-distance similarity can produce.
pub const EDIT_SIMILARITY_CEILING: f64 = EDIT_SIMILARITY_SCALE;

/// Whole-word contractions and colloquial forms whose expansion is not a
/// plain suffix rewrite.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("won't", "will not"),
    ("can't", "can not"),
    ("cannot", "can not"),
    ("shan't", "shall not"),
    ("ain't", "is not"),
    ("let's", "let us"),
    ("it's", "it is"),
    ("that's", "that is"),
    ("what's", "what is"),
    ("where's", "where is"),
    ("who's", "who is"),
    ("there's", "there is"),
    ("here's", "here is"),
    ("he's", "he is"),
    ("she's", "she is"),
    ("how's", "how is"),
    ("y'all", "you all"),
    ("ma'am", "madam"),
    ("o'er", "over"),
    ("ne'er", "never"),
    ("e'er", "ever"),
    ("tis", "it is"),
    ("twas", "it was"),
    ("til", "until"),
    ("till", "until"),
    ("gonna", "going to"),
    ("wanna", "want to"),
    ("gotta", "got to"),
    ("gimme", "give me"),
    ("lemme", "let me"),
    ("kinda", "kind of"),
    ("sorta", "sort of"),
];

const SUFFIX_EXPANSIONS: &[(&str, &str)] = &[
    ("n't", " not"),
    ("'re", " are"),
    ("'ve", " have"),
    ("'ll", " will"),
    ("'d", " would"),
    ("'m", " am"),
];

/// Lowercase, fold unicode variants and strip punctuation. Interior
/// apostrophes survive so contractions stay distinguishable.
pub fn normalize_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        fold_char(c, &mut out);
    }
    let trimmed = out.trim_matches('\'');
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}

fn fold_char(c: char, out: &mut String) {
    match c {
        '\'' | '\u{2018}' | '\u{2019}' | '\u{02BC}' | '\u{2032}' | '`' | '\u{00B4}' => {
            out.push('\'')
        }
        '\u{FB01}' => out.push_str("fi"),
        '\u{FB02}' => out.push_str("fl"),
        '\u{00DF}' => out.push_str("ss"),
        '\u{00E6}' | '\u{00C6}' => out.push_str("ae"),
        '\u{0153}' | '\u{0152}' => out.push_str("oe"),
        c if c.is_alphanumeric() => {
            for lower in c.to_lowercase() {
                out.push(strip_accent(lower));
            }
        }
        _ => {}
    }
}

fn strip_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' => 'i',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' | 'ś' => 's',
        'ž' | 'ź' | 'ż' => 'z',
        'ł' => 'l',
        'ř' => 'r',
        _ => c,
    }
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}')
}

/// Split on whitespace (and en/em dashes). Tokens with no word content are
/// dropped whether or not `normalize` is set.
pub fn tokenize(text: &str, normalize: bool) -> Vec<String> {
    token_spans(text)
        .into_iter()
        .map(|(_, token)| {
            if normalize {
                normalize_word(token)
            } else {
                token.to_string()
            }
        })
        .collect()
}

/// Word-bearing tokens of `text` with the character offset each starts at.
pub fn token_spans(text: &str) -> Vec<(usize, &str)> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    for (char_offset, (byte, c)) in text.char_indices().enumerate() {
        if is_word_separator(c) {
            if let Some((start_char, start_byte)) = open.take() {
                push_span(&mut spans, start_char, &text[start_byte..byte]);
            }
        } else if open.is_none() {
            open = Some((char_offset, byte));
        }
    }
    if let Some((start_char, start_byte)) = open {
        push_span(&mut spans, start_char, &text[start_byte..]);
    }
    spans
}

fn push_span<'a>(spans: &mut Vec<(usize, &'a str)>, char_offset: usize, token: &'a str) {
    if !normalize_word(token).is_empty() {
        spans.push((char_offset, token));
    }
}

/// Expand a normalized word to its long form; words without a known
/// contraction are returned unchanged.
pub fn expand_contraction(normalized: &str) -> String {
    if let Some((_, expanded)) = CONTRACTIONS.iter().find(|(short, _)| *short == normalized) {
        return (*expanded).to_string();
    }
    for (suffix, replacement) in SUFFIX_EXPANSIONS {
        if let Some(stem) = normalized.strip_suffix(suffix) {
            if !stem.is_empty() {
                return format!("{stem}{replacement}");
            }
        }
    }
    normalized.to_string()
}

/// A word prepared once for repeated comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableWord {
    pub surface: String,
    pub normalized: String,
    folded: String,
    expanded: String,
}

impl ComparableWord {
    pub fn new(surface: &str) -> Self {
        let normalized = normalize_word(surface);
        let folded = normalized.replace('\'', "");
        let expanded = expand_contraction(&normalized);
        Self {
            surface: surface.to_string(),
            normalized,
            folded,
            expanded,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Similarity from the equivalence tiers only (literal, normalized,
/// contraction). Returns `0.0` where edit distance would be needed.
pub fn equivalence_similarity(a: &ComparableWord, b: &ComparableWord) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.surface == b.surface {
        EXACT_MATCH_SCORE
    } else if a.normalized == b.normalized || a.folded == b.folded {
        NORMALIZED_MATCH_SCORE
    } else if a.expanded == b.expanded {
        CONTRACTION_MATCH_SCORE
    } else {
        0.0
    }
}

pub fn similarity(a: &ComparableWord, b: &ComparableWord) -> f64 {
    let tier = equivalence_similarity(a, b);
    if tier > 0.0 || a.is_empty() || b.is_empty() {
        return tier;
    }
    edit_similarity(&a.normalized, &b.normalized)
}

fn edit_similarity(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let max_len = len_a.max(len_b);
    if max_len == 0 {
        return 0.0;
    }
    // The length difference alone bounds the distance from below.
    if (len_a.abs_diff(len_b) as f64 / max_len as f64) > 1.0 - EDIT_RATIO_FLOOR {
        return 0.0;
    }
    let distance = strsim::levenshtein(a, b);
    let ratio = 1.0 - distance as f64 / max_len as f64;
    if ratio >= EDIT_RATIO_FLOOR {
        ratio * EDIT_SIMILARITY_SCALE
    } else {
        0.0
    }
}

/// Pairwise word similarity in `[0, 1]`.
pub fn word_similarity(a: &str, b: &str) -> f64 {
    similarity(&ComparableWord::new(a), &ComparableWord::new(b))
}
