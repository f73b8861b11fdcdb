//! Noise stripping for diagram text
//!
//! Removes everything that can mention diagram keywords without declaring
//! diagram structure: comments, styling, sprites, preprocessor directives,
//! notes, and header/footer/title/legend/caption blocks.
//!
//! Stages run in a fixed order. Each stage assumes the previous ones already
//! removed their noise, so a directive-like word inside a comment never
//! triggers a later stage.

use once_cell::sync::Lazy;
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid preprocessing regex")
}

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| re(r"(?s)/'.*?'/"));

static SKINPARAM_BLOCK: Lazy<Regex> = Lazy::new(|| re(r"(?si)skinparam\s+\w+\s*\{[^}]*\}"));
static SKINPARAM_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?mi)^\s*skinparam\s+.*$"));
static HIDE_SHOW_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?mi)^\s*(?:hide|show)\s+.*$"));
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| re(r"(?si)style\s+\w+\s*\{[^}]*\}"));

static SPRITE_RASTER: Lazy<Regex> =
    Lazy::new(|| re(r"(?si)sprite\s+\$?[\w-]+\s*\[[^\]]+\]\s*\{[^}]*\}"));
static SPRITE_SVG: Lazy<Regex> =
    Lazy::new(|| re(r"(?si)sprite\s+\$?[\w-]+\s*<svg[^>]*>.*?</svg>"));

static DEFINE_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?m)^\s*!define\s+.*$"));
static INCLUDE_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?m)^\s*!include\s+.*$"));
static PROCEDURE_BLOCK: Lazy<Regex> = Lazy::new(|| re(r"(?si)!procedure\b.*?!endprocedure"));
static FUNCTION_BLOCK: Lazy<Regex> = Lazy::new(|| re(r"(?si)!function\b.*?!endfunction"));
static VARIABLE_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?m)^\s*!\$\w+\s*=.*$"));
static UNQUOTED_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?m)^\s*!unquoted\s+.*$"));

static NOTE_LINE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?mi)^\s*note\s+(?:left|right|top|bottom|over)(?:\s+of\s+\w+)?\s*:.*$")
});
static NOTE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    re(r"(?si)\bnote\s+(?:left|right|top|bottom|over)?(?:\s+of\s+\w+)?\s*\n.*?\bend\s+note\b")
});
static NOTE_FLOATING: Lazy<Regex> =
    Lazy::new(|| re(r#"(?mi)^\s*note\s+"[^"]*"(?:\s+as\s+\w+)?.*$"#));

static HEADER_BLOCK: Lazy<Regex> =
    Lazy::new(|| re(r"(?si)\b(?:left|right|center)?\s*header\b.*?\bendheader\b"));
static FOOTER_BLOCK: Lazy<Regex> =
    Lazy::new(|| re(r"(?si)\b(?:left|right|center)?\s*footer\b.*?\bendfooter\b"));
static HEADER_FOOTER_LINE: Lazy<Regex> =
    Lazy::new(|| re(r"(?mi)^\s*(?:left|right|center)?\s*(?:header|footer)\s+.*$"));
static TITLE_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?mi)^\s*title\s+.*$"));
static LEGEND_BLOCK: Lazy<Regex> = Lazy::new(|| re(r"(?si)\blegend\b.*?\bendlegend\b"));
static CAPTION_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?mi)^\s*caption\s+.*$"));

/// One step of the preprocessing pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Block, whole-line, and inline comments
    Comments,

    /// `skinparam` blocks and lines, `hide`/`show` directives, `style` blocks
    Styling,

    /// Raster and inline-SVG sprite definitions
    Sprites,

    /// `!define`, `!include`, procedure/function blocks, variables, `!unquoted`
    Directives,

    /// Single-line, multi-line, and floating notes
    Notes,

    /// Header, footer, title, legend, and caption content
    FooterHeader,
}

impl Stage {
    /// Stages in the order [`preprocess`] applies them
    pub const PIPELINE: [Stage; 6] = [
        Self::Comments,
        Self::Styling,
        Self::Sprites,
        Self::Directives,
        Self::Notes,
        Self::FooterHeader,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Styling => "styling",
            Self::Sprites => "sprites",
            Self::Directives => "directives",
            Self::Notes => "notes",
            Self::FooterHeader => "footer_header",
        }
    }

    /// Apply this stage alone
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Comments => strip_comments(text),
            Self::Styling => strip_styling(text),
            Self::Sprites => strip_sprites(text),
            Self::Directives => strip_directives(text),
            Self::Notes => strip_notes(text),
            Self::FooterHeader => strip_footer_header(text),
        }
    }
}

/// Run the full pipeline; never fails, whatever the input
pub fn preprocess(text: &str) -> String {
    let mut current = text.to_string();
    for stage in Stage::PIPELINE {
        let before = current.len();
        current = stage.apply(&current);
        tracing::trace!(
            stage = stage.as_str(),
            removed = before - current.len(),
            "preprocess stage"
        );
    }
    current
}

fn strip_all(text: &str, patterns: &[&Regex]) -> String {
    let mut current = text.to_string();
    for pattern in patterns {
        if let std::borrow::Cow::Owned(replaced) = pattern.replace_all(&current, "") {
            current = replaced;
        }
    }
    current
}

/// Remove comments while preserving line structure
pub fn strip_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT.replace_all(text, "");
    without_blocks
        .split('\n')
        .map(|line| {
            if line.trim_start().starts_with('\'') {
                String::new()
            } else {
                remove_inline_comment(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop a trailing `'` comment from one line
///
/// A `'` opens a comment only at the very start of the line, or when it
/// follows whitespace and is itself followed by whitespace or the end of the
/// line. Quotes inside double-quoted strings and apostrophes inside words
/// (`Alice's`) are kept.
pub fn remove_inline_comment(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut result: Vec<char> = Vec::with_capacity(chars.len());
    let mut in_string = false;

    for (i, &c) in chars.iter().enumerate() {
        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if c == '\'' && !in_string {
            if i == 0 {
                break;
            }
            if matches!(result.last(), Some(' ') | Some('\t')) {
                let at_end = i + 1 >= chars.len();
                if at_end || matches!(chars[i + 1], ' ' | '\t') {
                    while matches!(result.last(), Some(' ') | Some('\t')) {
                        result.pop();
                    }
                    break;
                }
            }
        }

        result.push(c);
    }

    result.into_iter().collect()
}

/// Remove styling and configuration directives
pub fn strip_styling(text: &str) -> String {
    strip_all(
        text,
        &[&SKINPARAM_BLOCK, &SKINPARAM_LINE, &HIDE_SHOW_LINE, &STYLE_BLOCK],
    )
}

/// Remove sprite definitions
pub fn strip_sprites(text: &str) -> String {
    strip_all(text, &[&SPRITE_RASTER, &SPRITE_SVG])
}

/// Remove preprocessor directives
pub fn strip_directives(text: &str) -> String {
    strip_all(
        text,
        &[
            &DEFINE_LINE,
            &INCLUDE_LINE,
            &PROCEDURE_BLOCK,
            &FUNCTION_BLOCK,
            &VARIABLE_LINE,
            &UNQUOTED_LINE,
        ],
    )
}

/// Remove notes; single-line notes go first so the multi-line form cannot
/// span across them
pub fn strip_notes(text: &str) -> String {
    strip_all(text, &[&NOTE_LINE, &NOTE_BLOCK, &NOTE_FLOATING])
}

/// Remove header, footer, title, legend, and caption content
pub fn strip_footer_header(text: &str) -> String {
    strip_all(
        text,
        &[
            &HEADER_BLOCK,
            &FOOTER_BLOCK,
            &HEADER_FOOTER_LINE,
            &TITLE_LINE,
            &LEGEND_BLOCK,
            &CAPTION_LINE,
        ],
    )
}
