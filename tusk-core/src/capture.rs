//! Heuristic capture classification.
//!
//! Scans user-authored text for signals that it encodes a durable fact or
//! preference worth storing. The gate is two-sided: reject rules run first
//! and short-circuit, accept rules run only when nothing rejected. False
//! positives are cheap (the per-run cap bounds them); the injection-reject
//! side must stay conservative, because capturing a prompt-injection string
//! turns the memory store into a replay channel for future prompts.
//!
//! Rules are data: two static tables of named patterns, compiled once.
//! Extending the reject table is safe; shrinking it is not.

use crate::framer::MEMORY_BLOCK_OPEN;
use regex::Regex;
use std::sync::OnceLock;

/// Candidate length bounds in chars, after trimming. Exclusive at the
/// bottom, inclusive at the top.
const MIN_CANDIDATE_CHARS: usize = 15;
const MAX_CANDIDATE_CHARS: usize = 2000;

/// Texts matching any of these are never captured, whatever else they match.
/// This list is a minimum bar, not a complete defense.
const INJECTION_SIGNATURES: &[(&str, &str)] = &[
    (
        "ignore_instructions",
        r"(?i)\bignore\s+(?:all\s+)?(?:previous|prior|above)\s+instructions\b",
    ),
    (
        "disregard_instructions",
        r"(?i)\bdisregard\s+(?:\w+\s+){0,3}instructions\b",
    ),
    ("system_prompt", r"(?i)\bsystem\s+prompt\b"),
    ("role_reassignment", r"(?i)\byou\s+are\s+now\b"),
    ("new_instructions", r"(?i)\bnew\s+instructions\s*:"),
    (
        "privileged_tag",
        r"(?i)</?(?:system|assistant|developer|relevant-memories)>",
    ),
];

/// Memorability signatures. A text is a candidate when at least one fires;
/// the first match names the candidate's trigger.
const CAPTURE_TRIGGERS: &[(&str, &str)] = &[
    (
        "explicit_request",
        r"(?i)\b(?:remember|don['’]?t\s+forget|keep\s+in\s+mind|note\s+that)\b",
    ),
    (
        "preference",
        r"(?i)\bi\s+(?:really\s+)?(?:like|love|hate|prefer|need|want|always|never|use)\b",
    ),
    ("favorite", r"(?i)\bmy\s+favou?rite\b.{0,60}?\bis\b"),
    (
        "biographical",
        r"(?i)\bmy\s+(?:name|job|company|employer|address|email|phone|birthday)\s+is\b",
    ),
    ("workplace", r"(?i)\bi\s+work\s+(?:at|for)\b"),
    ("residence", r"(?i)\bi\s+live\s+in\b"),
    ("nickname", r"(?i)\bcall\s+me\b"),
    (
        "decision",
        r"(?i)\b(?:we\s+(?:decided|agreed)|let['’]?s\s+go\s+with|the\s+plan\s+is)\b",
    ),
    (
        "email_address",
        r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
    ),
    ("phone_number", r"\+\d{7,}"),
];

/// A transcript text accepted for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCandidate {
    /// The trimmed candidate text, exactly as it will be stored.
    pub text: String,
    /// Name of the capture trigger that accepted it.
    pub trigger: &'static str,
}

struct Signature {
    name: &'static str,
    regex: Regex,
}

fn compile_table(table: &[(&'static str, &'static str)]) -> Vec<Signature> {
    table
        .iter()
        .map(|(name, pattern)| Signature {
            name,
            // Static patterns, covered by tests; match instead of expect.
            regex: match Regex::new(pattern) {
                Ok(re) => re,
                Err(_) => unreachable!("static signature pattern is valid"),
            },
        })
        .collect()
}

fn injection_signatures() -> &'static [Signature] {
    static RULES: OnceLock<Vec<Signature>> = OnceLock::new();
    RULES.get_or_init(|| compile_table(INJECTION_SIGNATURES))
}

fn capture_triggers() -> &'static [Signature] {
    static RULES: OnceLock<Vec<Signature>> = OnceLock::new();
    RULES.get_or_init(|| compile_table(CAPTURE_TRIGGERS))
}

/// Classify one user-authored text.
///
/// Returns the name of the first capture trigger that fired, or `None` when
/// the text is out of bounds, already an injection block, or matches an
/// injection signature. Reject always wins over accept.
pub fn classify(text: &str) -> Option<&'static str> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len <= MIN_CANDIDATE_CHARS || len > MAX_CANDIDATE_CHARS {
        return None;
    }
    if trimmed.contains(MEMORY_BLOCK_OPEN) {
        return None;
    }
    if injection_signatures()
        .iter()
        .any(|sig| sig.regex.is_match(trimmed))
    {
        return None;
    }
    capture_triggers()
        .iter()
        .find(|sig| sig.regex.is_match(trimmed))
        .map(|sig| sig.name)
}

/// Extract capture candidates from user-authored transcript texts, in input
/// order. Role filtering is the transcript walker's job; everything passed
/// here is treated as human text.
pub fn extract_candidates(texts: &[&str]) -> Vec<CaptureCandidate> {
    texts
        .iter()
        .filter_map(|text| {
            let trimmed = text.trim();
            classify(trimmed).map(|trigger| CaptureCandidate {
                text: trimmed.to_string(),
                trigger,
            })
        })
        .collect()
}
