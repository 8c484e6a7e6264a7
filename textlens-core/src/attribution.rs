//! Heuristic owner attribution for extracted action items
//!
//! Tasks come back from the model as free text; the participant list comes
//! back separately. Matching an owner to a task runs four tiers in order
//! and stops at the first hit:
//!
//! 1. a participant named verbatim inside the task
//! 2. a delegation phrase followed by a participant's name
//! 3. a pronoun anywhere in the task, resolved to the first participant
//! 4. a modal-verb opener, resolved by substring search over participants
//!
//! Unresolvable tasks get no owner. The result depends only on the inputs,
//! never on ambient state.

/// Delegation phrases checked in tier 2, in precedence order.
const DELEGATION_KEYWORDS: [&str; 6] = [
    "assigned to",
    "responsible for",
    "delegated to",
    "handed to",
    "entrusted to",
    "owned by",
];

/// Pronouns that fall back to the first participant in tier 3.
const PRONOUNS: [&str; 6] = ["he", "she", "they", "him", "her", "them"];

/// Modal openers that trigger the tier 4 contains-search.
const MODAL_PREFIXES: [&str; 4] = ["needs to", "should", "must", "has to"];

/// Pick an owner for `task` out of `people`, or `None` when no tier matches.
pub fn attribute<'a>(task: &str, people: &'a [String]) -> Option<&'a str> {
    if people.is_empty() {
        return None;
    }

    // Tier 1: direct mention
    if let Some(person) = people.iter().find(|p| !p.is_empty() && task.contains(p.as_str())) {
        return Some(person);
    }

    // Tier 2: delegation phrase followed by a name
    for keyword in DELEGATION_KEYWORDS {
        if let Some(idx) = task.find(keyword) {
            let after = task[idx + keyword.len()..].trim_start();
            if let Some(person) = people
                .iter()
                .find(|p| !p.is_empty() && after.starts_with(p.as_str()))
            {
                return Some(person);
            }
        }
    }

    // Tier 3: pronoun resolves to the first participant
    if PRONOUNS.iter().any(|p| contains_word(task, p)) {
        return people.first().map(String::as_str);
    }

    // Tier 4: modal opener, search each participant within the remainder
    for prefix in MODAL_PREFIXES {
        if starts_with_ignore_case(task.trim_start(), prefix) {
            let rest = &task.trim_start()[prefix.len()..];
            if let Some(person) = people
                .iter()
                .find(|p| !p.is_empty() && rest.contains(p.as_str()))
            {
                return Some(person);
            }
        }
    }

    None
}

/// Case-insensitive whole-word search. Plain `contains` would match "he"
/// inside "the".
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token.eq_ignore_ascii_case(word))
}

/// Case-insensitive ASCII prefix check that never slices mid-character.
fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
