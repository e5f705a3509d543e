use crate::filing::title_case;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ORGANIZATION: Regex = Regex::new(
        r"\b((?:[A-Z][A-Za-z0-9&'.\-]*[ \t]+){1,5}(?:Company|COMPANY|Incorporated|INCORPORATED|Inc|INC|Ltd|LTD|Limited|LIMITED|Enterprise|ENTERPRISE|Corporation|CORPORATION|Corp|CORP|LLC|PLC|Plc)\b\.?)"
    )
    .expect("organization pattern");
    static ref REGISTRANT_MARKER: Regex =
        Regex::new(r"(?i)\(?\s*exact\s+name\s+of\s+(?:the\s+)?registrant\s+as\s+specified\s+in\s+its\s+charter\s*\)?")
            .expect("registrant pattern");
    static ref NAME_FILTER: Regex =
        Regex::new(r"company|inc.|ltd|enterprise|corporation").expect("name filter pattern");
}

// Capitalised sentence openers and articles that the organisation pattern
// would otherwise glue onto the front of a name.
const LEADING_NOISE: &[&str] = &[
    "the", "a", "an", "for", "in", "by", "and", "of", "to", "at", "on", "as", "with",
];

/// Organisation-like names in document order, without duplicates. The
/// registrant named on the cover page comes first when present.
pub fn extract_company_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    };

    if let Some(registrant) = registrant_name(text) {
        push(registrant);
    }

    for capture in ORGANIZATION.captures_iter(text) {
        if let Some(name) = capture.get(1).and_then(|m| strip_leading_noise(m.as_str())) {
            push(name);
        }
    }

    names
}

/// First candidate that reads like a legal entity name, title-cased.
pub fn primary_company_name(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .find(|name| NAME_FILTER.is_match(&name.to_lowercase()))
        .map(|name| title_case(name))
}

fn registrant_name(text: &str) -> Option<String> {
    let marker = REGISTRANT_MARKER.find(text)?;
    text[..marker.start()]
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
}

/// `None` when nothing but the legal suffix is left, as in "The Company".
fn strip_leading_noise(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let start = words
        .iter()
        .position(|word| !LEADING_NOISE.iter().any(|noise| word.eq_ignore_ascii_case(noise)))?;
    let words = &words[start..];
    (words.len() > 1).then(|| words.join(" "))
}
