//! Book name normalization.
//!
//! Maps whatever a corpus or a user calls a book (BHSA's Latin labels,
//! English names, roman-numbered forms, historical spellings, close typos)
//! onto one canonical SBL-style abbreviation such as `Gen` or `1 Kgs`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::similarity::close_match;

/// Minimum similarity for the fuzzy fallback
pub const FUZZY_CUTOFF: f64 = 0.80;

const CACHE_CAPACITY: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown book: {alias:?} (strict={strict})")]
pub struct UnknownBookError {
    pub alias: String,
    pub strict: bool,
}

/// BHSA book labels and their canonical abbreviations, in canonical order.
pub const BHS_TO_CANONICAL: &[(&str, &str)] = &[
    ("Genesis", "Gen"),
    ("Exodus", "Exod"),
    ("Leviticus", "Lev"),
    ("Numeri", "Num"),
    ("Deuteronomium", "Deut"),
    ("Josua", "Josh"),
    ("Judices", "Judg"),
    ("Ruth", "Ruth"),
    ("Samuel_I", "1 Sam"),
    ("Samuel_II", "2 Sam"),
    ("Reges_I", "1 Kgs"),
    ("Reges_II", "2 Kgs"),
    ("Chronica_I", "1 Chr"),
    ("Chronica_II", "2 Chr"),
    ("Esra", "Ezra"),
    ("Nehemia", "Neh"),
    ("Esther", "Esth"),
    ("Iob", "Job"),
    ("Psalmi", "Ps"),
    ("Proverbia", "Prov"),
    ("Ecclesiastes", "Eccl"),
    ("Canticum", "Song"),
    ("Jesaia", "Isa"),
    ("Jeremia", "Jer"),
    ("Threni", "Lam"),
    ("Ezechiel", "Ezek"),
    ("Daniel", "Dan"),
    ("Hosea", "Hos"),
    ("Joel", "Joel"),
    ("Amos", "Amos"),
    ("Obadia", "Obad"),
    ("Jona", "Jonah"),
    ("Micha", "Mic"),
    ("Nahum", "Nah"),
    ("Habakuk", "Hab"),
    ("Zephania", "Zeph"),
    ("Haggai", "Hag"),
    ("Sacharia", "Zech"),
    ("Maleachi", "Mal"),
];

/// English names as emitted by most non-BHSA corpora
pub const ENGLISH_TO_CANONICAL: &[(&str, &str)] = &[
    ("Genesis", "Gen"),
    ("Exodus", "Exod"),
    ("Leviticus", "Lev"),
    ("Numbers", "Num"),
    ("Deuteronomy", "Deut"),
    ("Joshua", "Josh"),
    ("Judges", "Judg"),
    ("Ruth", "Ruth"),
    ("1 Samuel", "1 Sam"),
    ("2 Samuel", "2 Sam"),
    ("1 Kings", "1 Kgs"),
    ("2 Kings", "2 Kgs"),
    ("1 Chronicles", "1 Chr"),
    ("2 Chronicles", "2 Chr"),
    ("Ezra", "Ezra"),
    ("Nehemiah", "Neh"),
    ("Esther", "Esth"),
    ("Job", "Job"),
    ("Psalms", "Ps"),
    ("Psalm", "Ps"),
    ("Proverbs", "Prov"),
    ("Ecclesiastes", "Eccl"),
    ("Song of Songs", "Song"),
    ("Song of Solomon", "Song"),
    ("Canticles", "Song"),
    ("Song", "Song"),
    ("Isaiah", "Isa"),
    ("Jeremiah", "Jer"),
    ("Lamentations", "Lam"),
    ("Ezekiel", "Ezek"),
    ("Daniel", "Dan"),
    ("Hosea", "Hos"),
    ("Joel", "Joel"),
    ("Amos", "Amos"),
    ("Obadiah", "Obad"),
    ("Jonah", "Jonah"),
    ("Micah", "Mic"),
    ("Nahum", "Nah"),
    ("Habakkuk", "Hab"),
    ("Zephaniah", "Zeph"),
    ("Haggai", "Hag"),
    ("Zechariah", "Zech"),
    ("Malachi", "Mal"),
];

/// Historical and alternate spellings, already in squashed key form
const EXTRA_KEYS: &[(&str, &str)] = &[
    ("jesaiah", "Isa"),
    ("isaias", "Isa"),
    ("jeremias", "Jer"),
    ("ezechiel", "Ezek"),
    ("zecharias", "Zech"),
    ("sacharia", "Zech"),
    ("jonas", "Jonah"),
    ("jonah", "Jonah"),
    ("psalmi", "Ps"),
    ("psalter", "Ps"),
    ("ps", "Ps"),
    ("canticles", "Song"),
    ("songofsolomon", "Song"),
    ("songofsongs", "Song"),
    ("song", "Song"),
    ("lamentations", "Lam"),
    ("threni", "Lam"),
    ("obadia", "Obad"),
    ("obadiah", "Obad"),
    ("micha", "Mic"),
    ("micah", "Mic"),
    ("nahum", "Nah"),
    ("habakuk", "Hab"),
    ("zephania", "Zeph"),
    ("haggai", "Hag"),
    ("numeri", "Num"),
    ("deuteronomium", "Deut"),
    ("judices", "Judg"),
    ("josua", "Josh"),
    ("regesi", "1 Kgs"),
    ("regesii", "2 Kgs"),
    ("chronicai", "1 Chr"),
    ("chronicaii", "2 Chr"),
    ("samueli", "1 Sam"),
    ("samuelii", "2 Sam"),
];

const ROMAN_TO_ARABIC: &[(&str, &str)] = &[
    ("i", "1"),
    ("ii", "2"),
    ("iii", "3"),
    ("iv", "4"),
    ("v", "5"),
    ("vi", "6"),
    ("vii", "7"),
    ("viii", "8"),
    ("ix", "9"),
    ("x", "10"),
];

static NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s._\-]+").unwrap());
static ROMAN_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(i{1,3}|iv|v|vi{0,3}|ix|x)\b").unwrap());
static ROMAN_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*)\s+(i{1,3}|iv|v|vi{0,3}|ix|x)$").unwrap());

fn roman_to_arabic(roman: &str) -> Option<&'static str> {
    let lower = roman.to_ascii_lowercase();
    ROMAN_TO_ARABIC
        .iter()
        .find(|(r, _)| *r == lower)
        .map(|(_, a)| *a)
}

/// Case-fold and collapse whitespace, periods, underscores and hyphens to
/// single spaces. Idempotent.
pub fn denoise(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let collapsed = NOISE.replace_all(&lowered, " ");
    collapsed
        .replace(['\u{2019}', '\u{2018}', '\u{00B4}'], "'")
        .trim()
        .to_string()
}

/// Replace a leading roman numeral word with its arabic value
/// (`"ii kings"` -> `"2 kings"`). Expects denoised input.
pub fn roman_prefix_to_arabic(s: &str) -> String {
    let trimmed = s.trim();
    match ROMAN_PREFIX.find(trimmed) {
        Some(m) => match roman_to_arabic(m.as_str()) {
            Some(arabic) => format!("{}{}", arabic, &trimmed[m.end()..]).trim().to_string(),
            None => trimmed.to_string(),
        },
        None => trimmed.to_string(),
    }
}

/// Keep only lowercase ASCII letters and digits
pub fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Lookup keys for one alias: denoised, roman-converted, and both squashed.
fn alias_keys(name: &str) -> Vec<String> {
    let denoised = denoise(name);
    let arabic = roman_prefix_to_arabic(&denoised);
    let mut keys = vec![denoised.clone()];
    if arabic != denoised {
        keys.push(arabic.clone());
    }
    keys.push(squash(&denoised));
    if arabic != denoised {
        keys.push(squash(&arabic));
    }
    keys
}

/// Humanized BHSA label plus its numbered variants
/// (`Samuel_I` -> `Samuel I`, `1 Samuel`, `1Samuel`, `I Samuel`, `1 Sam`, `I Sam`).
fn expand_numbered(label: &str) -> Vec<String> {
    let nice = label.replace('_', " ");
    let mut out = vec![nice.clone()];

    if let Some(caps) = ROMAN_SUFFIX.captures(&nice) {
        let base = caps[1].to_string();
        let roman = caps[2].to_string();
        let arabic = roman_to_arabic(&roman).unwrap_or(roman.as_str()).to_string();
        let short = match base.as_str() {
            "Samuel" => "Sam",
            "Reges" => "Kgs",
            "Chronica" => "Chr",
            other => other,
        };
        out.push(format!("{arabic} {base}"));
        out.push(format!("{arabic}{}", base.replace(' ', "")));
        out.push(format!("{roman} {base}"));
        out.push(format!("{arabic} {short}"));
        out.push(format!("{roman} {short}"));
    }

    out
}

/// Immutable alias table: normalized key -> canonical abbreviation.
#[derive(Debug)]
pub struct AliasTable {
    map: HashMap<String, &'static str>,
    /// Keys in insertion order, scanned by the fuzzy fallback
    keys: Vec<String>,
}

impl AliasTable {
    fn insert(&mut self, key: String, canonical: &'static str) {
        if !self.map.contains_key(&key) {
            self.keys.push(key.clone());
            self.map.insert(key, canonical);
        }
    }

    /// Build the table from the static name lists. First insertion wins.
    pub fn build() -> Self {
        let mut table = AliasTable {
            map: HashMap::new(),
            keys: Vec::new(),
        };

        for canonical in canonical_names() {
            for key in alias_keys(canonical) {
                table.insert(key, canonical);
            }
        }

        for &(label, canonical) in BHS_TO_CANONICAL {
            for alias in expand_numbered(label) {
                for key in alias_keys(&alias) {
                    table.insert(key, canonical);
                }
            }
            for key in alias_keys(label) {
                table.insert(key, canonical);
            }
        }

        for &(name, canonical) in ENGLISH_TO_CANONICAL {
            for key in alias_keys(name) {
                table.insert(key, canonical);
            }
        }

        for &(key, canonical) in EXTRA_KEYS {
            table.insert(key.to_string(), canonical);
        }

        tracing::debug!(keys = table.keys.len(), "built book alias table");
        table
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Exact lookup on any of the alias's normalized keys
    pub fn exact(&self, alias: &str) -> Option<&'static str> {
        alias_keys(alias)
            .iter()
            .find_map(|key| self.map.get(key).copied())
    }

    /// Fuzzy lookup of the squashed alias against every key
    pub fn fuzzy(&self, alias: &str) -> Option<&'static str> {
        let probe = squash(&denoise(alias));
        let (key, score) = close_match(&probe, self.keys.iter().map(String::as_str), FUZZY_CUTOFF)?;
        tracing::debug!(alias, key, score, "fuzzy book match");
        self.map.get(key).copied()
    }

    pub fn lookup(&self, alias: &str, strict: bool) -> Result<&'static str, UnknownBookError> {
        self.exact(alias)
            .or_else(|| if strict { None } else { self.fuzzy(alias) })
            .ok_or_else(|| UnknownBookError {
                alias: alias.to_string(),
                strict,
            })
    }
}

static ALIAS_TABLE: Lazy<AliasTable> = Lazy::new(AliasTable::build);
static LOOKUP_CACHE: Lazy<Mutex<LookupCache>> =
    Lazy::new(|| Mutex::new(LookupCache::new(CACHE_CAPACITY)));

/// Memo of successful lookups keyed by `(alias, strict)`; cleared when full.
#[derive(Debug)]
struct LookupCache {
    map: HashMap<(String, bool), &'static str>,
    capacity: usize,
}

impl LookupCache {
    fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            capacity,
        }
    }

    fn get(&self, alias: &str, strict: bool) -> Option<&'static str> {
        self.map.get(&(alias.to_string(), strict)).copied()
    }

    fn insert(&mut self, alias: &str, strict: bool, canonical: &'static str) {
        if self.map.len() >= self.capacity {
            self.map.clear();
        }
        self.map.insert((alias.to_string(), strict), canonical);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// The process-wide alias table, built on first use
pub fn alias_table() -> &'static AliasTable {
    &ALIAS_TABLE
}

/// Canonical abbreviations in canonical book order
pub fn canonical_names() -> impl Iterator<Item = &'static str> {
    BHS_TO_CANONICAL.iter().map(|(_, canonical)| *canonical)
}

/// Convert any book spelling into its canonical abbreviation.
///
/// With `strict = false` a failed exact lookup falls back to the closest
/// known alias scoring at least [`FUZZY_CUTOFF`].
pub fn to_canonical(alias: &str, strict: bool) -> Result<&'static str, UnknownBookError> {
    if let Ok(cache) = LOOKUP_CACHE.lock() {
        if let Some(hit) = cache.get(alias, strict) {
            return Ok(hit);
        }
    }

    let canonical = alias_table().lookup(alias, strict)?;

    if let Ok(mut cache) = LOOKUP_CACHE.lock() {
        cache.insert(alias, strict, canonical);
    }
    Ok(canonical)
}

/// Citation such as `Gen 1` or `1 Kgs 3:4`
pub fn citation(book: &str, chapter: u32, verse: Option<u32>) -> Result<String, UnknownBookError> {
    let canonical = to_canonical(book, false)?;
    Ok(match verse {
        Some(v) => format!("{canonical} {chapter}:{v}"),
        None => format!("{canonical} {chapter}"),
    })
}

/// Verse range citation within one chapter, e.g. `Ezek 1:1–3`
pub fn cite_range(book: &str, chapter: u32, v1: u32, v2: u32) -> Result<String, UnknownBookError> {
    let canonical = to_canonical(book, false)?;
    Ok(format!("{canonical} {chapter}:{v1}\u{2013}{v2}"))
}
