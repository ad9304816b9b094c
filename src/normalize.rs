use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Footer fragment left by the JDIH exporter, e.g. ".jdih -12-".
static RE_PAGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\.\w*\s*-\d+-\s*").unwrap());
static RE_HALAMAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Halaman\s+\d+").unwrap());
// Watermark host: three labels plus an optional short TLD, e.g. "jdih.kemenkoinfra.go.id".
// The TLD must end at a word boundary so a following ".Pasal 5" is never swallowed.
static RE_WATERMARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)jdih\.[a-z]+\.[a-z]+(?:\.[a-z]{2,3}\b)?").unwrap());
static RE_HYPHEN_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)-[ \t]*\n[ \t]*(\w)").unwrap());
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static RE_HSPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());

// Heading isolation only looks at the "Pasal N[A]" head; the ayat suffix gets its own break.
static RE_PASAL_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Pasal\s+\d+[A-Za-z]?").unwrap());
static RE_AYAT_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ayat\s*\(\d+\)").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanStats {
    pub page_markers_removed: usize,
    pub watermarks_removed: usize,
    pub hyphens_fixed: usize,
    pub headings_isolated: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeOutput {
    pub text: String,
    pub stats: CleanStats,
}

/// Normalize raw `pdftotext` output into the canonical form the segmenter expects.
pub fn normalize(text: &str) -> String {
    normalize_with_stats(text).text
}

/// Same as [`normalize`], also reporting what the cleanup passes touched.
pub fn normalize_with_stats(text: &str) -> NormalizeOutput {
    let cleaned = clean_text(text);
    let (isolated, headings_isolated) = isolate_headings(&cleaned.text);
    let mut stats = cleaned.stats;
    stats.headings_isolated = headings_isolated;
    NormalizeOutput { text: isolated, stats }
}

/// Strip extraction artifacts: page markers, watermark hosts, hyphenated line wraps
/// and redundant whitespace. Returns trimmed text.
pub fn clean_text(text: &str) -> NormalizeOutput {
    // pdftotext separates pages with form feeds unless -nopgbrk is given
    let text = text.replace("\r\n", "\n").replace('\u{000C}', "\n");

    let mut stats = CleanStats::default();

    // 1) page artifacts
    stats.page_markers_removed = RE_PAGE_MARKER.find_iter(&text).count();
    let text = RE_PAGE_MARKER.replace_all(&text, " ");
    stats.page_markers_removed += RE_HALAMAN.find_iter(&text).count();
    let text = RE_HALAMAN.replace_all(&text, "");

    // 2) watermark
    stats.watermarks_removed = RE_WATERMARK.find_iter(&text).count();
    let text = RE_WATERMARK.replace_all(&text, "");

    // 3) keten-\ntuan -> ketentuan
    stats.hyphens_fixed = RE_HYPHEN_BREAK.find_iter(&text).count();
    let text = RE_HYPHEN_BREAK.replace_all(&text, "${1}${2}");

    // 4) + 5)
    let text = RE_BLANK_RUN.replace_all(&text, "\n\n");
    let text = RE_HSPACE.replace_all(&text, " ");

    NormalizeOutput { text: text.trim().to_string(), stats }
}

/// Put every clause heading on its own paragraph and every ayat marker on its own line.
/// Returns the rewritten text and the number of breaks inserted.
pub fn isolate_headings(text: &str) -> (String, usize) {
    let (text, pasal_breaks) = break_before(text, &RE_PASAL_HEAD, 2);
    let (text, ayat_breaks) = break_before(&text, &RE_AYAT_HEAD, 1);
    let text = RE_HSPACE.replace_all(&text, " ");
    (text.trim().to_string(), pasal_breaks + ayat_breaks)
}

/// Insert line breaks before every match of `re` that does not directly follow a `\n`,
/// so that the match ends up preceded by at least `newlines` consecutive breaks.
fn break_before(text: &str, re: &Regex, newlines: usize) -> (String, usize) {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0usize;
    let mut inserted = 0usize;
    for m in re.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        last = m.start();
        if out.is_empty() || out.ends_with('\n') {
            continue;
        }
        // drop the space that separated the heading from the previous sentence
        let kept = out.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
        out.truncate(kept);
        let have = out.len() - out.trim_end_matches('\n').len();
        if have < newlines {
            out.extend(std::iter::repeat('\n').take(newlines - have));
            inserted += 1;
        }
    }
    out.push_str(&text[last..]);
    (out, inserted)
}
