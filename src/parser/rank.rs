use regex::Regex;
use tracing::debug;

use super::normalize::PageText;
use super::tokenize::{clean_to_int, looks_like_year, MatchKind, NumericCandidate};

/// Closed interval of totals a source can plausibly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRange {
    pub min: u64,
    pub max: u64,
}

impl ExtractionRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A fixed sentence a source renders around its total. Capture group 1 is the number.
#[derive(Debug, Clone)]
pub struct PhraseTemplate(Regex);

impl PhraseTemplate {
    pub fn new(re: Regex) -> Self {
        Self(re)
    }

    pub fn find(&self, text: &str) -> Option<u64> {
        let caps = self.0.captures(text)?;
        clean_to_int(caps.get(1)?.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseScope {
    Headings,
    PageText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub value: u64,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Found(Pick),
    NotFound,
}

#[derive(Debug, Clone)]
pub enum Stage {
    /// Trusted unconditionally: no range filter.
    Phrase {
        template: PhraseTemplate,
        scope: PhraseScope,
    },
    KeywordAdjacent,
    SlashTotal,
    /// Years in copyright, date or span position are skipped here only.
    BareMax,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Phrase { scope: PhraseScope::Headings, .. } => "exact heading match",
            Stage::Phrase { scope: PhraseScope::PageText, .. } => "exact page match",
            Stage::KeywordAdjacent => "keyword-adjacent",
            Stage::SlashTotal => "slash-total",
            Stage::BareMax => "bare max in range",
        }
    }

    pub fn run(
        &self,
        page: &PageText,
        candidates: &[NumericCandidate],
        range: ExtractionRange,
    ) -> StageOutcome {
        let pick = match self {
            Stage::Phrase { template, scope } => {
                let value = match scope {
                    PhraseScope::Headings => page.headings.iter().find_map(|h| template.find(h)),
                    PhraseScope::PageText => template.find(&page.text),
                };
                value.map(|value| Pick { value, kind: MatchKind::PhraseExact })
            }
            Stage::KeywordAdjacent => max_in_range(candidates, range, MatchKind::KeywordAdjacent),
            Stage::SlashTotal => max_in_range(candidates, range, MatchKind::SlashTotal),
            Stage::BareMax => candidates
                .iter()
                .filter(|c| range.contains(c.value) && !is_year_noise(c))
                .map(|c| c.value)
                .max()
                .map(|value| Pick { value, kind: MatchKind::Bare }),
        };
        match pick {
            Some(p) => StageOutcome::Found(p),
            None => StageOutcome::NotFound,
        }
    }
}

const SPAN_DASHES: [char; 3] = ['-', '–', '—'];

/// An ungrouped 19xx/20xx that reads as a year: "© 2024", "2000–2025", "1.11.2025".
fn is_year_noise(c: &NumericCandidate) -> bool {
    if !looks_like_year(&c.raw) {
        return false;
    }
    let before = c.before.trim_end();
    let after = c.after.trim_start();
    let lower = before.to_lowercase();

    let mut tail = c.before.chars().rev();
    let dated = tail.next() == Some('.') && tail.next().is_some_and(|ch| ch.is_ascii_digit());

    dated
        || before.ends_with('©')
        || lower.ends_with("(c)")
        || lower.ends_with("copyright")
        || before.ends_with(SPAN_DASHES)
        || after.starts_with(SPAN_DASHES)
        || after.starts_with('©')
}

fn max_in_range(
    candidates: &[NumericCandidate],
    range: ExtractionRange,
    kind: MatchKind,
) -> Option<Pick> {
    candidates
        .iter()
        .filter(|c| c.kind == kind && range.contains(c.value))
        .map(|c| c.value)
        .max()
        .map(|value| Pick { value, kind })
}

/// Ordered stage chain for one source. The first stage to find a value wins.
#[derive(Debug, Clone)]
pub struct Ranker {
    pub stages: Vec<Stage>,
    pub range: ExtractionRange,
    pub keywords: Vec<String>,
}

impl Ranker {
    pub fn new(stages: Vec<Stage>, range: ExtractionRange, keywords: &[&str]) -> Self {
        Self {
            stages,
            range,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn pick(&self, page: &PageText, candidates: Vec<NumericCandidate>) -> Option<Pick> {
        let candidates = self.classify(candidates);
        self.stages.iter().find_map(|stage| match stage.run(page, &candidates, self.range) {
            StageOutcome::Found(p) => {
                debug!(stage = stage.label(), value = p.value, "stage matched");
                Some(p)
            }
            StageOutcome::NotFound => {
                debug!(stage = stage.label(), "stage found nothing");
                None
            }
        })
    }

    /// Tag candidates as keyword-adjacent or slash-total. Keyword wins if both apply.
    pub fn classify(&self, mut candidates: Vec<NumericCandidate>) -> Vec<NumericCandidate> {
        for c in &mut candidates {
            c.kind = if self.followed_by_keyword(c) {
                MatchKind::KeywordAdjacent
            } else if c.before.trim_end().ends_with('/') {
                MatchKind::SlashTotal
            } else {
                MatchKind::Bare
            };
        }
        candidates
    }

    fn followed_by_keyword(&self, c: &NumericCandidate) -> bool {
        let word: String = c
            .after
            .trim_start()
            .chars()
            .take_while(|ch| ch.is_alphabetic() || *ch == '-')
            .collect();
        !word.is_empty() && self.keywords.contains(&word.to_lowercase())
    }
}
