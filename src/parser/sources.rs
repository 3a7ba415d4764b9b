use std::sync::LazyLock;

use regex::Regex;

use super::rank::{ExtractionRange, PhraseScope, PhraseTemplate, Ranker, Stage};
use super::tokenize::GROUPED_INT;

pub const OIKOTIE_RANGE: ExtractionRange = ExtractionRange::new(500, 300_000);
pub const LUMO_RANGE: ExtractionRange = ExtractionRange::new(50, 20_000);

const OIKOTIE_KEYWORDS: &[&str] = &[
    "asuntoa",
    "asunnot",
    "vuokra-asuntoa",
    "ilmoitusta",
    "ilmoitukset",
    "kohdetta",
    "hakutulosta",
    "tulosta",
    "listings",
    "results",
    "total",
];

const LUMO_KEYWORDS: &[&str] = &[
    "asuntoa",
    "asunnot",
    "kohdetta",
    "tulosta",
    "apartments",
    "results",
    "total",
];

// "Hakuehdoillasi löytyi 1 246 asuntoa"; the site has shipped both spellings.
static LUMO_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)Hakuehdoill?asi\s+löytyi\s+({GROUPED_INT}|[0-9]+)\s+asuntoa"
    ))
    .unwrap()
});

/// Everything needed to fetch and read one listing source.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: &'static str,
    pub url: String,
    pub range: ExtractionRange,
    pub keywords: &'static [&'static str],
    pub phrase: Option<PhraseTemplate>,
}

impl Source {
    pub fn oikotie(url: impl Into<String>) -> Self {
        Self {
            name: "Oikotie",
            url: url.into(),
            range: OIKOTIE_RANGE,
            keywords: OIKOTIE_KEYWORDS,
            phrase: None,
        }
    }

    pub fn lumo(url: impl Into<String>) -> Self {
        Self {
            name: "Lumo",
            url: url.into(),
            range: LUMO_RANGE,
            keywords: LUMO_KEYWORDS,
            phrase: Some(PhraseTemplate::new(LUMO_PHRASE_RE.clone())),
        }
    }

    /// Phrase stages (headings, then page text) ahead of the generic chain.
    pub fn ranker(&self) -> Ranker {
        let mut stages = Vec::with_capacity(5);
        if let Some(template) = &self.phrase {
            stages.push(Stage::Phrase {
                template: template.clone(),
                scope: PhraseScope::Headings,
            });
            stages.push(Stage::Phrase {
                template: template.clone(),
                scope: PhraseScope::PageText,
            });
        }
        stages.extend([Stage::KeywordAdjacent, Stage::SlashTotal, Stage::BareMax]);
        Ranker::new(stages, self.range, self.keywords)
    }
}
