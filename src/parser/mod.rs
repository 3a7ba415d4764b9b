pub mod normalize;
pub mod rank;
pub mod sources;
pub mod tokenize;

use tracing::debug;

use crate::error::ExtractionError;
use normalize::PageText;
use rank::Ranker;
use sources::Source;

/// Pipeline for one source: markup → page text → candidates → ranked total.
pub struct Extractor {
    source: Source,
    ranker: Ranker,
}

impl Extractor {
    pub fn new(source: Source) -> Self {
        let ranker = source.ranker();
        Self { source, ranker }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn extract(&self, html: &str) -> Result<u64, ExtractionError> {
        self.extract_page(&PageText::from_html(html))
    }

    pub fn extract_page(&self, page: &PageText) -> Result<u64, ExtractionError> {
        let candidates = tokenize::tokenize(&page.text);
        debug!(site = self.source.name, candidates = candidates.len(), "tokenized page");

        match self.ranker.pick(page, candidates) {
            Some(pick) => {
                debug!(site = self.source.name, value = pick.value, kind = ?pick.kind, "picked count");
                Ok(pick.value)
            }
            None => Err(ExtractionError::NoPlausibleCount {
                site: self.source.name.to_string(),
                min: self.source.range.min,
                max: self.source.range.max,
            }),
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn oikotie() -> Extractor {
        Extractor::new(Source::oikotie("https://asunnot.oikotie.fi/vuokra-asunnot"))
    }

    fn lumo() -> Extractor {
        Extractor::new(Source::lumo("https://lumo.fi/vuokra-asunnot"))
    }

    #[test]
    fn oikotie_fixture() {
        assert_eq!(oikotie().extract(&fixture("oikotie")).unwrap(), 23456);
    }

    #[test]
    fn lumo_fixture_heading() {
        assert_eq!(lumo().extract(&fixture("lumo")).unwrap(), 1246);
    }

    #[test]
    fn lumo_phrase_beats_larger_and_out_of_range_numbers() {
        let page = PageText::from_plain(
            "Vuokraa koti 19 990 € 250000 Hakuehdoillasi löytyi 1 246 asuntoa 15 000 kotia",
        );
        assert_eq!(lumo().extract_page(&page).unwrap(), 1246);
    }

    #[test]
    fn lumo_phrase_in_body_when_not_in_heading() {
        let html = "<h1>Vuokra-asunnot</h1><p>Hakuehdoillasi löytyi <strong>1 246</strong> asuntoa</p><p>5 000 kotia</p>";
        assert_eq!(lumo().extract(html).unwrap(), 1246);
    }

    #[test]
    fn lumo_falls_back_to_generic_chain() {
        let html = "<h1>Vuokra-asunnot</h1><p>Näytetään 1–20 / 980 asuntoa</p><p>Vuokra 1 150 €/kk</p>";
        assert_eq!(lumo().extract(html).unwrap(), 980);
    }

    #[test]
    fn lumo_fallback_ignores_nationwide_home_count() {
        // No result heading; "15 000 kotia" is marketing copy, the banner is the count.
        assert_eq!(lumo().extract(&fixture("lumo_no_heading")).unwrap(), 980);
    }

    #[test]
    fn oikotie_slash_banner() {
        let page = PageText::from_plain("Näytetään 1–24 / 12 345 · Hinta 150 000 €");
        assert_eq!(oikotie().extract_page(&page).unwrap(), 12345);
    }

    #[test]
    fn only_years_is_an_error() {
        let err = oikotie().extract("<footer>© 2024 Oikotie</footer>").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Oikotie"));
        assert!(msg.contains("[500, 300000]"));

        let err = lumo().extract("<footer>Kojamo Oyj 2000–2024</footer>").unwrap_err();
        assert!(err.to_string().starts_with("Lumo:"));
    }

    #[test]
    fn out_of_range_only_is_an_error() {
        assert!(lumo().extract("<p>Vuokra 45 € ja 99999 kotia</p>").is_err());
        assert_eq!(oikotie().extract("<p>99999 kotia</p>").unwrap(), 99999);
    }
}
