use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::config::Settings;
use crate::fetcher::{fetch_with_retry, RetryPolicy, Transport};
use crate::ledger::{Ledger, ListingRecord, UpsertOutcome};
use crate::parser::sources::Source;
use crate::parser::Extractor;

/// One fetch-extract-record cycle over both sources.
pub struct Tracker<'a, T: Transport + ?Sized> {
    transport: &'a T,
    oikotie: Extractor,
    lumo: Extractor,
    retry: RetryPolicy,
    politeness_delay: Duration,
    ledger: Ledger,
}

impl<'a, T: Transport + ?Sized> Tracker<'a, T> {
    pub fn new(transport: &'a T, settings: &Settings) -> Self {
        Self {
            transport,
            oikotie: Extractor::new(Source::oikotie(settings.oikotie_url.as_str())),
            lumo: Extractor::new(Source::lumo(settings.lumo_url.as_str())),
            retry: RetryPolicy::from_settings(settings),
            politeness_delay: settings.politeness_delay(),
            ledger: Ledger::new(&settings.ledger_path),
        }
    }

    /// Both counts must succeed before the ledger is touched.
    pub async fn run_once(&self, today: NaiveDate) -> Result<(ListingRecord, UpsertOutcome)> {
        let oikotie = self.count(&self.oikotie).await?;
        tokio::time::sleep(self.politeness_delay).await;
        let lumo = self.count(&self.lumo).await?;

        let record = ListingRecord { date: today, oikotie, lumo };
        let outcome = self.ledger.upsert(&record)?;
        Ok((record, outcome))
    }

    async fn count(&self, extractor: &Extractor) -> Result<u64> {
        let source = extractor.source();
        info!("Fetching {}: {}", source.name, source.url);
        let html = fetch_with_retry(self.transport, &source.url, &self.retry).await?;
        let value = extractor.extract(&html)?;
        info!("{} count: {}", source.name, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::error::{ExtractionError, FetchError};
    use crate::fetcher::testing::FakeTransport;

    const OIKOTIE: &str = "http://fixtures.test/oikotie";
    const LUMO: &str = "http://fixtures.test/lumo";

    fn settings(ledger: &Path) -> Settings {
        Settings {
            oikotie_url: OIKOTIE.into(),
            lumo_url: LUMO.into(),
            ledger_path: ledger.to_path_buf(),
            retry_delay_ms: 0,
            politeness_delay_ms: 0,
            ..Settings::default()
        }
    }

    fn fixture(name: &str) -> String {
        fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn both_pages() -> FakeTransport {
        FakeTransport::default()
            .with_page(OIKOTIE, &fixture("oikotie"))
            .with_page(LUMO, &fixture("lumo"))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 16).unwrap()
    }

    #[tokio::test]
    async fn records_both_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/listings.csv");
        let transport = both_pages();

        let (record, outcome) = Tracker::new(&transport, &settings(&path))
            .run_once(today())
            .await
            .unwrap();
        assert_eq!(record, ListingRecord { date: today(), oikotie: 23456, lumo: 1246 });
        assert_eq!(outcome, UpsertOutcome::Appended);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,oikotie,lumo\n2025-10-16,23456,1246\n"
        );
    }

    #[tokio::test]
    async fn second_run_same_day_keeps_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        let transport = both_pages();
        let tracker = Tracker::new(&transport, &settings(&path));

        tracker.run_once(today()).await.unwrap();
        let (_, outcome) = tracker.run_once(today()).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Replaced);

        let rows = Ledger::new(&path).records().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, today());
    }

    #[tokio::test]
    async fn extraction_failure_leaves_ledger_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.csv");
        let before = "date,oikotie,lumo\n2025-10-15,23000,1200\n";
        fs::write(&path, before).unwrap();

        let transport = FakeTransport::default()
            .with_page(OIKOTIE, &fixture("oikotie"))
            .with_page(LUMO, "<html><body><footer>© 2024</footer></body></html>");

        let err = Tracker::new(&transport, &settings(&path))
            .run_once(today())
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ExtractionError>().is_some());
        assert!(err.to_string().contains("Lumo"));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn fetch_failure_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/listings.csv");
        let transport = FakeTransport::default().with_page(LUMO, &fixture("lumo"));

        let err = Tracker::new(&transport, &settings(&path))
            .run_once(today())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::Exhausted { url, attempts: 3, .. }) if url == OIKOTIE
        ));
        // Lumo is never fetched once Oikotie has failed.
        assert_eq!(transport.calls(), 3);
        assert!(!path.exists());
    }
}
