use super::types::Lead;
use super::ExtractionStrategy;
use crate::browser::PageSession;
use anyhow::{Context, Result};

pub struct Extractor {
    strategy: Box<dyn ExtractionStrategy>,
}

impl Extractor {
    pub fn new(strategy: Box<dyn ExtractionStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy_id(&self) -> &str {
        self.strategy.id()
    }

    /// One `evaluate` call against the current page.
    ///
    /// `Ok(vec![])` means the page showed no cards (e.g. mid-load). `Err`
    /// means the snapshot could not be taken or understood at all.
    pub async fn extract(&self, page: &dyn PageSession) -> Result<Vec<Lead>> {
        let snapshot = page
            .evaluate(self.strategy.script())
            .await
            .with_context(|| format!("evaluating {} script failed", self.strategy.id()))?;

        let raw = self
            .strategy
            .parse(&snapshot)
            .with_context(|| format!("{} could not parse snapshot", self.strategy.id()))?;

        Ok(raw.into_iter().map(Lead::from).collect())
    }
}
