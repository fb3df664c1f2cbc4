//! Clipboard import into the active set's inventory

use idolplanner_domain::{
    parse_idol_text, IdolParseError, IdolSource, ImportSummary, InventoryIdolId, ModifierCatalog,
};

use super::planner_service::PlannerService;
use crate::application::error::PlannerError;
use crate::ports::outbound::{ClockPort, StorageProvider};

/// Result of importing pasted idol text
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    /// Inventory ids of the idols that were added, in paste order
    pub added: Vec<InventoryIdolId>,
    pub failures: Vec<IdolParseError>,
}

impl<S: StorageProvider, C: ClockPort> PlannerService<S, C> {
    /// Parse pasted item text and add every idol that parsed to the active
    /// set (creating one when needed). Blocks that fail to parse are reported
    /// and skipped.
    pub fn import_clipboard(
        &mut self,
        text: &str,
        catalog: &ModifierCatalog,
    ) -> Result<ImportOutcome, PlannerError> {
        let results = parse_idol_text(text, catalog);
        let summary = ImportSummary::from_results(&results);

        let mut idols = Vec::with_capacity(summary.succeeded());
        let mut failures = Vec::with_capacity(summary.failed);
        for result in results {
            match result {
                Ok(idol) => idols.push(idol),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping idol block that failed to parse");
                    failures.push(e);
                }
            }
        }

        let added = if idols.is_empty() {
            Vec::new()
        } else {
            self.add_idols(idols, IdolSource::Clipboard)?
        };

        if summary.has_failures() {
            tracing::warn!(total = summary.total, failed = summary.failed, "Clipboard import had failures");
        } else {
            tracing::info!(total = summary.total, "Imported idols from clipboard");
        }

        Ok(ImportOutcome {
            summary,
            added,
            failures,
        })
    }
}
