//! Template lookup seam.

use std::collections::HashMap;

use super::types::SalaryTemplate;

/// Read access to salary templates by id.
///
/// The resolver only needs lookups, so callers can back it with a loaded
/// YAML catalog, an in-memory map, or their own record store.
pub trait TemplateCatalog {
    /// Returns the template with the given id, if present.
    fn template(&self, id: &str) -> Option<&SalaryTemplate>;
}

impl TemplateCatalog for HashMap<String, SalaryTemplate> {
    fn template(&self, id: &str) -> Option<&SalaryTemplate> {
        self.get(id)
    }
}
