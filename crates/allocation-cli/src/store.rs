//! Catalog and people file access.

use allocation_core::catalog::{self, AssetCatalog, CatalogDocument};
use allocation_core::person::PersonRecord;
use allocation_core::ComputationOutput;
use std::path::Path;

use crate::input::file;

/// Load and resolve the asset catalog. Resolution warnings stay in the envelope.
pub fn load_catalog(path: &Path) -> Result<ComputationOutput<AssetCatalog>, Box<dyn std::error::Error>> {
    let document: CatalogDocument = file::read_json(path)?;
    let resolved = catalog::load_catalog(&document)?;
    tracing::debug!(
        path = %path.display(),
        assets = resolved.result.len(),
        reference = ?resolved.result.currency_reference(),
        "resolved asset catalog"
    );
    Ok(resolved)
}

/// People file. A missing file is an empty list.
pub fn load_people(path: &Path) -> Result<Vec<PersonRecord>, Box<dyn std::error::Error>> {
    let people: Vec<PersonRecord> = file::read_json_or_default(path)?;
    tracing::debug!(path = %path.display(), count = people.len(), "loaded people");
    Ok(people)
}

pub fn save_people(path: &Path, people: &[PersonRecord]) -> Result<(), Box<dyn std::error::Error>> {
    file::write_json(path, &people)
}

/// Find a person by 1-based position or by case-insensitive name.
pub fn find_person(people: &[PersonRecord], selector: &str) -> Option<usize> {
    let selector = selector.trim();
    if let Ok(n) = selector.parse::<usize>() {
        if (1..=people.len()).contains(&n) {
            return Some(n - 1);
        }
    }
    let wanted = selector.to_lowercase();
    people.iter().position(|p| p.name.trim().to_lowercase() == wanted)
}

/// Load the people file and return the selected record.
pub fn load_person(path: &Path, selector: &str) -> Result<PersonRecord, Box<dyn std::error::Error>> {
    let mut people = load_people(path)?;
    let idx = find_person(&people, selector)
        .ok_or_else(|| format!("No person '{}' in {}", selector, path.display()))?;
    tracing::info!(person = %people[idx].name, "selected person");
    Ok(people.swap_remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<PersonRecord> {
        vec![PersonRecord::new("Ayşe"), PersonRecord::new("Mehmet")]
    }

    #[test]
    fn test_find_by_index() {
        assert_eq!(find_person(&people(), "2"), Some(1));
        assert_eq!(find_person(&people(), "3"), None);
        assert_eq!(find_person(&people(), "0"), None);
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        assert_eq!(find_person(&people(), "mehmet"), Some(1));
        assert_eq!(find_person(&people(), " AYŞE "), Some(0));
        assert_eq!(find_person(&people(), "Zeynep"), None);
    }

    #[test]
    fn test_missing_people_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let people = load_people(&dir.path().join("people.json")).unwrap();
        assert!(people.is_empty());
    }

    #[test]
    fn test_save_then_load_person() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.json");
        save_people(&path, &people()).unwrap();
        let p = load_person(&path, "mehmet").unwrap();
        assert_eq!(p.name, "Mehmet");
    }
}
