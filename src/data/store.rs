use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;

use super::loader;
use super::model::RecordStore;

// ---------------------------------------------------------------------------
// Process-wide record store
// ---------------------------------------------------------------------------

/// The dataset, loaded at most once per process and never invalidated.
static STORE: OnceLock<RecordStore> = OnceLock::new();

/// Load the dataset from `path` on the first call and return the shared
/// store. Later calls return the cached store without reading `path`.
pub fn load_once(path: &Path) -> Result<&'static RecordStore> {
    if let Some(store) = STORE.get() {
        log::debug!("Record store already loaded, ignoring {}", path.display());
        return Ok(store);
    }
    let store = loader::load_file(path)?;
    Ok(STORE.get_or_init(|| store))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_once_and_reuses_the_cached_store() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(
            br#"[{"id": 1, "year": 2020, "classification": "A1", "evaluation_area": "Ensino",
                  "specific_area": "Fisica", "impact_factor": 1.5, "internationalized": true}]"#,
        )
        .unwrap();

        let first = load_once(file.path()).unwrap();
        let missing = Path::new("/definitely/not/here.json");
        let second = load_once(missing).unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, STORE.get().unwrap()));
        assert_eq!(first.len(), 1);
    }
}
