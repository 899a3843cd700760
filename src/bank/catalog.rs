use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_embed::Embed;

use crate::bank::{BankError, QuestionBank, level_label};

#[derive(Embed)]
#[folder = "assets/banks/"]
struct BankAssets;

pub enum BankStatus<'a> {
    Ready(&'a QuestionBank),
    Failed(&'a BankError),
    Missing,
}

/// Question banks keyed by level. A bank that failed to load keeps its slot
/// so the UI can still list the level and explain the failure.
#[derive(Debug, Default)]
pub struct BankCatalog {
    levels: BTreeMap<String, Result<QuestionBank, BankError>>,
}

impl BankCatalog {
    /// Load the bundled banks, then let `<key>.json` files in `user_dir`
    /// replace or add levels.
    pub fn load(user_dir: Option<&Path>) -> Self {
        let mut catalog = Self::bundled();
        if let Some(dir) = user_dir {
            catalog.load_dir(dir);
        }
        catalog
    }

    pub fn bundled() -> Self {
        let mut catalog = Self::default();
        for filename in BankAssets::iter() {
            let Some(key) = filename.strip_suffix(".json") else {
                continue;
            };
            let result = match BankAssets::get(&filename) {
                Some(file) => match std::str::from_utf8(file.data.as_ref()) {
                    Ok(text) => QuestionBank::from_json(key, text),
                    Err(_) => Err(BankError::InvalidEntry {
                        key: key.to_string(),
                        index: 0,
                        reason: "bundled bank is not UTF-8",
                    }),
                },
                None => Err(BankError::NotFound {
                    key: key.to_string(),
                }),
            };
            catalog.insert(key, result);
        }
        catalog
    }

    pub fn load_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("cannot read bank directory {}: {err}", dir.display());
                return;
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let result = fs::read_to_string(&path)
                .map_err(|source| BankError::Io {
                    key: key.to_string(),
                    source,
                })
                .and_then(|text| QuestionBank::from_json(key, &text));
            self.insert(key, result);
        }
    }

    fn insert(&mut self, key: &str, result: Result<QuestionBank, BankError>) {
        match &result {
            Ok(bank) => log::info!("loaded bank {key}: {} questions", bank.len()),
            Err(err) => log::error!("{err}"),
        }
        self.levels.insert(key.to_string(), result);
    }

    pub fn status(&self, key: &str) -> BankStatus<'_> {
        match self.levels.get(key) {
            Some(Ok(bank)) => BankStatus::Ready(bank),
            Some(Err(err)) => BankStatus::Failed(err),
            None => BankStatus::Missing,
        }
    }

    pub fn bank(&self, key: &str) -> Option<&QuestionBank> {
        match self.status(key) {
            BankStatus::Ready(bank) => Some(bank),
            _ => None,
        }
    }

    /// Level keys in display order, with labels and question counts
    /// (`None` for banks that failed to load).
    pub fn levels(&self) -> Vec<(String, String, Option<usize>)> {
        self.levels
            .iter()
            .map(|(key, result)| {
                (
                    key.clone(),
                    level_label(key),
                    result.as_ref().ok().map(QuestionBank::len),
                )
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_levels_load() {
        let catalog = BankCatalog::bundled();
        let keys: Vec<String> = catalog.levels().into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(keys, vec!["1".to_string(), "2".to_string()]);
        for key in ["1", "2"] {
            let bank = catalog.bank(key).expect("bundled bank should parse");
            assert!(bank.len() >= 10);
        }
    }

    #[test]
    fn test_user_dir_overrides_and_adds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("1.json"),
            r#"[{"q": "override", "answers": ["x"]}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("3.json"), r#"[{"q": "new", "answers": ["y"]}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = BankCatalog::load(Some(dir.path()));
        assert_eq!(catalog.bank("1").unwrap().questions[0].prompt, "override");
        assert_eq!(catalog.bank("3").unwrap().label, "3級");
        assert!(catalog.bank("2").is_some());
        assert_eq!(catalog.levels().len(), 3);
    }

    #[test]
    fn test_broken_user_bank_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2.json"), "not json").unwrap();

        let catalog = BankCatalog::load(Some(dir.path()));
        assert!(matches!(catalog.status("2"), BankStatus::Failed(BankError::Parse { .. })));
        let (_, _, count) = catalog
            .levels()
            .into_iter()
            .find(|(k, _, _)| k == "2")
            .unwrap();
        assert_eq!(count, None);
    }

    #[test]
    fn test_missing_level() {
        let catalog = BankCatalog::bundled();
        assert!(matches!(catalog.status("9"), BankStatus::Missing));
        assert!(catalog.bank("9").is_none());
    }

    #[test]
    fn test_unreadable_dir_keeps_bundled() {
        let catalog = BankCatalog::load(Some(Path::new("/nonexistent/rekiken/banks")));
        assert!(catalog.bank("1").is_some());
    }
}
