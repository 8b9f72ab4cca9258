use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use eyre::{eyre, Result, WrapErr};

use crate::model::Model;

/// Finds model files below the game's install folder
pub struct DirectoryReader {
    root: PathBuf,
    /// Model name -> SKN file, sorted by name
    models: BTreeMap<String, PathBuf>,
}

impl DirectoryReader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            models: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_root<P: Into<PathBuf>>(&mut self, root: P) {
        self.root = root.into();
    }

    /// Rescans the root. On failure the previously read list is kept.
    pub fn read(&mut self) -> Result<usize> {
        if !self.root.is_dir() {
            return Err(eyre!("'{}' is not a directory", self.root.display()));
        }

        let root = self
            .root
            .to_str()
            .ok_or_else(|| eyre!("Root path '{}' is not valid UTF-8", self.root.display()))?;
        let pattern = format!("{}/**/*.skn", glob::Pattern::escape(root));

        let options = glob::MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };

        let mut models = BTreeMap::new();
        for entry in glob::glob_with(&pattern, options).wrap_err("Invalid model search pattern")? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            let name = model_name(&path, &models);
            models.insert(name, path);
        }

        if models.is_empty() {
            return Err(eyre!("No models found below '{}'", self.root.display()));
        }

        log::info!("Found {} models below '{}'", models.len(), self.root.display());
        self.models = models;
        Ok(self.models.len())
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn get_model(&self, name: &str) -> Result<Model> {
        let path = self
            .models
            .get(name)
            .ok_or_else(|| eyre!("Unknown model '{name}'"))?;

        Model::from_file(name, path)
    }
}

/// The file stem, or `<parent>/<stem>` when the stem is already taken
fn model_name(path: &Path, taken: &BTreeMap<String, PathBuf>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "N/A".to_string());

    if !taken.contains_key(&stem) {
        return stem;
    }

    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name = format!("{parent}/{stem}");
    let mut n = 2;
    while taken.contains_key(&name) {
        name = format!("{parent}/{stem} ({n})");
        n += 1;
    }

    name
}
