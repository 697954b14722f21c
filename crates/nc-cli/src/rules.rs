use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use log::debug;

use nc_compiler::{compile_sources, FilterSource, SourceSetReport};

/// Where rules come from. Shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Filter list files
    #[arg(short, long = "list")]
    pub lists: Vec<String>,

    /// Extra rules, one per line, applied after the lists
    #[arg(short, long)]
    pub rules: Option<String>,

    /// JSON manifest of subscribed sources (`[{name, url, isEnabled}]`)
    #[arg(short, long)]
    pub sources: Option<PathBuf>,

    /// Directory holding cached source text as `<slug>.txt`
    /// (defaults to the manifest's directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

impl RuleArgs {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.rules.is_none() && self.sources.is_none()
    }
}

pub fn load_rules(args: &RuleArgs) -> Result<SourceSetReport, String> {
    if args.is_empty() {
        return Err("No rules specified (use --list, --rules or --sources)".to_string());
    }

    let mut sources = Vec::new();
    let mut texts: HashMap<String, String> = HashMap::new();

    for path in &args.lists {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
        let name = Path::new(path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        texts.insert(path.clone(), content);
        sources.push(FilterSource::new(name, path.clone()));
    }

    let mut cache_paths: HashMap<String, PathBuf> = HashMap::new();
    if let Some(manifest) = &args.sources {
        let cache_dir = match &args.cache_dir {
            Some(dir) => dir.clone(),
            None => manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        for source in read_manifest(manifest)? {
            let cache_path = cache_dir.join(format!("{}.txt", source.slug()));
            debug!("source '{}' -> {}", source.name, cache_path.display());
            cache_paths.insert(source.url.clone(), cache_path);
            sources.push(source);
        }
    }

    let custom_rules = args.rules.as_deref().unwrap_or("");

    Ok(compile_sources(&sources, custom_rules, |source| {
        if let Some(text) = texts.get(&source.url) {
            return Some(text.clone());
        }
        let path = cache_paths.get(&source.url)?;
        fs::read_to_string(path).ok()
    }))
}

pub fn read_manifest(path: &Path) -> Result<Vec<FilterSource>, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Invalid sources manifest '{}': {}", path.display(), e))
}
