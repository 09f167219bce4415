use crate::csv_export::parse_line;
use crate::models::{ComponentRecord, ReferenceEntry};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const ARTICLE_REFERENCE_FILE: &str = "article_reference.csv";
const CATEGORY_FILE: &str = "component_categories.csv";

// Static lookup data loaded once at startup and read-only afterwards. A
// missing or malformed file degrades enrichment to a no-op but never
// blocks the pipeline.
pub struct ReferenceData {
    entries: HashMap<String, ReferenceEntry>,
    categories: HashMap<String, String>,
}

impl ReferenceData {
    pub fn load(dir: &Path) -> Self {
        let entries = match load_article_reference(&dir.join(ARTICLE_REFERENCE_FILE)) {
            Ok(entries) => {
                log::info!("loaded {} article reference entries", entries.len());
                entries
            }
            Err(err) => {
                log::warn!("article reference unavailable, enrichment degraded: {}", err);
                HashMap::new()
            }
        };

        let categories = match load_categories(&dir.join(CATEGORY_FILE)) {
            Ok(categories) => {
                log::info!("loaded {} component categories", categories.len());
                categories
            }
            Err(err) => {
                log::warn!("category map unavailable, enrichment degraded: {}", err);
                HashMap::new()
            }
        };

        Self { entries, categories }
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            categories: HashMap::new(),
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&ReferenceEntry> {
        self.entries.get(&code.to_lowercase())
    }

    pub fn category(&self, component_name: &str) -> Option<&str> {
        self.categories
            .get(&component_name.to_lowercase())
            .map(String::as_str)
    }

    // Fill a record's gaps from the reference maps. Fields the model
    // already populated are never overwritten.
    pub fn enrich(&self, record: &mut ComponentRecord) {
        let entry = self
            .lookup(&record.article_id)
            .or_else(|| self.lookup(&record.component_name));

        if let Some(entry) = entry {
            fill(&mut record.size, &entry.size);
            fill(&mut record.signal, &entry.signal);
            fill(&mut record.rating, &entry.rating);
            fill(&mut record.material, &entry.material);
            if record.has_placeholder_description() && !entry.description.is_empty() {
                record.description = entry.description.clone();
            }
        }

        if record.has_placeholder_description() {
            if let Some(category) = self.category(&record.component_name) {
                record.description = category.to_string();
            }
        }
    }

    pub fn enrich_all(&self, records: &mut [ComponentRecord]) {
        for record in records.iter_mut() {
            self.enrich(record);
        }
    }
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        *target = source.clone();
    }
}

// article_reference.csv: code,description,size,signal,rating,material
fn load_article_reference(path: &Path) -> anyhow::Result<HashMap<String, ReferenceEntry>> {
    let text = fs::read_to_string(path)?;
    let mut entries = HashMap::new();

    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_line(line);
        if fields.len() < 2 {
            log::warn!("skipping malformed reference row: {}", line);
            continue;
        }
        let code = fields[0].trim().to_lowercase();
        let entry = ReferenceEntry {
            code: code.clone(),
            description: fields[1].trim().to_string(),
            size: optional_field(&fields, 2),
            signal: optional_field(&fields, 3),
            rating: optional_field(&fields, 4),
            material: optional_field(&fields, 5),
        };
        entries.insert(code, entry);
    }

    Ok(entries)
}

// component_categories.csv: component,category
fn load_categories(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let text = fs::read_to_string(path)?;
    let mut categories = HashMap::new();

    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields = parse_line(line);
        if fields.len() < 2 {
            log::warn!("skipping malformed category row: {}", line);
            continue;
        }
        categories.insert(
            fields[0].trim().to_lowercase(),
            fields[1].trim().to_string(),
        );
    }

    Ok(categories)
}

fn optional_field(fields: &[String], index: usize) -> Option<String> {
    fields
        .get(index)
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}
