use crate::models::ComponentRecord;

pub const BOM_HEADERS: [&str; 10] = [
    "Plant",
    "Article ID",
    "Component Name",
    "Description",
    "Remark",
    "Count",
    "Size",
    "Signal",
    "Rating",
    "Material",
];

// Serialize a BOM to CSV: one row per record, fixed column order, every
// text field double-quote escaped, counts written bare.
pub fn export_bom(records: &[ComponentRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(BOM_HEADERS.join(","));

    for record in records {
        let fields = [
            escape_field(&record.plant),
            escape_field(&record.article_id),
            escape_field(&record.component_name),
            escape_field(&record.description),
            escape_field(&record.remark),
            record.count.to_string(),
            escape_field(record.size.as_deref().unwrap_or("")),
            escape_field(record.signal.as_deref().unwrap_or("")),
            escape_field(record.rating.as_deref().unwrap_or("")),
            escape_field(record.material.as_deref().unwrap_or("")),
        ];
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

// Parse a BOM CSV produced by export_bom back into records. Short rows are
// skipped.
pub fn parse_bom(text: &str) -> Vec<ComponentRecord> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields = parse_line(line);
            if fields.len() < BOM_HEADERS.len() {
                return None;
            }
            Some(ComponentRecord {
                plant: fields[0].clone(),
                article_id: fields[1].clone(),
                component_name: fields[2].clone(),
                description: fields[3].clone(),
                remark: fields[4].clone(),
                count: fields[5].trim().parse().unwrap_or(1),
                size: optional(&fields[6]),
                signal: optional(&fields[7]),
                rating: optional(&fields[8]),
                material: optional(&fields[9]),
            })
        })
        .collect()
}

pub fn escape_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

// Split one CSV line into fields, honoring quoted fields and doubled
// quote escapes.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(current.clone());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

fn optional(field: &str) -> Option<String> {
    if field.trim().is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_DESCRIPTION;

    fn record(name: &str, description: &str, count: u32) -> ComponentRecord {
        let mut record = ComponentRecord::with_name(name.to_string());
        record.article_id = "ART-001".to_string();
        record.description = description.to_string();
        record.count = count;
        record
    }

    #[test]
    fn round_trip_preserves_name_count_and_description() {
        let records = vec![
            record("Valve A", "DN20 ball valve", 2),
            record("Pump 1", NO_DESCRIPTION, 1),
        ];
        let parsed = parse_bom(&export_bom(&records));

        assert_eq!(parsed.len(), 2);
        for (original, parsed) in records.iter().zip(parsed.iter()) {
            assert_eq!(parsed.component_name, original.component_name);
            assert_eq!(parsed.count, original.count);
            assert_eq!(parsed.description, original.description);
        }
    }

    #[test]
    fn quotes_and_commas_survive_the_round_trip() {
        let records = vec![record("Valve \"A\", main line", "2\" thread, brass", 1)];
        let parsed = parse_bom(&export_bom(&records));
        assert_eq!(parsed[0].component_name, "Valve \"A\", main line");
        assert_eq!(parsed[0].description, "2\" thread, brass");
    }

    #[test]
    fn header_row_uses_the_fixed_column_order() {
        let csv = export_bom(&[]);
        assert_eq!(csv, BOM_HEADERS.join(","));
    }

    #[test]
    fn empty_optional_fields_parse_back_to_none() {
        let records = vec![record("Fan 1", "supply air", 1)];
        let parsed = parse_bom(&export_bom(&records));
        assert!(parsed[0].size.is_none());
        assert!(parsed[0].material.is_none());
    }

    #[test]
    fn parse_line_handles_escaped_quotes() {
        let fields = parse_line(r#""a","b ""c"" d",3"#);
        assert_eq!(fields, vec!["a", "b \"c\" d", "3"]);
    }
}
