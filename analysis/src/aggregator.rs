use crate::models::*;
use std::collections::HashSet;

// Merge normalized records from all queries, in query-set order. The dedup
// key is the case-insensitive (name, description) pair, so the first query
// to report a component wins field-for-field. Known limitation: distinct
// components sharing a generic description merge into one row.
pub fn aggregate(results: &[Vec<ComponentRecord>]) -> Vec<ComponentRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<ComponentRecord> = Vec::new();

    for records in results {
        for record in records {
            let key = dedup_key(record);
            if seen.contains(&key) {
                log::debug!("dropping duplicate record for '{}'", record.component_name);
                continue;
            }
            seen.insert(key);

            let mut record = record.clone();
            record.article_id = article_id(merged.len() + 1);
            merged.push(record);
        }
    }

    merged
}

// The single row returned when every query failed or yielded nothing, so
// downstream consumers always receive at least one record.
pub fn placeholder_error_record() -> ComponentRecord {
    let mut record = ComponentRecord::with_name("error".to_string());
    record.article_id = article_id(1);
    record.description = "analysis failed - no components could be identified".to_string();
    record.remark = "all analysis queries failed or returned no records".to_string();
    record
}

fn dedup_key(record: &ComponentRecord) -> String {
    format!(
        "{}|{}",
        record.component_name.to_lowercase(),
        record.description.to_lowercase()
    )
}

fn article_id(position: usize) -> String {
    format!("ART-{:03}", position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, description: &str) -> ComponentRecord {
        let mut record = ComponentRecord::with_name(name.to_string());
        record.description = description.to_string();
        record
    }

    #[test]
    fn duplicate_reports_across_queries_merge_into_one_row() {
        let results = vec![
            vec![record("Valve A", "DN20 ball valve")],
            vec![record("Valve A", "DN20 ball valve")],
        ];
        let merged = aggregate(&results);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].article_id, "ART-001");
    }

    #[test]
    fn dedup_key_is_case_insensitive() {
        let results = vec![
            vec![record("Valve A", "DN20 Ball Valve")],
            vec![record("VALVE A", "dn20 ball valve")],
        ];
        assert_eq!(aggregate(&results).len(), 1);
    }

    #[test]
    fn article_ids_are_sequential_and_gap_free() {
        let results = vec![
            vec![record("Valve A", "ball"), record("Valve A", "ball"), record("Pump 1", "feed")],
            vec![record("Sensor T", "temperature")],
        ];
        let merged = aggregate(&results);
        let ids: Vec<_> = merged.iter().map(|r| r.article_id.as_str()).collect();
        assert_eq!(ids, ["ART-001", "ART-002", "ART-003"]);
    }

    #[test]
    fn first_query_wins_field_for_field() {
        let mut first = record("Valve A", "DN20 ball valve");
        first.material = Some("brass".to_string());
        let mut second = record("Valve A", "DN20 ball valve");
        second.material = Some("steel".to_string());

        let merged = aggregate(&[vec![first], vec![second]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].material.as_deref(), Some("brass"));
    }

    #[test]
    fn same_name_with_distinct_descriptions_stays_separate() {
        let results = vec![vec![
            record("Valve A", "DN20 ball valve"),
            record("Valve A", "DN25 gate valve"),
        ]];
        assert_eq!(aggregate(&results).len(), 2);
    }

    #[test]
    fn placeholder_record_is_a_valid_single_row() {
        let placeholder = placeholder_error_record();
        assert_eq!(placeholder.article_id, "ART-001");
        assert_eq!(placeholder.component_name, "error");
        assert_eq!(placeholder.count, 1);
    }
}
