use crate::models::AnalysisQuery;

// Shared tail of every system prompt: the JSON contract the normalizer
// expects. Keys follow the plant-engineering convention of the reference
// data (komponente, beschreibung, stueck, ...).
const JSON_CONTRACT: &str = r#"Respond ONLY with a JSON array. Each element must be an object with these keys:
"anlage" (plant or system section), "artikel" (article code if visible), "komponente" (component name), "beschreibung" (short technical description), "bemerkung" (remark), "stueck" (integer count, at least 1), "groesse" (nominal size such as DN20, or null), "signal" (signal range such as 4-20mA, or null), "rating" (pressure class or flow coefficient, or null), "material" (or null).
Do not wrap the array in markdown fences and do not add prose before or after it."#;

const FOCUSES: [(&str, &str); 4] = [
    (
        "general component sweep",
        "You are an expert in analyzing technical drawings and plant schematics according to \
         VDI 3814, ISO 16484, ISO 14617, IEC 60617 and DIN EN 81346. Identify EVERY component \
         visible in the provided drawing or document: valves, pumps, sensors, controllers, \
         pipes, fittings, electrical equipment.",
    ),
    (
        "valve and pump focus",
        "You are a piping specialist reading a technical drawing. Focus exclusively on valves \
         (ball, gate, check, control, safety, solenoid) and on pumps, motors and drives. Report \
         nominal sizes (DN), pressure classes (PN) and flow coefficients (kvs) whenever they \
         are legible.",
    ),
    (
        "electrical and control focus",
        "You are a control systems engineer reading a technical drawing. Focus exclusively on \
         sensors, measurement instruments, PLCs, DCS/SCADA components, actuators and electrical \
         wiring. Report signal ranges (for example 0-10V or 4-20mA) whenever they are legible.",
    ),
    (
        "HVAC and mechanical focus",
        "You are an HVAC engineer reading a technical drawing. Focus exclusively on air \
         handling units, fans, dampers, heat exchangers, filters, ducts, pipe supports and \
         other mechanical equipment.",
    ),
];

// The fixed, ordered analysis query set. Order determines which query wins
// when duplicates are merged.
pub fn analysis_queries() -> Vec<AnalysisQuery> {
    FOCUSES
        .iter()
        .map(|&(name, focus)| AnalysisQuery {
            name,
            system_prompt: format!("{}\n\n{}", focus, JSON_CONTRACT),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn query_set_is_fixed_and_ordered() {
        let queries = analysis_queries();
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[0].name, "general component sweep");

        let names: HashSet<_> = queries.iter().map(|q| q.name).collect();
        assert_eq!(names.len(), queries.len(), "query names must be unique");
    }

    #[test]
    fn every_prompt_demands_the_json_contract() {
        for query in analysis_queries() {
            assert!(query.system_prompt.contains("JSON array"), "{}", query.name);
            assert!(query.system_prompt.contains("\"komponente\""), "{}", query.name);
            assert!(query.system_prompt.contains("\"stueck\""), "{}", query.name);
        }
    }
}
