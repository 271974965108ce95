//! End-to-end pipeline tests: grammar text -> delta -> reconciled registry

use dtdsync::{diff, parse_dtd, parse_registry, reconcile, Mode, Result};

const GRAMMAR: &str = r#"
<!-- reporting layout -->
<!ELEMENT report (header?,row*,footer)>
<!ATTLIST report id CDATA #REQUIRED>
<!ELEMENT header (#PCDATA)>
<!ELEMENT row EMPTY>
<!ATTLIST row
    kind (data|summary) "data"
    hidden CDATA #IMPLIED>
<!ELEMENT footer (#PCDATA)>
<!ELEMENT list (item+)>
<!ELEMENT item (#PCDATA)>
"#;

#[test]
fn test_missing_report_element_is_synthesized() -> Result<()> {
    let grammar = parse_dtd("<!ELEMENT report (header?,row*,footer)>\n<!ATTLIST report id CDATA #REQUIRED>")?;
    let mut registry = parse_registry("{}")?;

    let delta = diff(&grammar, &registry);
    assert_eq!(delta.missing_elements, vec!["report".to_string()]);

    let outcome = reconcile(&grammar, &delta, &mut registry, Mode::Apply);
    assert_eq!(outcome.edits, 1);

    assert_eq!(
        registry.children_of("report"),
        Some(vec![
            "header".to_string(),
            "row".to_string(),
            "footer".to_string()
        ])
    );
    assert_eq!(
        registry
            .props_of("report")
            .and_then(|p| p.get("id"))
            .and_then(|v| v.as_object())
            .and_then(|o| o.get("required"))
            .and_then(|v| v.as_bool()),
        Some(true)
    );
    Ok(())
}

#[test]
fn test_stale_children_on_empty_element_are_left_alone() -> Result<()> {
    // grammar says EMPTY, registry still carries children from a prior
    // schema version; grammar absence of children is not a mismatch
    let grammar = parse_dtd("<!ELEMENT row EMPTY>")?;
    let registry = parse_registry(r#"{"row": {"props": {}, "children": ["cell"]}}"#)?;

    let delta = diff(&grammar, &registry);
    assert!(delta.incorrect_children.is_empty());
    assert!(delta.missing_children.is_empty());
    assert!(delta.is_in_sync());
    Ok(())
}

#[test]
fn test_incorrect_children_are_overwritten() -> Result<()> {
    let grammar = parse_dtd("<!ELEMENT list (item+)>")?;
    let mut registry = parse_registry(r#"{"list": {"props": {}, "children": ["entry"]}}"#)?;

    let delta = diff(&grammar, &registry);
    let mismatch = delta.incorrect_children.get("list");
    assert_eq!(
        mismatch.map(|m| (m.current.clone(), m.should_be.clone())),
        Some((vec!["entry".to_string()], vec!["item".to_string()]))
    );

    reconcile(&grammar, &delta, &mut registry, Mode::Apply);
    assert_eq!(registry.children_of("list"), Some(vec!["item".to_string()]));
    Ok(())
}

#[test]
fn test_props_less_entry_reported_as_anomaly() -> Result<()> {
    let grammar = parse_dtd("<!ATTLIST row id CDATA #REQUIRED>")?;
    let registry = parse_registry(r#"{"row": {"description": "pre-structural entry"}}"#)?;

    let delta = diff(&grammar, &registry);
    assert_eq!(delta.skipped_props, vec!["row".to_string()]);
    assert!(delta.missing_attributes.is_empty());
    assert_eq!(delta.total_issues(), 0);
    Ok(())
}

#[test]
fn test_apply_then_rerun_yields_empty_delta() -> Result<()> {
    let grammar = parse_dtd(GRAMMAR)?;
    let mut registry = parse_registry(
        r#"{"report": {"props": {"id": {"type": "string", "required": true}}}}"#,
    )?;

    let delta = diff(&grammar, &registry);
    assert!(!delta.is_in_sync());
    let outcome = reconcile(&grammar, &delta, &mut registry, Mode::Apply);
    assert!(outcome.edits > 0);

    // full second pass over the serialized document
    let reloaded = parse_registry(&registry.to_json_pretty())?;
    let second = diff(&grammar, &reloaded);
    assert!(second.is_in_sync());
    assert!(second.missing_elements.is_empty());
    assert!(second.missing_attributes.is_empty());
    assert!(second.missing_children.is_empty());
    assert!(second.incorrect_children.is_empty());
    Ok(())
}

#[test]
fn test_dry_run_leaves_document_untouched() -> Result<()> {
    let grammar = parse_dtd(GRAMMAR)?;
    let mut registry = parse_registry("{}")?;
    let before = registry.to_json_pretty();

    let delta = diff(&grammar, &registry);
    let outcome = reconcile(&grammar, &delta, &mut registry, Mode::DryRun);

    assert!(outcome.edits > 0);
    assert_eq!(registry.to_json_pretty(), before);
    Ok(())
}

#[test]
fn test_hand_authored_metadata_survives_apply() -> Result<()> {
    let grammar = parse_dtd(GRAMMAR)?;
    let mut registry = parse_registry(
        r#"{
            "report": {
                "name": "report",
                "description": "Carefully written by a human",
                "validation": {"custom_rule": "rows must balance"},
                "props": {"id": {"type": "string", "description": "Report key", "required": true}}
            }
        }"#,
    )?;

    let delta = diff(&grammar, &registry);
    reconcile(&grammar, &delta, &mut registry, Mode::Apply);

    let report = registry.element("report");
    assert_eq!(
        report
            .and_then(|o| o.get("description"))
            .and_then(|v| v.as_str()),
        Some("Carefully written by a human")
    );
    assert!(report.is_some_and(|o| o.contains_key("validation")));
    assert_eq!(
        registry
            .props_of("report")
            .and_then(|p| p.get("id"))
            .and_then(|v| v.as_object())
            .and_then(|o| o.get("description"))
            .and_then(|v| v.as_str()),
        Some("Report key")
    );
    Ok(())
}

#[test]
fn test_enumerated_attribute_round_trip() -> Result<()> {
    let grammar = parse_dtd(GRAMMAR)?;
    let mut registry = parse_registry("{}")?;
    let delta = diff(&grammar, &registry);
    reconcile(&grammar, &delta, &mut registry, Mode::Apply);

    let values: Option<Vec<String>> = registry
        .props_of("row")
        .and_then(|p| p.get("kind"))
        .and_then(|v| v.as_object())
        .and_then(|o| o.get("type"))
        .and_then(|v| v.as_object())
        .and_then(|o| o.get("oneOf"))
        .and_then(|v| v.as_array())
        .map(|alts| {
            alts.iter()
                .filter_map(|alt| {
                    alt.as_object()
                        .and_then(|o| o.get("value"))
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                })
                .collect()
        });
    assert_eq!(values, Some(vec!["data".to_string(), "summary".to_string()]));
    Ok(())
}
