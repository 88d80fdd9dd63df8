use serp_filter_rs::audit::MemoryAuditSink;
use serp_filter_rs::content_filter::SuggestionFilter;
use serp_filter_rs::models::{AuditAction, AuditKind};
use serp_filter_rs::FilterError;
use serde_json::json;
use std::sync::Arc;

const ENVELOPE: &str = concat!(
    ")]}'\n",
    r#"[[["spam recipe",0,[512]],["good recipe",0,[512,433]],["spam free diet",0,[22]]],{"q":"Xy","t":{"bpc":false,"tlw":false}}]"#
);

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn filter() -> (SuggestionFilter, Arc<MemoryAuditSink>) {
    let sink = Arc::new(MemoryAuditSink::new());
    (SuggestionFilter::new(sink.clone()), sink)
}

#[test]
fn test_drops_matching_suggestions_in_order() {
    let (filter, sink) = filter();

    let output = filter
        .filter_content(ENVELOPE.as_bytes(), &words(&["spam"]))
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        concat!(
            ")]}'\n",
            r#"[[["good recipe",0,[512,433]]],{"q":"Xy","t":{"bpc":false,"tlw":false}}]"#
        )
    );

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.kind == AuditKind::SearchSuggestion));
    assert!(records.iter().all(|r| r.action == AuditAction::Filtered));
    assert_eq!(records[0].payload["text"], "spam recipe");
    assert_eq!(records[0].payload["original_data"], json!(["spam recipe", 0, [512]]));
    assert_eq!(records[1].payload["text"], "spam free diet");
}

#[test]
fn test_empty_word_list_round_trips() {
    let (filter, sink) = filter();

    let output = filter.filter_content(ENVELOPE.as_bytes(), &[]).unwrap();

    assert_eq!(output, ENVELOPE.as_bytes());
    assert!(sink.is_empty());
}

#[test]
fn test_matching_is_case_sensitive() {
    let (filter, _sink) = filter();

    let output = filter
        .filter_content(ENVELOPE.as_bytes(), &words(&["SPAM"]))
        .unwrap();

    assert_eq!(output, ENVELOPE.as_bytes());
}

#[test]
fn test_non_ascii_text_is_not_escaped() {
    let body = concat!(")]}'\n", r#"[[["天气 spam",0],["天气预报",0]]]"#);
    let (filter, _sink) = filter();

    let output = filter.filter_content(body.as_bytes(), &words(&["spam"])).unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        concat!(")]}'\n", r#"[[["天气预报",0]]]"#)
    );
}

#[test]
fn test_regex_words() {
    let body = concat!(")]}'\n", r#"[[["win 100 dollars",0],["win big",0]]]"#);
    let (filter, _sink) = filter();

    let output = filter
        .filter_content(body.as_bytes(), &words(&[r"win \d+"]))
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        concat!(")]}'\n", r#"[[["win big",0]]]"#)
    );
}

#[test]
fn test_body_without_prefix() {
    let body = r#"[[["spam",0],["ham",0]]]"#;
    let (filter, _sink) = filter();

    let output = filter.filter_content(body.as_bytes(), &words(&["spam"])).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), r#"[[["ham",0]]]"#);
}

#[test]
fn test_malformed_json_is_an_error() {
    let body = concat!(")]}'\n", r#"[[["unterminated"#);
    let (filter, sink) = filter();

    let result = filter.filter_content(body.as_bytes(), &words(&["spam"]));

    assert!(matches!(result, Err(FilterError::Json(_))));
    assert!(sink.is_empty());
}

#[test]
fn test_unexpected_shape_is_an_error() {
    let body = concat!(")]}'\n", r#"{"suggestions":[]}"#);
    let (filter, _sink) = filter();

    let result = filter.filter_content(body.as_bytes(), &words(&["spam"]));

    assert!(matches!(result, Err(FilterError::UnexpectedShape(_))));
}

const ESCAPED_ENVELOPE: &str = concat!(
    ")]}'\n",
    r#"[[["spam \u003cb\u003erecipe\u003c/b\u003e",0,[512]],["caf\u00e9 \u003cb\u003emenu\u003c/b\u003e",0,[512],{"zf":33}]],{"q":"x","t":{"bpc":false}}]"#
);

#[test]
fn test_escaped_envelope_round_trips_without_words() {
    let (filter, sink) = filter();

    let output = filter.filter_content(ESCAPED_ENVELOPE.as_bytes(), &[]).unwrap();

    assert_eq!(output, ESCAPED_ENVELOPE.as_bytes());
    assert!(sink.is_empty());
}

#[test]
fn test_escaped_envelope_keeps_escapes_in_retained_entries() {
    let (filter, sink) = filter();

    let output = filter
        .filter_content(ESCAPED_ENVELOPE.as_bytes(), &words(&["<b>recipe"]))
        .unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        concat!(
            ")]}'\n",
            r#"[[["caf\u00e9 \u003cb\u003emenu\u003c/b\u003e",0,[512],{"zf":33}]],{"q":"x","t":{"bpc":false}}]"#
        )
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload["text"], "spam <b>recipe</b>");
}

#[test]
fn test_envelope_without_matches_is_returned_verbatim() {
    let body = concat!(")]}'\n", "[[[\"ham\", 0], [\"eggs\", 0]], {\"q\": \"h\"}]");
    let (filter, _sink) = filter();

    let output = filter.filter_content(body.as_bytes(), &words(&["spam"])).unwrap();

    assert_eq!(output, body.as_bytes());
}
