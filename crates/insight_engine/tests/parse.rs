use insight_core::{Sentiment, Source};
use insight_engine::{
    collect_sources, parse_analysis, strip_code_fences, AnalysisError, WebReference,
};
use pretty_assertions::assert_eq;

const BARE: &str = r#"{
  "title": "Example Domain",
  "summary": "A placeholder page. It is used in documentation.",
  "keywords": ["example", "domain", "example"],
  "sentiment": "Neutral",
  "mainEntities": ["IANA"],
  "estimatedReadingTimeMinutes": 1
}"#;

fn web(title: Option<&str>, uri: Option<&str>) -> WebReference {
    WebReference {
        title: title.map(str::to_string),
        uri: uri.map(str::to_string),
    }
}

fn schema_field(err: AnalysisError) -> &'static str {
    match err {
        AnalysisError::Schema { field, .. } => field,
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn bare_json_parses_into_result() {
    insight_logging::initialize_for_tests();
    let result = parse_analysis(BARE).unwrap();
    assert_eq!(result.title, "Example Domain");
    assert_eq!(result.keywords, vec!["example", "domain", "example"]);
    assert_eq!(result.sentiment, Sentiment::Neutral);
    assert_eq!(result.main_entities, vec!["IANA"]);
    assert_eq!(result.estimated_reading_time_minutes, 1.0);
    assert!(result.sources.is_empty());
}

#[test]
fn fenced_json_parses_identically_to_bare_json() {
    let fenced = format!("```json\n{BARE}\n```");
    assert_eq!(parse_analysis(&fenced).unwrap(), parse_analysis(BARE).unwrap());

    let untagged = format!("Here you go:\n```\n{BARE}\n```\n");
    assert_eq!(strip_code_fences(&untagged), format!("Here you go:\n\n{BARE}"));
    // Leading prose is not repaired away.
    assert_eq!(parse_analysis(&untagged), Err(AnalysisError::Parse));
}

#[test]
fn plain_refusal_is_a_parse_error() {
    insight_logging::initialize_for_tests();
    let err = parse_analysis("Sorry, I cannot help.").unwrap_err();
    assert_eq!(err, AnalysisError::Parse);
    assert_eq!(
        err.to_string(),
        "Failed to parse the analysis result. The model output was not valid JSON."
    );
}

#[test]
fn non_object_json_is_a_parse_error() {
    assert_eq!(parse_analysis("[1, 2]"), Err(AnalysisError::Parse));
    assert_eq!(parse_analysis("\"text\""), Err(AnalysisError::Parse));
}

#[test]
fn unknown_or_miscased_sentiment_names_the_field() {
    let text = BARE.replace("\"Neutral\"", "\"Mixed\"");
    assert_eq!(schema_field(parse_analysis(&text).unwrap_err()), "sentiment");

    let text = BARE.replace("\"Neutral\"", "\"neutral\"");
    assert_eq!(schema_field(parse_analysis(&text).unwrap_err()), "sentiment");
}

#[test]
fn missing_or_mistyped_fields_name_the_field() {
    assert_eq!(schema_field(parse_analysis("{}").unwrap_err()), "title");

    let text = BARE.replace("\"title\": \"Example Domain\"", "\"title\": \"  \"");
    assert_eq!(schema_field(parse_analysis(&text).unwrap_err()), "title");

    let text = BARE.replace("\"mainEntities\": [\"IANA\"],", "");
    assert_eq!(schema_field(parse_analysis(&text).unwrap_err()), "mainEntities");

    let text = BARE.replace("[\"example\", \"domain\", \"example\"]", "\"example\"");
    assert_eq!(schema_field(parse_analysis(&text).unwrap_err()), "keywords");

    let text = BARE.replace(": 1\n", ": \"five\"\n");
    assert_eq!(
        schema_field(parse_analysis(&text).unwrap_err()),
        "estimatedReadingTimeMinutes"
    );

    let text = BARE.replace(": 1\n", ": -2\n");
    let err = parse_analysis(&text).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid analysis result: field `estimatedReadingTimeMinutes` must not be negative"
    );
}

#[test]
fn model_written_sources_are_ignored() {
    let text = BARE.replace(
        "\"estimatedReadingTimeMinutes\": 1",
        "\"estimatedReadingTimeMinutes\": 2.5, \"sources\": [{\"title\": \"x\", \"uri\": \"y\"}]",
    );
    let result = parse_analysis(&text).unwrap();
    assert!(result.sources.is_empty());
    assert_eq!(result.estimated_reading_time_minutes, 2.5);
}

#[test]
fn sources_are_deduplicated_by_uri_first_wins() {
    let sources = collect_sources(&[
        web(Some("A"), Some("a")),
        web(Some("B"), Some("b")),
        web(Some("A again"), Some("a")),
    ]);
    assert_eq!(
        sources,
        vec![
            Source {
                title: "A".to_string(),
                uri: "a".to_string()
            },
            Source {
                title: "B".to_string(),
                uri: "b".to_string()
            },
        ]
    );
}

#[test]
fn sources_default_title_and_skip_empty_references() {
    let sources = collect_sources(&[
        web(None, None),
        web(Some(""), Some("")),
        web(None, Some("https://u")),
        web(Some("Only title"), None),
    ]);
    assert_eq!(
        sources,
        vec![
            Source {
                title: "Source".to_string(),
                uri: "https://u".to_string()
            },
            Source {
                title: "Only title".to_string(),
                uri: String::new()
            },
        ]
    );
}
