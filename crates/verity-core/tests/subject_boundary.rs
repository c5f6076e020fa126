//! Request-boundary validation and the evidence-only boundary.

use verity_core::{
    gather_evidence, AnalysisSubject, InputRejected, SourceKind, SubjectLimits, VerityError,
};

#[test]
fn test_nine_characters_rejected_ten_accepted() {
    let err = AnalysisSubject::new("123456789", None).unwrap_err();
    assert_eq!(err, InputRejected::TooShort { actual: 9, min: 10 });

    let subject = AnalysisSubject::new("1234567890", None).unwrap();
    assert_eq!(subject.char_len(), 10);
}

#[test]
fn test_length_counts_characters_not_bytes() {
    // ten characters, twenty bytes
    let body = "éééééééééé";
    assert_eq!(body.len(), 20);
    assert!(AnalysisSubject::new(body, None).is_ok());
    assert!(AnalysisSubject::new(&body[..18], None).is_err());
}

#[test]
fn test_surrounding_whitespace_does_not_count() {
    let err = AnalysisSubject::new("   short    \n", None).unwrap_err();
    assert_eq!(err, InputRejected::TooShort { actual: 5, min: 10 });
    assert_eq!(
        AnalysisSubject::new("  \t\n ", None).unwrap_err(),
        InputRejected::Empty
    );
}

#[test]
fn test_maximum_length_enforced() {
    let at_limit = "a".repeat(10_000);
    assert!(AnalysisSubject::new(at_limit, None).is_ok());

    let over = "a".repeat(10_001);
    assert_eq!(
        AnalysisSubject::new(over, None).unwrap_err(),
        InputRejected::TooLong {
            actual: 10_001,
            max: 10_000
        }
    );
}

#[test]
fn test_custom_limits() {
    let limits = SubjectLimits {
        min_chars: 3,
        max_chars: 5,
    };
    assert!(AnalysisSubject::with_limits("abc", None, &limits).is_ok());
    assert!(AnalysisSubject::with_limits("abcdef", None, &limits).is_err());
}

#[test]
fn test_rejection_converts_to_domain_error() {
    let err: VerityError = AnalysisSubject::new("tiny", None).unwrap_err().into();
    assert!(matches!(err, VerityError::InputRejected(InputRejected::TooShort { .. })));
}

#[test]
fn test_blank_title_is_dropped_and_url_sets_source() {
    let subject = AnalysisSubject::new("A body that is long enough.", Some("   ".to_string()))
        .unwrap()
        .with_url("https://example.org/a");
    assert_eq!(subject.title(), None);
    assert_eq!(subject.source(), SourceKind::Url);
    assert_eq!(subject.url(), Some("https://example.org/a"));
}

#[tokio::test]
async fn test_evidence_only_query() {
    let snapshot = gather_evidence("election ballots destroyed warehouse", None).await;
    let data = snapshot.data().unwrap();
    assert_eq!(data.search_terms, vec!["election", "ballots", "destroyed", "warehouse"]);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["status"], "available");
    assert_eq!(json["synthetic"], true);
    assert!(json["fact_check_sites"]["snopes"].is_string());
}
