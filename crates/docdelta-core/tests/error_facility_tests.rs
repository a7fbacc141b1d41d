use docdelta_core::errors::{CompareError, ExError, ExErrorKind};
use docdelta_core::model::{DocumentDescriptor, DocumentSide, PageSelection};
use docdelta_core::{ComparisonDocuments, ComparisonOperation, TextComparisonOptions};

#[test]
fn test_page_selection_error_carries_side() {
    let err = CompareError::InvalidPageSelection {
        side: DocumentSide::Changed,
        reason: "range [4, 2] is reversed".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidPageSelection);
    assert_eq!(ex_err.code(), "ERR_INVALID_PAGE_SELECTION");
    assert_eq!(ex_err.side(), Some(DocumentSide::Changed));
    assert!(ex_err.kind().is_input_error());
}

#[test]
fn test_layout_error_carries_page() {
    let err = CompareError::InvalidPageLayout {
        page_index: 3,
        reason: "blocks overlap".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidPageLayout);
    assert_eq!(ex_err.page_index(), Some(3));
    assert!(ex_err.kind().is_defect());
    assert!(ex_err.message().contains("blocks overlap"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::DocumentUnavailable, "ERR_DOCUMENT_UNAVAILABLE"),
        (ExErrorKind::WrongPassword, "ERR_WRONG_PASSWORD"),
        (ExErrorKind::OutOfBounds, "ERR_OUT_OF_BOUNDS"),
        (ExErrorKind::InconsistentAlignment, "ERR_INCONSISTENT_ALIGNMENT"),
        (ExErrorKind::MalformedResponse, "ERR_MALFORMED_RESPONSE"),
        (ExErrorKind::Timeout, "ERR_TIMEOUT"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_input_errors_raised_before_io() {
    let documents = ComparisonDocuments::new(
        DocumentDescriptor::from_bytes(b"a".to_vec()),
        DocumentDescriptor::from_bytes(Vec::new()),
    );
    assert!(matches!(
        documents.validate(),
        Err(CompareError::EmptyDescriptor {
            side: DocumentSide::Changed
        })
    ));

    let reversed = ComparisonDocuments::new(
        DocumentDescriptor::from_bytes(b"a".to_vec()).with_pages(vec![PageSelection::Range([4, 2])]),
        DocumentDescriptor::from_bytes(b"b".to_vec()),
    );
    assert!(matches!(
        reversed.validate(),
        Err(CompareError::InvalidPageSelection {
            side: DocumentSide::Original,
            ..
        })
    ));

    let tag_without_categories =
        ComparisonOperation::tag(TextComparisonOptions::default(), Vec::<String>::new());
    let ex_err: ExError = tag_without_categories.validate().unwrap_err().into();
    assert_eq!(ex_err.kind(), ExErrorKind::UnsupportedOperation);
}

#[test]
fn test_source_chain() {
    let err = ExError::new(ExErrorKind::DocumentUnavailable)
        .with_side(DocumentSide::Original)
        .with_source(ExError::new(ExErrorKind::CorruptDocument).with_message("bad xref"));

    let source = err.source_error().expect("has source");
    assert_eq!(source.kind(), ExErrorKind::CorruptDocument);
    assert!(std::error::Error::source(&err).is_some());
}
