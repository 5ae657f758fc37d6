use super::*;
use pretty_assertions::assert_eq;

#[test]
fn decodes_a_test_code_request() {
    let request = TestCodeRequest::from_json(
        r#"{"originalCode": "def f(a): return a", "optimizedCode": "def g(a): return a", "testCaseInputs": [[1, 2], 3.5]}"#,
    )
    .unwrap();
    assert_eq!(
        request.test_case_inputs,
        vec![
            Datum::List(vec![Datum::Int(1), Datum::Int(2)]),
            Datum::Float(3.5)
        ]
    );
}

#[test]
fn missing_or_empty_fields_are_rejected() {
    assert_eq!(
        TestCodeRequest::from_json(r#"{"optimizedCode": "x", "testCaseInputs": [1]}"#),
        Err(BoundaryError::MissingField("originalCode"))
    );
    assert_eq!(
        TestCodeRequest::from_json(
            r#"{"originalCode": "x", "optimizedCode": "   ", "testCaseInputs": [1]}"#
        ),
        Err(BoundaryError::MissingField("optimizedCode"))
    );
    assert_eq!(
        TestCodeRequest::from_json(
            r#"{"originalCode": "x", "optimizedCode": "y", "testCaseInputs": []}"#
        ),
        Err(BoundaryError::MissingField("testCaseInputs"))
    );
}

#[test]
fn malformed_json_is_rejected() {
    for text in ["", "{", "[1, 2]", r#"{"originalCode": 5}"#] {
        assert!(
            matches!(TestCodeRequest::from_json(text), Err(BoundaryError::Malformed(_))),
            "{text}"
        );
    }
}

#[test]
fn batch_requests_validate_tolerance() {
    let text = r#"{"originalCode": "x", "optimizedCode": "y", "testCases": [[1]], "tolerance": -1.0}"#;
    assert_eq!(
        BatchRequest::from_json(text),
        Err(BoundaryError::InvalidTolerance(-1.0))
    );
    let text = r#"{"originalCode": "x", "optimizedCode": "y", "testCases": []}"#;
    assert_eq!(
        BatchRequest::from_json(text),
        Err(BoundaryError::MissingField("testCases"))
    );
}

#[test]
fn batch_request_becomes_a_job() {
    let text = r#"{"originalCode": "a", "optimizedCode": "b", "testCases": [[1], ["s", null]], "tolerance": 0.01}"#;
    let job = BatchRequest::from_json(text).unwrap().into_job();
    assert_eq!(job.original_code, "a");
    assert_eq!(job.candidate_code, "b");
    assert_eq!(
        job.test_cases,
        vec![
            vec![Datum::Int(1)],
            vec![Datum::Str("s".to_owned()), Datum::None]
        ]
    );
    assert_eq!(job.tolerance, Some(0.01));
}

#[test]
fn responses_render_failures_as_error_text() {
    let original = Execution {
        result: InvocationResult::Value(Datum::Int(10)),
        cost: Cost {
            steps: 12,
            elapsed_us: 40,
        },
    };
    let optimized = Execution {
        result: InvocationResult::Failure(
            "NameError: name 'x' is not defined (line 2)".to_owned(),
        ),
        cost: Cost {
            steps: 2,
            elapsed_us: 9,
        },
    };
    let response = TestCodeResponse::new(&original, &optimized, false);
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({
            "status": true,
            "originalOutput": 10,
            "optimizedOutput": "Error: NameError: name 'x' is not defined (line 2)",
            "outputsMatch": false,
            "originalCost": {"steps": 12, "elapsedUs": 40},
            "optimizedCost": {"steps": 2, "elapsedUs": 9},
        })
    );
}

#[test]
fn rejections_render_as_error_objects() {
    let body = serde_json::to_value(BoundaryError::MissingField("testCases").to_response()).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"error": "'testCases' is required and must not be empty"})
    );
}

#[test]
fn args_must_be_a_json_array() {
    assert_eq!(
        parse_args("[1, \"a\"]"),
        Ok(vec![Datum::Int(1), Datum::Str("a".to_owned())])
    );
    assert_eq!(parse_args("[]"), Ok(vec![]));
    assert!(matches!(parse_args("7"), Err(BoundaryError::Malformed(_))));
}
