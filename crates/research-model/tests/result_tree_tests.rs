use pretty_assertions::assert_eq;
use proptest::prelude::*;
use research_model::{
    AnswerResult, CollectionResult, CountdownStep, Factory, FactoryConfig, QuestionStep, ResultData,
    ResultObject, ResourceType, TaskResult,
};
use research_serialization::{FieldKind, SerializationError};
use research_test_utils::{
    assert_round_trip, integer_answer, sample_task, step_result, two_step_task_result, END_DATE,
    START_DATE,
};
use serde_json::{json, Value};

#[test]
fn test_two_step_task_round_trip() {
    let factory = Factory::shared();
    let task = two_step_task_result();

    let encoded = factory.encode_result(&task).unwrap();
    assert!(encoded.get("asyncResults").is_none());
    assert_eq!(encoded["stepHistory"].as_array().map(Vec::len), Some(2));

    let decoded = factory.decode_result(&encoded).unwrap();
    let decoded = decoded.downcast_ref::<TaskResult>().unwrap();
    let identifiers: Vec<&str> = decoded.step_history().map(|result| result.identifier()).collect();
    assert_eq!(identifiers, vec!["step1", "step2"]);
    assert!(decoded.async_results().is_none());
    assert_eq!(decoded.task_run_uuid(), task.task_run_uuid());
    assert_eq!(decoded, &task);
}

#[test]
fn test_async_results_stay_separate() {
    let factory = Factory::shared();
    let mut task = two_step_task_result();
    task.append_async_result(step_result("motion"));

    let encoded = factory.encode_result(&task).unwrap();
    assert_eq!(encoded["stepHistory"].as_array().map(Vec::len), Some(2));
    assert_eq!(encoded["asyncResults"].as_array().map(Vec::len), Some(1));
    assert_round_trip(factory, &encoded);
}

#[test]
fn test_nested_tree_round_trip() {
    let value = json!({
        "type": "task",
        "identifier": "survey",
        "taskRunUUID": "6f1c9d0e-3f0a-4a6b-9a35-1df0b1b2c3d4",
        "startDate": START_DATE,
        "endDate": END_DATE,
        "stepHistory": [
            {"type": "answer", "identifier": "age", "startDate": START_DATE,
             "answerType": {"type": "integer"}, "value": 42},
            {"type": "collection", "identifier": "form", "startDate": START_DATE, "children": [
                {"type": "answer", "identifier": "colors", "startDate": START_DATE,
                 "answerType": {"type": "array", "baseType": "string", "sequenceSeparator": ","},
                 "value": "red,blue"},
                {"type": "file", "identifier": "photo", "startDate": START_DATE,
                 "relativePath": "photo.jpg", "contentType": "image/jpeg"}
            ]},
            {"type": "section", "identifier": "part2", "startDate": START_DATE, "stepHistory": [
                {"type": "error", "identifier": "motion", "startDate": START_DATE,
                 "errorDescription": "Sensor unavailable", "errorDomain": "Motion", "errorCode": 1}
            ]},
            {"type": "navigation", "identifier": "jump", "startDate": START_DATE, "skipToIdentifier": "end"}
        ],
        "path": [
            {"identifier": "age", "direction": "forward"},
            {"identifier": "form", "direction": "forward"}
        ]
    });

    let decoded = assert_round_trip(Factory::shared(), &value);
    let task = decoded.downcast_ref::<TaskResult>().unwrap();
    let form = task.find_result("form").unwrap().downcast_ref::<CollectionResult>().unwrap();
    assert_eq!(form.children().len(), 2);
    assert_eq!(task.node_path(), vec!["age", "form"]);
}

#[test]
fn test_unresolved_type_names_family() {
    let factory = Factory::try_new(FactoryConfig::new().with_strict_discriminators(true)).unwrap();
    let err = factory
        .decode_result(&json!({"type": "spinner", "identifier": "foo"}))
        .unwrap_err();
    assert_eq!(err, SerializationError::unresolved("results", Some("spinner")));
}

#[test]
fn test_array_mismatch_names_field() {
    let factory = Factory::shared();
    let err = factory
        .decode_result(&json!({"type": "task", "identifier": "foo", "stepHistory": {}}))
        .unwrap_err();
    assert_eq!(err, SerializationError::mismatch("stepHistory", FieldKind::Array));

    let err = factory
        .decode_result(&json!({"type": "collection", "identifier": "form", "children": "q1"}))
        .unwrap_err();
    assert!(matches!(err, SerializationError::FieldTypeMismatch { field, .. } if field == "children"));

    let err = factory
        .decode_task(r#"{"identifier": "survey", "steps": {}}"#, ResourceType::Json)
        .unwrap_err();
    assert!(err.to_string().contains("'steps'"));
}

#[test]
fn test_unknown_type_falls_back_to_base() {
    let result = Factory::shared()
        .decode_result(&json!({"type": "spinner", "identifier": "foo", "startDate": START_DATE}))
        .unwrap();
    assert!(result.downcast_ref::<ResultObject>().is_some());
}

#[test]
fn test_sample_task_run() {
    let factory = Factory::shared();
    let text = serde_json::to_string(&sample_task()).unwrap();
    let task = factory.decode_task(&text, ResourceType::Json).unwrap();
    assert_eq!(task.len(), 5);

    let countdown = task.step("countdown").and_then(|step| step.downcast_ref::<CountdownStep>()).unwrap();
    assert_eq!(countdown.active_step().map(|link| link.identifier.as_str()), Some("walk"));

    let question = task.step("age").and_then(|step| step.downcast_ref::<QuestionStep>()).unwrap();
    let mut run = task.new_result();
    for step in task.steps() {
        let mut result = step.instantiate_result();
        if let Some(answer) = result.downcast_mut::<AnswerResult>() {
            answer.set_value(question.validate_text(Some("42")).unwrap());
        }
        run.append_step_history(result);
    }

    let encoded = factory.encode_result(&run).unwrap();
    assert_eq!(encoded["stepHistory"][1]["value"], json!(42));
    assert_eq!(encoded["assessmentIdentifier"], json!("walkAndSurvey"));
    assert_round_trip(factory, &encoded);
}

#[test]
fn test_duplicate_children_keep_later_node() {
    let value = json!({
        "type": "collection",
        "identifier": "form",
        "startDate": START_DATE,
        "children": [
            {"type": "base", "identifier": "q1", "startDate": START_DATE},
            {"type": "answer", "identifier": "q1", "startDate": START_DATE, "answerType": {"type": "boolean"}, "value": true}
        ]
    });
    let decoded = Factory::shared().decode_result(&value).unwrap();
    let form = decoded.downcast_ref::<CollectionResult>().unwrap();
    assert_eq!(form.children().len(), 1);
    assert!(form.find("q1").unwrap().downcast_ref::<AnswerResult>().is_some());
}

#[test]
fn test_deep_copy_shares_nothing() {
    let mut task = two_step_task_result();
    task.append_async_result(integer_answer("score", 1));
    let copy = task.deep_copy();

    task.append_step_history(step_result("step3"));
    task.remove_async_result("score");

    let copy = copy.downcast_ref::<TaskResult>().unwrap();
    assert_eq!(copy.step_history().count(), 2);
    assert!(copy.async_results().is_some_and(|set| set.contains("score")));
    assert_eq!(copy.task_run_uuid(), task.task_run_uuid());
}

fn identifier() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string)
}

#[derive(Debug, Clone)]
enum Op {
    Insert(String, i64),
    Remove(String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (identifier(), any::<i64>()).prop_map(|(id, value)| Op::Insert(id, value)),
        identifier().prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn prop_collection_matches_ordered_model(ops in prop::collection::vec(op(), 0..40)) {
        let mut collection = CollectionResult::new("form");
        let mut model: Vec<(String, i64)> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(id, value) => {
                    let previous = collection.insert(integer_answer(&id, value));
                    let position = model.iter().position(|(existing, _)| *existing == id);
                    prop_assert_eq!(previous.is_some(), position.is_some());
                    if let Some(position) = position {
                        model.remove(position);
                    }
                    model.push((id, value));
                }
                Op::Remove(id) => {
                    let removed = collection.remove(&id);
                    let position = model.iter().position(|(existing, _)| *existing == id);
                    prop_assert_eq!(removed.is_some(), position.is_some());
                    if let Some(position) = position {
                        model.remove(position);
                    }
                }
            }
        }

        let identifiers: Vec<&str> = collection.children().identifiers().collect();
        let expected: Vec<&str> = model.iter().map(|(id, _)| id.as_str()).collect();
        prop_assert_eq!(identifiers, expected);
    }

    #[test]
    fn prop_collection_encoding_is_stable(values in prop::collection::vec(any::<i64>(), 0..8)) {
        let mut collection = CollectionResult::new("form");
        for (index, value) in values.iter().enumerate() {
            collection.insert(integer_answer(&format!("q{index}"), *value));
        }
        let factory = Factory::shared();
        let encoded = factory.encode_result(&collection).unwrap();
        let decoded = factory.decode_result(&encoded).unwrap();
        prop_assert_eq!(Value::Object(decoded.encode().unwrap()), encoded);
    }
}
