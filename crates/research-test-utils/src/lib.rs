//! Testing utilities for the research workspace
//!
//! Shared fixtures and assertions.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};
use research_input::AnswerValue;
use research_model::{
    AnswerResult, AnswerType, Factory, ResultData, ResultObject, ResultTiming, TaskResult,
};
use research_serialization::parse_timestamp;
use serde_json::{json, Value};

pub const START_DATE: &str = "2017-10-16T22:28:09.000-02:30";
pub const END_DATE: &str = "2017-10-16T22:30:09.000-02:30";

pub fn fixed_date(text: &str) -> DateTime<FixedOffset> {
    parse_timestamp(text).unwrap()
}

pub fn fixed_timing() -> ResultTiming {
    let mut timing = ResultTiming::starting_at(fixed_date(START_DATE));
    timing.finish("fixture", fixed_date(END_DATE)).unwrap();
    timing
}

pub fn step_result(identifier: &str) -> Box<dyn ResultData> {
    Box::new(ResultObject::new(identifier).with_timing(fixed_timing()))
}

pub fn integer_answer(identifier: &str, value: i64) -> Box<dyn ResultData> {
    Box::new(AnswerResult::new(identifier, AnswerType::Integer).with_value(AnswerValue::Integer(value)))
}

pub fn two_step_task_result() -> TaskResult {
    let mut task = TaskResult::new("foo").with_schema_identifier("foo-schema");
    task.append_step_history(step_result("step1"));
    task.append_step_history(step_result("step2"));
    task
}

pub fn sample_task() -> Value {
    json!({
        "identifier": "walkAndSurvey",
        "schemaIdentifier": "walk-survey",
        "versionString": "2",
        "steps": [
            {
                "type": "instruction",
                "identifier": "intro",
                "title": "Welcome",
                "actions": {
                    "skip": {"type": "reminder", "reminderIdentifier": "walkReminder"}
                }
            },
            {
                "type": "question",
                "identifier": "age",
                "title": "How old are you?",
                "answerType": {"type": "integer"},
                "inputOptions": {"type": "integer", "minimumValue": 0, "maximumValue": 120}
            },
            {"type": "countdown", "identifier": "countdown", "duration": 3},
            {"type": "active", "identifier": "walk", "duration": 30, "commands": ["transitionAutomatically"]},
            {"identifier": "completion", "title": "Done"}
        ]
    })
}

/// Decode, encode and decode again, asserting the two decodes agree
pub fn assert_round_trip(factory: &Factory, value: &Value) -> Box<dyn ResultData> {
    let decoded = factory.decode_result(value).unwrap();
    let encoded = factory.encode_result(decoded.as_ref()).unwrap();
    let again = factory.decode_result(&encoded).unwrap();
    assert!(
        decoded.as_ref() == again.as_ref(),
        "round trip changed the result:\n{decoded:?}\n{again:?}"
    );
    decoded
}
