//! Test: Sub-pipelines - run-pipeline dispatch, skips and cycles

use crate::helpers::*;
use certflow::action::{ActionArgs, ActionError};
use certflow::core::{Pipeline, RunOutcome};
use std::sync::Arc;

#[tokio::test]
async fn test_sub_pipeline_runs_between_outer_steps() {
    let log = run_log();
    let (mut actions, pipelines) = builtin_store(Arc::new(CountingCertificateService::new()));
    actions.register(RecordingAction::new("before", &log, Behavior::Continue));
    actions.register(RecordingAction::new("inner", &log, Behavior::Continue));
    actions.register(RecordingAction::new("after", &log, Behavior::Continue));

    pipelines
        .store_pipeline(pipeline_from_yaml(
            r#"
name: child
actions:
  - name: inner
"#,
            &actions,
        ))
        .await;

    let outer = pipeline_from_yaml(
        r#"
name: parent
actions:
  - name: before
  - name: run-pipeline
    args:
      pipeline-name: child
  - name: after
"#,
        &actions,
    );

    assert_eq!(outer.run().await.unwrap(), RunOutcome::Completed);
    assert_eq!(entries(&log), vec!["before", "inner", "after"]);
}

#[tokio::test]
async fn test_skip_inside_sub_pipeline_stops_the_caller() {
    let log = run_log();
    let (mut actions, pipelines) = builtin_store(Arc::new(CountingCertificateService::new()));
    actions.register(RecordingAction::new("gate", &log, Behavior::Skip));
    actions.register(RecordingAction::new("after", &log, Behavior::Continue));

    pipelines
        .store_pipeline(pipeline_from_yaml(
            "name: child\nactions:\n  - name: gate\n",
            &actions,
        ))
        .await;

    let outer = pipeline_from_yaml(
        r#"
name: parent
actions:
  - name: run-pipeline
    args:
      pipeline-name: child
  - name: after
"#,
        &actions,
    );

    let outcome = outer.run().await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Skipped {
            action: "run-pipeline".to_string(),
            reason: "gate says stop".to_string(),
        }
    );
    assert_eq!(entries(&log), vec!["gate"]);
}

#[tokio::test]
async fn test_unknown_sub_pipeline() {
    let (actions, _) = builtin_store(Arc::new(CountingCertificateService::new()));
    let outer = pipeline_from_yaml(
        r#"
name: parent
actions:
  - name: run-pipeline
    args:
      pipeline-name: ghost
"#,
        &actions,
    );

    let err = outer.run().await.unwrap_err();
    assert_eq!(err.to_string(), "pipeline not found: ghost");
}

#[tokio::test]
async fn test_cycle_is_reported_not_recursed() {
    let (actions, pipelines) = builtin_store(Arc::new(CountingCertificateService::new()));
    let run_pipeline = actions.get("run-pipeline").unwrap();

    let mut a = Pipeline::new("a");
    a.register_action(
        run_pipeline.clone(),
        [("pipeline-name", "b")].into_iter().collect::<ActionArgs>(),
    );
    let mut b = Pipeline::new("b");
    b.register_action(
        run_pipeline,
        [("pipeline-name", "a")].into_iter().collect::<ActionArgs>(),
    );
    let a = pipelines.store_pipeline(a).await;
    pipelines.store_pipeline(b).await;

    let err = a.run().await.unwrap_err();

    assert!(matches!(err, ActionError::CycleDetected { .. }));
    assert_eq!(
        err.to_string(),
        "cycle detected in pipeline invocation: a -> b -> a"
    );
}

#[tokio::test]
async fn test_same_pipeline_twice_in_sequence_is_not_a_cycle() {
    let log = run_log();
    let (mut actions, pipelines) = builtin_store(Arc::new(CountingCertificateService::new()));
    actions.register(RecordingAction::new("inner", &log, Behavior::Continue));

    pipelines
        .store_pipeline(pipeline_from_yaml(
            "name: child\nactions:\n  - name: inner\n",
            &actions,
        ))
        .await;

    let outer = pipeline_from_yaml(
        r#"
name: parent
actions:
  - name: run-pipeline
    args:
      pipeline-name: child
  - name: run-pipeline
    args:
      pipeline-name: child
"#,
        &actions,
    );

    assert_eq!(outer.run().await.unwrap(), RunOutcome::Completed);
    assert_eq!(entries(&log), vec!["inner", "inner"]);
}
