//! Scenario-based tests for certflow

mod helpers;

mod failure_handling;
mod renewal;
mod sub_pipeline;
