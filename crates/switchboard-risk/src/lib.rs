//! Deterministic risk scoring for Switchboard plans.
//!
//! Scoring is a pure function of the structured step data: the same plan
//! always produces the same score, regardless of when or where it is
//! evaluated. Each step gets a base score for its type plus rule-based
//! increments, clamped to 0..=100; a plan aggregates its steps into a
//! single score and a [`RiskSummary`] for the approval surface.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod flags;
mod score;

pub use score::{classify, score_plan, score_step, RiskClass, RiskSummary, StepScore};
