//! Unit tests for background task tracking.

mod support;
