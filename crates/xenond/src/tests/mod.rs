//! Test suites for the playground daemon.

mod support;
