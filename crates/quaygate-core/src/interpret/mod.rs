//! Resilient tool-output interpretation.
//!
//! External verification tools drift in output format across versions and
//! platforms. Each concern (unit-test outcome, coverage percentage) is
//! interpreted through an ordered chain of independent fallback strategies;
//! a strategy that cannot apply returns `None` and the driver moves on. The
//! chain always terminates in a parsed, an estimated, or an explicit-failure
//! verdict, never a panic that aborts the suite.

pub mod coverage;
pub mod unit_tests;

pub use coverage::CoverageInterpreter;
pub use unit_tests::UnitTestInterpreter;
