//! Random ledger generation for stress testing and benchmarks.

pub mod random_ledger;
