//! End-to-end scenarios.

mod flows;
mod upstream;
