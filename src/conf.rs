//! Site settings
//!
//! Re-exports appflow-conf: layered defaults, `appflow.toml` and `APPFLOW_*`
//! environment variables.

pub use appflow_conf::*;
