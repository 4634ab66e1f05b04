#![forbid(unsafe_code)]

//! Core: state graph engine, touch contacts, and gesture classification.
//!
//! # Role in the workspace
//! `sortable-core` is the input layer. It knows nothing about lists; it turns
//! one item's raw contact stream into named gestures and provides the generic
//! [`StateGraph`](state_graph::StateGraph) that the list session coordinator
//! in `sortable-list` is also built on.
//!
//! # Primary responsibilities
//! - **StateGraph**: vertices, adjacency, and `(state, event)` handler dispatch.
//! - **GestureClassifier**: tap / hold / hold-release / drag / scroll.
//! - **Configuration**: hold threshold and animation duration, optionally
//!   loaded from TOML or JSON.
//! - **Logging**: tracing targets shared by the workspace.

pub mod config;
pub mod contact;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod state_graph;
