//! Core data models for items and research results.

mod item;
mod research;

pub use item::{Item, Paper, Post, Product, Repository, SourceType};
pub use research::{
    AggregateError, AggregateResult, AggregateStatus, FailureKind, ResearchConfig, SourceFailure,
    SourceResult,
};
