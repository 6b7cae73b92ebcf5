//! Data models for the visitor log

pub mod visitor;

// Re-export commonly used types
pub use visitor::{
    CheckoutOutcome, CreateVisitor, Visitor, VisitorListing, VisitorQuery, VisitorStatus,
    VisitorSummary, VisitorView,
};
