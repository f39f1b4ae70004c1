//! Analysis on top of the questionnaire model: condition translation and
//! navigation graph queries.

pub mod condition;
pub mod flow;
pub mod summary;

pub use condition::translate;
pub use flow::{
    FlowAnalysis, FlowEdge, NavigationGraph, PageGraph, PageNode, PagePositions, PositionBasis, SortKey,
    TransitionFilter,
};
pub use summary::QuestionnaireSummary;
