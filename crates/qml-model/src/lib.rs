//! In-memory model of a survey questionnaire: pages, navigation
//! transitions with their reverse source index, and variables.

pub mod error;
pub mod page;
pub mod questionnaire;
pub mod registry;
pub mod transition;
pub mod validate;
pub mod variable;

pub use error::{ModelError, Result};
pub use page::{Header, HeaderKind, Page, Question, Trigger};
pub use questionnaire::{MergePolicy, Questionnaire};
pub use registry::{Insertion, VariableRegistry};
pub use transition::{Source, Transition};
pub use variable::{VarPlace, Variable, VariableType};
