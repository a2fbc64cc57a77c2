pub mod cli;
pub mod error;
pub mod form;
pub mod pipeline;
pub mod trace;
pub mod transport;

pub use error::{FormError, TransportError};
pub use form::{record::FormRecord, schema::FormSchema, store::SubmissionState};
pub use pipeline::pipeline::{FormPipeline, SubmitOutcome};
