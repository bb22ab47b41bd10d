//! Contact-lead intake: field validators, form state, the submission gate,
//! the transport contract and the form controller tying them together.

pub mod form;
pub mod gate;
pub mod intake;
pub mod transport;
pub mod validate;

pub use form::{Field, FormErrors, FormSnapshot, FormState};
pub use gate::{LeadSubmission, evaluate};
pub use intake::{ContactForm, FormView, Notice, NoticeLevel, Phase, SubmitOutcome};
pub use transport::{LeadTransport, TransportError};
pub use validate::{ErrorKind, FieldError};
