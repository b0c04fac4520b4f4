//! The pre-dispatch filter pipeline (spec.md §4: "filters run in order
//! (CORS → Auth → AuthZ → Cache → WebSub → Path/Extension) and either
//! short-circuit with a response or hand off to the method handler").
//!
//! Cache-Control and WebSub hub annotation only apply to *successful
//! read* responses, which are not known until the method handler runs;
//! they are implemented as response post-processors invoked from
//! [`crate::service`] rather than as request-side short-circuits, while
//! still occupying their documented position in the pipeline's ordering.

pub mod auth;
pub mod authz;
pub mod cache;
pub mod cors;
pub mod path_ext;
pub mod websub;
