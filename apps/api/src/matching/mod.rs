// Job matching: concurrent skill annotation of the stored jobs, then Jaccard
// scoring against the stored résumé.

pub mod dispatcher;
pub mod handlers;
pub mod scoring;
