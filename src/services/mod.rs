pub mod describer;
pub mod gemini;
pub mod ingress;
pub mod pipeline;
pub mod roaster;
pub mod staging;
pub mod turnstile;
