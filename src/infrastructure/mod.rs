pub mod ai;
pub mod storage;
pub mod turnstile;
