//! Cache Replacement Policy Tests.
//!
//! Each policy implements `ReplacementPolicy` with `instantiate`, `reset`,
//! `touch`, `invalidate` and `select_victim`. Tests drive them directly,
//! without an orchestrator, to pin down victim choice and metadata updates.



/// BRRIP: insertion, promotion, aging and saturation.
pub mod brrip;
