//! Business logic services.
//!
//! Services contain the policy core separated from HTTP handlers: the
//! moderation router, the validation gate, and the vocabulary cache.

/// TTL cache for controlled vocabularies
pub mod domain_cache;
/// Direct-apply vs enqueue policy and approve/deny transitions
pub mod moderation;
/// Field allow-lists and vocabulary validation
pub mod validation;
