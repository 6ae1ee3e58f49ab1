//! Error handling foundation for log-gateway.
//!
//! Each crate defines its own domain error types; this module only provides
//! the `Result` alias over rootcause's `Report` so multi-step flows can carry
//! layered context as failures propagate.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_works() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.expect("should be ok"), 42);
    }
}
