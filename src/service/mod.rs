//! Customer service: validation followed by scoped store access.

mod customers;
mod validation;
pub use customers::CustomerService;
pub use validation::RequestValidator;
