mod form;
#[cfg(test)]
mod tests;

pub use form::{AuthForm, AuthMode};
