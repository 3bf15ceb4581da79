pub mod error;
pub mod http;
pub mod password;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;
