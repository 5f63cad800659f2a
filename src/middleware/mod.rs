/*
 * Responsibility
 * - Public surface of the middleware layers
 * - http (request id / trace / limits), cors, security headers, access-token auth
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
