/*
 * Responsibility
 * - Public surface of the middleware layer
 * - auth: bearer token filter / http: transport layers shared by every route
 */
pub mod auth;
pub mod http;
