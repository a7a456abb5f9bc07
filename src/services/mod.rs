/*
 * Responsibility
 * - 認証まわりの collaborator (manager / entry point / context)
 */
pub mod auth;
