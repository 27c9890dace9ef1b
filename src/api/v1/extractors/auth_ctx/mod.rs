/*!
 * Authenticated principal extractor
 *
 * Responsibility:
 * - Hand the ClaimsPrincipal attached by the access middleware to handlers
 * - Keep axum-specific code in `core`
 */

mod core;

pub use self::core::CurrentPrincipal;
