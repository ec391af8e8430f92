// Signature capture: the free-hand pad, replay of recorded pointer sessions
// and the HTTP endpoints that turn a session into a stored drawn signature.

pub mod handlers;
pub mod pad;
pub mod replay;
