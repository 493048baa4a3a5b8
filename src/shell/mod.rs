// Composition root for the attendance bounded context.
//
// Responsibilities
// - Read config from environment.
// - Instantiate concrete infrastructure implementations and wire them into
//   the service.
// - Spawn the background reconcile task.

pub mod http;
pub mod state;
