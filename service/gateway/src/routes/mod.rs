pub mod execute;
pub mod health;
pub mod sandboxes;
pub mod sessions;
pub mod upload;

/// The full gateway surface, mounted when this process is the orchestrator-facing
/// gateway rather than a workload's own kernel executor.
pub fn gateway_routes() -> Vec<rocket::Route> {
    rocket::routes![
        sandboxes::create_sandbox,
        sandboxes::list_sandboxes,
        sandboxes::get_sandbox,
        sandboxes::delete_sandbox,
        execute::execute,
        upload::upload,
        upload::list_files,
        sessions::initialize,
        health::health,
    ]
}

/// The minimal surface mounted when `IS_SANDBOX` is set: the gateway is running
/// inside a workload, where only the kernel-executor's own wire contract applies.
/// The kernel executor itself is an external collaborator (see §4.5); `/execute`
/// is deliberately not mounted here since implementing it would mean reimplementing
/// that out-of-scope service rather than the gateway.
pub fn sandbox_routes() -> Vec<rocket::Route> {
    rocket::routes![health::health]
}
