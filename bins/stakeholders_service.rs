#[path = "launch.rs"]
mod launch;

fn main() -> std::process::ExitCode {
    launch::launch("stakeholders-service", server::run_stakeholders_service)
}
