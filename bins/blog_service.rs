#[path = "launch.rs"]
mod launch;

fn main() -> std::process::ExitCode {
    launch::launch("blog-service", server::run_blog_service)
}
