use habit_app::report::run;
use habit_service::ServiceConfig;

fn main() {
    tracing_subscriber::fmt::init();
    let config = ServiceConfig::from_env().unwrap_or_default();
    if let Err(err) = run(config) {
        eprintln!("Failed to build habit report: {err:#}");
    }
}
