extern crate jemallocator;

// jemalloc handles the gateway's allocation pattern far better than glibc's
// allocator does here: many short-lived per-request allocations (registry
// entries, JSON envelopes, streamed chunks) punctuated by bursts of concurrent
// sandbox provisioning. glibc fragments badly under that churn; jemalloc settles
// back down to a small resident set once a burst subsides.
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

use gateway::config::Config;
use gateway::state::Gateway;
use gateway::{routes, sandbox};

#[tokio::main]
async fn main() {
    std::env::set_var("RUST_LOG_STYLE", "always");
    env_logger::init();

    let config = Config::from_env();
    let gateway = Gateway::new(config.clone());

    if !config.is_sandbox {
        let registry = gateway.registry.clone();
        let driver = gateway.driver;
        let check_interval = config.check_interval;
        let idle_timeout = config.idle_timeout;
        tokio::spawn(async move {
            sandbox::reaper::run(registry, driver, check_interval, idle_timeout).await;
        });
    }

    let mut rocket_config = rocket::Config::default();
    // Default binds to 127.0.0.1, which is unreachable from outside a container.
    rocket_config.address = "0.0.0.0".parse().unwrap();

    let routes = if config.is_sandbox {
        routes::sandbox_routes()
    } else {
        routes::gateway_routes()
    };

    rocket::custom(rocket_config)
        .manage(gateway)
        .mount("/", routes)
        .launch()
        .await
        .unwrap();
}
