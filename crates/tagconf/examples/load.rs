//! Loads a service configuration from `./config.yaml` and the environment.
//!
//! Run with `RUST_LOG=tagconf=debug` to see where each value comes from, and
//! with `APP_ENV=production` to enable the strict environment audit:
//!
//! ```text
//! APP_ENV=production MYAPP_DB_PASSWORD=123456 cargo run -p tagconf --example load
//! ```

use serde::{Deserialize, Serialize};
use tagconf::{Config, Loader, Locale};
use tracing_subscriber::EnvFilter;
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct DbConfig {
    #[config(default = "localhost")]
    #[validate(length(min = 1))]
    pub host: String,
    #[config(default = "5432")]
    #[validate(range(min = 1024))]
    pub port: u16,
    #[config(env = "strict")]
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, Config)]
pub struct AppConfig {
    #[config(default = "MyService")]
    pub name: String,
    #[config(key = "db")]
    #[validate(nested)]
    pub database: DbConfig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg: AppConfig = Loader::new("myapp")
        .with_dotenv()?
        .with_locale(Some(Locale::Zh))
        .load()?;

    println!(
        "App loaded: {}, DB {}:{}",
        cfg.name, cfg.database.host, cfg.database.port
    );
    Ok(())
}
