//! Deletes audit entries older than the configured retention period.
//!
//! Meant to run from cron; a retention of zero days keeps everything.

use chrono::Utc;
use dotenvy::dotenv;

use agent_crm::db::establish_connection_pool;
use agent_crm::models::config::ServerConfig;
use agent_crm::repository::DieselRepository;
use agent_crm::services::audit::purge_expired;

fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    match purge_expired(&repo, Utc::now().naive_utc()) {
        Ok(purged) => log::info!("Audit purge finished, {purged} entries removed"),
        Err(err) => {
            log::error!("Audit purge failed: {err}");
            std::process::exit(1);
        }
    }
}
