use timtro::config::AppConfig;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = AppConfig::from_env();
    let state = timtro::db::init_state(&cfg).await?;
    let _ = timtro::build_rocket(state).launch().await?;
    Ok(())
}
