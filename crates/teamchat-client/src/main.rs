use teamchat_client_lib::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    teamchat_client_lib::init_tracing();
    teamchat_client_lib::run(ClientConfig::from_env()).await
}
