use kanban_board_lib::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    kanban_board_lib::run(config).await
}
