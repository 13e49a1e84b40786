#[tokio::main]
async fn main() -> std::process::ExitCode {
    order_cli::start(std::env::args()).await
}
