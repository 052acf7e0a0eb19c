mod cli;
mod demo;
mod extract;
mod handlers;
mod infra;
mod routes;
mod server;

use shopledger::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
