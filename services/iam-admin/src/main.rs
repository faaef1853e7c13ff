//! IAM Admin Service 入口

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    admin_bootstrap::run("config", iam_admin::build).await
}
