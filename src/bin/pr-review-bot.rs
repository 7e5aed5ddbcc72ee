use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use pr_review_bot::agent::{OpenAiAgent, OpenAiConfig, Toolbox};
use pr_review_bot::config::DEFAULT_BOT_USERNAME;
use pr_review_bot::github::api::{base_github_url, create_github_client, GithubClient};
use pr_review_bot::{create_app, BotConfig, BotContext, RetryPolicy, ServerState, WebhookSecret};

const AGENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(clap::Parser)]
struct Opts {
    /// Token used to access the GitHub API.
    #[arg(long, env = "GITHUB_TOKEN")]
    github_token: String,

    /// Base URL of the GitHub REST API.
    #[arg(long, env = "GITHUB_API_URL", default_value = base_github_url())]
    github_api_url: String,

    /// API key of the reasoning agent.
    #[arg(long, env = "OPENAI_API_KEY")]
    agent_api_key: String,

    /// Base URL of the OpenAI compatible agent API.
    #[arg(long, env = "OPENAI_API_BASE", default_value = "https://api.openai.com/v1")]
    agent_api_base: String,

    /// Model used by the agent.
    #[arg(long, env = "AGENT_MODEL", default_value = "gpt-4o")]
    agent_model: String,

    /// Maximum number of model round trips per webhook.
    #[arg(long, env = "AGENT_MAX_TURNS", default_value_t = 16)]
    agent_max_turns: usize,

    /// Port of the HTTP server.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// GitHub username of the bot, used to detect mentions.
    #[arg(long, env = "BOT_USERNAME", default_value = DEFAULT_BOT_USERNAME)]
    bot_username: String,

    /// Secret used to authenticate webhooks. Webhooks are not authenticated if it is missing.
    #[arg(long, env = "WEBHOOK_SECRET")]
    webhook_secret: Option<String>,

    /// How many files of a single PR can be downloaded concurrently.
    #[arg(long, env = "FILE_FETCH_CONCURRENCY", default_value_t = 8)]
    file_fetch_concurrency: usize,

    /// How many times should failed GitHub read requests be retried.
    #[arg(long, env = "GITHUB_MAX_RETRIES", default_value_t = 0)]
    github_max_retries: u32,

    /// Base delay between GitHub retries, in milliseconds.
    #[arg(long, env = "GITHUB_RETRY_BASE_DELAY_MS", default_value_t = 500)]
    github_retry_base_delay_ms: u64,

    /// Upper bound of a single delay between GitHub retries, in milliseconds.
    #[arg(long, env = "GITHUB_RETRY_MAX_DELAY_MS", default_value_t = 30_000)]
    github_retry_max_delay_ms: u64,
}

async fn server(state: ServerState, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Cannot bind to {addr}"))?;

    tracing::info!("PR review bot listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn try_main(opts: Opts) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Cannot build tokio runtime")?;

    let config = BotConfig {
        bot_name: opts.bot_username.clone(),
        file_fetch_concurrency: opts.file_fetch_concurrency,
        github_retry: RetryPolicy::new(
            opts.github_max_retries,
            Duration::from_millis(opts.github_retry_base_delay_ms),
        )
        .with_max_delay(Duration::from_millis(opts.github_retry_max_delay_ms)),
    };

    runtime.block_on(async move {
        let octocrab = create_github_client(
            &opts.github_api_url,
            &SecretString::new(opts.github_token),
        )?;
        let github = GithubClient::new(octocrab, config.github_retry);
        let toolbox = Toolbox::new(github, config.file_fetch_concurrency);

        let agent = OpenAiAgent::new(
            OpenAiConfig {
                api_base: opts.agent_api_base,
                api_key: SecretString::new(opts.agent_api_key),
                model: opts.agent_model,
                max_turns: opts.agent_max_turns,
                request_timeout: AGENT_REQUEST_TIMEOUT,
            },
            toolbox,
        )?;

        let bot = BotContext::new(Arc::new(agent), config);
        let state = ServerState::new(bot, opts.webhook_secret.map(WebhookSecret::new));
        let res = server(state, opts.port).await;
        tracing::warn!("Server has ended: {res:?}");
        res
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    if let Err(error) = try_main(opts) {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}
