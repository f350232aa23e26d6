//! Inter-Actief activity CLI
//!
//! Logs in through OAuth (or reuses an access token) and talks to the
//! Inter-Actief API through a single `Connector`.
//!
//! Features:
//! - Interactive OAuth login: open the printed URL, paste the callback URL back
//! - List upcoming activities, show details, enroll and revoke enrollments
//! - Prints the obtained tokens so later runs can skip the login
//!
//! Run with: cargo run -p iaconnector-activity-cli -- list

mod output;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use console::style;
use iaconnector::types::{ApiConfig, DEFAULT_API_BASE_URL, DEFAULT_OAUTH_BASE_URL, OAuthConfig};
use iaconnector::{ApiError, Connector, SignupOption};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "ia-activities")]
#[command(about = "List and join Inter-Actief activities")]
struct Args {
    /// OAuth client id
    #[arg(long, env = "IA_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "IA_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Redirect URI registered for the client
    #[arg(long, env = "IA_REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// Permissions to request, space separated
    #[arg(long, default_value = "read signup")]
    scope: String,

    /// Use an existing access token instead of logging in
    #[arg(long, env = "IA_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// OAuth provider base URL
    #[arg(long, default_value = DEFAULT_OAUTH_BASE_URL)]
    oauth_url: String,

    /// API base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Tag requests as preview traffic
    #[arg(long)]
    preview: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the logged in person
    Whoami,
    /// List activities in the coming days
    List {
        #[arg(long, short = 'd', default_value = "14")]
        days: i64,
    },
    /// Show one activity
    Show { id: i64 },
    /// Enroll for an activity
    Signup {
        id: i64,
        /// Price to agree to
        #[arg(long, default_value = "0")]
        price: f64,
        /// Enrollment option answers as `id=json`, e.g. `3=true`
        #[arg(long = "option", short = 'o')]
        options: Vec<String>,
    },
    /// Revoke an enrollment
    Revoke { id: i64 },
}

/// Ask the user to log in and exchange the callback URL for tokens
async fn login(connector: &mut Connector, args: &Args) -> Result<()> {
    let (Some(client_id), Some(client_secret), Some(redirect_uri)) =
        (&args.client_id, &args.client_secret, &args.redirect_uri)
    else {
        bail!("either --access-token or --client-id, --client-secret and --redirect-uri are required");
    };

    let oauth = connector.init_oauth(
        OAuthConfig::builder()
            .client_id(client_id)
            .client_secret(client_secret.as_str())
            .redirect_uri(redirect_uri)
            .scope(args.scope.split_whitespace().collect::<Vec<_>>())
            .base_url(&args.oauth_url)
            .build(),
    )?;

    let request = oauth.authorization_url()?;
    println!("{}", style("Log in by opening this URL:").bold());
    println!("  {}", style(&request.url).cyan().underlined());
    println!();
    print!("{} ", style("Paste the URL you were redirected to:").bold());
    io::stdout().flush()?;

    let mut callback = String::new();
    io::stdin().lock().read_line(&mut callback)?;

    let tokens = oauth
        .fetch_access_token(callback.trim())
        .await
        .context("logging in failed")?;

    output::print_tokens(&tokens);
    Ok(())
}

fn parse_option(raw: &str) -> Result<SignupOption> {
    let (id, value) = raw
        .split_once('=')
        .with_context(|| format!("option {raw:?} is not of the form id=value"))?;
    let id = id.trim().parse().with_context(|| format!("invalid option id in {raw:?}"))?;
    // Bare words are taken as strings
    let value = serde_json::from_str(value).unwrap_or_else(|_| serde_json::json!(value));
    Ok(SignupOption::new(id, value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut connector = Connector::new();

    let mut api_config = ApiConfig::builder()
        .base_url(args.api_url.as_str())
        .preview(args.preview)
        .build();
    match &args.access_token {
        Some(token) => api_config.access_token = Some(token.clone()),
        None => login(&mut connector, &args).await?,
    }
    let api = connector.init_api(api_config)?;

    let result = match &args.command {
        Command::Whoami => api
            .get_person_details()
            .await
            .map(|person| output::print_record("Person", &person)),
        Command::List { days } => {
            let begin = chrono::Utc::now();
            let end = begin + chrono::Duration::days(*days);
            api.get_activity_stream(begin, end)
                .await
                .map(|activities| output::print_activities(&activities))
        }
        Command::Show { id } => api
            .get_activity_details(*id)
            .await
            .map(|activity| output::print_record("Activity", &activity)),
        Command::Signup { id, price, options } => {
            let options = options
                .iter()
                .map(|raw| parse_option(raw))
                .collect::<Result<Vec<_>>>()?;
            api.activity_signup(*id, *price, &options)
                .await
                .map(|()| println!("{} enrolled for {id}", style("✓").green()))
        }
        Command::Revoke { id } => api
            .revoke_activity_signup(*id)
            .await
            .map(|()| println!("{} enrollment for {id} revoked", style("✓").green())),
    };

    match result {
        Err(ApiError::NotLoggedIn { message }) => {
            bail!("not logged in ({message}); log in again without --access-token")
        }
        Err(ApiError::SignupRejected { message }) => bail!("enrollment rejected: {message}"),
        other => Ok(other?),
    }
}
