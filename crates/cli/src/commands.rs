//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use jobhub_core::{CookieSessionRepository, FileCookieJar, Navigator, Role};
use jobhub_frontend_common::{AppServices, AuthProvider};
use jobhub_http::client::ApiClient;
use jobhub_http::middleware::{GuardDecision, authorize_navigation};
use jobhub_http::types::{SignInRequest, SignUpRequest, VerifyOtpRequest};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Signin {
        #[arg(long)]
        email: String,

        #[arg(long, env = "JOBHUB_PASSWORD", hide_env_values = true)]
        password: String,

        /// JOBSEEKER, EMPLOYER or ADMIN
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },

    /// Create an account; finish with `verify-otp`
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "JOBHUB_PASSWORD", hide_env_values = true)]
        password: String,

        /// JOBSEEKER, EMPLOYER or ADMIN
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },

    /// Confirm a sign-up with the mailed one-time password
    VerifyOtp {
        #[arg(long)]
        email: String,

        #[arg(long)]
        otp: String,
    },

    /// Show the stored session
    Status,

    /// Send an authenticated GET and print the JSON response
    Get {
        /// API path, e.g. /jobseeker/applications
        path: String,
    },

    /// Forget the stored session
    Signout,

    /// Check whether the stored role may open a page
    Route {
        /// Page path, e.g. /employer/job-listing
        path: String,
    },
}

impl Commands {
    pub async fn execute(self, settings: &Settings) -> Result<()> {
        let repository = Arc::new(CookieSessionRepository::new(FileCookieJar::new(
            settings.cookie_jar_path(),
        )));
        let provider = AuthProvider::new(services(settings, repository.clone())?);

        match self {
            Self::Signin {
                email,
                password,
                role,
            } => {
                let session = provider
                    .sign_in(&SignInRequest {
                        email,
                        password,
                        role,
                    })
                    .await?;
                println!("Signed in as {} <{}> ({})", session.name, session.email, session.role);
            }
            Self::Signup {
                name,
                email,
                password,
                role,
            } => {
                let response = provider
                    .sign_up(&SignUpRequest {
                        name,
                        email: email.clone(),
                        password,
                        role,
                    })
                    .await?;
                if !response.message.is_empty() {
                    println!("{}", response.message);
                }
                println!("Check {email} for a code, then run `jobhub verify-otp`");
            }
            Self::VerifyOtp { email, otp } => {
                let session = provider.verify_otp(&VerifyOtpRequest { email, otp }).await?;
                println!("Verified; signed in as {} ({})", session.name, session.role);
            }
            Self::Status => match provider.session() {
                Some(session) => {
                    println!("Signed in as {} <{}>", session.name, session.email);
                    println!("Role: {}", session.role);
                }
                None => println!("Not signed in"),
            },
            Self::Get { path } => {
                let body: Value = provider.services().client().get(&path).await?;
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Self::Signout => {
                provider.sign_out();
                println!("Signed out");
            }
            Self::Route { path } => {
                match authorize_navigation(&path, repository.raw_value().as_deref()) {
                    GuardDecision::Allow => println!("allow {path}"),
                    GuardDecision::Redirect(location) => println!("redirect {path} -> {location}"),
                }
            }
        }

        Ok(())
    }
}

fn services(
    settings: &Settings,
    repository: Arc<CookieSessionRepository<FileCookieJar>>,
) -> Result<AppServices> {
    let mut builder = ApiClient::builder()
        .base_url(&settings.api_url)
        .config(settings.endpoints.clone());
    if let Some(timeout) = settings.request_timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(agent) = &settings.user_agent {
        builder = builder.user_agent(agent);
    }

    AppServices::new(builder, repository, Arc::new(TerminalNavigator))
        .context("Failed to build API client")
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.to_ascii_uppercase().parse()
}

/// A CLI has no page to reload; it reports where the app would go
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, location: &str) {
        info!(location, "Navigation requested");
        eprintln!("-> {location}");
    }
}
