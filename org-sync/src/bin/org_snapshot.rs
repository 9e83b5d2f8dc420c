//! Fetch the organization structure from the backend and write it as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use org_sync::OrgSyncSettings;
use org_sync::domain::ports::{NoopOrganizationCache, OrganizationCache};
use org_sync::domain::{OrganizationStore, RefreshOutcome, SessionSnapshot};
use org_sync::outbound::cache::FileOrganizationCache;
use org_sync::outbound::http::{HttpOrganizationApi, StaticAccessToken};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `org-snapshot` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "org-snapshot",
    about = "Fetch directorates, divisions, departments, users, roles and delegations as JSON",
    version
)]
struct CliArgs {
    /// Write the snapshot to this file instead of standard output.
    #[arg(long = "output", value_name = "path")]
    output: Option<PathBuf>,
    /// User id reported for the session driving the refresh.
    #[arg(long = "session-user", value_name = "id", default_value = "org-snapshot")]
    session_user: String,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = OrgSyncSettings::load_from_iter([OsString::from("org-snapshot")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;

    let tokens = StaticAccessToken::from_option(settings.access_token());
    let api = HttpOrganizationApi::new(
        settings.api_base_url(),
        settings.request_timeout(),
        Arc::new(tokens),
    )
    .map_err(io::Error::other)?;
    let cache: Arc<dyn OrganizationCache> = match settings.cache_dir() {
        Some(dir) => Arc::new(FileOrganizationCache::open(dir).map_err(io::Error::other)?),
        None => Arc::new(NoopOrganizationCache),
    };
    let store = OrganizationStore::new(Arc::new(api), cache);

    let session = SessionSnapshot {
        hydrated: true,
        user_id: Some(args.session_user),
        has_tokens: settings.access_token().is_some(),
    };
    match store.observe_session(session).await {
        RefreshOutcome::Applied => {}
        RefreshOutcome::Skipped => {
            return Err(io::Error::other(
                "no access token configured; set ORG_SYNC_ACCESS_TOKEN",
            ));
        }
        RefreshOutcome::Discarded => {
            return Err(io::Error::other("refresh result was superseded"));
        }
        RefreshOutcome::Failed(error) => {
            return Err(io::Error::other(format!("refresh failed: {error}")));
        }
    }

    let snapshot = store.snapshot();
    let encoded = serde_json::to_vec_pretty(&snapshot)
        .map_err(|error| io::Error::other(format!("encode snapshot: {error}")))?;

    let mut stdout = io::stdout().lock();
    let Some(path) = args.output else {
        stdout.write_all(&encoded)?;
        return writeln!(stdout);
    };
    write_file(&path, &encoded)?;
    writeln!(stdout, "output={}", path.display())?;
    writeln!(stdout, "directorates={}", snapshot.directorates.len())?;
    writeln!(stdout, "divisions={}", snapshot.divisions.len())?;
    writeln!(stdout, "departments={}", snapshot.departments.len())?;
    writeln!(stdout, "users={}", snapshot.users.len())?;
    writeln!(stdout, "roles={}", snapshot.roles.len())?;
    writeln!(stdout, "assignments={}", snapshot.assignments.len())?;

    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::other(format!("output path has no file name: {}", path.display()))
    })?;
    Dir::create_ambient_dir_all(parent, ambient_authority())?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.write(file_name, contents)
}
