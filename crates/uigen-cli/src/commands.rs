//! Subcommand implementations

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use uigen_session::{
    AnonymousWorkSnapshot, AuthMethod, ChatMessage, FileSystemData, FileWorkStore, LandingKind,
    LocalAuthGateway, LocalDirectory, LogNavigator, ProjectDirectory, SessionConfig,
    SessionReconciler, SessionSource, WorkStore,
};

/// `uigen stash`
pub(crate) fn stash(data_dir: &Path, messages: &[String], files: &[String]) -> Result<ExitCode> {
    let messages = messages
        .iter()
        .enumerate()
        .map(|(i, text)| ChatMessage::user((i + 1).to_string(), text.clone()))
        .collect();

    let mut data = FileSystemData::new();
    for entry in files {
        let (path, content) = parse_file_arg(entry)?;
        data.insert(path, content);
    }

    let snapshot = AnonymousWorkSnapshot::new(messages, data);
    let store = FileWorkStore::in_dir(data_dir);
    store
        .put(snapshot.clone())
        .with_context(|| format!("failed to write {}", store.path().display()))?;

    println!(
        "stashed {} message(s), {} file(s)",
        snapshot.messages.len(),
        snapshot.file_system_data.len()
    );
    Ok(ExitCode::SUCCESS)
}

/// `uigen signin` / `uigen signup`
pub(crate) async fn authenticate(
    data_dir: &Path,
    config: Option<&Path>,
    method: AuthMethod,
    email: &str,
    password: &str,
) -> Result<ExitCode> {
    let config = match config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let auth = Arc::new(LocalAuthGateway::open(data_dir).context("failed to open account book")?);
    let directory = LocalDirectory::open(data_dir)
        .context("failed to open project directory")?
        .with_session(Arc::clone(&auth) as Arc<dyn SessionSource>);
    let reconciler = SessionReconciler::new(
        auth,
        Arc::new(FileWorkStore::in_dir(data_dir)),
        Arc::new(directory),
    )
    .with_config(config)
    .with_navigator(Arc::new(LogNavigator));

    let outcome = match method {
        AuthMethod::SignIn => reconciler.sign_in(email, password).await,
        AuthMethod::SignUp => reconciler.sign_up(email, password).await,
    }
    .with_context(|| format!("{method} failed"))?;

    let Some(landing) = outcome.landing else {
        let reason = outcome.auth.error.as_deref().unwrap_or("unknown error");
        eprintln!("{method} rejected: {reason}");
        return Ok(ExitCode::FAILURE);
    };

    let how = match &landing.kind {
        LandingKind::Adopted {
            store_cleared: true,
            ..
        } => "adopted anonymous work",
        LandingKind::Adopted {
            store_cleared: false,
            ..
        } => "adopted anonymous work (stash not cleared)",
        LandingKind::MostRecent { .. } => "most recent project",
        LandingKind::Bootstrapped { .. } => "new project",
    };
    let project = landing.kind.project();
    println!("{} ({how}: {})", landing.route, project.name);
    Ok(ExitCode::SUCCESS)
}

/// `uigen projects`
pub(crate) async fn projects(data_dir: &Path, owner: Option<&str>) -> Result<ExitCode> {
    let directory = LocalDirectory::open(data_dir).context("failed to open project directory")?;
    let projects = match owner {
        Some(owner) => directory.owned_by(&owner.trim().to_lowercase()),
        None => directory.list_projects().await?,
    };
    if projects.is_empty() {
        println!("no projects");
    }
    for project in projects {
        println!("{}\t{}", project.id, project.name);
    }
    Ok(ExitCode::SUCCESS)
}

/// `uigen tool`
pub(crate) fn tool(name: &str, args: Option<&str>) -> Result<ExitCode> {
    let args: Option<serde_json::Value> = args
        .map(serde_json::from_str)
        .transpose()
        .context("--args is not valid JSON")?;
    let activity = uigen_chat::describe(name, args.as_ref());
    println!("{}", activity.message);
    println!("{}", activity.description);
    Ok(ExitCode::SUCCESS)
}

fn parse_file_arg(entry: &str) -> Result<(String, String)> {
    let Some((path, content)) = entry.split_once('=') else {
        bail!("--file expects path=content, got {entry:?}");
    };
    if path.is_empty() {
        bail!("--file path is empty in {entry:?}");
    }
    Ok((path.to_string(), content.to_string()))
}
