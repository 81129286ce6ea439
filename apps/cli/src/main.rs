use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{
    dashboard::load_dashboard,
    navigation::{can_access, Permissions, Section},
    services::{ReportKind, Resource, ResourceService},
    ClientError, RentManagerClient, Session, Settings, TransitionService,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ContractId, InvoiceId, PropertyId, UserId},
    protocol::EntityKind,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod output;

use output::Tabular;

const PASSWORD_ENV: &str = "RENTMANAGER_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "rentctl", version, about = "Command-line client for the RentManager backend")]
struct Cli {
    /// TOML settings file; defaults to ./rentmanager.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides `api_base_url` from the settings.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to $RENTMANAGER_PASSWORD.
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    Properties {
        #[command(subcommand)]
        action: CrudAction,
    },
    Contracts {
        #[command(subcommand)]
        action: CrudAction,
    },
    Invoices {
        #[command(subcommand)]
        action: CrudAction,
    },
    Payments {
        #[command(subcommand)]
        action: CrudAction,
    },
    Users {
        #[command(subcommand)]
        action: CrudAction,
    },
    /// Role overview for the signed-in user.
    Dashboard,
    Transition {
        #[command(subcommand)]
        action: TransitionAction,
    },
    Report {
        /// File or directory to write the report to.
        #[arg(long, default_value = ".")]
        out: PathBuf,
        #[command(subcommand)]
        kind: ReportTarget,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum CrudAction {
    List,
    Show {
        id: i64,
    },
    Create {
        /// JSON payload file, or `-` for stdin.
        #[arg(long)]
        data: PathBuf,
    },
    Update {
        id: i64,
        /// JSON payload file with the fields to change, or `-` for stdin.
        #[arg(long)]
        data: PathBuf,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum TransitionAction {
    Analyze {
        kind: String,
        id: i64,
        target: String,
        #[arg(long)]
        reason: Option<String>,
    },
    Execute {
        kind: String,
        id: i64,
        target: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// States a record in `current` may be moved to.
    Targets {
        kind: String,
        current: String,
    },
}

#[derive(Subcommand, Debug)]
enum ReportTarget {
    Property { id: i64 },
    Contract { id: i64 },
    Invoice { id: i64 },
    Tenant { id: i64 },
    Financial {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

impl ReportTarget {
    fn kind(&self) -> ReportKind {
        match *self {
            ReportTarget::Property { id } => ReportKind::Property(PropertyId(id)),
            ReportTarget::Contract { id } => ReportKind::Contract(ContractId(id)),
            ReportTarget::Invoice { id } => ReportKind::Invoice(InvoiceId(id)),
            ReportTarget::Tenant { id } => ReportKind::TenantStatement(UserId(id)),
            ReportTarget::Financial { from, to } => ReportKind::Financial { from, to },
        }
    }
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective settings as TOML.
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    if let Some(url) = &cli.api_url {
        settings = settings.with_api_base_url(url)?;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = RentManagerClient::with_file_session(&settings)?;
    debug!(api = client.base_url(), "client ready");
    let out = Printer { json: cli.json };

    let attempts_login = matches!(cli.command, Command::Login { .. });
    let result = run(cli.command, &client, &settings, &out).await;
    if let Err(err) = &result {
        if !attempts_login && rejected_session(err) {
            if let Err(clear) = client.auth.invalidate().await {
                warn!("could not clear rejected session: {clear}");
            }
        }
    }
    result
}

async fn run(
    command: Command,
    client: &RentManagerClient,
    settings: &Settings,
    out: &Printer,
) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => std::env::var(PASSWORD_ENV)
                    .map_err(|_| anyhow!("pass --password or set {PASSWORD_ENV}"))?,
            };
            let session = client.auth.login(&email, &password).await?;
            out.session(&session)?;
        }
        Command::Logout => {
            client.auth.logout().await?;
            out.message("signed out");
        }
        Command::Whoami => {
            let session = signed_in(client).await?;
            out.session(&session)?;
        }
        Command::Properties { action } => {
            let session = signed_in(client).await?;
            crud(&client.properties, Section::Properties, &session, action, out).await?;
        }
        Command::Contracts { action } => {
            let session = signed_in(client).await?;
            crud(&client.contracts, Section::Contracts, &session, action, out).await?;
        }
        Command::Invoices { action } => {
            let session = signed_in(client).await?;
            crud(&client.invoices, Section::Invoices, &session, action, out).await?;
        }
        Command::Payments { action } => {
            let session = signed_in(client).await?;
            crud(&client.payments, Section::Payments, &session, action, out).await?;
        }
        Command::Users { action } => {
            let session = signed_in(client).await?;
            crud(&client.users, Section::Users, &session, action, out).await?;
        }
        Command::Dashboard => {
            let session = signed_in(client).await?;
            let dashboard = load_dashboard(client, &session, Local::now().date_naive()).await?;
            if out.json {
                out.print_json(&dashboard)?;
            } else {
                print!("{}", output::dashboard(&dashboard));
            }
        }
        Command::Transition { action } => transition(client, action, out).await?,
        Command::Report { out: target, kind } => {
            let session = signed_in(client).await?;
            if !Permissions::for_role(session.role()).can_download_reports() {
                bail!(refused(&session, Section::Reports));
            }
            let document = client.reports.download(kind.kind()).await?;
            let path = document.save_to(&target).await?;
            out.message(&format!(
                "saved {} ({} bytes) to {}",
                document.filename,
                document.bytes.len(),
                path.display()
            ));
        }
        Command::Config {
            action: ConfigAction::Show,
        } => {
            if out.json {
                out.print_json(settings)?;
            } else {
                print!("{}", settings.to_toml()?);
            }
        }
    }

    Ok(())
}

/// The backend refused the stored token; keeping it would only replay the 401.
fn rejected_session(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ClientError>(),
        Some(ClientError::Unauthorized(_))
    )
}

async fn signed_in(client: &RentManagerClient) -> Result<Session> {
    client
        .auth
        .restore()
        .await?
        .ok_or_else(|| anyhow!("not signed in; run `rentctl login` first"))
}

fn refused(session: &Session, section: Section) -> String {
    format!(
        "the {} role has no access to {}",
        session.role().label(),
        section.label().to_lowercase()
    )
}

async fn crud<R>(
    service: &ResourceService<R>,
    section: Section,
    session: &Session,
    action: CrudAction,
    out: &Printer,
) -> Result<()>
where
    R: Resource,
    R::Entity: Serialize + Tabular,
    R::New: DeserializeOwned,
    R::Update: DeserializeOwned,
{
    if !can_access(session.role(), section) {
        bail!(refused(session, section));
    }
    let allowed = Permissions::for_role(session.role()).actions(section);
    let denied = |verb: &str| {
        anyhow!(
            "the {} role cannot {verb} {}",
            session.role().label(),
            section.label().to_lowercase()
        )
    };

    match action {
        CrudAction::List => {
            let items = service.list().await?;
            out.items(&items)?;
        }
        CrudAction::Show { id } => {
            let item = service.get(R::id(id)).await?;
            out.items(std::slice::from_ref(&item))?;
        }
        CrudAction::Create { data } => {
            if !allowed.create {
                return Err(denied("create"));
            }
            let new: R::New = read_payload(&data)?;
            let created = service.create(&new).await?;
            out.items(std::slice::from_ref(&created))?;
        }
        CrudAction::Update { id, data } => {
            if !allowed.edit {
                return Err(denied("edit"));
            }
            let patch: R::Update = read_payload(&data)?;
            let updated = service.update(R::id(id), &patch).await?;
            out.items(std::slice::from_ref(&updated))?;
        }
        CrudAction::Delete { id } => {
            if !allowed.delete {
                return Err(denied("delete"));
            }
            service.delete(R::id(id)).await?;
            out.message(&format!("deleted {} {id}", section.label().to_lowercase()));
        }
    }
    Ok(())
}

async fn transition(
    client: &RentManagerClient,
    action: TransitionAction,
    out: &Printer,
) -> Result<()> {
    if let TransitionAction::Targets { kind, current } = &action {
        let kind = parse_kind(kind)?;
        let targets = TransitionService::candidate_targets(kind, current);
        if out.json {
            out.print_json(&targets)?;
        } else {
            println!("{}", targets.join("\n"));
        }
        return Ok(());
    }

    let session = signed_in(client).await?;
    let (execute, kind, id, target, reason) = match action {
        TransitionAction::Analyze {
            kind,
            id,
            target,
            reason,
        } => (false, kind, id, target, reason),
        TransitionAction::Execute {
            kind,
            id,
            target,
            reason,
        } => (true, kind, id, target, reason),
        TransitionAction::Targets { .. } => return Ok(()),
    };
    let kind = parse_kind(&kind)?;
    let section = section_for_kind(kind);
    if !Permissions::for_role(session.role()).actions(section).transition {
        bail!(
            "the {} role cannot change the state of {}",
            session.role().label(),
            section.label().to_lowercase()
        );
    }

    if execute {
        let outcome = client
            .transitions
            .execute(kind, id, &target, reason.as_deref())
            .await?;
        if out.json {
            out.print_json(&outcome)?;
        } else if outcome.exito {
            println!(
                "{} {id}: {} -> {}",
                kind.resource(),
                outcome.estado_anterior,
                outcome.estado_nuevo
            );
        } else {
            bail!(
                "transition not applied: {}",
                outcome.mensaje.as_deref().unwrap_or("no reason given")
            );
        }
    } else {
        let analysis = client
            .transitions
            .analyze(kind, id, &target, reason.as_deref())
            .await?;
        if out.json {
            out.print_json(&analysis)?;
        } else {
            let verdict = if analysis.permitida { "allowed" } else { "not allowed" };
            println!(
                "{} {id}: {} -> {} {verdict}",
                kind.resource(),
                analysis.estado_actual,
                analysis.estado_destino
            );
            for reason in &analysis.motivos {
                println!("  reason: {reason}");
            }
            for warning in &analysis.advertencias {
                println!("  warning: {warning}");
            }
        }
    }
    Ok(())
}

fn parse_kind(raw: &str) -> Result<EntityKind> {
    EntityKind::parse(raw).ok_or_else(|| {
        anyhow!("unknown record kind `{raw}`; expected properties, contracts, invoices or payments")
    })
}

fn section_for_kind(kind: EntityKind) -> Section {
    match kind {
        EntityKind::Propiedades => Section::Properties,
        EntityKind::Contratos => Section::Contracts,
        EntityKind::Facturas => Section::Invoices,
        EntityKind::Pagos => Section::Payments,
    }
}

fn read_payload<T: DeserializeOwned>(source: &Path) -> Result<T> {
    let raw = if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("reading payload from {}", source.display()))?
    };
    serde_json::from_str(&raw).context("payload is not valid JSON for this record")
}

struct Printer {
    json: bool,
}

impl Printer {
    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn items<T: Serialize + Tabular>(&self, items: &[T]) -> Result<()> {
        if self.json {
            self.print_json(items)
        } else {
            print!("{}", output::table(items));
            Ok(())
        }
    }

    fn session(&self, session: &Session) -> Result<()> {
        if self.json {
            return self.print_json(&session.user);
        }
        println!(
            "{} <{}> ({}, user {})",
            session.user.display_name(),
            session.user.email,
            session.role().label(),
            session.user.id
        );
        if let Some(expiry) = session.token_expiry() {
            println!("token expires {}", expiry.to_rfc3339());
        }
        Ok(())
    }

    fn message(&self, text: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "message": text }));
        } else {
            println!("{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_crud_and_report_commands() {
        let cli = Cli::parse_from(["rentctl", "--json", "invoices", "update", "7", "--data", "-"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Invoices {
                action: CrudAction::Update { id: 7, .. }
            }
        ));

        let cli = Cli::parse_from([
            "rentctl",
            "report",
            "--out",
            "/tmp/out",
            "financial",
            "--from",
            "2024-01-01",
            "--to",
            "2024-03-31",
        ]);
        let Command::Report { kind, .. } = cli.command else {
            panic!("expected report command");
        };
        assert!(matches!(kind.kind(), ReportKind::Financial { .. }));
    }

    #[test]
    fn kinds_map_to_their_sections() {
        assert_eq!(section_for_kind(parse_kind("facturas").unwrap()), Section::Invoices);
        assert!(parse_kind("vehicles").is_err());
    }

    #[test]
    fn only_unauthorized_answers_drop_the_session() {
        let refused = anyhow::Error::new(ClientError::Unauthorized("revoked".into()))
            .context("listing properties");
        assert!(rejected_session(&refused));
        assert!(!rejected_session(&anyhow::Error::new(ClientError::Forbidden(
            "sin permisos".into()
        ))));
        assert!(!rejected_session(&anyhow!("not signed in")));
    }

    #[test]
    fn reads_payload_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.json");
        std::fs::write(&path, r#"{"estado": "pagada"}"#).unwrap();
        let value: serde_json::Value = read_payload(&path).unwrap();
        assert_eq!(value["estado"], "pagada");
        assert!(read_payload::<serde_json::Value>(&dir.path().join("missing.json")).is_err());
    }
}
