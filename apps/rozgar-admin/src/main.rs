use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

use rozgar_client::{ApiClient, ApiError, AuditLogQuery, ConnectionManager, SubadminFilter, UserFilter};
use rozgar_core::{
    authorize, config, Access, Role, Session, SessionStore, Settings, ANY_STAFF,
};
use rozgar_events::{Bridge, Notifier, RefreshHooks};
use rozgar_protocol::{Job, Scheme, StaffUser, SubadminUpsert};

#[derive(Parser)]
#[command(
    name = "rozgar-admin",
    version,
    about = "Staff console for the Rozgar jobs/schemes listing service"
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Backend base URL (e.g. https://api.example.com/api)
    #[arg(long, global = true)]
    base: Option<String>,
    /// Realtime endpoint; defaults to the base URL without its /api suffix
    #[arg(long, global = true)]
    events_url: Option<String>,
    /// Directory holding the persisted session
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// TOML config file; ROZGAR_CONFIG is honored as well
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

impl ConnectionArgs {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            base_url: self.base.clone(),
            events_url: self.events_url.clone(),
            state_dir: self.state_dir.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Send an OTP to a staff mobile number and establish a session
    Login(LoginArgs),
    /// End the session (backend notify is best-effort; local purge always)
    Logout,
    /// Show the authenticated principal
    Whoami(OutputArgs),
    /// Aggregate listing/user counters
    Stats(OutputArgs),
    /// Jobs management
    Jobs {
        #[command(subcommand)]
        cmd: JobsCmd,
    },
    /// Schemes management
    Schemes {
        #[command(subcommand)]
        cmd: SchemesCmd,
    },
    /// End-user accounts
    Users {
        #[command(subcommand)]
        cmd: UsersCmd,
    },
    /// Subadmin onboarding and lifecycle
    Subadmins {
        #[command(subcommand)]
        cmd: SubadminsCmd,
    },
    /// Append-only audit trail
    Audit {
        #[command(subcommand)]
        cmd: AuditCmd,
    },
    /// Live dashboard: realtime events drive refetches until ctrl-c
    Watch,
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Args)]
struct LoginArgs {
    /// 10-digit staff mobile number
    #[arg(long)]
    mobile: String,
    /// OTP; prompted for when omitted
    #[arg(long)]
    otp: Option<String>,
}

#[derive(Args)]
struct OutputArgs {
    /// Print full JSON instead of a summary
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum JobsCmd {
    /// List jobs
    List {
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    /// Fetch one job
    Get {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Create a job from a JSON file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update a job from a JSON file
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a job
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SchemesCmd {
    /// List schemes
    List {
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long)]
        json: bool,
    },
    /// Fetch one scheme
    Get {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Create a scheme from a JSON file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Update a scheme from a JSON file
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete a scheme
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UsersCmd {
    /// List end users, optionally filtered
    List {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SubadminsCmd {
    /// List subadmins, optionally filtered
    List {
        /// PENDING | VERIFIED | REJECTED
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        /// Match against name, mobile or email
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Create an onboarding request
    Create {
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        /// Repeatable, e.g. --permission CREATE_JOBS
        #[arg(long = "permission")]
        permissions: Vec<String>,
        /// Repeatable region code; none means all states
        #[arg(long = "state")]
        states: Vec<String>,
    },
    /// Update profile, permissions and assigned states
    Update {
        id: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "permission")]
        permissions: Vec<String>,
        #[arg(long = "state")]
        states: Vec<String>,
    },
    /// Approve a pending subadmin
    Verify {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Reject a pending subadmin
    Reject {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Re-enable a deactivated subadmin
    Activate { id: String },
    /// Disable a subadmin
    Deactivate { id: String },
}

#[derive(Subcommand)]
enum AuditCmd {
    /// List audit rows with optional filters
    List {
        /// e.g. SUBADMIN_VERIFIED
        #[arg(long)]
        action: Option<String>,
        /// SUCCESS | FAILED
        #[arg(long)]
        status: Option<String>,
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// End date, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 50)]
        limit: u64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the JSON schema for the TOML config file
    Schema,
    /// Print the resolved settings
    Show,
}

struct App {
    settings: Settings,
    store: SessionStore,
    client: ApiClient,
}

impl App {
    fn new(settings: Settings) -> Result<Self> {
        let client = ApiClient::new(settings.base_url.clone())
            .map_err(|err| anyhow::anyhow!("building HTTP client: {err}"))?;
        let store = SessionStore::new(&settings.state_dir);
        Ok(Self {
            settings,
            store,
            client,
        })
    }

    fn restore(&mut self) {
        if let Some(session) = self.store.restore_session() {
            self.client.set_token(Some(session.token));
        }
    }

    /// Gate a protected screen. Prints nothing on Allow; the two redirect
    /// outcomes become errors naming the navigation target.
    fn require(&self, required: &[Role]) -> Result<Session> {
        match authorize(self.store.session(), required) {
            Access::Allow => Ok(self
                .store
                .session()
                .cloned()
                .context("session vanished after authorization")?),
            Access::RedirectLogin => {
                bail!("Not logged in. Run `rozgar-admin login` first.")
            }
            Access::RedirectHome(role) => bail!(
                "Access denied for role {}. Go to the {} screen.",
                role.as_str(),
                role.home_screen()
            ),
        }
    }

    /// Apply the one cross-cutting error policy: 401 purges the session
    /// and routes back to login. Everything else leaves state untouched.
    fn check<T>(&mut self, result: std::result::Result<T, ApiError>) -> Result<T> {
        result.map_err(|err| {
            if matches!(err, ApiError::AuthorizationDenied) {
                self.store.end_session();
                self.client.set_token(None);
            }
            anyhow::anyhow!(err.user_message())
        })
    }
}

fn valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.chars().all(|c| c.is_ascii_digit())
}

fn valid_otp(otp: &str) -> bool {
    (4..=6).contains(&otp.len()) && otp.chars().all(|c| c.is_ascii_digit())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(prompt: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{prompt} [y/N] "))?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json_file(path: &PathBuf) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.connection.overrides())?;

    let mut app = App::new(settings.clone())?;
    app.restore();

    match cli.command {
        Commands::Login(args) => cmd_login(&mut app, args).await,
        Commands::Logout => cmd_logout(&mut app).await,
        Commands::Whoami(out) => cmd_whoami(&app, out),
        Commands::Stats(out) => cmd_stats(&mut app, out).await,
        Commands::Jobs { cmd } => cmd_jobs(&mut app, cmd).await,
        Commands::Schemes { cmd } => cmd_schemes(&mut app, cmd).await,
        Commands::Users { cmd } => cmd_users(&mut app, cmd).await,
        Commands::Subadmins { cmd } => cmd_subadmins(&mut app, cmd).await,
        Commands::Audit { cmd } => cmd_audit(&mut app, cmd).await,
        Commands::Watch => cmd_watch(&mut app).await,
        Commands::Config { cmd } => cmd_config(&settings, cmd),
    }
}

fn cmd_config(settings: &Settings, cmd: ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&config::config_schema_json())?
            );
        }
        ConfigCmd::Show => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "base_url": &settings.base_url,
                    "events_url": &settings.events_url,
                    "state_dir": &settings.state_dir,
                }))?
            );
        }
    }
    Ok(())
}

async fn cmd_login(app: &mut App, args: LoginArgs) -> Result<()> {
    if !valid_mobile(&args.mobile) {
        bail!("Please enter a valid 10-digit mobile number");
    }
    let sent = app.client.send_otp(&args.mobile, "LOGIN").await;
    app.check(sent)?;
    println!("OTP sent to {}", args.mobile);

    let otp = match args.otp {
        Some(otp) => otp,
        None => prompt_line("Enter OTP: ")?,
    };
    if !valid_otp(&otp) {
        bail!("Please enter a valid OTP");
    }

    let verified = app.client.verify_otp(&args.mobile, &otp, None).await;
    let (token, principal) = app.check(verified)?;
    // The returned role decides the landing screen directly.
    let session = app.store.start_session(token.clone(), principal)?;
    app.client.set_token(Some(token));
    println!(
        "Login successful. Signed in as {} ({}); home screen: {}",
        session.principal.name,
        session.principal.role.as_str(),
        session.principal.role.home_screen()
    );
    Ok(())
}

async fn cmd_logout(app: &mut App) -> Result<()> {
    if app.store.is_authenticated() {
        if let Err(err) = app.client.logout().await {
            tracing::warn!(%err, "backend logout failed; purging local session anyway");
        }
    }
    app.store.end_session();
    app.client.set_token(None);
    println!("Logged out successfully");
    Ok(())
}

fn cmd_whoami(app: &App, out: OutputArgs) -> Result<()> {
    let session = app.require(&ANY_STAFF)?;
    if out.json {
        return print_json(&session.principal);
    }
    let p = &session.principal;
    println!("{} ({})", p.name, p.role.as_str());
    println!("mobile: {}", p.mobile_number);
    if let Some(email) = &p.email {
        println!("email: {email}");
    }
    if !p.permissions.is_empty() {
        println!("permissions: {:?}", p.permissions);
    }
    if p.assigned_states.is_empty() {
        println!("states: all");
    } else {
        println!("states: {}", p.assigned_states.join(", "));
    }
    Ok(())
}

async fn cmd_stats(app: &mut App, out: OutputArgs) -> Result<()> {
    app.require(&ANY_STAFF)?;
    let stats = {
        let fetched = app.client.admin_stats().await;
        app.check(fetched)?
    };
    if out.json {
        return print_json(&stats);
    }
    println!(
        "users total={} active={} admins={}",
        stats.users.total, stats.users.active, stats.users.admins
    );
    println!(
        "jobs total={} active={} featured={} central={} state={}",
        stats.jobs.total, stats.jobs.active, stats.jobs.featured, stats.jobs.central, stats.jobs.state
    );
    println!(
        "schemes total={} active={} featured={} central={} state={}",
        stats.schemes.total,
        stats.schemes.active,
        stats.schemes.featured,
        stats.schemes.central,
        stats.schemes.state
    );
    println!(
        "last 7 days: jobs={} schemes={} users={}",
        stats.recent.jobs, stats.recent.schemes, stats.recent.users
    );
    Ok(())
}

fn job_line(job: &Job) -> String {
    format!(
        "{}  {}  type={} state={} active={}",
        job.id,
        job.title,
        job.job_type.as_deref().unwrap_or("-"),
        job.state.as_deref().unwrap_or("-"),
        job.is_active.unwrap_or(true)
    )
}

async fn cmd_jobs(app: &mut App, cmd: JobsCmd) -> Result<()> {
    app.require(&ANY_STAFF)?;
    match cmd {
        JobsCmd::List { limit, json } => {
            let fetched = app.client.list_jobs(Some(limit)).await;
            let jobs = app.check(fetched)?;
            if json {
                return print_json(&jobs);
            }
            for job in &jobs {
                println!("{}", job_line(job));
            }
            println!("{} jobs", jobs.len());
        }
        JobsCmd::Get { id, json } => {
            let fetched = app.client.get_job(&id).await;
            let job = app.check(fetched)?;
            if json {
                return print_json(&job);
            }
            println!("{}", job_line(&job));
        }
        JobsCmd::Create { file } => {
            let body = read_json_file(&file)?;
            let sent = app.client.create_job(&body).await;
            app.check(sent)?;
            println!("Job created successfully");
        }
        JobsCmd::Update { id, file } => {
            let body = read_json_file(&file)?;
            let sent = app.client.update_job(&id, &body).await;
            app.check(sent)?;
            println!("Job updated successfully");
        }
        JobsCmd::Delete { id, yes } => {
            if !yes && !confirm("Delete this job?")? {
                println!("Aborted");
                return Ok(());
            }
            let sent = app.client.delete_job(&id).await;
            app.check(sent)?;
            println!("Job deleted successfully");
        }
    }
    Ok(())
}

fn scheme_line(scheme: &Scheme) -> String {
    format!(
        "{}  {}  type={} state={} active={}",
        scheme.id,
        scheme.name,
        scheme.scheme_type.as_deref().unwrap_or("-"),
        scheme.state.as_deref().unwrap_or("-"),
        scheme.is_active.unwrap_or(true)
    )
}

async fn cmd_schemes(app: &mut App, cmd: SchemesCmd) -> Result<()> {
    app.require(&ANY_STAFF)?;
    match cmd {
        SchemesCmd::List { limit, json } => {
            let fetched = app.client.list_schemes(Some(limit)).await;
            let schemes = app.check(fetched)?;
            if json {
                return print_json(&schemes);
            }
            for scheme in &schemes {
                println!("{}", scheme_line(scheme));
            }
            println!("{} schemes", schemes.len());
        }
        SchemesCmd::Get { id, json } => {
            let fetched = app.client.get_scheme(&id).await;
            let scheme = app.check(fetched)?;
            if json {
                return print_json(&scheme);
            }
            println!("{}", scheme_line(&scheme));
        }
        SchemesCmd::Create { file } => {
            let body = read_json_file(&file)?;
            let sent = app.client.create_scheme(&body).await;
            app.check(sent)?;
            println!("Scheme created successfully");
        }
        SchemesCmd::Update { id, file } => {
            let body = read_json_file(&file)?;
            let sent = app.client.update_scheme(&id, &body).await;
            app.check(sent)?;
            println!("Scheme updated successfully");
        }
        SchemesCmd::Delete { id, yes } => {
            if !yes && !confirm("Delete this scheme?")? {
                println!("Aborted");
                return Ok(());
            }
            let sent = app.client.delete_scheme(&id).await;
            app.check(sent)?;
            println!("Scheme deleted successfully");
        }
    }
    Ok(())
}

async fn cmd_users(app: &mut App, cmd: UsersCmd) -> Result<()> {
    app.require(&ANY_STAFF)?;
    match cmd {
        UsersCmd::List {
            role,
            state,
            active,
            json,
        } => {
            let filter = UserFilter {
                role,
                state,
                is_active: active,
            };
            let fetched = app.client.list_users(&filter).await;
            let users = app.check(fetched)?;
            if json {
                return print_json(&users);
            }
            for user in &users {
                println!(
                    "{}  {}  role={} state={} active={}",
                    user.id,
                    user.mobile_number,
                    user.role.as_deref().unwrap_or("-"),
                    user.state.as_deref().unwrap_or("-"),
                    user.is_active.unwrap_or(true)
                );
            }
            println!("{} users", users.len());
        }
    }
    Ok(())
}

fn subadmin_line(subadmin: &StaffUser) -> String {
    let profile = subadmin.admin_profile.clone().unwrap_or_default();
    let states = if profile.assigned_states.is_empty() {
        "all".to_string()
    } else {
        profile.assigned_states.join(",")
    };
    format!(
        "{}  {}  {}  verification={} active={} states={}",
        subadmin.id,
        subadmin.mobile_number,
        profile.name.as_deref().unwrap_or("-"),
        profile.verification_status.as_deref().unwrap_or("PENDING"),
        subadmin.is_active.unwrap_or(true),
        states
    )
}

async fn cmd_subadmins(app: &mut App, cmd: SubadminsCmd) -> Result<()> {
    app.require(&[Role::Admin])?;
    match cmd {
        SubadminsCmd::List {
            status,
            active,
            search,
            json,
        } => {
            let filter = SubadminFilter {
                verification_status: status,
                is_active: active,
                search,
            };
            let fetched = app.client.list_subadmins(&filter).await;
            let subadmins = app.check(fetched)?;
            if json {
                return print_json(&subadmins);
            }
            for subadmin in &subadmins {
                println!("{}", subadmin_line(subadmin));
            }
            println!("{} subadmins", subadmins.len());
        }
        SubadminsCmd::Create {
            mobile,
            name,
            email,
            permissions,
            states,
        } => {
            if !valid_mobile(&mobile) {
                bail!("Please enter a valid 10-digit mobile number");
            }
            if name.trim().is_empty() {
                bail!("Name is required");
            }
            let body = SubadminUpsert {
                mobile_number: mobile,
                name,
                email,
                permissions,
                assigned_states: states,
            };
            let sent = app.client.create_subadmin(&body).await;
            app.check(sent)?;
            println!("Subadmin onboarding request created successfully");
        }
        SubadminsCmd::Update {
            id,
            mobile,
            name,
            email,
            permissions,
            states,
        } => {
            let body = SubadminUpsert {
                mobile_number: mobile,
                name,
                email,
                permissions,
                assigned_states: states,
            };
            let sent = app.client.update_subadmin(&id, &body).await;
            app.check(sent)?;
            println!("Subadmin updated successfully");
        }
        SubadminsCmd::Verify { id, notes } => {
            let sent = app.client.verify_subadmin(&id, notes.as_deref()).await;
            app.check(sent)?;
            println!("Subadmin verified successfully");
        }
        SubadminsCmd::Reject { id, reason } => {
            if reason.trim().is_empty() {
                bail!("Please provide a rejection reason");
            }
            let sent = app.client.reject_subadmin(&id, &reason).await;
            app.check(sent)?;
            println!("Subadmin rejected successfully");
        }
        SubadminsCmd::Activate { id } => {
            let sent = app.client.activate_subadmin(&id).await;
            app.check(sent)?;
            println!("Subadmin activated successfully");
        }
        SubadminsCmd::Deactivate { id } => {
            let sent = app.client.deactivate_subadmin(&id).await;
            app.check(sent)?;
            println!("Subadmin deactivated successfully");
        }
    }
    Ok(())
}

async fn cmd_audit(app: &mut App, cmd: AuditCmd) -> Result<()> {
    app.require(&[Role::Admin])?;
    match cmd {
        AuditCmd::List {
            action,
            status,
            from,
            to,
            page,
            limit,
            json,
        } => {
            let query = AuditLogQuery {
                action,
                status,
                start_date: from,
                end_date: to,
                page,
                limit,
            };
            let fetched = app.client.audit_logs(&query).await;
            let result = app.check(fetched)?;
            if json {
                return print_json(&result.entries);
            }
            for entry in &result.entries {
                let performer = entry
                    .performed_by
                    .as_ref()
                    .and_then(|a| a.mobile_number.clone())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  by={} status={}",
                    entry.created_at.as_deref().unwrap_or("-"),
                    entry.action,
                    performer,
                    entry.status.as_deref().unwrap_or("-")
                );
            }
            println!(
                "page {} of {} ({} rows total)",
                query.page, result.pages, result.total
            );
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Refetch {
    Jobs,
    Schemes,
}

async fn cmd_watch(app: &mut App) -> Result<()> {
    let session = app.require(&ANY_STAFF)?;

    let bridge = Bridge::new();
    let notifier: Arc<dyn Notifier> = Arc::new(|text: &str| {
        let now = Local::now().format("%H:%M:%S");
        println!("[{now}] {text}");
    });
    let mut manager = ConnectionManager::new(
        app.client.http().clone(),
        app.settings.events_url.clone(),
        bridge.clone(),
        notifier,
    );
    manager.on_session_change(Some(&session));

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Refetch>();
    let tx_jobs = tx.clone();
    let _sub = bridge.subscribe(RefreshHooks {
        on_job_event: Some(Box::new(move || {
            let _ = tx_jobs.send(Refetch::Jobs);
        })),
        on_scheme_event: Some(Box::new(move || {
            let _ = tx.send(Refetch::Schemes);
        })),
    });

    render_snapshot(app).await?;
    println!("watching for job/scheme events (ctrl-c to exit)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(target) = rx.recv() => {
                if let Err(err) = render_refetch(app, target).await {
                    // 401 has already purged the session by now; anything
                    // else leaves the previous render in place.
                    println!("refetch failed: {err}");
                    if !app.store.is_authenticated() {
                        break;
                    }
                }
            }
        }
    }

    manager.teardown();
    println!("watch ended");
    Ok(())
}

async fn render_snapshot(app: &mut App) -> Result<()> {
    let now = Local::now().format("%H:%M:%S");
    let stats = {
        let fetched = app.client.admin_stats().await;
        app.check(fetched)?
    };
    println!(
        "[{now}] jobs={} schemes={} users={}",
        stats.jobs.total, stats.schemes.total, stats.users.total
    );
    Ok(())
}

async fn render_refetch(app: &mut App, target: Refetch) -> Result<()> {
    let now = Local::now().format("%H:%M:%S");
    match target {
        Refetch::Jobs => {
            let fetched = app.client.list_jobs(Some(100)).await;
            let jobs = app.check(fetched)?;
            println!("[{now}] jobs refreshed: {} items", jobs.len());
        }
        Refetch::Schemes => {
            let fetched = app.client.list_schemes(Some(100)).await;
            let schemes = app.check(fetched)?;
            println!("[{now}] schemes refreshed: {} items", schemes.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_validation_requires_ten_digits() {
        assert!(valid_mobile("9876543210"));
        assert!(!valid_mobile("987654321"));
        assert!(!valid_mobile("98765432101"));
        assert!(!valid_mobile("987654321x"));
    }

    #[test]
    fn otp_validation_accepts_four_to_six_digits() {
        assert!(valid_otp("1234"));
        assert!(valid_otp("123456"));
        assert!(!valid_otp("123"));
        assert!(!valid_otp("1234567"));
        assert!(!valid_otp("12a4"));
    }
}
