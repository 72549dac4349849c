use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unicare_core::common::{date_diff, format_local, minutes_to_time, time_remaining};
use unicare_core::models::{Appointment, AppointmentRequest, ChatMessage};
use unicare_core::services::{
    AppointmentService, AuthService, EmergencyService, HomeService, ProfileService,
    TimeSlotService,
};
use unicare_core::{config, ApiClient, PortalConfig, PortalError, Session, SessionStore};
use unicare_messaging::{Applied, Inbox, SseDecoder};
use unicare_types::{Role, ThemeMode};
use unicare_validation::presets::{self, FORM_NAMES};
use unicare_validation::value::parse_date;
use unicare_validation::FieldValue;

#[derive(Parser)]
#[command(name = "unicare")]
#[command(about = "UniCare clinic portal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one value against a form's field rule
    Validate {
        /// Form name (see `unicare rules`)
        form: String,
        field: String,
        value: String,
    },
    /// Print a form's rules as JSON, or list the forms
    Rules { form: Option<String> },
    /// Log in and remember the token
    Login {
        /// `student` or `doctor`
        #[arg(value_parser = parse_role)]
        role: Role,
        username: String,
        password: String,
    },
    /// Forget the token (the theme is kept)
    Logout,
    /// Show who is logged in
    Whoami,
    /// Appointments: the student's lists, or the doctor's dashboard
    Appointments,
    /// Free consultation windows on a date (YYYY-MM-DD)
    FreeSlots { date: String },
    /// Book an appointment
    Book {
        /// YYYY-MM-DD
        date: String,
        timeslot_id: String,
        description: String,
    },
    /// List the medical centre's time slots
    Slots,
    /// Add a time slot
    AddSlot {
        /// Start, e.g. "08:30 AM"
        start: String,
        /// End, e.g. "09:00 AM"
        end: String,
    },
    /// Remove a time slot
    RemoveSlot { id: String },
    /// Show or change the theme: light, dark or toggle
    Theme { mode: Option<String> },
    /// Emergency messages
    Messages {
        /// Doctor only: open this student's thread
        #[arg(long)]
        student: Option<String>,
    },
    /// Send an emergency message
    Send {
        text: String,
        /// Doctor only: the student to reply to
        #[arg(long)]
        student: Option<String>,
    },
    /// Follow a relay's notification stream
    Listen {
        /// Relay base URL, e.g. http://localhost:3000
        relay_url: String,
        /// Only show payloads addressed to this role
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    value.parse().map_err(|e| format!("{e}"))
}

/// Configuration, the stored session and a client carrying its token.
struct Portal {
    store: SessionStore,
    session: Session,
    api: ApiClient,
}

impl Portal {
    fn open() -> anyhow::Result<Self> {
        let config = resolve_config()?;
        let store = SessionStore::new(config.session_file());
        let session = store.load()?;
        let api = ApiClient::new(&config)?.with_token(session.token.clone());
        Ok(Self {
            store,
            session,
            api,
        })
    }

    fn role(&self) -> anyhow::Result<Role> {
        self.session
            .role()
            .map_err(|_| anyhow!("Not logged in. Run `unicare login <student|doctor> <username> <password>`."))
    }

    fn save(&self) -> anyhow::Result<()> {
        self.store.save(&self.session)?;
        Ok(())
    }
}

fn resolve_config() -> anyhow::Result<PortalConfig> {
    Ok(config::from_env_values(
        std::env::var("UNICARE_API_URL").ok(),
        std::env::var("UNICARE_TIMEOUT_SECS").ok(),
        std::env::var("UNICARE_HOME").ok(),
        dirs::home_dir(),
    )?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unicare_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("No command given. Use --help to see available commands.");
        return Ok(());
    };

    let result = run(command).await;
    if let Err(err) = &result {
        if err
            .downcast_ref::<PortalError>()
            .is_some_and(PortalError::needs_login)
        {
            // The token is no longer accepted; drop it so the next command starts clean.
            if let Ok(config) = resolve_config() {
                let store = SessionStore::new(config.session_file());
                if let Err(e) = store.update(Session::log_out) {
                    tracing::warn!(error = %e, "could not clear session");
                }
            }
            eprintln!("Your session has ended. Please log in again.");
        }
    }
    result
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Validate { form, field, value } => validate(&form, &field, &value),
        Commands::Rules { form } => rules(form.as_deref()),
        Commands::Login {
            role,
            username,
            password,
        } => {
            let mut portal = Portal::open()?;
            let reply = AuthService::new(&portal.api)
                .login(&mut portal.session, role, &username, &password)
                .await?;
            portal.save()?;
            println!("{}", reply.message);
            Ok(())
        }
        Commands::Logout => {
            let mut portal = Portal::open()?;
            AuthService::logout(&mut portal.session);
            portal.save()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => whoami().await,
        Commands::Appointments => appointments().await,
        Commands::FreeSlots { date } => {
            let portal = Portal::open()?;
            let date = parse_date(&date).ok_or_else(|| anyhow!("unrecognized date: {date}"))?;
            let slots = AppointmentService::new(&portal.api).free_slots(date).await?;
            if slots.is_empty() {
                println!("No free slots on {date}.");
            }
            for slot in slots {
                println!(
                    "{}  {} - {}",
                    slot.id,
                    minutes_to_time(slot.start_time),
                    minutes_to_time(slot.end_time)
                );
            }
            Ok(())
        }
        Commands::Book {
            date,
            timeslot_id,
            description,
        } => {
            let portal = Portal::open()?;
            let request = AppointmentRequest {
                date: parse_date(&date).ok_or_else(|| anyhow!("unrecognized date: {date}"))?,
                timeslot_id,
                description,
            };
            let reply = AppointmentService::new(&portal.api).book(&request).await?;
            println!("{}", reply.message);
            Ok(())
        }
        Commands::Slots => {
            let portal = Portal::open()?;
            for slot in TimeSlotService::new(&portal.api).list().await? {
                println!(
                    "{}  {} - {}",
                    slot.id,
                    minutes_to_time(slot.start_time),
                    minutes_to_time(slot.end_time)
                );
            }
            Ok(())
        }
        Commands::AddSlot { start, end } => {
            let portal = Portal::open()?;
            let reply = TimeSlotService::new(&portal.api).add(&start, &end).await?;
            println!("{}", reply.message);
            Ok(())
        }
        Commands::RemoveSlot { id } => {
            let portal = Portal::open()?;
            let reply = TimeSlotService::new(&portal.api).remove(&id).await?;
            println!("{}", reply.message);
            Ok(())
        }
        Commands::Theme { mode } => theme(mode.as_deref()),
        Commands::Messages { student } => messages(student.as_deref()).await,
        Commands::Send { text, student } => {
            let portal = Portal::open()?;
            let service = EmergencyService::new(&portal.api);
            let sent = match (portal.role()?, student) {
                (Role::Student, _) => service.send_to_centre(&text).await?,
                (Role::MedicalCentre, Some(id)) => service.send_to_student(&id, &text).await?,
                (Role::MedicalCentre, None) => bail!("Please select a student with --student <id>."),
            };
            println!("{}", sent.ack.message);
            Ok(())
        }
        Commands::Listen { relay_url, role } => listen(&relay_url, role).await,
    }
}

fn validate(form: &str, field: &str, value: &str) -> anyhow::Result<()> {
    let rules = presets::by_name(form)
        .ok_or_else(|| anyhow!("unknown form '{form}', expected one of: {}", FORM_NAMES.join(", ")))?;
    let verdict = rules
        .validate_field(field, &FieldValue::from(value))
        .ok_or_else(|| anyhow!("form '{form}' has no field '{field}'"))?;
    if verdict.valid {
        println!("{}", verdict.message);
        Ok(())
    } else {
        bail!("{}", verdict.message)
    }
}

fn rules(form: Option<&str>) -> anyhow::Result<()> {
    let Some(form) = form else {
        for name in FORM_NAMES {
            println!("{name}");
        }
        return Ok(());
    };
    let rules = presets::by_name(form).ok_or_else(|| anyhow!("unknown form '{form}'"))?;
    println!("{}", serde_json::to_string_pretty(&rules.to_json())?);
    Ok(())
}

async fn whoami() -> anyhow::Result<()> {
    let portal = Portal::open()?;
    let theme = portal.session.theme;
    let role = match portal.session.role() {
        Ok(role) => role,
        Err(_) => {
            println!("Not logged in (theme: {})", theme_name(theme));
            return Ok(());
        }
    };

    let profile = ProfileService::new(&portal.api);
    let name = match role {
        Role::Student => profile.current_student().await?.display_name(),
        Role::MedicalCentre => profile.current_doctor().await?.display_name(),
    };
    println!("{name} ({role}, theme: {})", theme_name(theme));
    Ok(())
}

fn theme_name(theme: ThemeMode) -> &'static str {
    if theme.is_dark() {
        "dark"
    } else {
        "light"
    }
}

fn theme(mode: Option<&str>) -> anyhow::Result<()> {
    let config = resolve_config()?;
    let store = SessionStore::new(config.session_file());
    let session = match mode {
        None => store.load()?,
        Some("toggle") => store.update(|s| s.theme = s.theme.toggled())?,
        Some(other) => {
            let theme: ThemeMode = other.parse().context("expected light, dark or toggle")?;
            store.update(|s| s.theme = theme)?
        }
    };
    println!("{}", theme_name(session.theme));
    Ok(())
}

fn print_appointment(appointment: &Appointment) {
    let who = match (&appointment.first_name, &appointment.last_name) {
        (Some(first), Some(last)) => format!("{first} {last}: "),
        _ => String::new(),
    };
    let when = format_local(appointment.start_time);
    let status = if appointment.checked {
        "checked".to_string()
    } else {
        time_remaining(&appointment.start_time.to_rfc3339())
    };
    println!("  {}  {when}  {who}{} ({status})", appointment.id, appointment.description);
}

async fn appointments() -> anyhow::Result<()> {
    let portal = Portal::open()?;
    match portal.role()? {
        Role::Student => {
            let lists = AppointmentService::new(&portal.api).list().await?;
            for (title, items) in [
                ("Ongoing", &lists.ongoing_appointments),
                ("Upcoming", &lists.upcoming_appointments),
                ("Previous", &lists.previous_appointments),
            ] {
                println!("{title} ({})", items.len());
                items.iter().for_each(print_appointment);
            }
        }
        Role::MedicalCentre => {
            let home = HomeService::new(&portal.api).dashboard().await?;
            println!(
                "You are {}. Today's appointments ({}):",
                if home.online { "online" } else { "offline" },
                home.appointments.len()
            );
            home.appointments.iter().for_each(print_appointment);
        }
    }
    Ok(())
}

fn print_message(message: &ChatMessage) {
    println!(
        "[{}] {}: {}",
        date_diff(&message.created_at.to_rfc3339()),
        message.from,
        message.text
    );
}

async fn messages(student: Option<&str>) -> anyhow::Result<()> {
    let portal = Portal::open()?;
    let service = EmergencyService::new(&portal.api);
    match (portal.role()?, student) {
        (Role::Student, _) => {
            let thread = service.student_thread().await?;
            if let Some(doctor) = thread.doctor {
                println!("Dr. {} {}", doctor.first_name, doctor.last_name);
            }
            thread.messages.iter().for_each(print_message);
        }
        (Role::MedicalCentre, Some(id)) => {
            service.messages(id).await?.iter().for_each(print_message);
        }
        (Role::MedicalCentre, None) => {
            let mut inbox = Inbox::new();
            service.refresh_inbox(&mut inbox).await?;
            for overview in inbox.overviews() {
                println!(
                    "{}  {}  {} unread  {}",
                    overview.id,
                    overview.display_name(),
                    overview.unread_count,
                    overview.last_message.text.as_deref().unwrap_or("")
                );
            }
            println!("{} unread in total", inbox.total_unread());
        }
    }
    Ok(())
}

async fn listen(relay_url: &str, role: Option<Role>) -> anyhow::Result<()> {
    let mut url = reqwest::Url::parse(relay_url)
        .with_context(|| format!("invalid relay URL '{relay_url}'"))?
        .join("notifications/stream")?;
    if let Some(role) = role {
        url.query_pairs_mut().append_pair("role", role.as_str());
    }

    let response = reqwest::get(url.clone()).await?.error_for_status()?;
    tracing::info!(%url, "listening for notifications");

    let mut decoder = SseDecoder::new();
    let mut inbox = Inbox::new();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        for event in decoder.feed(&chunk?) {
            match event.event.as_deref() {
                Some("lagged") => eprintln!("missed {} notifications", event.data),
                _ => match event.notification() {
                    Ok(notification) => {
                        let message = ChatMessage::from(&notification);
                        print!("{}  ", notification.conversation_id.as_str());
                        print_message(&message);
                        if let Applied::Updated { unread } = inbox.apply(&notification) {
                            tracing::debug!(unread, total = inbox.total_unread(), "inbox updated");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "skipping malformed event"),
                },
            }
        }
    }

    println!("Stream closed.");
    Ok(())
}
