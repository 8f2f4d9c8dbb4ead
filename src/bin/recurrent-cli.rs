#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use recurrent::{
    io,
    overlay::{
        Cancellation, ExceptionRecord, ExtendedCancellation, ExtraInfo, HolidayClosure,
        Postponement,
    },
    resolver::{localize, OccurrenceResolver, ResolverOptions},
    storage::{EventFile, JsonStorage, Storage},
    EventTimes, HolidayLookup, Holidays, RecurrenceRule,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'événements récurrents (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de l'événement
    #[arg(long, global = true, default_value = "event.json")]
    event: String,

    /// CSV de jours fériés (`date,name`)
    #[arg(long, global = true)]
    holidays: Option<String>,

    /// Fuseau d'affichage
    #[arg(long, global = true, default_value = "UTC")]
    tz: String,

    #[arg(long, global = true, default_value_t = 500)]
    max_iterations: usize,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer l'événement
    Create {
        #[arg(long)]
        title: String,
        /// "DTSTART:20200107\nRRULE:FREQ=WEEKLY;BYDAY=TU" ou seulement la ligne RRULE
        #[arg(long)]
        rule: String,
        /// YYYY-MM-DD, si la règle n'a pas de DTSTART
        #[arg(long)]
        dtstart: Option<String>,
        /// HH:MM
        #[arg(long)]
        time_from: Option<String>,
        /// HH:MM
        #[arg(long)]
        time_to: Option<String>,
        #[arg(long, default_value_t = 1)]
        num_days: u32,
        /// Fuseau de l'événement
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },

    /// Annuler une occurrence
    Cancel {
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        details: String,
    },

    /// Fermer sur une plage (sans --to : jusqu'à nouvel ordre)
    Shutdown {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Reporter une occurrence
    Postpone {
        #[arg(long)]
        date: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        time_from: Option<String>,
        #[arg(long)]
        time_to: Option<String>,
        #[arg(long, default_value_t = 1)]
        num_days: u32,
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Ajouter une information à une occurrence
    ExtraInfo {
        #[arg(long)]
        date: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        details: String,
    },

    /// Fermer les jours fériés
    CloseForHolidays {
        /// liste "nom1,nom2" ; absent = tous les jours fériés
        #[arg(long)]
        names: Option<String>,
        #[arg(long, default_value = "")]
        title: String,
    },

    /// Importer des exceptions depuis un CSV
    ImportExceptions {
        #[arg(long)]
        csv: String,
    },

    /// Décrire la récurrence
    Describe,

    /// Prochaine occurrence (reports compris)
    Next {
        /// RFC3339, ou YYYY-MM-DDTHH:MM en heure de l'événement
        #[arg(long)]
        at: Option<String>,
    },

    /// Occurrence précédente
    Prev {
        #[arg(long)]
        at: Option<String>,
    },

    /// Statut courant
    Status {
        #[arg(long)]
        at: Option<String>,
    },

    /// Une occurrence commence-t-elle ce jour-là ?
    OccursOn {
        #[arg(long)]
        date: String,
    },

    /// Lister les occurrences d'une plage et optionnellement exporter
    List {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_time(raw: Option<&str>) -> Result<Option<NaiveTime>> {
    raw.map(|t| {
        NaiveTime::parse_from_str(t.trim(), "%H:%M").with_context(|| format!("invalid time: {t}"))
    })
    .transpose()
}

/// Instant de référence en heure locale de l'événement.
fn reference(at: Option<&str>, event_tz: Tz) -> Result<NaiveDateTime> {
    let Some(raw) = at else {
        return Ok(localize(Utc::now(), event_tz));
    };
    if let Ok(instant) = raw.parse::<DateTime<Utc>>() {
        return Ok(localize(instant, event_tz));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .with_context(|| format!("invalid instant: {raw}"))
}

fn parse_tz(raw: &str) -> Result<Tz> {
    raw.parse::<Tz>()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("unknown timezone {raw}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.event)?;
    let viewer = parse_tz(&cli.tz)?;
    let holidays = match &cli.holidays {
        Some(path) => io::import_holidays_csv(path)?,
        None => Holidays::new(),
    };
    let options = ResolverOptions {
        max_iterations: cli.max_iterations,
        ..ResolverOptions::default()
    };

    if let Commands::Create {
        title,
        rule,
        dtstart,
        time_from,
        time_to,
        num_days,
        timezone,
    } = &cli.cmd
    {
        let text = match dtstart {
            Some(date) => format!("DTSTART:{}\n{rule}", parse_date(date)?.format("%Y%m%d")),
            None => rule.clone(),
        };
        let rule: RecurrenceRule = text.parse()?;
        let times = EventTimes::new(
            parse_time(time_from.as_deref())?,
            parse_time(time_to.as_deref())?,
            *num_days,
        );
        let mut event = EventFile::new(title.clone(), rule, times);
        parse_tz(timezone)?;
        event.timezone = timezone.clone();
        storage.save(&event)?;
        println!("{}", event.rule);
        std::process::exit(0);
    }

    let mut event = storage.load()?;
    let event_tz = event.tz()?;

    let record: Option<ExceptionRecord> = match &cli.cmd {
        Commands::Cancel {
            date,
            title,
            details,
        } => Some(
            Cancellation {
                date: parse_date(date)?,
                title: title.clone(),
                details: details.clone(),
            }
            .into(),
        ),
        Commands::Shutdown { from, to, title } => {
            let mut shutdown =
                ExtendedCancellation::new(parse_date(from)?, to.as_deref().map(parse_date).transpose()?);
            shutdown.title = title.clone();
            Some(shutdown.into())
        }
        Commands::Postpone {
            date,
            to,
            time_from,
            time_to,
            num_days,
            title,
        } => {
            let times = EventTimes::new(
                parse_time(time_from.as_deref())?,
                parse_time(time_to.as_deref())?,
                *num_days,
            );
            Some(
                Postponement::new(parse_date(date)?, parse_date(to)?, times)
                    .with_title(title.clone())
                    .into(),
            )
        }
        Commands::ExtraInfo {
            date,
            title,
            details,
        } => Some(ExtraInfo::new(parse_date(date)?, title.clone(), details.clone()).into()),
        Commands::CloseForHolidays { names, title } => {
            let mut closure = match names {
                Some(list) => HolidayClosure::only(
                    list.split(',').map(str::trim).filter(|s| !s.is_empty()),
                ),
                None => HolidayClosure::all(),
            };
            closure.title = title.clone();
            Some(closure.into())
        }
        _ => None,
    };

    if let Some(record) = record {
        event.add_record(record)?;
        storage.save(&event)?;
        std::process::exit(0);
    }

    if let Commands::ImportExceptions { csv } = &cli.cmd {
        let records = io::import_exceptions_csv(csv)?;
        let count = records.len();
        for record in records {
            event.add_record(record)?;
        }
        storage.save(&event)?;
        println!("{count} exception(s) imported");
        std::process::exit(0);
    }

    let overlay = event.overlay()?;
    let lookup: &dyn HolidayLookup = &holidays;
    let resolver = OccurrenceResolver::new(&event.rule, &overlay, event.times)
        .holidays(lookup)
        .options(options)
        .timezone(event_tz)
        .title(event.title.clone());

    let code = match &cli.cmd {
        Commands::Describe => {
            println!("{}", resolver.when_viewed_in(Utc::now(), viewer));
            0
        }
        Commands::Next { at } => {
            let now = reference(at.as_deref(), event_tz)?;
            match resolver.next_occurrence(now) {
                Some(found) => {
                    let label = if found.is_postponed() { " (postponed)" } else { "" };
                    println!("{}{label}", found.start.format("%Y-%m-%d %H:%M"));
                    0
                }
                None => {
                    eprintln!("no further occurrence");
                    // Code 2 = rien trouvé
                    2
                }
            }
        }
        Commands::Prev { at } => {
            let now = reference(at.as_deref(), event_tz)?;
            match resolver.previous_occurrence(now) {
                Some(found) => {
                    println!("{}", found.start.format("%Y-%m-%d %H:%M"));
                    0
                }
                None => {
                    eprintln!("no previous occurrence");
                    2
                }
            }
        }
        Commands::Status { at } => {
            let now = reference(at.as_deref(), event_tz)?;
            match resolver.status(now) {
                Some(status) => println!("{status}"),
                None => println!("-"),
            }
            0
        }
        Commands::OccursOn { date } => {
            let date = parse_date(date)?;
            if resolver.occurs_on(date) {
                println!("yes");
                0
            } else {
                println!("no");
                2
            }
        }
        Commands::List { from, to, out_csv } => {
            let occurrences = resolver.occurrences_in_range(parse_date(from)?, parse_date(to)?)?;
            if let Some(path) = out_csv {
                io::export_occurrences_csv(path, &occurrences)?;
            }
            // impression compacte
            for occ in occurrences.iter().filter(|o| o.is_displayed()) {
                println!(
                    "{} | {} → {} | {} | {}",
                    occ.date,
                    occ.start.format("%H:%M"),
                    occ.end.format("%Y-%m-%d %H:%M"),
                    occ.source.as_str(),
                    occ.title
                );
            }
            0
        }
        other => bail!("unexpected command {other:?}"),
    };

    std::process::exit(code);
}
