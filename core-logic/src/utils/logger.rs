use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use std::fmt::Write as _;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

/// Target used for the final outcome of a deployment
pub const RESULT_TARGET: &str = "deploy_result";

const DEFAULT_CONSOLE_FILTER: &str = "warn,deploy_result=info,trader_deployer=info,core_logic=info";

/// Installs the console and file layers.
///
/// The returned guard flushes the file writer and MUST be kept alive by the
/// caller. `RUST_LOG` replaces the console filter.
pub fn setup_logger(log_dir: &str) -> Option<WorkerGuard> {
    let file_layer = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "deploy");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_filter = tracing_subscriber::filter::Targets::new()
                .with_target(RESULT_TARGET, Level::INFO)
                .with_default(Level::DEBUG);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(FileFormatter)
                .with_filter(file_filter);
            Some((layer, guard))
        }
        Err(_) => None,
    };

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(TerminalFormatter)
        .with_filter(console_filter);

    let (file_layer, guard) = match file_layer {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

// --- Formatters ---

/// Collects the message and the remaining fields as `key=value`.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: String,
}

impl EventVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl tracing::field::Visit for EventVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }
}

fn visit(event: &Event<'_>) -> EventVisitor {
    let mut visitor = EventVisitor::default();
    event.record(&mut visitor);
    visitor
}

pub struct TerminalFormatter;

impl TerminalFormatter {
    fn colorize(msg: String) -> String {
        if msg.contains("SUCCESS") || msg.contains("Success") {
            let green_text = Style::new().fg(Color::LightGreen).bold();
            msg.replace("SUCCESS", &format!("{}", green_text.paint("SUCCESS")))
                .replace("Success", &format!("{}", green_text.paint("Success")))
        } else if msg.contains("FAILED") || msg.contains("Failed") {
            let red_text = Style::new().fg(Color::LightRed).bold();
            msg.replace("FAILED", &format!("{}", red_text.paint("FAILED")))
                .replace("Failed", &format!("{}", red_text.paint("Failed")))
        } else {
            msg
        }
    }
}

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let EventVisitor { message, fields } = visit(event);

        let level = *event.metadata().level();
        if level == Level::ERROR {
            write!(writer, "{} ", Color::Red.bold().paint("error:"))?;
        } else if level == Level::WARN {
            write!(writer, "{} ", Color::Yellow.bold().paint("warning:"))?;
        }

        write!(writer, "{}", Self::colorize(message))?;
        if !fields.is_empty() {
            write!(writer, " {}", Style::new().dimmed().paint(fields))?;
        }
        writeln!(writer)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let metadata = event.metadata();
        let EventVisitor { message, fields } = visit(event);

        write!(
            writer,
            "{} [{}] {}: {}",
            timestamp,
            metadata.level(),
            metadata.target(),
            message
        )?;
        if !fields.is_empty() {
            write!(writer, " {}", fields)?;
        }
        writeln!(writer)
    }
}
