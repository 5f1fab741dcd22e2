use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use lingua_relay::bot::commands::Command;
use lingua_relay::bot::transport::TelegramOutbound;
use lingua_relay::config::{get_broadcast_interval_ms, Settings};
use lingua_relay::relay::RelayLog;
use lingua_relay::router::Router;
use lingua_relay::session::SessionStore;
use lingua_relay::translate::gemini::GeminiTranslator;
use lingua_relay::{bot, translate};
use regex::Regex;
use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting credentials from log output
struct RedactionPatterns {
    token_in_url: Regex,
    bare_token: Regex,
    bot_prefix: Regex,
    gemini_key: Regex,
}

impl RedactionPatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_in_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
            bare_token: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            bot_prefix: Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
            gemini_key: Regex::new(r"key=[A-Za-z0-9_-]{20,}")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .token_in_url
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .bare_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .bot_prefix
            .replace_all(&output, "$1[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .gemini_key
            .replace_all(&output, "key=[GEMINI_KEY]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length to satisfy the Write contract even
        // when redaction changed the byte count
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: (self.make_inner)(),
            patterns: self.patterns.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile redaction patterns: {e}");
        e
    })?);
    init_logging(patterns);

    info!("Starting lingua-relay translation bot...");

    let settings = init_settings();
    let bot = Bot::new(settings.telegram_token.clone());

    let store = Arc::new(SessionStore::new(settings.default_target_lang.clone()));
    let relay = Arc::new(RelayLog::new());
    let translator: Arc<dyn translate::Translator> =
        Arc::new(GeminiTranslator::new(settings.gemini_api_key.clone()));
    let outbound = Arc::new(TelegramOutbound::new(bot.clone()));

    if settings.admin_id().is_none() {
        info!("No administrator configured; admin commands and support relay are disabled.");
    }

    let router = Arc::new(Router::new(
        store,
        relay,
        translator,
        outbound,
        settings.admin_id(),
        Duration::from_millis(get_broadcast_interval_ms()),
    ));

    let mut dispatcher = Dispatcher::builder(bot.clone(), setup_handler())
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build();

    info!("Bot is running...");

    match settings.webhook_url.as_deref() {
        Some(url) => {
            let addr = SocketAddr::from(([0, 0, 0, 0], settings.webhook_port));
            let options = webhooks::Options::new(addr, url.parse()?);
            // Registers the public URL with the platform; re-running it
            // on restart is safe
            let listener = webhooks::axum(bot, options).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Webhook listener error"),
                )
                .await;
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stderr,
        patterns,
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Settings {
    match Settings::new() {
        Ok(s) => {
            info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(bot::handlers::handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(bot::handlers::handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| msg.text().is_some())
                        .endpoint(bot::handlers::handle_message),
                ),
        )
}
