use anyhow::{bail, Context};
use ferrum_facade::{ClientConfig, Expiry, Facade, MemoryClient, StoreClient, TcpClient};
use tracing::info;

const USAGE: &str = "usage: ferrum-facade [--memory] <command> [args...]

commands:
  get <key>
  get-long <key>
  get-double <key>
  set <key> <value> [ttl-ms]
  incr <key>
  ttl <key>
  lock <key>
  unlock <key>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG wins; warnings only otherwise, so replies stay readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let memory = match args.iter().position(|a| a == "--memory") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    if args.is_empty() {
        bail!("{}", USAGE);
    }

    let output = if memory {
        info!("Using the in-process store");
        run(&Facade::new(MemoryClient::new()), &args).await?
    } else {
        let config = ClientConfig::load().context("loading client configuration")?;
        let client = TcpClient::connect(&config)
            .await
            .with_context(|| format!("connecting to {}", config.addr))?;
        run(&Facade::new(client), &args).await?
    };

    println!("{}", output);
    Ok(())
}

/// Run one command and render its result
async fn run<C: StoreClient>(facade: &Facade<C>, args: &[String]) -> anyhow::Result<String> {
    let (command, rest) = args.split_first().context(USAGE)?;
    let key = rest.first().map(String::as_str).context(USAGE)?;

    let output = match command.as_str() {
        "get" => render(facade.get_string(key).await?),
        "get-long" => render(facade.get_long(key).await?),
        "get-double" => render(facade.get_double(key).await?),
        "set" => {
            let value = rest.get(1).context(USAGE)?;
            let expiry = match rest.get(2) {
                Some(ms) => Some(Expiry::millis(ms.parse().with_context(|| format!("bad ttl: {}", ms))?)),
                None => None,
            };
            facade.set(key, value, expiry).await?;
            "OK".to_string()
        }
        "incr" => facade.incr(key).await?.to_string(),
        "ttl" => facade.ttl(key).await?.to_string(),
        "lock" => {
            let acquired = facade.lock(key).await?;
            (if acquired { "locked" } else { "busy" }).to_string()
        }
        "unlock" => {
            facade.unlock(key).await?;
            "OK".to_string()
        }
        other => bail!("unknown command: {}\n{}", other, USAGE),
    };
    Ok(output)
}

fn render<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "(nil)".to_string(), |v| v.to_string())
}
