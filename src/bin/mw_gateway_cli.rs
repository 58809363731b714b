//! mw-gateway-cli — MediaWiki API 网关命令行工具
//!
//! Usage:
//!   mw-gateway-cli get <title>                 Print a page's wikitext
//!   mw-gateway-cli list <prefix>               List titles with a prefix
//!   mw-gateway-cli category <category>         List category members
//!   mw-gateway-cli search <key> [--max <n>]    Full-text search
//!   mw-gateway-cli siteinfo                    Print general site information
//!   mw-gateway-cli version                     Print the wiki's MediaWiki version

use anyhow::{bail, Context};
use mediawiki_gateway::{Gateway, GatewayBuilder, GatewayConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "get" => connect().and_then(|mut gw| cmd_get(&mut gw, &args[2..])),
        "list" => connect().and_then(|mut gw| cmd_list(&mut gw, &args[2..])),
        "category" => connect().and_then(|mut gw| cmd_category(&mut gw, &args[2..])),
        "search" => connect().and_then(|mut gw| cmd_search(&mut gw, &args[2..])),
        "siteinfo" => connect().and_then(|mut gw| cmd_siteinfo(&mut gw)),
        "version" => connect().and_then(|mut gw| cmd_version(&mut gw)),
        "--version" | "-V" => {
            println!("mw-gateway-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"mw-gateway-cli — MediaWiki API 网关命令行工具

USAGE:
    mw-gateway-cli <COMMAND> [ARGS]

COMMANDS:
    get <title>                 Print a page's wikitext
    list <prefix>               List page titles starting with a prefix
    category <category>         List members of a category
    search <key> [--max <n>]    Full-text search in the main namespace
    siteinfo                    Print general site information as JSON
    version                     Print the wiki's MediaWiki version
    help                        Show this help message

ENVIRONMENT:
    MW_API_URL                  Full URL of the wiki's api.php (required)
    MW_USERNAME, MW_PASSWORD    Log in before running the command
    MW_GATEWAY_CONFIG           YAML gateway configuration file
    MW_GATEWAY_*                Configuration overrides (MAXLAG, RETRY_COUNT, ...)
    RUST_LOG                    Log filter, e.g. mediawiki_gateway=debug"#
    );
}

fn connect() -> anyhow::Result<Gateway> {
    let url = std::env::var("MW_API_URL").context("MW_API_URL is not set")?;
    let config = match std::env::var("MW_GATEWAY_CONFIG") {
        Ok(path) => GatewayConfig::from_yaml_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        Err(_) => GatewayConfig::default(),
    }
    .with_env_overrides();

    let mut gateway = GatewayBuilder::new(url).config(config).build()?;
    if let (Ok(user), Ok(password)) = (std::env::var("MW_USERNAME"), std::env::var("MW_PASSWORD")) {
        gateway
            .login(&user, &password, None)
            .with_context(|| format!("logging in as {}", user))?;
    }
    Ok(gateway)
}

fn required<'a>(args: &'a [String], what: &str) -> anyhow::Result<&'a str> {
    match args.first() {
        Some(arg) => Ok(arg.as_str()),
        None => bail!("missing argument: <{}>", what),
    }
}

fn cmd_get(gw: &mut Gateway, args: &[String]) -> anyhow::Result<()> {
    let title = required(args, "title")?;
    match gw.get(title)? {
        Some(text) => println!("{}", text),
        None => bail!("page '{}' does not exist", title),
    }
    Ok(())
}

fn cmd_list(gw: &mut Gateway, args: &[String]) -> anyhow::Result<()> {
    for title in gw.list(required(args, "prefix")?)? {
        println!("{}", title);
    }
    Ok(())
}

fn cmd_category(gw: &mut Gateway, args: &[String]) -> anyhow::Result<()> {
    for title in gw.category_members(required(args, "category")?)? {
        println!("{}", title);
    }
    Ok(())
}

fn cmd_search(gw: &mut Gateway, args: &[String]) -> anyhow::Result<()> {
    let key = required(args, "key")?;
    let mut max = None;
    for (i, arg) in args.iter().enumerate() {
        if arg == "--max" {
            let value = args.get(i + 1).context("--max needs a value")?;
            max = Some(value.parse::<u32>().context("--max must be a number")?);
        }
    }
    for title in gw.search(key, None, None, max)? {
        println!("{}", title);
    }
    Ok(())
}

fn cmd_siteinfo(gw: &mut Gateway) -> anyhow::Result<()> {
    let info = gw.siteinfo()?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_version(gw: &mut Gateway) -> anyhow::Result<()> {
    match gw.version()? {
        Some(version) => println!("{}", version),
        None => bail!("the wiki did not report a generator"),
    }
    Ok(())
}
