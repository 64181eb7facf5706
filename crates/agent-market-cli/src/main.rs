use std::path::PathBuf;

use agent_market_core::{
    api::{MarketClient, DEFAULT_URL},
    catalog::{all_capabilities, AgentRecord},
    checkout::CheckoutRequest,
    compare::{compare, Attribute},
    config::MarketConfig,
    estimate::estimate,
    filter::{filter, FilterCriteria, PriceTier},
    pricing::{BillingModel, PricingDescriptor},
    templates::{self, TEMPLATES},
    SelectionSet,
};
use clap::{Parser, Subcommand};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use tracing_subscriber::EnvFilter;

// ── Palette ──────────────────────────────────────────────────────────

fn s_header() -> Style { Style::new().color256(252).bold() }  // bright gray, bold
fn s_dim() -> Style    { Style::new().color256(248) }         // light gray
fn s_tree() -> Style   { Style::new().color256(245) }         // mid gray
fn s_hint() -> Style   { Style::new().color256(243) }         // soft gray
fn s_hot() -> Style    { Style::new().color256(114) }         // green
fn s_warm() -> Style   { Style::new().color256(214) }         // amber
fn s_err() -> Style    { Style::new().color256(167) }         // red
fn s_price() -> Style  { Style::new().color256(109) }         // teal
fn s_bold() -> Style   { Style::new().bold() }
fn s_label() -> Style  { Style::new().color256(146) }         // muted lavender

fn sep(width: usize) -> String {
    s_tree().apply_to("\u{2500}".repeat(width)).to_string()
}

fn tier_style(model: BillingModel) -> Style {
    match model {
        BillingModel::Free => s_hot(),
        BillingModel::Freemium => s_price(),
        BillingModel::PayAsYouGo => s_warm(),
        BillingModel::Subscription => s_label(),
    }
}

fn verified_str(verified: bool) -> String {
    if verified {
        s_hot().apply_to("\u{2713} verified").to_string()
    } else {
        String::new()
    }
}

/// One-line pricing summary, e.g. "$0.10/image, 50 free".
fn pricing_summary(p: &PricingDescriptor) -> String {
    match p {
        PricingDescriptor::Free => "free".to_string(),
        PricingDescriptor::Subscription { price, unit } => format!("{price}/{unit}"),
        PricingDescriptor::PayAsYouGo { price, unit } => format!("{}/{unit}", price.fmt_rate()),
        PricingDescriptor::Freemium {
            price,
            unit,
            free_tier_limit,
        } => format!("{}/{unit}, {free_tier_limit} free", price.fmt_rate()),
    }
}

// ── CLI Args ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "agent-market",
    about = "Browse, filter and compare AI agents, estimate what they cost, check out",
    version,
    after_help = "examples:\n  \
        agent-market serve --seed\n  \
        agent-market list content\n  \
        agent-market list --price freemium --cap \"Batch Processing\"\n  \
        agent-market list --template research\n  \
        agent-market compare 1 2 4\n  \
        agent-market estimate 1 --quantity 200\n  \
        agent-market checkout 2"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of a running catalog service.
    #[arg(long, global = true, env = "AGENT_MARKET_URL", default_value = DEFAULT_URL)]
    server: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog service.
    Serve {
        /// Config file (default: agent-market.toml in the user config dir).
        #[arg(long, short)]
        config: Option<PathBuf>,
        #[arg(long)]
        bind: Option<String>,
        /// JSON file to keep the catalog in.
        #[arg(long)]
        data: Option<PathBuf>,
        /// Seed the bundled catalog if the store is empty.
        #[arg(long)]
        seed: bool,
    },
    /// List agents, optionally filtered.
    List {
        /// Matches name, description or category, case-insensitively.
        query: Option<String>,
        /// all, free, freemium, subscription, pay-as-you-go
        #[arg(long, short)]
        price: Option<PriceTier>,
        /// Required capability; repeat for several.
        #[arg(long = "cap")]
        caps: Vec<String>,
        #[arg(long)]
        verified: bool,
        /// Start from a use-case template (see `templates`).
        #[arg(long, short)]
        template: Option<String>,
        #[arg(long, short)]
        json: bool,
    },
    /// Full details for one agent.
    Show {
        id: u32,
        #[arg(long, short)]
        json: bool,
    },
    /// Side-by-side comparison of two or more agents.
    Compare {
        #[arg(num_args = 2.., required = true)]
        ids: Vec<u32>,
        #[arg(long, short)]
        json: bool,
    },
    /// Estimate cost for a usage quantity.
    Estimate {
        id: u32,
        #[arg(long, short, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Reset the service's catalog to the bundled data.
    Seed,
    /// Open a checkout session for an agent.
    Checkout { id: u32 },
    /// Use-case templates.
    Templates,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Serve { .. }));

    let client = MarketClient::new(&cli.server);

    match cli.command {
        Commands::Serve {
            config,
            bind,
            data,
            seed,
        } => {
            let mut cfg = MarketConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                cfg.bind = bind;
            }
            if data.is_some() {
                cfg.data_file = data;
            }
            cfg.seed_on_start |= seed;
            agent_market_server::serve(cfg).await?;
        }
        Commands::List {
            query,
            price,
            caps,
            verified,
            template,
            json,
        } => {
            let (query, criteria) =
                build_query(template.as_deref(), query, price, caps, verified)?;
            cmd_list(&client, &query, &criteria, json).await?;
        }
        Commands::Show { id, json } => cmd_show(&client, id, json).await?,
        Commands::Compare { ids, json } => cmd_compare(&client, &ids, json).await?,
        Commands::Estimate { id, quantity } => cmd_estimate(&client, id, quantity).await?,
        Commands::Seed => cmd_seed(&client).await?,
        Commands::Checkout { id } => cmd_checkout(&client, id).await?,
        Commands::Templates => cmd_templates(),
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise the server logs at info and everything else
/// stays quiet unless something goes wrong.
fn init_tracing(serving: bool) {
    let default = if serving { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ── Query building ───────────────────────────────────────────────────

/// Merge a template with explicit flags. Flags override the template's
/// query and tier; capabilities accumulate.
fn build_query(
    template: Option<&str>,
    query: Option<String>,
    price: Option<PriceTier>,
    caps: Vec<String>,
    verified: bool,
) -> anyhow::Result<(String, FilterCriteria)> {
    let (base_query, mut criteria) = match template {
        Some(key) => {
            let t = templates::find(key).ok_or_else(|| {
                anyhow::anyhow!("unknown template: {key}\n  try: agent-market templates")
            })?;
            (t.query.to_string(), t.criteria())
        }
        None => (String::new(), FilterCriteria::default()),
    };
    if let Some(tier) = price {
        criteria.price_tier = tier;
    }
    for cap in caps {
        if !criteria.capabilities.contains(&cap) {
            criteria.capabilities.push(cap);
        }
    }
    criteria.verified_only |= verified;
    Ok((query.unwrap_or(base_query), criteria))
}

fn describe_criteria(query: &str, c: &FilterCriteria) -> String {
    let mut parts = Vec::new();
    if !query.is_empty() {
        parts.push(format!("\"{query}\""));
    }
    if c.price_tier != PriceTier::All {
        parts.push(c.price_tier.to_string());
    }
    parts.extend(c.capabilities.iter().map(|cap| format!("+{cap}")));
    if c.verified_only {
        parts.push("verified".to_string());
    }
    parts.join("  ")
}

// ── List ─────────────────────────────────────────────────────────────

async fn cmd_list(
    client: &MarketClient,
    query: &str,
    criteria: &FilterCriteria,
    json: bool,
) -> anyhow::Result<()> {
    let term = Term::stderr();
    let spinner = term.is_term() && !json;
    if spinner {
        term.write_line(&format!("{}", s_dim().apply_to("fetching agents...")))?;
    }
    let agents = client.list_agents().await;
    if spinner {
        term.clear_last_lines(1)?;
    }
    let agents = agents?;
    let hits = filter(&agents, query, criteria);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!();
    let title = describe_criteria(query, criteria);
    if title.is_empty() {
        println!("{}", s_header().apply_to("agents"));
    } else {
        println!("{}", s_header().apply_to(format!("agents: {title}")));
    }
    println!("{}", sep(72));

    if hits.is_empty() {
        println!("  {}", s_dim().apply_to("No agents match your criteria."));
        if !criteria.capabilities.is_empty() {
            println!(
                "  {}",
                s_hint().apply_to(format!(
                    "known capabilities: {}",
                    all_capabilities(&agents).join(", ")
                ))
            );
        }
    }
    for a in &hits {
        let model = a.billing_model();
        println!(
            "  {:>3}  {:<24} {:<20} {:<14} {}",
            s_dim().apply_to(a.id),
            s_bold().apply_to(&a.name),
            s_label().apply_to(&a.category),
            tier_style(model).apply_to(a.price_label()),
            verified_str(a.verified),
        );
    }

    println!("{}", sep(72));
    println!(
        "{}",
        s_hint().apply_to(format!(
            "  {} of {} agents   agent-market show <id> for details",
            hits.len(),
            agents.len()
        ))
    );
    println!();
    Ok(())
}

// ── Show ─────────────────────────────────────────────────────────────

async fn cmd_show(client: &MarketClient, id: u32, json: bool) -> anyhow::Result<()> {
    let a = client.get_agent(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&a)?);
        return Ok(());
    }
    print_agent(&a);
    Ok(())
}

fn print_agent(a: &AgentRecord) {
    let model = a.billing_model();
    println!();
    println!(
        "  {}  {}  {}",
        s_header().apply_to(&a.name),
        s_label().apply_to(&a.category),
        verified_str(a.verified)
    );
    println!("  {}", sep(56));
    println!("  {}", a.description);
    println!();

    let row = |k: &str, v: String| {
        println!("  {:<14} {}", s_dim().apply_to(k), v);
    };
    row(
        "pricing",
        format!(
            "{}  {}",
            tier_style(model).apply_to(model.label()),
            s_price().apply_to(pricing_summary(&a.pricing_details))
        ),
    );
    if !a.free_tier.is_empty() {
        row("free tier", a.free_tier.clone());
    }
    row("speed", a.performance.speed.clone());
    row("accuracy", a.performance.accuracy.clone());
    row("uptime", a.performance.uptime.clone());
    if !a.privacy.is_empty() {
        row("privacy", a.privacy.clone());
    }
    row("capabilities", a.capabilities.join(", "));
    if !a.integrations.is_empty() {
        row("integrations", a.integrations.join(", "));
    }

    println!("  {}", sep(56));
    let hint = if a.pricing_details.is_metered() {
        format!("  agent-market estimate {} --quantity <n>", a.id)
    } else {
        format!("  agent-market checkout {}", a.id)
    };
    println!("{}", s_hint().apply_to(hint));
    println!();
}

// ── Compare ──────────────────────────────────────────────────────────

async fn cmd_compare(client: &MarketClient, ids: &[u32], json: bool) -> anyhow::Result<()> {
    let mut selection = SelectionSet::new();
    for &id in ids {
        if !selection.contains(id) {
            selection.toggle(id);
        }
    }
    if !selection.can_compare() {
        anyhow::bail!("pick at least two different agents to compare");
    }

    let agents = client.get_agents(selection.ids()).await?;
    let table = compare(&agents, &Attribute::ALL);

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    let mut out = Table::new();
    out.load_preset(presets::NOTHING);
    out.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("  Feature").fg(Color::AnsiValue(243))];
    header.extend(
        table
            .columns
            .iter()
            .map(|name| Cell::new(name).fg(Color::AnsiValue(252))),
    );
    out.set_header(header);

    for row in &table.rows {
        let mut cells = vec![Cell::new(format!("  {}", row.label)).fg(Color::AnsiValue(248))];
        cells.extend(row.cells.iter().map(Cell::new));
        out.add_row(cells);
    }

    println!();
    println!("{}", s_header().apply_to("compare"));
    println!("{}", sep(72));
    println!("{out}");
    println!("{}", sep(72));
    println!();
    Ok(())
}

// ── Estimate ─────────────────────────────────────────────────────────

async fn cmd_estimate(client: &MarketClient, id: u32, quantity: i64) -> anyhow::Result<()> {
    let a = client.get_agent(id).await?;
    let e = estimate(&a.pricing_details, quantity);

    println!();
    println!(
        "  {}  {}",
        s_header().apply_to(&a.name),
        tier_style(a.billing_model()).apply_to(a.price_label())
    );
    println!("  {}", sep(48));
    if let Some(unit) = a.pricing_details.unit() {
        println!(
            "  {:<14} {} {unit}s",
            s_dim().apply_to("quantity"),
            quantity.max(0)
        );
    }
    println!(
        "  {:<14} {}",
        s_dim().apply_to("estimate"),
        s_price().apply_to(e.total.to_string())
    );
    println!("  {}", s_hint().apply_to(&e.explanation));
    println!();
    Ok(())
}

// ── Seed ─────────────────────────────────────────────────────────────

async fn cmd_seed(client: &MarketClient) -> anyhow::Result<()> {
    let report = client.seed().await?;
    println!();
    println!("  {}", s_hot().apply_to("seeded"));
    println!(
        "  {}",
        s_dim().apply_to(format!("{} ({} agents)", report.message, report.count))
    );
    println!();
    Ok(())
}

// ── Checkout ─────────────────────────────────────────────────────────

async fn cmd_checkout(client: &MarketClient, id: u32) -> anyhow::Result<()> {
    let a = client.get_agent(id).await?;
    let request = CheckoutRequest::for_agent(&a);
    if let Err(e) = request.validate() {
        eprintln!(
            "{}",
            s_err().apply_to(format!("error: {} can't be checked out: {e}", a.name))
        );
        return Ok(());
    }

    let session = client.create_checkout(&request).await?;
    println!();
    println!("  {}  {}", s_hot().apply_to("checkout ready"), s_bold().apply_to(&a.name));
    println!("  {:<10} {}", s_dim().apply_to("session"), session.session_id);
    match session.url {
        Some(url) => println!("  {:<10} {}", s_dim().apply_to("pay at"), s_price().apply_to(url)),
        None => println!("  {}", s_hint().apply_to("no redirect URL returned")),
    }
    println!();
    Ok(())
}

// ── Templates ────────────────────────────────────────────────────────

fn cmd_templates() {
    println!();
    println!("{}", s_header().apply_to("use-case templates"));
    println!("{}", sep(64));
    for t in TEMPLATES {
        let mut detail = Vec::new();
        if !t.query.is_empty() {
            detail.push(format!("\"{}\"", t.query));
        }
        if t.tier != PriceTier::All {
            detail.push(t.tier.to_string());
        }
        detail.extend(t.capabilities.iter().map(|c| format!("+{c}")));
        println!(
            "  {:<12} {:<20} {}",
            s_bold().apply_to(t.key),
            s_label().apply_to(t.name),
            s_dim().apply_to(detail.join("  "))
        );
    }
    println!("{}", sep(64));
    println!(
        "{}",
        s_hint().apply_to("  agent-market list --template <key>")
    );
    println!();
}
